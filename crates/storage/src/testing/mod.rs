//! Testing utilities for racing writers
//!
//! - **Read rendezvous**: Collection decorator that lines up point reads at a
//!   barrier so concurrent writers observe the same precondition
//!
//! # Example
//!
//! ```ignore
//! use streamstate_storage::testing::ReadRendezvous;
//!
//! let rv = Arc::new(ReadRendezvous::new(collection));
//! rv.arm(2);
//! // two threads now call store.set_state(...) and both read before either writes
//! ```

mod rendezvous;

pub use rendezvous::ReadRendezvous;
