//! Lifecycle Integration Tests
//!
//! Single-caller behavior of the state store: validated transitions, the
//! admin bypass, error precedence, and persistence across reconnects.

#[path = "../common/mod.rs"]
mod common;

mod admin_bypass;
mod error_precedence;
mod transitions;
