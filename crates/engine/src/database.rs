//! Opening a store against an endpoint
//!
//! # Flow
//!
//! 1. Validate the database namespace
//! 2. `mem://`: fresh in-memory collection, done
//! 3. Directory endpoint: create the root, read or create
//!    `streamstate.toml`, derive the durability mode
//! 4. Open `<root>/<database>/` as a durable collection (lock, replay WAL)
//!
//! Every error here is a startup failure for the host program.

use std::path::Path;
use std::sync::Arc;
use streamstate_core::{Error, Result, StreamCollection};
use streamstate_storage::{DurableCollection, MemoryCollection};
use tracing::info;

use crate::config::{StoreConfig, CONFIG_FILE_NAME};
use crate::endpoint::{validate_database_name, Endpoint, COLLECTION_NAME};
use crate::store::StateStore;

/// Open a store for `database` at `endpoint`
///
/// Durable endpoints read `streamstate.toml` from the root, writing the
/// default file first if it is missing.
///
/// # Example
///
/// ```text
/// use streamstate_engine::{connect, Endpoint};
///
/// let store = connect(&Endpoint::parse("file:///var/lib/streams")?, "test")?;
/// ```
pub fn connect(endpoint: &Endpoint, database: &str) -> Result<StateStore> {
    validate_database_name(database)?;

    let root = match endpoint {
        Endpoint::Memory => return connect_with_config(endpoint, database, StoreConfig::default()),
        Endpoint::Directory(root) => root,
    };

    create_root(root)?;
    let config_path = root.join(CONFIG_FILE_NAME);
    StoreConfig::write_default_if_missing(&config_path)?;
    let config = StoreConfig::from_file(&config_path)?;

    open_store(endpoint, database, &config)
}

/// Open a store with an explicit configuration
///
/// For durable endpoints the config is written to `streamstate.toml` so that
/// later plain `connect` calls pick up the same settings.
pub fn connect_with_config(
    endpoint: &Endpoint,
    database: &str,
    config: StoreConfig,
) -> Result<StateStore> {
    validate_database_name(database)?;
    config.durability_mode()?;

    if let Endpoint::Directory(root) = endpoint {
        create_root(root)?;
        config.write_to_file(&root.join(CONFIG_FILE_NAME))?;
    }

    open_store(endpoint, database, &config)
}

/// Parse `url` and connect
pub fn connect_url(url: &str, database: &str) -> Result<StateStore> {
    connect(&Endpoint::parse(url)?, database)
}

fn create_root(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root).map_err(|e| {
        Error::unavailable(format!(
            "cannot create data directory '{}': {}",
            root.display(),
            e
        ))
    })
}

fn open_store(endpoint: &Endpoint, database: &str, config: &StoreConfig) -> Result<StateStore> {
    let collection: Arc<dyn StreamCollection> = match endpoint {
        Endpoint::Memory => Arc::new(MemoryCollection::new()),
        Endpoint::Directory(root) => {
            let mode = config.durability_mode()?;
            let durable = DurableCollection::open(&root.join(database), mode)?;
            info!(
                target: "streamstate::db",
                root = %root.display(),
                database,
                durability = mode.description(),
                replayed = durable.recovery_stats().records_replayed,
                "Opened durable collection"
            );
            Arc::new(durable)
        }
    };

    info!(
        target: "streamstate::db",
        endpoint = %endpoint,
        database,
        collection = COLLECTION_NAME,
        documents = collection.len(),
        "Connected"
    );
    Ok(StateStore::new(collection))
}
