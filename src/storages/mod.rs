use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::get_config;
use crate::errors::{RedirectoryError, Result};

pub mod feed;
pub mod file;
pub mod memory;
pub mod models;
pub mod retry;

pub use feed::{ChangeFeed, Snapshot, Subscription};
pub use models::{LinkRecord, SerializableLinkRecord};

/// The record store: exclusive owner of link persistence.
///
/// All writes go through here; the registry service and the resolver never
/// hold a writable record reference of their own. Every successful mutation
/// publishes one complete snapshot on the store's change feed.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Persist a new record under a freshly assigned id, access count zero.
    async fn create(&self, url: &str) -> Result<LinkRecord>;

    /// Point lookup; `None` means the id does not exist.
    async fn get(&self, id: &str) -> Option<LinkRecord>;

    /// Replace the target url, leaving the access count untouched.
    async fn update(&self, id: &str, url: &str) -> Result<()>;

    /// Atomic read-modify-write of the access counter: N concurrent calls
    /// for one id always add exactly N.
    async fn increment_access(&self, id: &str) -> Result<()>;

    async fn remove(&self, id: &str) -> Result<()>;

    async fn load_all(&self) -> HashMap<String, LinkRecord>;

    /// Subscribe to the change feed; the current snapshot is delivered first.
    async fn subscribe(&self) -> Subscription;

    async fn backend_name(&self) -> String;
}

/// Creation requires a non-empty target; a record with no url must never
/// reach persistence.
pub(crate) fn validate_target_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(RedirectoryError::validation(
            "target url must not be blank",
        ));
    }
    Ok(())
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create() -> Result<Arc<dyn LinkStore>> {
        let config = get_config();

        let boxed: Box<dyn LinkStore> = match config.storage.backend.as_str() {
            "memory" => Box::new(memory::MemoryStore::new(config.storage.id_length)),
            _ => Box::new(
                file::FileStore::new_async(&config.storage.file_path, config.storage.id_length)
                    .await?,
            ),
        };

        Ok(Arc::from(boxed))
    }
}
