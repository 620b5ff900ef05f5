//! Link management service
//!
//! Validates operator intents and forwards them to the record store. Shared
//! between the HTTP admin handlers and the CLI. `search` and
//! `resolution_path` are pure functions: they touch no storage of their own.

use std::sync::Arc;

use tracing::info;

use crate::errors::{RedirectoryError, Result};
use crate::storages::{LinkRecord, LinkStore};

#[derive(Clone)]
pub struct LinkService {
    storage: Arc<dyn LinkStore>,
}

impl LinkService {
    pub fn new(storage: Arc<dyn LinkStore>) -> Self {
        LinkService { storage }
    }

    pub fn storage(&self) -> &Arc<dyn LinkStore> {
        &self.storage
    }

    /// Register a new redirect target. The id is store-assigned; a blank or
    /// whitespace-only target is rejected before anything touches storage.
    pub async fn create_link(&self, url: &str) -> Result<LinkRecord> {
        Self::ensure_target(url)?;

        let record = self.storage.create(url).await?;
        info!("Link {} now redirects to {}", record.id, record.url);
        Ok(record)
    }

    /// Point the record at a new target. The access count is untouched.
    pub async fn edit_link(&self, id: &str, url: &str) -> Result<()> {
        Self::ensure_target(url)?;

        self.storage.update(id, url).await?;
        info!("Link {} now redirects to {}", id, url);
        Ok(())
    }

    pub async fn delete_link(&self, id: &str) -> Result<()> {
        self.storage.remove(id).await
    }

    /// Case-sensitive substring filter on the id, over whatever snapshot the
    /// caller supplies. An empty term matches every record.
    pub fn search(records: &[LinkRecord], term: &str) -> Vec<LinkRecord> {
        records
            .iter()
            .filter(|record| record.id.contains(term))
            .cloned()
            .collect()
    }

    /// Externally visible resolution path for a record.
    pub fn resolution_path(id: &str) -> String {
        format!("/redirect/{}", id)
    }

    fn ensure_target(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(RedirectoryError::validation(
                "target url must not be blank",
            ));
        }
        Ok(())
    }
}
