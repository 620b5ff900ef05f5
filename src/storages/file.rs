use std::collections::HashMap;
use std::fs;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::feed::{ChangeFeed, Subscription, order_snapshot};
use super::models::{LinkRecord, SerializableLinkRecord};
use super::retry::{RetryConfig, with_retry};
use super::{LinkStore, validate_target_url};
use crate::errors::{RedirectoryError, Result};
use crate::utils::generate_random_code;

/// JSON document file backend.
///
/// The file itself is the source of truth; every operation loads, mutates
/// and writes back under `io_lock`, so a mutation either fully lands on disk
/// or leaves the registry exactly as it was.
pub struct FileStore {
    file_path: String,
    // write guard spans the whole load-modify-save cycle
    io_lock: RwLock<()>,
    feed: ChangeFeed,
    id_length: usize,
}

impl FileStore {
    pub async fn new_async(file_path: &str, id_length: usize) -> Result<Self> {
        // 如果不存在就初始化
        if fs::read_to_string(file_path).is_err() {
            fs::write(file_path, "[]")?;
            info!("Created empty link file: {}", file_path);
        }

        Ok(FileStore {
            file_path: file_path.to_string(),
            io_lock: RwLock::new(()),
            feed: ChangeFeed::new(),
            id_length,
        })
    }

    fn load_from_file(&self) -> Result<HashMap<String, LinkRecord>> {
        let content = fs::read_to_string(&self.file_path).map_err(|e| {
            error!("Failed to read link file {}: {}", self.file_path, e);
            RedirectoryError::file_operation(format!("failed to read link file: {}", e))
        })?;

        let docs: Vec<SerializableLinkRecord> = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse link file {}: {}", self.file_path, e);
            RedirectoryError::serialization(format!("failed to parse link file: {}", e))
        })?;

        Ok(docs
            .into_iter()
            .map(|doc| {
                let record: LinkRecord = doc.into();
                (record.id.clone(), record)
            })
            .collect())
    }

    fn save_to_file(&self, links: &HashMap<String, LinkRecord>) -> Result<()> {
        let docs: Vec<SerializableLinkRecord> =
            links.values().map(SerializableLinkRecord::from).collect();

        let json = serde_json::to_string_pretty(&docs)?;
        fs::write(&self.file_path, json)?;
        Ok(())
    }

    fn publish_locked(&self, links: &HashMap<String, LinkRecord>) {
        // called with the write guard held, so emissions follow file order
        self.feed
            .publish(order_snapshot(links.values().cloned().collect()));
    }
}

#[async_trait]
impl LinkStore for FileStore {
    async fn create(&self, url: &str) -> Result<LinkRecord> {
        validate_target_url(url)?;

        let record = with_retry("assign link id", RetryConfig::default(), || async {
            let _guard = self.io_lock.write().await;
            let mut links = self.load_from_file()?;

            let id = generate_random_code(self.id_length);
            if links.contains_key(&id) {
                return Err(RedirectoryError::conflict(format!(
                    "generated id '{}' is already taken",
                    id
                )));
            }

            let record = LinkRecord {
                id: id.clone(),
                url: url.to_string(),
                access_count: 0,
                created_at: chrono::Utc::now(),
            };
            links.insert(id, record.clone());

            self.save_to_file(&links)?;
            self.publish_locked(&links);
            Ok(record)
        })
        .await?;

        info!("Created link {} -> {}", record.id, record.url);
        Ok(record)
    }

    async fn get(&self, id: &str) -> Option<LinkRecord> {
        let _guard = self.io_lock.read().await;
        match self.load_from_file() {
            Ok(links) => links.get(id).cloned(),
            Err(e) => {
                error!("Failed to load links from file: {}", e);
                None
            }
        }
    }

    async fn update(&self, id: &str, url: &str) -> Result<()> {
        validate_target_url(url)?;

        let _guard = self.io_lock.write().await;
        let mut links = self.load_from_file()?;

        match links.get_mut(id) {
            Some(record) => {
                record.url = url.to_string();
            }
            None => {
                return Err(RedirectoryError::not_found(format!(
                    "link '{}' does not exist",
                    id
                )));
            }
        }

        self.save_to_file(&links)?;
        self.publish_locked(&links);
        Ok(())
    }

    async fn increment_access(&self, id: &str) -> Result<()> {
        // the write guard makes the load-add-save cycle one atomic step
        let _guard = self.io_lock.write().await;
        let mut links = self.load_from_file()?;

        match links.get_mut(id) {
            Some(record) => {
                record.access_count += 1;
            }
            None => {
                return Err(RedirectoryError::not_found(format!(
                    "link '{}' does not exist",
                    id
                )));
            }
        }

        self.save_to_file(&links)?;
        self.publish_locked(&links);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.io_lock.write().await;
        let mut links = self.load_from_file()?;

        if links.remove(id).is_none() {
            return Err(RedirectoryError::not_found(format!(
                "link '{}' does not exist",
                id
            )));
        }

        self.save_to_file(&links)?;
        self.publish_locked(&links);
        info!("Removed link {}", id);
        Ok(())
    }

    async fn load_all(&self) -> HashMap<String, LinkRecord> {
        let _guard = self.io_lock.read().await;
        match self.load_from_file() {
            Ok(links) => links,
            Err(e) => {
                error!("Failed to load links from file: {}", e);
                HashMap::new()
            }
        }
    }

    async fn subscribe(&self) -> Subscription {
        let _guard = self.io_lock.read().await;
        let initial = match self.load_from_file() {
            Ok(links) => order_snapshot(links.into_values().collect()),
            Err(e) => {
                error!("Failed to load links from file: {}", e);
                Vec::new()
            }
        };
        self.feed.subscribe(initial)
    }

    async fn backend_name(&self) -> String {
        "file".to_string()
    }
}
