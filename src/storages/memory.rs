//! In-memory store backed by a sharded concurrent map.
//!
//! Counter increments take the record's shard write guard, which is the
//! atomic read-modify-write the resolution path relies on. Operations on
//! distinct ids land on independent shard locks and do not serialize.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::feed::{ChangeFeed, Subscription, order_snapshot};
use super::models::LinkRecord;
use super::retry::{RetryConfig, with_retry};
use super::{LinkStore, validate_target_url};
use crate::errors::{RedirectoryError, Result};
use crate::utils::generate_random_code;

pub struct MemoryStore {
    links: DashMap<String, LinkRecord>,
    feed: ChangeFeed,
    // serializes snapshot capture so feed emissions observe mutation order
    feed_lock: parking_lot::Mutex<()>,
    id_length: usize,
}

impl MemoryStore {
    pub fn new(id_length: usize) -> Self {
        MemoryStore {
            links: DashMap::new(),
            feed: ChangeFeed::new(),
            feed_lock: parking_lot::Mutex::new(()),
            id_length,
        }
    }

    fn current_snapshot(&self) -> Vec<LinkRecord> {
        self.links
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn publish_snapshot(&self) {
        let _order = self.feed_lock.lock();
        self.feed.publish(order_snapshot(self.current_snapshot()));
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn create(&self, url: &str) -> Result<LinkRecord> {
        validate_target_url(url)?;

        // 生成的 id 撞上已有记录视为写冲突，换一个重来
        let record = with_retry("assign link id", RetryConfig::default(), || async {
            let id = generate_random_code(self.id_length);
            match self.links.entry(id.clone()) {
                Entry::Occupied(_) => Err(RedirectoryError::conflict(format!(
                    "generated id '{}' is already taken",
                    id
                ))),
                Entry::Vacant(slot) => {
                    let record = LinkRecord {
                        id,
                        url: url.to_string(),
                        access_count: 0,
                        created_at: chrono::Utc::now(),
                    };
                    slot.insert(record.clone());
                    Ok(record)
                }
            }
        })
        .await?;

        debug!("Created link {} -> {}", record.id, record.url);
        self.publish_snapshot();
        Ok(record)
    }

    async fn get(&self, id: &str) -> Option<LinkRecord> {
        self.links.get(id).map(|entry| entry.value().clone())
    }

    async fn update(&self, id: &str, url: &str) -> Result<()> {
        validate_target_url(url)?;

        match self.links.get_mut(id) {
            Some(mut record) => {
                record.url = url.to_string();
            }
            None => {
                return Err(RedirectoryError::not_found(format!(
                    "link '{}' does not exist",
                    id
                )));
            }
        }

        self.publish_snapshot();
        Ok(())
    }

    async fn increment_access(&self, id: &str) -> Result<()> {
        // get_mut holds the shard write guard across the read and the write
        match self.links.get_mut(id) {
            Some(mut record) => {
                record.access_count += 1;
            }
            None => {
                return Err(RedirectoryError::not_found(format!(
                    "link '{}' does not exist",
                    id
                )));
            }
        }

        self.publish_snapshot();
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        if self.links.remove(id).is_none() {
            return Err(RedirectoryError::not_found(format!(
                "link '{}' does not exist",
                id
            )));
        }

        debug!("Removed link {}", id);
        self.publish_snapshot();
        Ok(())
    }

    async fn load_all(&self) -> HashMap<String, LinkRecord> {
        self.links
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    async fn subscribe(&self) -> Subscription {
        // capture the seed snapshot under the feed order lock so the first
        // delivery is never older than an emission already in flight
        let _order = self.feed_lock.lock();
        self.feed.subscribe(order_snapshot(self.current_snapshot()))
    }

    async fn backend_name(&self) -> String {
        "memory".to_string()
    }
}
