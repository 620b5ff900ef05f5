use serde::{Deserialize, Serialize};

/// A registered redirect link.
///
/// `id` is assigned by the store at creation time and never changes;
/// `access_count` only ever moves up, by exactly one per successful
/// resolution. Edits replace `url` and touch nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: String,
    pub url: String,
    pub access_count: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Document form of a [`LinkRecord`], used for file persistence and the
/// admin API. Timestamps are RFC3339 strings.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SerializableLinkRecord {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub access_count: u64,
    pub created_at: String,
}

impl From<&LinkRecord> for SerializableLinkRecord {
    fn from(record: &LinkRecord) -> Self {
        SerializableLinkRecord {
            id: record.id.clone(),
            url: record.url.clone(),
            access_count: record.access_count,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

impl From<SerializableLinkRecord> for LinkRecord {
    fn from(doc: SerializableLinkRecord) -> Self {
        let created_at = chrono::DateTime::parse_from_rfc3339(&doc.created_at)
            .unwrap_or_else(|_| chrono::Utc::now().into())
            .with_timezone(&chrono::Utc);

        LinkRecord {
            id: doc.id,
            url: doc.url,
            access_count: doc.access_count,
            created_at,
        }
    }
}
