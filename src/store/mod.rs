pub mod filter;
pub mod sqlite;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TAROT_KEY_PREFIX;

pub use filter::{Field, Filter};

/// Conversation identity as delivered by the messaging platform.
pub type ChatId = i64;

/// How many times a keyword has been counted by `/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub id: String,
    pub count: u64,
}

/// The last card a user drew, plus the contact value they shared for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotDrawRecord {
    pub id: String,
    pub tarot_result: String,
    pub analysis: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl TarotDrawRecord {
    /// A fresh draw. Any previously shared contact value is not carried over.
    pub fn new(chat_id: ChatId, tarot_result: String, analysis: String, timestamp: u64) -> Self {
        Self {
            id: tarot_key(chat_id),
            tarot_result,
            analysis,
            timestamp,
            phone: None,
        }
    }
}

/// Key of a user's tarot record.
pub fn tarot_key(chat_id: ChatId) -> String {
    format!("{TAROT_KEY_PREFIX}{chat_id}")
}

/// Every shape the store knows how to hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Document {
    Keyword(KeywordRecord),
    Tarot(TarotDrawRecord),
}

impl Document {
    pub fn id(&self) -> &str {
        match self {
            Document::Keyword(r) => &r.id,
            Document::Tarot(r) => &r.id,
        }
    }

    /// Records are partitioned by their own id.
    pub fn partition_key(&self) -> &str {
        self.id()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Document::Keyword(_) => "keyword",
            Document::Tarot(_) => "tarot",
        }
    }

    pub fn into_keyword(self) -> Result<KeywordRecord, StoreError> {
        match self {
            Document::Keyword(r) => Ok(r),
            other => Err(StoreError::UnexpectedKind {
                id: other.id().to_string(),
                expected: "keyword",
                found: other.kind(),
            }),
        }
    }

    pub fn into_tarot(self) -> Result<TarotDrawRecord, StoreError> {
        match self {
            Document::Tarot(r) => Ok(r),
            other => Err(StoreError::UnexpectedKind {
                id: other.id().to_string(),
                expected: "tarot",
                found: other.kind(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("document {id} is malformed: {source}")]
    Malformed {
        id: String,
        source: serde_json::Error,
    },

    #[error("document stored under {key} carries id {found}")]
    KeyMismatch { key: String, found: String },

    #[error("document {id} is a {found} record, expected {expected}")]
    UnexpectedKind {
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("scan does not pin a partition; cross-partition scan must be enabled")]
    CrossPartitionRequired,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("store connection poisoned")]
    Poisoned,
}

/// Single-pass sequence of scan results.
pub type DocumentStream = BoxStream<'static, Result<Document, StoreError>>;

/// Keyed document storage. Could be SQLite, a hosted document database, etc.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, id: &str, partition_key: &str) -> Result<Document, StoreError>;

    /// Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, doc: &Document) -> Result<(), StoreError>;

    /// Fails with `NotFound` if there is nothing to replace.
    async fn replace(&self, doc: &Document) -> Result<(), StoreError>;

    /// Create or replace the whole document.
    async fn upsert(&self, doc: &Document) -> Result<(), StoreError>;

    async fn scan(&self, filter: &Filter, cross_partition: bool)
    -> Result<DocumentStream, StoreError>;
}
