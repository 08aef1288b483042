use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a stored prospect: one row per user and prospect pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProspectKey {
    pub user_id: String,
    pub prospect_id: String,
}

impl ProspectKey {
    pub fn new(user_id: impl Into<String>, prospect_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            prospect_id: prospect_id.into(),
        }
    }
}

/// Verdict for one prospect, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectUpsert {
    pub key: ProspectKey,
    pub company_country: Option<String>,
    pub company_state: Option<String>,
    pub qualified: bool,
}

/// Stored prospect with its latest verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectRecord {
    pub id: u64,
    pub user_id: String,
    pub prospect_id: String,
    pub company_country: Option<String>,
    pub company_state: Option<String>,
    pub qualified: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ProspectRecord {
    pub fn key(&self) -> ProspectKey {
        ProspectKey::new(self.user_id.clone(), self.prospect_id.clone())
    }

    /// Applies an upsert to an existing record, keeping its id and creation time.
    pub fn apply(&mut self, upsert: ProspectUpsert, now: DateTime<Utc>) {
        self.company_country = upsert.company_country;
        self.company_state = upsert.company_state;
        self.qualified = upsert.qualified;
        self.last_updated = now;
    }

    pub fn from_upsert(id: u64, upsert: ProspectUpsert, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: upsert.key.user_id,
            prospect_id: upsert.key.prospect_id,
            company_country: upsert.company_country,
            company_state: upsert.company_state,
            qualified: upsert.qualified,
            created_at: now,
            last_updated: now,
        }
    }
}

/// Counts from a single upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
}

impl UpsertReport {
    pub fn merge(&mut self, other: UpsertReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
    }
}

/// Storage abstraction so the qualification service can be exercised in isolation.
///
/// `upsert_batch` inserts unseen keys and overwrites location and verdict for known ones;
/// implementations should apply a batch atomically.
pub trait ProspectRepository: Send + Sync {
    fn upsert_batch(&self, batch: Vec<ProspectUpsert>) -> Result<UpsertReport, RepositoryError>;
    fn fetch(&self, key: &ProspectKey) -> Result<Option<ProspectRecord>, RepositoryError>;
    fn qualified(&self) -> Result<Vec<ProspectRecord>, RepositoryError>;
    fn count(&self) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
