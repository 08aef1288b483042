//! Geographic qualification of prospects against per-user location rules.
//!
//! [`RegionMap`] resolves a location to the regions it belongs to and
//! [`QualificationEngine`] applies include/exclude precedence on top of it. Both are pure
//! over read-only data. The remaining modules load that data, ingest prospect rows, and
//! persist verdicts through [`ProspectRepository`].

pub mod evaluation;
pub mod ingest;
pub mod preferences;
pub mod regions;
pub mod repository;
pub mod router;
pub mod service;
pub(crate) mod sources;

#[cfg(test)]
mod tests;

pub use evaluation::{QualificationEngine, QualificationOutcome, QualificationReason, RuleSet};
pub use ingest::{ProspectCsvReader, ProspectRow};
pub use preferences::{LocationPreference, PreferenceBook, ALL_LOCATIONS};
pub use regions::{canonical_location, RegionMap, SUBDIVIDED_COUNTRY};
pub use repository::{
    ProspectKey, ProspectRecord, ProspectRepository, ProspectUpsert, RepositoryError,
    UpsertReport,
};
pub use router::{qualification_router, CheckRequest, InlineProspects, QualificationState};
pub use service::{
    BatchReport, ProspectQualificationService, QualificationServiceError, QualificationSummary,
    DEFAULT_BATCH_SIZE,
};
pub use sources::SourceError;
