use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::evaluation::{QualificationEngine, QualificationOutcome, QualificationReason};
use super::ingest::{ProspectCsvReader, ProspectRow};
use super::preferences::PreferenceBook;
use super::regions::canonical_location;
use super::repository::{
    ProspectKey, ProspectRecord, ProspectRepository, ProspectUpsert, RepositoryError,
    UpsertReport,
};
use super::sources::SourceError;

/// Number of verdicts written per repository call unless overridden.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Service composing the evaluator, loaded preferences, and prospect storage.
pub struct ProspectQualificationService<R> {
    engine: Arc<QualificationEngine>,
    preferences: Arc<PreferenceBook>,
    repository: Arc<R>,
    batch_size: usize,
}

impl<R> ProspectQualificationService<R>
where
    R: ProspectRepository + 'static,
{
    pub fn new(
        engine: Arc<QualificationEngine>,
        preferences: Arc<PreferenceBook>,
        repository: Arc<R>,
    ) -> Self {
        Self {
            engine,
            preferences,
            repository,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Overrides the write batch size; values below one are clamped to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn engine(&self) -> &QualificationEngine {
        &self.engine
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Verdict for one row. Users without preferences qualify by default and the
    /// evaluator is not consulted.
    pub fn verdict(&self, row: &ProspectRow) -> bool {
        match self.preferences.get(&row.user_id) {
            Some(preference) => self
                .engine
                .is_qualified_for(row.country(), row.state(), preference),
            None => true,
        }
    }

    /// Explained verdict for a single user and location.
    pub fn check(
        &self,
        user_id: &str,
        country: Option<&str>,
        subdivision: Option<&str>,
    ) -> QualificationOutcome {
        match self.preferences.get(user_id) {
            Some(preference) => self.engine.explain_for(country, subdivision, preference),
            None => {
                let regions = self
                    .engine
                    .regions_for(country, subdivision)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                QualificationOutcome::from_reason(
                    canonical_location(country, subdivision),
                    regions,
                    QualificationReason::NoPreferences,
                )
            }
        }
    }

    /// Evaluates every row and upserts the verdicts in `batch_size` chunks.
    pub fn qualify_rows(
        &self,
        rows: Vec<ProspectRow>,
    ) -> Result<BatchReport, QualificationServiceError> {
        let processed = rows.len();
        let upserts: Vec<ProspectUpsert> = rows
            .into_par_iter()
            .map(|row| {
                let qualified = self.verdict(&row);
                ProspectUpsert {
                    key: ProspectKey::new(row.user_id, row.prospect_id),
                    company_country: row.company_country,
                    company_state: row.company_state,
                    qualified,
                }
            })
            .collect();

        let qualified = upserts.iter().filter(|upsert| upsert.qualified).count();
        let mut writes = UpsertReport::default();
        let mut pending = upserts.into_iter().peekable();

        while pending.peek().is_some() {
            let chunk: Vec<ProspectUpsert> = pending.by_ref().take(self.batch_size).collect();
            debug!(size = chunk.len(), "writing prospect batch");
            writes.merge(self.repository.upsert_batch(chunk)?);
        }

        let report = BatchReport {
            processed,
            qualified,
            inserted: writes.inserted,
            updated: writes.updated,
        };
        info!(
            processed = report.processed,
            qualified = report.qualified,
            inserted = report.inserted,
            updated = report.updated,
            stored = self.stored_prospects()?,
            "prospect batch qualified"
        );

        Ok(report)
    }

    pub fn qualify_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<BatchReport, QualificationServiceError> {
        let rows = ProspectCsvReader::from_path(path)?;
        self.qualify_rows(rows)
    }

    pub fn qualify_from_reader<T: Read>(
        &self,
        reader: T,
    ) -> Result<BatchReport, QualificationServiceError> {
        let rows = ProspectCsvReader::from_reader(reader)?;
        self.qualify_rows(rows)
    }

    /// Summary in the shape the qualification endpoint reports: `qualified` counts every
    /// qualified record in storage, not only those from the latest batch.
    pub fn summary(
        &self,
        total_processed: usize,
    ) -> Result<QualificationSummary, QualificationServiceError> {
        let qualified = self.repository.qualified()?.len();
        Ok(QualificationSummary {
            total_processed,
            qualified,
            not_qualified: total_processed.saturating_sub(qualified),
        })
    }

    pub fn qualified_prospects(&self) -> Result<Vec<ProspectRecord>, QualificationServiceError> {
        Ok(self.repository.qualified()?)
    }

    /// Number of prospects held by the repository across all runs.
    pub fn stored_prospects(&self) -> Result<usize, QualificationServiceError> {
        Ok(self.repository.count()?)
    }

    pub fn get(&self, key: &ProspectKey) -> Result<ProspectRecord, QualificationServiceError> {
        let record = self
            .repository
            .fetch(key)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Outcome of one qualification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub processed: usize,
    pub qualified: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Counts returned by the qualification endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationSummary {
    pub total_processed: usize,
    pub qualified: usize,
    pub not_qualified: usize,
}

/// Error raised by the qualification service.
#[derive(Debug, thiserror::Error)]
pub enum QualificationServiceError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
