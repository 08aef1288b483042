use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use prospect_qualifier::config::SourceConfig;
use prospect_qualifier::error::AppError;
use prospect_qualifier::workflows::qualification::{
    PreferenceBook, ProspectKey, ProspectQualificationService, ProspectRecord,
    ProspectRepository, ProspectUpsert, QualificationEngine, RegionMap, RepositoryError,
    UpsertReport,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct ProspectTable {
    records: HashMap<ProspectKey, ProspectRecord>,
    next_id: u64,
}

/// Process-local prospect store with upsert semantics keyed by user and prospect id.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProspectRepository {
    table: Arc<Mutex<ProspectTable>>,
}

impl InMemoryProspectRepository {
    fn lock(&self) -> Result<MutexGuard<'_, ProspectTable>, RepositoryError> {
        self.table
            .lock()
            .map_err(|_| RepositoryError::Unavailable("prospect table lock poisoned".to_string()))
    }
}

impl ProspectRepository for InMemoryProspectRepository {
    fn upsert_batch(&self, batch: Vec<ProspectUpsert>) -> Result<UpsertReport, RepositoryError> {
        let mut guard = self.lock()?;
        let now = Utc::now();
        let mut report = UpsertReport::default();

        for upsert in batch {
            if let Some(existing) = guard.records.get_mut(&upsert.key) {
                existing.apply(upsert, now);
                report.updated += 1;
                continue;
            }

            guard.next_id += 1;
            let record = ProspectRecord::from_upsert(guard.next_id, upsert, now);
            guard.records.insert(record.key(), record);
            report.inserted += 1;
        }

        Ok(report)
    }

    fn fetch(&self, key: &ProspectKey) -> Result<Option<ProspectRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.get(key).cloned())
    }

    fn qualified(&self) -> Result<Vec<ProspectRecord>, RepositoryError> {
        let guard = self.lock()?;
        let mut records: Vec<ProspectRecord> = guard
            .records
            .values()
            .filter(|record| record.qualified)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.len())
    }
}

/// Loads the region map and preferences. Missing or malformed sources are fatal.
pub(crate) fn load_sources(
    sources: &SourceConfig,
) -> Result<(Arc<QualificationEngine>, Arc<PreferenceBook>), AppError> {
    let regions = RegionMap::from_path(&sources.region_map)?;
    let preferences = PreferenceBook::from_path(&sources.user_preferences)?;

    info!(
        regions = regions.len(),
        users = preferences.len(),
        region_map = %sources.region_map.display(),
        user_preferences = %sources.user_preferences.display(),
        "qualification sources loaded"
    );

    Ok((
        Arc::new(QualificationEngine::new(Arc::new(regions))),
        Arc::new(preferences),
    ))
}

pub(crate) fn build_service(
    sources: &SourceConfig,
) -> Result<Arc<ProspectQualificationService<InMemoryProspectRepository>>, AppError> {
    let (engine, preferences) = load_sources(sources)?;
    let repository = Arc::new(InMemoryProspectRepository::default());
    let service = ProspectQualificationService::new(engine, preferences, repository)
        .with_batch_size(sources.batch_size);
    Ok(Arc::new(service))
}
