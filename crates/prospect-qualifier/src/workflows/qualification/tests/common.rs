use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::qualification::{
    LocationPreference, PreferenceBook, ProspectKey, ProspectQualificationService,
    ProspectRecord, ProspectRepository, ProspectRow, ProspectUpsert, QualificationEngine,
    RegionMap, RepositoryError, UpsertReport,
};

pub(super) fn region_map() -> RegionMap {
    RegionMap::from_iter([
        ("US", vec!["North America"]),
        ("US-CA", vec!["West Coast", "California"]),
        ("US-WA", vec!["West Coast", "Washington"]),
        ("US-NY", vec!["East Coast", "New York"]),
        ("US-TX", vec!["South", "Texas"]),
        ("CA", vec!["North America", "Canada"]),
        ("MX", vec!["North America", "Latin America"]),
        ("UK", vec!["Europe", "United Kingdom"]),
        ("FR", vec!["Europe", "European Union"]),
        ("DE", vec!["Europe", "European Union"]),
        ("NG", vec!["Africa", "Nigeria"]),
        ("JP", vec!["Asia", "Japan"]),
    ])
}

pub(super) fn preferences() -> PreferenceBook {
    PreferenceBook::from_iter([
        (
            "us_california_with_ny_exclusion",
            LocationPreference::new(["US-CA", "North America"], ["US-NY"]),
        ),
        (
            "europe_only_with_africa_exclusion",
            LocationPreference::new(["Europe"], ["Africa"]),
        ),
        ("empty_preferences", LocationPreference::default()),
        (
            "conflicting_regions",
            LocationPreference::new(["US-CA"], ["North America"]),
        ),
        (
            "hierarchical_exclusion",
            LocationPreference::new(["Asia", "Europe"], ["Japan"]),
        ),
        (
            "everywhere_but_africa",
            LocationPreference::new(["All"], ["Africa"]),
        ),
    ])
}

pub(super) fn engine() -> Arc<QualificationEngine> {
    Arc::new(QualificationEngine::new(Arc::new(region_map())))
}

pub(super) fn build_service(
    batch_size: usize,
) -> (
    Arc<ProspectQualificationService<MemoryRepository>>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ProspectQualificationService::new(
        engine(),
        Arc::new(preferences()),
        repository.clone(),
    )
    .with_batch_size(batch_size);
    (Arc::new(service), repository)
}

pub(super) fn row(user: &str, prospect: &str, country: &str, state: Option<&str>) -> ProspectRow {
    let country = Some(country).filter(|value| !value.is_empty());
    ProspectRow::new(user, prospect, country, state)
}

pub(super) const PROSPECTS_CSV: &str = "user_id,prospect_id,company_country,company_state\n\
us_california_with_ny_exclusion,p1,US,CA\n\
us_california_with_ny_exclusion,p2,US,NY\n\
europe_only_with_africa_exclusion,p3,FR,\n\
europe_only_with_africa_exclusion,p4,NG,\n\
unknown_user,p5,JP,\n\
hierarchical_exclusion,p6,JP,\n";

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<BTreeMap<ProspectKey, ProspectRecord>>,
    sequence: AtomicU64,
    batches: Mutex<Vec<usize>>,
}

impl MemoryRepository {
    pub(super) fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().expect("batch mutex poisoned").clone()
    }
}

impl ProspectRepository for MemoryRepository {
    fn upsert_batch(&self, batch: Vec<ProspectUpsert>) -> Result<UpsertReport, RepositoryError> {
        self.batches
            .lock()
            .expect("batch mutex poisoned")
            .push(batch.len());

        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let now = Utc::now();
        let mut report = UpsertReport::default();
        for upsert in batch {
            match guard.get_mut(&upsert.key) {
                Some(existing) => {
                    existing.apply(upsert, now);
                    report.updated += 1;
                }
                None => {
                    let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
                    guard.insert(
                        upsert.key.clone(),
                        ProspectRecord::from_upsert(id, upsert, now),
                    );
                    report.inserted += 1;
                }
            }
        }
        Ok(report)
    }

    fn fetch(&self, key: &ProspectKey) -> Result<Option<ProspectRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn qualified(&self) -> Result<Vec<ProspectRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.qualified)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").len())
    }
}

pub(super) struct UnavailableRepository;

impl ProspectRepository for UnavailableRepository {
    fn upsert_batch(&self, _batch: Vec<ProspectUpsert>) -> Result<UpsertReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _key: &ProspectKey) -> Result<Option<ProspectRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn qualified(&self) -> Result<Vec<ProspectRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
