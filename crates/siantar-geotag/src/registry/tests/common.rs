use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::registry::domain::{Business, BusinessId, NetworkType, User, UserId, UserRole};
use crate::registry::repository::{BusinessRepository, RepositoryError};
use crate::registry::stats::AnalyticsSettings;
use crate::registry::submission::{BusinessSubmission, LocationReading};
use crate::registry::{registry_router, RegistryService};

pub(crate) fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn business(
    id: &str,
    legal_name: &str,
    address: &str,
    district: &str,
    sub_district: &str,
) -> Business {
    Business {
        id: BusinessId(id.to_string()),
        legal_name: legal_name.to_string(),
        commercial_name: legal_name.to_string(),
        address: address.to_string(),
        district: district.to_string(),
        sub_district: sub_district.to_string(),
        sls_code: "1272010001".to_string(),
        phone: "081234567890".to_string(),
        email: "usaha@example.com".to_string(),
        founding_year: 2015,
        activity_description: "Perdagangan eceran kebutuhan sehari-hari".to_string(),
        network_type: NetworkType::Single,
        latitude: 2.9595,
        longitude: 99.0687,
        submitted_by: UserId("officer-1".to_string()),
        created_at: created_at(),
    }
}

pub(crate) fn owned_by(mut record: Business, user: &User) -> Business {
    record.submitted_by = user.id.clone();
    record
}

pub(crate) fn admin() -> User {
    User {
        id: UserId("1".to_string()),
        email: "admin@pematangsiantar.go.id".to_string(),
        name: "Administrator".to_string(),
        role: UserRole::Administrator,
    }
}

pub(crate) fn officer(id: &str) -> User {
    User {
        id: UserId(id.to_string()),
        email: format!("{id}@survey.example"),
        name: format!("Officer {id}"),
        role: UserRole::Regular,
    }
}

pub(crate) fn submission() -> BusinessSubmission {
    BusinessSubmission {
        legal_name: "Toko Sinar Jaya".to_string(),
        commercial_name: "Sinar Jaya".to_string(),
        address: "Jl. Sutomo No. 21".to_string(),
        district: "Siantar Barat".to_string(),
        sub_district: "Teladan".to_string(),
        sls_code: "1272010001".to_string(),
        phone: "081234567890".to_string(),
        email: "sinarjaya@example.com".to_string(),
        founding_year: Some(2012),
        activity_description: "Perdagangan eceran sembako dan alat tulis".to_string(),
        network_type: Some("Tunggal".to_string()),
        location: Some(LocationReading::Fixed {
            latitude: 2.9595,
            longitude: 99.0687,
        }),
    }
}

/// Unique scratch directory under the system temp dir.
pub(crate) fn scratch_dir(label: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "siantar-geotag-{label}-{}-{n}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[derive(Default, Clone)]
pub(crate) struct MemoryRepository {
    pub(crate) records: Arc<Mutex<Vec<Business>>>,
}

impl MemoryRepository {
    pub(crate) fn seeded(records: Vec<Business>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Business> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl BusinessRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<Business>, RepositoryError> {
        Ok(self.snapshot())
    }

    fn append(&self, record: Business) -> Result<Business, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict(record.id));
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn delete_by_id(&self, id: &BusinessId) -> Result<Business, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let position = guard
            .iter()
            .position(|existing| &existing.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        Ok(guard.remove(position))
    }
}

pub(crate) struct ConflictRepository;

impl BusinessRepository for ConflictRepository {
    fn load(&self) -> Result<Vec<Business>, RepositoryError> {
        Ok(Vec::new())
    }

    fn append(&self, record: Business) -> Result<Business, RepositoryError> {
        Err(RepositoryError::Conflict(record.id))
    }

    fn delete_by_id(&self, id: &BusinessId) -> Result<Business, RepositoryError> {
        Err(RepositoryError::NotFound(id.clone()))
    }
}

pub(crate) struct UnavailableRepository;

impl BusinessRepository for UnavailableRepository {
    fn load(&self) -> Result<Vec<Business>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn append(&self, _record: Business) -> Result<Business, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn delete_by_id(&self, _id: &BusinessId) -> Result<Business, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(crate) fn build_service(
    records: Vec<Business>,
) -> (RegistryService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::seeded(records));
    let service = RegistryService::new(repository.clone(), AnalyticsSettings::default());
    (service, repository)
}

pub(crate) fn router_with_records(records: Vec<Business>) -> (axum::Router, Arc<MemoryRepository>) {
    let (service, repository) = build_service(records);
    (registry_router(Arc::new(service)), repository)
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
