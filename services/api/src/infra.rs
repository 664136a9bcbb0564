use metrics_exporter_prometheus::PrometheusHandle;
use siantar_geotag::config::AppConfig;
use siantar_geotag::registry::stats::MAX_REPORT_YEAR;
use siantar_geotag::registry::submission::MIN_FOUNDING_YEAR;
use siantar_geotag::registry::{
    Business, BusinessId, BusinessRepository, JsonFileRepository, RegistryService,
    RepositoryError, User, UserId, UserRole,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryBusinessRepository {
    records: Arc<Mutex<Vec<Business>>>,
}

impl InMemoryBusinessRepository {
    pub(crate) fn seeded(records: Vec<Business>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl BusinessRepository for InMemoryBusinessRepository {
    fn load(&self) -> Result<Vec<Business>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
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

/// Identity used by the maintenance commands, which run with full access.
pub(crate) fn operator() -> User {
    User {
        id: UserId("cli".to_string()),
        email: String::new(),
        name: "Command line operator".to_string(),
        role: UserRole::Administrator,
    }
}

pub(crate) fn field_officer(id: &str) -> User {
    User {
        id: UserId(id.to_string()),
        email: String::new(),
        name: String::new(),
        role: UserRole::Regular,
    }
}

/// Service backed by the configured data file, or `data_path` when given.
pub(crate) fn file_service(
    config: &AppConfig,
    data_path: Option<PathBuf>,
) -> RegistryService<JsonFileRepository> {
    let path = data_path.unwrap_or_else(|| config.storage.data_path.clone());
    RegistryService::new(Arc::new(JsonFileRepository::new(path)), config.analytics)
}

pub(crate) fn parse_year(raw: &str) -> Result<i32, String> {
    let year = raw
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("failed to parse '{raw}' as a year ({err})"))?;
    if (MIN_FOUNDING_YEAR..=MAX_REPORT_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(format!(
            "year must be between {MIN_FOUNDING_YEAR} and {MAX_REPORT_YEAR}"
        ))
    }
}
