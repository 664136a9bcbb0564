//! Business registration for the Pematang Siantar geotagging survey.
//!
//! The filter, audit, and stats modules are pure functions over a record
//! snapshot; storage sits behind [`BusinessRepository`] and only the service
//! talks to it.

pub mod audit;
pub mod domain;
pub mod export;
pub mod filter;
pub mod repository;
pub mod router;
pub mod service;
pub mod stats;
pub mod store;
pub mod submission;

#[cfg(test)]
mod tests;

pub use audit::{audit, AuditReport, DuplicateReport, MissingFieldsReport, RequiredField};
pub use domain::{
    Business, BusinessId, Coordinates, NetworkType, User, UserId, UserRole, DISTRICTS,
    SUB_DISTRICTS,
};
pub use filter::{filter, FilterCriteria};
pub use repository::{BusinessRepository, RepositoryError};
pub use router::{caller_from_headers, registry_router};
pub use service::{ImportSummary, RegistryService, RegistryServiceError, RejectedRow};
pub use stats::{
    count_by_category, founding_year_series, network_breakdown, top_categories,
    AnalyticsSettings, AnalyticsSnapshot, AreaSummary, CategoryCount, NetworkBreakdown, YearCount,
};
pub use store::JsonFileRepository;
pub use submission::{
    BusinessSubmission, LocationError, LocationReading, SubmissionError, ValidationErrors,
};
