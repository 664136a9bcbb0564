use std::io::{Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::audit::{audit, AuditReport};
use super::domain::{Business, BusinessId, User};
use super::export::{read_submissions, write_csv};
use super::filter::{filter, FilterCriteria};
use super::repository::{BusinessRepository, RepositoryError};
use super::stats::{AnalyticsSettings, AnalyticsSnapshot, AreaSummary};
use super::submission::{build_record, BusinessSubmission, SubmissionError, ValidationErrors};

static BUSINESS_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_business_id(submitted_at: DateTime<Utc>) -> BusinessId {
    let sequence = BUSINESS_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BusinessId(format!(
        "biz-{}-{sequence:04}",
        submitted_at.timestamp_millis()
    ))
}

/// Service composing the repository, intake validation, and the read-only core.
pub struct RegistryService<R> {
    repository: Arc<R>,
    settings: AnalyticsSettings,
}

impl<R> RegistryService<R>
where
    R: BusinessRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: AnalyticsSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> AnalyticsSettings {
        self.settings
    }

    /// Validate a submission, capture its location, and append the record.
    pub fn submit(
        &self,
        submitter: &User,
        submission: BusinessSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<Business, RegistryServiceError> {
        let id = next_business_id(submitted_at);
        let record = match build_record(submission, id, submitter.id.clone(), submitted_at) {
            Ok(record) => record,
            Err(err) => {
                warn!(user = %submitter.id, error = %err, "business submission rejected");
                return Err(err.into());
            }
        };

        let stored = self.repository.append(record)?;
        info!(
            id = %stored.id,
            user = %submitter.id,
            district = %stored.district,
            "business registered"
        );
        Ok(stored)
    }

    /// Records the viewer is allowed to see, in storage order.
    pub fn list(&self, viewer: &User) -> Result<Vec<Business>, RegistryServiceError> {
        let mut records = self.repository.load()?;
        records.retain(|business| viewer.can_view(business));
        Ok(records)
    }

    pub fn search(
        &self,
        viewer: &User,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Business>, RegistryServiceError> {
        let visible = self.list(viewer)?;
        Ok(filter(&visible, criteria).into_iter().cloned().collect())
    }

    /// Dashboard headline counts over the records the viewer may see.
    pub fn summary(&self, viewer: &User) -> Result<AreaSummary, RegistryServiceError> {
        let visible = self.list(viewer)?;
        Ok(AreaSummary::compute(&visible))
    }

    /// Delete a record; administrators may delete anything, users only their own.
    pub fn delete(&self, actor: &User, id: &BusinessId) -> Result<Business, RegistryServiceError> {
        let records = self.repository.load()?;
        let target = records
            .iter()
            .find(|business| &business.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;

        if !actor.can_delete(target) {
            warn!(id = %id, user = %actor.id, "delete refused for non-owner");
            return Err(RegistryServiceError::Forbidden);
        }

        let removed = self.repository.delete_by_id(id)?;
        info!(id = %removed.id, user = %actor.id, "business deleted");
        Ok(removed)
    }

    pub fn audit(&self, viewer: &User) -> Result<AuditReport, RegistryServiceError> {
        let records = self.admin_snapshot(viewer)?;
        let report = audit(&records);
        debug!(
            total = report.total,
            missing = report.missing.len(),
            duplicates = report.duplicates.len(),
            "data-quality audit complete"
        );
        Ok(report)
    }

    pub fn analytics(
        &self,
        viewer: &User,
        current_year: i32,
    ) -> Result<AnalyticsSnapshot, RegistryServiceError> {
        let records = self.admin_snapshot(viewer)?;
        let snapshot = AnalyticsSnapshot::compute(&records, self.settings, current_year);
        debug!(total = snapshot.total, current_year, "analytics snapshot computed");
        Ok(snapshot)
    }

    pub fn export_csv<W: Write>(&self, viewer: &User, writer: W) -> Result<usize, RegistryServiceError> {
        let records = self.admin_snapshot(viewer)?;
        write_csv(&records, writer)?;
        Ok(records.len())
    }

    /// Register every valid row of a survey sheet; invalid rows are reported, not fatal.
    pub fn import_csv<Rd: Read>(
        &self,
        submitter: &User,
        reader: Rd,
        submitted_at: DateTime<Utc>,
    ) -> Result<ImportSummary, RegistryServiceError> {
        let rows = read_submissions(reader)?;
        let mut summary = ImportSummary::default();

        for row in rows {
            let submission = match row.submission {
                Ok(submission) => submission,
                Err(reason) => {
                    warn!(line = row.line, %reason, "survey sheet row skipped");
                    summary.rejected.push(RejectedRow {
                        line: row.line,
                        reason,
                        fields: ValidationErrors::default(),
                    });
                    continue;
                }
            };

            match self.submit(submitter, submission, submitted_at) {
                Ok(record) => summary.accepted.push(record.id),
                Err(RegistryServiceError::Submission(err)) => summary.rejected.push(RejectedRow {
                    line: row.line,
                    reason: err.to_string(),
                    fields: match &err {
                        SubmissionError::Invalid(errors) => errors.clone(),
                        SubmissionError::Location(_) => ValidationErrors::default(),
                    },
                }),
                Err(other) => return Err(other),
            }
        }

        info!(
            accepted = summary.accepted.len(),
            rejected = summary.rejected.len(),
            "survey sheet imported"
        );
        Ok(summary)
    }

    fn admin_snapshot(&self, viewer: &User) -> Result<Vec<Business>, RegistryServiceError> {
        if !viewer.is_admin() {
            return Err(RegistryServiceError::Forbidden);
        }
        Ok(self.repository.load()?)
    }
}

/// Outcome of a bulk survey-sheet import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub accepted: Vec<BusinessId>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
    #[serde(skip_serializing_if = "ValidationErrors::is_empty")]
    pub fields: ValidationErrors,
}

/// Error raised by the registry service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("operation is not permitted for this user")]
    Forbidden,
    #[error("csv processing failed: {0}")]
    Csv(#[from] csv::Error),
}
