use super::domain::{Business, BusinessId};

/// Storage abstraction so the service and the pure core never touch I/O directly.
pub trait BusinessRepository: Send + Sync {
    /// Consistent snapshot of every stored record, in insertion order.
    fn load(&self) -> Result<Vec<Business>, RepositoryError>;
    fn append(&self, record: Business) -> Result<Business, RepositoryError>;
    /// Removes a record and hands it back.
    fn delete_by_id(&self, id: &BusinessId) -> Result<Business, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record {0} already exists")]
    Conflict(BusinessId),
    #[error("record {0} not found")]
    NotFound(BusinessId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored records are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
