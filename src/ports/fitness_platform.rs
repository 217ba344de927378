use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{DataType, DeletionRequest, InsertionRequest, ReadRequest, ReadResult};

/// Non-success outcomes reported by the fitness platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("platform rejected request ({code}): {message}")]
    Rejected { code: i32, message: String },

    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    pub fn rejected(code: i32, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

/// Port for the fitness platform's history and recording APIs
///
/// Implementations are shared read-only across every adapter and task, so
/// they must be usable concurrently through `&self`. Calls are not bounded
/// here; callers apply their own ceiling.
#[async_trait]
pub trait FitnessPlatform: Send + Sync {
    /// Read raw or bucketed history for one data type
    async fn read(&self, request: ReadRequest) -> Result<ReadResult, PlatformError>;

    /// Write a dataset attributed to the request's data source
    async fn insert(&self, request: InsertionRequest) -> Result<(), PlatformError>;

    /// Remove points of one data type within a time window
    async fn delete(&self, request: DeletionRequest) -> Result<(), PlatformError>;

    /// Start continuous background recording of a data type
    async fn subscribe(&self, data_type: DataType) -> Result<(), PlatformError>;
}
