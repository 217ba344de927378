use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{DataSet, DataType, DeletionRequest, InsertionRequest, MetricSample, ReadRequest, ReadResult};
use crate::ports::{FitnessPlatform, PlatformError};

use super::runtime::spawn_on;

/// Ceiling applied to every history call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("background task failed: {0}")]
    TaskFailed(String),

    #[error("no tokio runtime to run the {0}")]
    NoRuntime(&'static str),
}

/// Handle on a submitted background write
///
/// Dropping the ticket detaches the task; the outcome is still logged.
#[derive(Debug)]
pub struct WriteTicket {
    operation: &'static str,
    handle: Option<JoinHandle<Result<(), HistoryError>>>,
}

impl WriteTicket {
    fn new(operation: &'static str, handle: Option<JoinHandle<Result<(), HistoryError>>>) -> Self {
        if handle.is_none() {
            warn!("No tokio runtime available, {} was not submitted", operation);
        }
        Self { operation, handle }
    }

    /// Wait for the platform to acknowledge the write
    pub async fn outcome(self) -> Result<(), HistoryError> {
        let handle = self.handle.ok_or(HistoryError::NoRuntime(self.operation))?;
        handle
            .await
            .map_err(|e| HistoryError::TaskFailed(e.to_string()))?
    }
}

/// Reads, writes and deletes history samples of one data type
#[derive(Clone)]
pub struct HistoryAdapter {
    platform: Arc<dyn FitnessPlatform>,
    data_type: DataType,
    app_package_name: Arc<str>,
    timeout: Duration,
    utc_offset: FixedOffset,
    runtime: Option<Handle>,
}

impl HistoryAdapter {
    pub fn new(platform: Arc<dyn FitnessPlatform>, data_type: DataType, app_package_name: impl Into<Arc<str>>) -> Self {
        Self {
            platform,
            data_type,
            app_package_name: app_package_name.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            utc_offset: Utc.fix(),
            runtime: None,
        }
    }

    /// Runtime for background writes; without one the caller's runtime is used
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Offset used to derive weekday labels
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Daily-bucketed history between two epoch-millisecond instants
    ///
    /// Waits at most the configured ceiling for the platform.
    pub async fn fetch_history(&self, start_time_ms: i64, end_time_ms: i64) -> Result<Vec<MetricSample>, HistoryError> {
        let request = ReadRequest::aggregate(self.data_type)
            .bucket_by_days(1)
            .time_range(start_time_ms, end_time_ms);
        debug!(data_type = %self.data_type, start_time_ms, end_time_ms, "Reading history");

        let result = bounded("read", self.timeout, self.platform.read(request)).await?;
        Ok(shape_read_result(&result, self.utc_offset))
    }

    /// Submit a zero-duration sample; returns `true` once submitted
    ///
    /// Safe to call from any thread. With no runtime configured or ambient the
    /// write is dropped with a warning and `true` is still returned.
    pub fn save_sample(&self, value: i64, timestamp_ms: i64) -> bool {
        self.submit_sample(value, timestamp_ms);
        true
    }

    /// Submit a zero-duration sample and keep a handle on the outcome
    pub fn submit_sample(&self, value: i64, timestamp_ms: i64) -> WriteTicket {
        let request = InsertionRequest::point(&self.app_package_name, self.data_type, value, timestamp_ms);
        let platform = Arc::clone(&self.platform);
        let timeout = self.timeout;
        let data_type = self.data_type;

        let handle = spawn_on(self.runtime.as_ref(), async move {
            let outcome = bounded("insert", timeout, platform.insert(request)).await;
            match &outcome {
                Ok(()) => info!(%data_type, value, timestamp_ms, "Data insert was successful"),
                Err(e) => warn!(%data_type, value, timestamp_ms, "There was a problem inserting the dataset: {}", e),
            }
            outcome
        });

        WriteTicket::new("insert", handle)
    }

    /// Submit a deletion window; returns `true` once submitted
    pub fn delete_samples(&self, start_time_ms: i64, end_time_ms: i64) -> bool {
        self.submit_deletion(start_time_ms, end_time_ms);
        true
    }

    /// Submit a deletion window and keep a handle on the outcome
    pub fn submit_deletion(&self, start_time_ms: i64, end_time_ms: i64) -> WriteTicket {
        let request = DeletionRequest::new(self.data_type, start_time_ms, end_time_ms);
        let platform = Arc::clone(&self.platform);
        let timeout = self.timeout;
        let data_type = self.data_type;

        let handle = spawn_on(self.runtime.as_ref(), async move {
            let outcome = bounded("delete", timeout, platform.delete(request)).await;
            match &outcome {
                Ok(()) => info!(%data_type, start_time_ms, end_time_ms, "Successfully deleted data"),
                Err(e) => warn!(%data_type, start_time_ms, end_time_ms, "Failed to delete data: {}", e),
            }
            outcome
        });

        WriteTicket::new("delete", handle)
    }
}

async fn bounded<T, F>(operation: &'static str, after: Duration, call: F) -> Result<T, HistoryError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(HistoryError::Timeout { operation, after }),
    }
}

/// Flatten a read result into one sample per dataset, in platform order
///
/// Buckets win over raw datasets when both are present.
pub fn shape_read_result(result: &ReadResult, utc_offset: FixedOffset) -> Vec<MetricSample> {
    if !result.buckets.is_empty() {
        result
            .buckets
            .iter()
            .flat_map(|bucket| bucket.data_sets.iter())
            .filter_map(|data_set| summarize_data_set(data_set, utc_offset))
            .collect()
    } else {
        result
            .data_sets
            .iter()
            .filter_map(|data_set| summarize_data_set(data_set, utc_offset))
            .collect()
    }
}

/// Sample for the last point of a dataset, read from its first declared field
///
/// Earlier points are overwritten, and further fields (max, min, ...) are
/// ignored. A dataset with no readable point yields nothing.
fn summarize_data_set(data_set: &DataSet, utc_offset: FixedOffset) -> Option<MetricSample> {
    let mut sample = None;

    for point in &data_set.points {
        let Some(field) = point.data_type.fields().first() else {
            continue;
        };
        let Some(value) = point.value(field) else {
            continue;
        };
        if let Some(next) = MetricSample::new(point.start_time_ms, point.end_time_ms, value.as_int(), utc_offset) {
            sample = Some(next);
        }
    }

    sample
}
