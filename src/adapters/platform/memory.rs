use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{
    Bucket, DataPoint, DataSet, DataSource, DataType, DeletionRequest, FieldFormat, InsertionRequest, ReadRequest,
    ReadResult,
};
use crate::ports::{FitnessPlatform, PlatformError};

/// Package the platform attributes its own aggregates to
pub const AGGREGATE_SOURCE: &str = "platform.aggregate";

const CODE_INVALID_DATA_POINT: i32 = 5016;
const CODE_DISCONNECTED: i32 = 4;
const CODE_TOO_MANY_BUCKETS: i32 = 5012;

/// Most buckets a single aggregated read may produce
pub const MAX_BUCKETS: i64 = 10_000;

/// In-process fitness platform keeping every dataset in memory
///
/// Honours the same contract as a remote platform: points are grouped by
/// data source; aggregated reads return one bucket per window starting at the
/// requested start, the last one clamped to the requested end.
pub struct InMemoryPlatform {
    data_sets: RwLock<Vec<DataSet>>,
    subscriptions: RwLock<HashSet<DataType>>,
    connected: AtomicBool,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self {
            data_sets: RwLock::new(Vec::new()),
            subscriptions: RwLock::new(HashSet::new()),
            connected: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the platform connection
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_subscribed(&self, data_type: DataType) -> bool {
        self.subscriptions
            .read()
            .map(|subs| subs.contains(&data_type))
            .unwrap_or(false)
    }

    /// Number of stored points of a data type
    pub fn point_count(&self, data_type: DataType) -> usize {
        self.data_sets
            .read()
            .map(|sets| {
                sets.iter()
                    .filter(|s| s.data_type() == data_type)
                    .map(|s| s.points.len())
                    .sum()
            })
            .unwrap_or(0)
    }

    fn ensure_connected(&self) -> Result<(), PlatformError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PlatformError::rejected(CODE_DISCONNECTED, "client not connected"))
        }
    }

    fn validate(data_set: &DataSet) -> Result<(), PlatformError> {
        let data_type = data_set.data_type();
        for point in &data_set.points {
            if point.data_type != data_type {
                return Err(PlatformError::rejected(
                    CODE_INVALID_DATA_POINT,
                    format!("data point of type {} in a {} dataset", point.data_type, data_type),
                ));
            }
            if point.values.len() != data_type.fields().len() {
                return Err(PlatformError::rejected(
                    CODE_INVALID_DATA_POINT,
                    format!("expected {} values, got {}", data_type.fields().len(), point.values.len()),
                ));
            }
        }
        Ok(())
    }

    /// Buckets needed to cover the request range; zero for an inverted range
    fn bucket_count(request: &ReadRequest, width_ms: i64) -> i128 {
        let span = i128::from(request.end_time_ms) - i128::from(request.start_time_ms);
        if span < 0 {
            return 0;
        }
        span / i128::from(width_ms) + 1
    }

    fn aggregate(request: &ReadRequest, points: &[DataPoint], aggregate: DataType, width_ms: i64) -> Vec<Bucket> {
        let mut buckets = Vec::new();
        let mut bucket_start = request.start_time_ms;

        while bucket_start <= request.end_time_ms {
            let bucket_end = bucket_start
                .saturating_add(width_ms - 1)
                .min(request.end_time_ms);
            let in_bucket: Vec<&DataPoint> = points
                .iter()
                .filter(|p| p.start_time_ms >= bucket_start && p.start_time_ms <= bucket_end)
                .collect();

            let mut data_set = DataSet::new(DataSource::derived(AGGREGATE_SOURCE, aggregate));
            if let Some(point) = summarize(&in_bucket, aggregate, bucket_start, bucket_end) {
                data_set.points.push(point);
            }

            buckets.push(Bucket {
                start_time_ms: bucket_start,
                end_time_ms: bucket_end,
                data_sets: vec![data_set],
            });

            match bucket_start.checked_add(width_ms) {
                Some(next) => bucket_start = next,
                None => break,
            }
        }

        buckets
    }
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse the first value of each point into one aggregate point
fn summarize(points: &[&DataPoint], aggregate: DataType, start_ms: i64, end_ms: i64) -> Option<DataPoint> {
    let values: Vec<f64> = points
        .iter()
        .filter_map(|p| p.values.first())
        .map(|v| v.as_float())
        .collect();
    if values.is_empty() {
        return None;
    }

    let point = DataPoint::new(aggregate, start_ms, end_ms);
    if aggregate.is_summary() {
        let average = values.iter().sum::<f64>() / values.len() as f64;
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        return Some(point.with_float_values(&[average, max, min]));
    }

    let total: f64 = values.iter().sum();
    match aggregate.fields().first().map(|f| f.format) {
        Some(FieldFormat::Int) => Some(point.with_int_values(&[total as i64])),
        _ => Some(point.with_float_values(&[total])),
    }
}

fn poisoned<T>(_: PoisonError<T>) -> PlatformError {
    PlatformError::Unavailable("platform store lock poisoned".to_string())
}

#[async_trait]
impl FitnessPlatform for InMemoryPlatform {
    async fn read(&self, request: ReadRequest) -> Result<ReadResult, PlatformError> {
        self.ensure_connected()?;

        let width_ms = request
            .bucket
            .map(|width| i64::try_from(width.as_millis()).unwrap_or(i64::MAX).max(1));
        if let (Some(_), Some(width_ms)) = (request.aggregate, width_ms) {
            let count = Self::bucket_count(&request, width_ms);
            if count > i128::from(MAX_BUCKETS) {
                return Err(PlatformError::rejected(
                    CODE_TOO_MANY_BUCKETS,
                    format!("range needs {} buckets, limit is {}", count, MAX_BUCKETS),
                ));
            }
        }

        let matching: Vec<DataSet> = {
            let data_sets = self.data_sets.read().map_err(poisoned)?;
            data_sets
                .iter()
                .filter(|s| s.data_type() == request.data_type)
                .map(|s| DataSet {
                    data_source: s.data_source.clone(),
                    points: s
                        .points
                        .iter()
                        .filter(|p| p.overlaps(request.start_time_ms, request.end_time_ms))
                        .cloned()
                        .collect(),
                })
                .filter(|s| !s.is_empty())
                .collect()
        };

        debug!(
            data_type = %request.data_type,
            sources = matching.len(),
            aggregated = request.is_aggregated(),
            "Serving history read"
        );

        match (request.aggregate, width_ms) {
            (Some(aggregate), Some(width_ms)) => {
                let points: Vec<DataPoint> = matching.into_iter().flat_map(|s| s.points).collect();
                Ok(ReadResult::bucketed(Self::aggregate(&request, &points, aggregate, width_ms)))
            }
            _ => Ok(ReadResult::raw(matching)),
        }
    }

    async fn insert(&self, request: InsertionRequest) -> Result<(), PlatformError> {
        self.ensure_connected()?;
        Self::validate(&request.data_set)?;

        let mut data_sets = self.data_sets.write().map_err(poisoned)?;
        let incoming = request.data_set;
        match data_sets.iter().position(|s| s.data_source == incoming.data_source) {
            Some(index) => data_sets[index].points.extend(incoming.points),
            None => data_sets.push(incoming),
        }
        Ok(())
    }

    async fn delete(&self, request: DeletionRequest) -> Result<(), PlatformError> {
        self.ensure_connected()?;
        let mut data_sets = self.data_sets.write().map_err(poisoned)?;

        for data_set in data_sets.iter_mut().filter(|s| s.data_type() == request.data_type) {
            data_set
                .points
                .retain(|p| !p.overlaps(request.start_time_ms, request.end_time_ms));
        }
        Ok(())
    }

    async fn subscribe(&self, data_type: DataType) -> Result<(), PlatformError> {
        self.ensure_connected()?;
        self.subscriptions.write().map_err(poisoned)?.insert(data_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    const DAY_MS: i64 = 86_400_000;
    const MONDAY: i64 = 1_704_067_200_000;

    async fn seeded(values: &[(i64, i64)]) -> InMemoryPlatform {
        let platform = InMemoryPlatform::new();
        for &(value, at) in values {
            platform
                .insert(InsertionRequest::point("com.example.app", DataType::Height, value, at))
                .await
                .unwrap();
        }
        platform
    }

    #[tokio::test]
    async fn test_daily_buckets_cover_range_and_clamp_last() {
        let platform = seeded(&[(170, MONDAY + 1_000), (180, MONDAY + 2_000), (175, MONDAY + DAY_MS + 5)]).await;
        let request = ReadRequest::aggregate(DataType::Height)
            .bucket_by_days(1)
            .time_range(MONDAY, MONDAY + DAY_MS + DAY_MS / 2);

        let result = platform.read(request).await.unwrap();

        assert_eq!(result.buckets.len(), 2);
        assert!(result.data_sets.is_empty());
        let first = &result.buckets[0].data_sets[0].points[0];
        assert_eq!(first.data_type, DataType::HeightSummary);
        assert_eq!(first.values, vec![Value::Float(175.0), Value::Float(180.0), Value::Float(170.0)]);
        assert_eq!(result.buckets[1].end_time_ms, MONDAY + DAY_MS + DAY_MS / 2);
    }

    #[tokio::test]
    async fn test_days_without_data_have_empty_datasets() {
        let platform = seeded(&[(170, MONDAY + 2 * DAY_MS)]).await;
        let request = ReadRequest::aggregate(DataType::Height)
            .bucket_by_days(1)
            .time_range(MONDAY, MONDAY + 3 * DAY_MS - 1);

        let result = platform.read(request).await.unwrap();

        let point_counts: Vec<usize> = result.buckets.iter().map(|b| b.data_sets[0].points.len()).collect();
        assert_eq!(point_counts, vec![0, 0, 1]);
    }

    #[tokio::test]
    async fn test_step_deltas_are_summed_as_ints() {
        let platform = InMemoryPlatform::new();
        for steps in [1200, 800] {
            let request = InsertionRequest::interval("com.example.app", DataType::StepCountDelta, steps, MONDAY, MONDAY + 60_000);
            platform.insert(request).await.unwrap();
        }
        let request = ReadRequest::aggregate(DataType::StepCountDelta)
            .bucket_by_days(1)
            .time_range(MONDAY, MONDAY + DAY_MS - 1);

        let result = platform.read(request).await.unwrap();
        assert_eq!(result.buckets[0].data_sets[0].points[0].values, vec![Value::Int(2000)]);
    }

    #[tokio::test]
    async fn test_inverted_range_reads_nothing() {
        let platform = seeded(&[(170, MONDAY)]).await;
        let request = ReadRequest::aggregate(DataType::Height)
            .bucket_by_days(1)
            .time_range(MONDAY + DAY_MS, MONDAY);

        let result = platform.read(request).await.unwrap();
        assert!(result.buckets.is_empty());
        assert!(result.data_sets.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_aggregate_range_is_rejected() {
        let platform = seeded(&[(170, MONDAY)]).await;
        let started = std::time::Instant::now();
        let request = ReadRequest::aggregate(DataType::Height)
            .bucket_by_days(1)
            .time_range(0, i64::MAX);

        let err = platform.read(request).await.unwrap_err();

        assert!(matches!(err, PlatformError::Rejected { code: CODE_TOO_MANY_BUCKETS, .. }));
        assert!(started.elapsed() < std::time::Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_range_at_bucket_limit_is_served() {
        let platform = InMemoryPlatform::new();
        let request = ReadRequest::aggregate(DataType::Height)
            .bucket_by_days(1)
            .time_range(0, MAX_BUCKETS * DAY_MS - 1);

        let result = platform.read(request).await.unwrap();
        assert_eq!(result.buckets.len(), MAX_BUCKETS as usize);
    }

    #[tokio::test]
    async fn test_plain_read_groups_points_by_source() {
        let platform = seeded(&[(170, MONDAY), (171, MONDAY + 10)]).await;
        let other = InsertionRequest::point("com.other.app", DataType::Height, 169, MONDAY + 20);
        platform.insert(other).await.unwrap();

        let result = platform
            .read(ReadRequest::new(DataType::Height).time_range(MONDAY, MONDAY + DAY_MS))
            .await
            .unwrap();

        assert!(result.buckets.is_empty());
        assert_eq!(result.data_sets.len(), 2);
        assert_eq!(result.data_sets[0].points.len(), 2);
        assert_eq!(result.data_sets[1].data_source.app_package_name, "com.other.app");
    }

    #[tokio::test]
    async fn test_rejects_mismatched_points() {
        let platform = InMemoryPlatform::new();
        let mut request = InsertionRequest::point("com.example.app", DataType::Height, 170, MONDAY);
        request.data_set.points[0].data_type = DataType::Weight;

        let err = platform.insert(request).await.unwrap_err();
        assert!(matches!(err, PlatformError::Rejected { code: CODE_INVALID_DATA_POINT, .. }));
    }

    #[tokio::test]
    async fn test_delete_only_touches_window_and_type() {
        let platform = seeded(&[(170, MONDAY), (171, MONDAY + DAY_MS)]).await;
        let weight = InsertionRequest::point("com.example.app", DataType::Weight, 70, MONDAY);
        platform.insert(weight).await.unwrap();

        platform
            .delete(DeletionRequest::new(DataType::Height, MONDAY, MONDAY + 1))
            .await
            .unwrap();

        assert_eq!(platform.point_count(DataType::Height), 1);
        assert_eq!(platform.point_count(DataType::Weight), 1);
    }

    #[tokio::test]
    async fn test_disconnected_platform_fails_every_call() {
        let platform = InMemoryPlatform::new();
        platform.set_connected(false);

        assert!(platform.subscribe(DataType::Height).await.is_err());
        assert!(platform.read(ReadRequest::new(DataType::Height)).await.is_err());
        assert!(!platform.is_subscribed(DataType::Height));

        platform.set_connected(true);
        platform.subscribe(DataType::Height).await.unwrap();
        assert!(platform.is_subscribed(DataType::Height));
    }
}
