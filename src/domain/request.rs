use std::time::Duration;

use super::{DataPoint, DataSet, DataSource, DataType};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// History read request, optionally aggregated into fixed-width time buckets
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub data_type: DataType,
    /// Output type when aggregating; `None` for a plain read
    pub aggregate: Option<DataType>,
    pub bucket: Option<Duration>,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
}

impl ReadRequest {
    /// Plain read of raw points
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            aggregate: None,
            bucket: None,
            start_time_ms: 0,
            end_time_ms: 0,
        }
    }

    /// Aggregated read using the type's platform aggregate
    pub fn aggregate(data_type: DataType) -> Self {
        Self {
            aggregate: Some(data_type.aggregate()),
            ..Self::new(data_type)
        }
    }

    pub fn bucket_by_time(mut self, width: Duration) -> Self {
        self.bucket = Some(width);
        self
    }

    pub fn bucket_by_days(self, days: u32) -> Self {
        self.bucket_by_time(DAY * days)
    }

    /// Range is forwarded as given, inverted ranges included
    pub fn time_range(mut self, start_time_ms: i64, end_time_ms: i64) -> Self {
        self.start_time_ms = start_time_ms;
        self.end_time_ms = end_time_ms;
        self
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregate.is_some() && self.bucket.is_some()
    }
}

/// A single-point dataset to be written on behalf of the host application
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionRequest {
    pub data_set: DataSet,
}

impl InsertionRequest {
    /// Zero-duration integer point tagged with a raw source owned by `app_package_name`
    pub fn point(app_package_name: &str, data_type: DataType, value: i64, timestamp_ms: i64) -> Self {
        Self::interval(app_package_name, data_type, value, timestamp_ms, timestamp_ms)
    }

    pub fn interval(
        app_package_name: &str,
        data_type: DataType,
        value: i64,
        start_time_ms: i64,
        end_time_ms: i64,
    ) -> Self {
        let source = DataSource::raw(app_package_name, data_type);
        let point = DataPoint::new(data_type, start_time_ms, end_time_ms).with_int_values(&[value]);
        Self {
            data_set: DataSet::new(source).with_point(point),
        }
    }
}

/// Deletion window for one data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionRequest {
    pub data_type: DataType,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
}

impl DeletionRequest {
    pub fn new(data_type: DataType, start_time_ms: i64, end_time_ms: i64) -> Self {
        Self {
            data_type,
            start_time_ms,
            end_time_ms,
        }
    }
}

/// Logical live-recording streams the host can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingStream {
    Steps,
    Distance,
    Weight,
    Height,
}

impl RecordingStream {
    pub const ALL: [RecordingStream; 4] = [Self::Steps, Self::Distance, Self::Weight, Self::Height];

    /// Unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "STEP_RECORDING" => Some(Self::Steps),
            "DISTANCE_RECORDING" => Some(Self::Distance),
            "WEIGHT_RECORDING" => Some(Self::Weight),
            "HEIGHT_RECORDING" => Some(Self::Height),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Steps => "STEP_RECORDING",
            Self::Distance => "DISTANCE_RECORDING",
            Self::Weight => "WEIGHT_RECORDING",
            Self::Height => "HEIGHT_RECORDING",
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Steps => DataType::StepCountCumulative,
            Self::Distance => DataType::DistanceDelta,
            Self::Weight => DataType::Weight,
            Self::Height => DataType::Height,
        }
    }
}

/// Which stream to subscribe to, and under which logical name to report it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub data_type: DataType,
    pub stream: RecordingStream,
}

impl From<RecordingStream> for SubscriptionRequest {
    fn from(stream: RecordingStream) -> Self {
        Self {
            data_type: stream.data_type(),
            stream,
        }
    }
}
