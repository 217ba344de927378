pub mod data_set;
pub mod data_type;
pub mod request;
pub mod sample;
pub mod unit;

pub use data_set::{Bucket, DataPoint, DataSet, DataSource, ReadResult, SourceKind, Value};
pub use data_type::{
    DataType, Field, FieldFormat, FIELD_AVERAGE, FIELD_DISTANCE, FIELD_HEIGHT, FIELD_MAX, FIELD_MIN,
    FIELD_STEPS, FIELD_WEIGHT,
};
pub use request::{DeletionRequest, InsertionRequest, ReadRequest, RecordingStream, SubscriptionRequest};
pub use sample::{weekday_label, MetricSample};
pub use unit::MassUnit;
