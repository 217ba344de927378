use serde::{Deserialize, Serialize};

use super::{DataType, Field};

/// A single field value as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    /// Integer view of the value; floats are truncated toward zero
    pub fn as_int(&self) -> i64 {
        match *self {
            Self::Int(v) => v,
            Self::Float(v) => v as i64,
        }
    }

    pub fn as_float(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

/// Provenance of a data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Raw,
    Derived,
}

/// Identity the platform attributes written data to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataSource {
    pub app_package_name: String,
    pub data_type: DataType,
    pub kind: SourceKind,
}

impl DataSource {
    pub fn raw(app_package_name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            app_package_name: app_package_name.into(),
            data_type,
            kind: SourceKind::Raw,
        }
    }

    pub fn derived(app_package_name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            app_package_name: app_package_name.into(),
            data_type,
            kind: SourceKind::Derived,
        }
    }
}

/// One raw observation: a time interval plus one value per declared field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub data_type: DataType,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    /// Aligned with `data_type.fields()`
    pub values: Vec<Value>,
}

impl DataPoint {
    pub fn new(data_type: DataType, start_time_ms: i64, end_time_ms: i64) -> Self {
        Self {
            data_type,
            start_time_ms,
            end_time_ms,
            values: Vec::new(),
        }
    }

    pub fn with_int_values(mut self, values: &[i64]) -> Self {
        self.values = values.iter().copied().map(Value::Int).collect();
        self
    }

    pub fn with_float_values(mut self, values: &[f64]) -> Self {
        self.values = values.iter().copied().map(Value::Float).collect();
        self
    }

    /// Value of a declared field, if the point carries one
    pub fn value(&self, field: &Field) -> Option<&Value> {
        let index = self
            .data_type
            .fields()
            .iter()
            .position(|f| f.name == field.name)?;
        self.values.get(index)
    }

    pub fn overlaps(&self, start_ms: i64, end_ms: i64) -> bool {
        self.start_time_ms <= end_ms && self.end_time_ms >= start_ms
    }
}

/// Data points belonging to one data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    pub data_source: DataSource,
    pub points: Vec<DataPoint>,
}

impl DataSet {
    pub fn new(data_source: DataSource) -> Self {
        Self {
            data_source,
            points: Vec::new(),
        }
    }

    pub fn with_point(mut self, point: DataPoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_source.data_type
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// An aggregation window and the datasets summarising it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub data_sets: Vec<DataSet>,
}

/// Platform response to a read request
///
/// Aggregated reads fill `buckets`; plain reads fill `data_sets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    pub buckets: Vec<Bucket>,
    pub data_sets: Vec<DataSet>,
}

impl ReadResult {
    pub fn bucketed(buckets: Vec<Bucket>) -> Self {
        Self {
            buckets,
            data_sets: Vec::new(),
        }
    }

    pub fn raw(data_sets: Vec<DataSet>) -> Self {
        Self {
            buckets: Vec::new(),
            data_sets,
        }
    }
}
