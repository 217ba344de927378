use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage format of a single field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFormat {
    Int,
    Float,
}

/// A named, typed field declared by a data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub format: FieldFormat,
}

impl Field {
    pub const fn new(name: &'static str, format: FieldFormat) -> Self {
        Self { name, format }
    }
}

pub const FIELD_HEIGHT: Field = Field::new("height", FieldFormat::Float);
pub const FIELD_WEIGHT: Field = Field::new("weight", FieldFormat::Float);
pub const FIELD_STEPS: Field = Field::new("steps", FieldFormat::Int);
pub const FIELD_DISTANCE: Field = Field::new("distance", FieldFormat::Float);
pub const FIELD_AVERAGE: Field = Field::new("average", FieldFormat::Float);
pub const FIELD_MAX: Field = Field::new("max", FieldFormat::Float);
pub const FIELD_MIN: Field = Field::new("min", FieldFormat::Float);

const SUMMARY_FIELDS: [Field; 3] = [FIELD_AVERAGE, FIELD_MAX, FIELD_MIN];

/// Metric types known to the fitness platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Height,
    Weight,
    StepCountCumulative,
    StepCountDelta,
    DistanceDelta,
    HeightSummary,
    WeightSummary,
}

impl DataType {
    /// Platform-side name of the type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Height => "com.google.height",
            Self::Weight => "com.google.weight",
            Self::StepCountCumulative => "com.google.step_count.cumulative",
            Self::StepCountDelta => "com.google.step_count.delta",
            Self::DistanceDelta => "com.google.distance.delta",
            Self::HeightSummary => "com.google.height.summary",
            Self::WeightSummary => "com.google.weight.summary",
        }
    }

    /// Declared fields, in platform order
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::Height => &[FIELD_HEIGHT],
            Self::Weight => &[FIELD_WEIGHT],
            Self::StepCountCumulative | Self::StepCountDelta => &[FIELD_STEPS],
            Self::DistanceDelta => &[FIELD_DISTANCE],
            Self::HeightSummary | Self::WeightSummary => &SUMMARY_FIELDS,
        }
    }

    /// The type the platform produces when aggregating this one into buckets
    pub fn aggregate(&self) -> DataType {
        match self {
            Self::Height | Self::HeightSummary => Self::HeightSummary,
            Self::Weight | Self::WeightSummary => Self::WeightSummary,
            Self::StepCountCumulative | Self::StepCountDelta => Self::StepCountDelta,
            Self::DistanceDelta => Self::DistanceDelta,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, Self::HeightSummary | Self::WeightSummary)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metric selector used by the host boundary (`height`, `weight`, `steps`, `distance`)
impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(Self::Height),
            "weight" => Ok(Self::Weight),
            "steps" => Ok(Self::StepCountDelta),
            "distance" => Ok(Self::DistanceDelta),
            other => Err(format!("unknown metric: {}", other)),
        }
    }
}
