use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One observation handed back to the host application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// Abbreviated weekday of `start_date` (`Mon`, `Tue`, ...)
    pub day: String,
    pub start_date: i64,
    pub end_date: i64,
    pub value: i64,
}

impl MetricSample {
    /// Returns `None` when `start_date` is outside the representable calendar range
    pub fn new(start_date: i64, end_date: i64, value: i64, offset: FixedOffset) -> Option<Self> {
        Some(Self {
            day: weekday_label(start_date, offset)?,
            start_date,
            end_date,
            value,
        })
    }
}

/// Locale-independent three-letter weekday for an epoch-millisecond instant
pub fn weekday_label(timestamp_ms: i64, offset: FixedOffset) -> Option<String> {
    let instant = DateTime::from_timestamp_millis(timestamp_ms)?;
    Some(instant.with_timezone(&offset).format("%a").to_string())
}
