use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use tokio::runtime::Handle;

use crate::domain::DataType;
use crate::ports::{EventSink, FitnessPlatform};

use super::{HistoryAdapter, RecordingSubscriptionAdapter};

/// Settings shared by every adapter the bridge hands out
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Package identity attached to inserted data
    pub app_package_name: String,
    pub request_timeout: Duration,
    pub utc_offset: FixedOffset,
}

/// Main application service: owns the shared platform handle and event sink
pub struct FitnessBridge {
    platform: Arc<dyn FitnessPlatform>,
    events: Arc<dyn EventSink>,
    settings: BridgeSettings,
    runtime: Option<Handle>,
}

impl FitnessBridge {
    /// Captures the current tokio runtime, if any, for background platform calls
    pub fn new(platform: Arc<dyn FitnessPlatform>, events: Arc<dyn EventSink>, settings: BridgeSettings) -> Self {
        Self {
            platform,
            events,
            settings,
            runtime: Handle::try_current().ok(),
        }
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// History adapter scoped to one data type
    pub fn history(&self, data_type: DataType) -> HistoryAdapter {
        let adapter = HistoryAdapter::new(
            Arc::clone(&self.platform),
            data_type,
            self.settings.app_package_name.as_str(),
        )
        .with_timeout(self.settings.request_timeout)
        .with_utc_offset(self.settings.utc_offset);
        match &self.runtime {
            Some(runtime) => adapter.with_runtime(runtime.clone()),
            None => adapter,
        }
    }

    pub fn recording(&self) -> RecordingSubscriptionAdapter {
        let adapter = RecordingSubscriptionAdapter::new(Arc::clone(&self.platform), Arc::clone(&self.events));
        match &self.runtime {
            Some(runtime) => adapter.with_runtime(runtime.clone()),
            None => adapter,
        }
    }
}
