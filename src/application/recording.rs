use std::sync::Arc;

use serde_json::json;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::domain::{RecordingStream, SubscriptionRequest};
use crate::ports::{EventSink, FitnessPlatform};

use super::runtime::spawn_on;

/// Subscribes the host application to live recording streams
///
/// Each accepted subscription reports back through the event sink exactly
/// once, when the platform answers: an event named after the stream with
/// payload `{"type": <stream>, "recording": <success>}`.
#[derive(Clone)]
pub struct RecordingSubscriptionAdapter {
    platform: Arc<dyn FitnessPlatform>,
    events: Arc<dyn EventSink>,
    runtime: Option<Handle>,
}

impl RecordingSubscriptionAdapter {
    pub fn new(platform: Arc<dyn FitnessPlatform>, events: Arc<dyn EventSink>) -> Self {
        Self {
            platform,
            events,
            runtime: None,
        }
    }

    /// Runtime the platform calls run on; without one the caller's runtime is used
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Subscribe to a stream by logical name; unknown names are ignored
    ///
    /// Callable from any thread. With no runtime to run on, the request is
    /// dropped with a warning and no event is emitted.
    pub fn subscribe(&self, stream_name: &str) {
        info!("Subscribe to {}", stream_name);
        match RecordingStream::parse(stream_name) {
            Some(stream) => self.subscribe_stream(stream.into()),
            None => debug!(stream_name, "Ignoring unknown recording stream"),
        }
    }

    /// Subscribe to each named stream, or to every known stream when `stream_names` is empty
    pub fn subscribe_all<S: AsRef<str>>(&self, stream_names: &[S]) {
        if stream_names.is_empty() {
            for stream in RecordingStream::ALL {
                self.subscribe_stream(stream.into());
            }
        } else {
            for name in stream_names {
                self.subscribe(name.as_ref());
            }
        }
    }

    fn subscribe_stream(&self, request: SubscriptionRequest) {
        let platform = Arc::clone(&self.platform);
        let events = Arc::clone(&self.events);
        let request_name = request.stream.as_str();

        let task = spawn_on(self.runtime.as_ref(), async move {
            let name = request.stream.as_str();
            let recording = match platform.subscribe(request.data_type).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(stream = name, data_type = %request.data_type, "Subscription failed: {}", e);
                    false
                }
            };

            events.emit(name, json!({ "type": name, "recording": recording }));
        });
        if task.is_none() {
            warn!(stream = request_name, "No tokio runtime available, subscription was not submitted");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{DataType, DeletionRequest, InsertionRequest, ReadRequest, ReadResult};
    use crate::ports::PlatformError;

    struct ScriptedPlatform {
        accept: bool,
        subscribed: Mutex<Vec<DataType>>,
    }

    impl ScriptedPlatform {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                subscribed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FitnessPlatform for ScriptedPlatform {
        async fn read(&self, _request: ReadRequest) -> Result<ReadResult, PlatformError> {
            Ok(ReadResult::default())
        }

        async fn insert(&self, _request: InsertionRequest) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn delete(&self, _request: DeletionRequest) -> Result<(), PlatformError> {
            Ok(())
        }

        async fn subscribe(&self, data_type: DataType) -> Result<(), PlatformError> {
            self.subscribed.lock().unwrap().push(data_type);
            if self.accept {
                Ok(())
            } else {
                Err(PlatformError::rejected(5010, "app not authorized"))
            }
        }
    }

    /// Channel-backed event sink
    struct ChannelSink(mpsc::UnboundedSender<(String, Value)>);

    impl EventSink for ChannelSink {
        fn emit(&self, name: &str, payload: Value) {
            let _ = self.0.send((name.to_string(), payload));
        }
    }

    fn setup(accept: bool) -> (RecordingSubscriptionAdapter, Arc<ScriptedPlatform>, mpsc::UnboundedReceiver<(String, Value)>) {
        let platform = Arc::new(ScriptedPlatform::new(accept));
        let (tx, rx) = mpsc::unbounded_channel();
        let adapter = RecordingSubscriptionAdapter::new(platform.clone(), Arc::new(ChannelSink(tx)));
        (adapter, platform, rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<(String, Value)>) -> (String, Value) {
        tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("event not emitted")
            .expect("sink closed")
    }

    #[tokio::test]
    async fn test_successful_subscription_emits_one_event() {
        let (adapter, platform, mut rx) = setup(true);

        adapter.subscribe("STEP_RECORDING");

        let (name, payload) = next_event(&mut rx).await;
        assert_eq!(name, "STEP_RECORDING");
        assert_eq!(payload, json!({ "type": "STEP_RECORDING", "recording": true }));
        assert_eq!(*platform.subscribed.lock().unwrap(), vec![DataType::StepCountCumulative]);

        drop(adapter);
        assert!(rx.recv().await.is_none(), "exactly one event expected");
    }

    #[tokio::test]
    async fn test_rejected_subscription_reports_not_recording() {
        let (adapter, _platform, mut rx) = setup(false);

        adapter.subscribe("WEIGHT_RECORDING");

        let (name, payload) = next_event(&mut rx).await;
        assert_eq!(name, "WEIGHT_RECORDING");
        assert_eq!(payload, json!({ "type": "WEIGHT_RECORDING", "recording": false }));
    }

    #[tokio::test]
    async fn test_unknown_stream_is_a_no_op() {
        let (adapter, platform, mut rx) = setup(true);

        adapter.subscribe("UNKNOWN_TYPE");
        drop(adapter);

        assert!(rx.recv().await.is_none());
        assert!(platform.subscribed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_all_defaults_to_every_stream() {
        let (adapter, platform, mut rx) = setup(true);

        adapter.subscribe_all::<&str>(&[]);
        drop(adapter);

        let mut names = Vec::new();
        while let Some((name, _)) = rx.recv().await {
            names.push(name);
        }
        names.sort();
        assert_eq!(
            names,
            vec!["DISTANCE_RECORDING", "HEIGHT_RECORDING", "STEP_RECORDING", "WEIGHT_RECORDING"]
        );
        assert_eq!(platform.subscribed.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_subscribe_from_plain_thread_uses_configured_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (adapter, platform, mut rx) = setup(true);
        let adapter = adapter.with_runtime(runtime.handle().clone());

        adapter.subscribe("HEIGHT_RECORDING");

        let (name, payload) = runtime.block_on(next_event(&mut rx));
        assert_eq!(name, "HEIGHT_RECORDING");
        assert_eq!(payload["recording"], json!(true));
        assert_eq!(*platform.subscribed.lock().unwrap(), vec![DataType::Height]);
    }

    #[test]
    fn test_subscribe_without_runtime_is_dropped() {
        let (adapter, platform, mut rx) = setup(true);

        adapter.subscribe("STEP_RECORDING");
        adapter.subscribe_all::<&str>(&[]);
        drop(adapter);

        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
        assert!(platform.subscribed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_all_skips_unknown_names() {
        let (adapter, platform, mut rx) = setup(true);

        adapter.subscribe_all(&["HEIGHT_RECORDING", "CALORIE_RECORDING"]);
        drop(adapter);

        let (name, _) = next_event(&mut rx).await;
        assert_eq!(name, "HEIGHT_RECORDING");
        assert!(rx.recv().await.is_none());
        assert_eq!(*platform.subscribed.lock().unwrap(), vec![DataType::Height]);
    }
}
