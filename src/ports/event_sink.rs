/// Port for delivering named events to host-application listeners
///
/// Delivery is fire-and-forget: there is no acknowledgment and no error path.
pub trait EventSink: Send + Sync {
    fn emit(&self, name: &str, payload: serde_json::Value);
}
