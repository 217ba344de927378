pub mod bridge;
pub mod history;
pub mod recording;
mod runtime;

pub use bridge::{BridgeSettings, FitnessBridge};
pub use history::{HistoryAdapter, HistoryError, WriteTicket, DEFAULT_REQUEST_TIMEOUT};
pub use recording::RecordingSubscriptionAdapter;
