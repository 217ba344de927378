pub mod event_sink;
pub mod fitness_platform;

pub use event_sink::EventSink;
pub use fitness_platform::{FitnessPlatform, PlatformError};
