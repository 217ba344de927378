pub mod events;
pub mod platform;

pub use events::{EventBus, EventSubscriber, HostEvent};
pub use platform::InMemoryPlatform;
