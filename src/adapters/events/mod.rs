mod bus;

pub use bus::{EventBus, EventSubscriber, HostEvent, DEFAULT_EVENT_BUFFER};
