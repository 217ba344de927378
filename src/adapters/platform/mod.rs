mod memory;

pub use memory::{InMemoryPlatform, AGGREGATE_SOURCE, MAX_BUCKETS};
