//! Bridge between a host application and a fitness platform's history and
//! live-recording APIs.
//!
//! [`application::HistoryAdapter`] reads day-bucketed samples and submits
//! writes in the background; [`application::RecordingSubscriptionAdapter`]
//! subscribes to recording streams and reports the outcome as an event. Both
//! talk to the platform through the [`ports::FitnessPlatform`] port.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod interface;
pub mod ports;
