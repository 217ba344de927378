use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adapters::EventBus;
use crate::application::FitnessBridge;

use super::handlers::{
    delete_samples_handler, events_handler, health_handler, history_handler, save_sample_handler,
    subscribe_all_handler, subscribe_handler, AppState,
};

pub fn create_router(bridge: Arc<FitnessBridge>, events: EventBus) -> Router {
    let state = AppState { bridge, events };

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/history/{metric}", get(history_handler).post(save_sample_handler))
        .route("/api/history/{metric}/delete", post(delete_samples_handler))
        .route("/api/recording", post(subscribe_all_handler))
        .route("/api/recording/{stream}", post(subscribe_handler))
        .route("/api/events", get(events_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
