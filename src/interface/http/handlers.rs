use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;

use crate::adapters::EventBus;
use crate::application::{FitnessBridge, HistoryError};
use crate::domain::{DataType, MassUnit, MetricSample};

/// Error response carrying a status code
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        let status = match &err {
            HistoryError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            HistoryError::Platform(_) => StatusCode::BAD_GATEWAY,
            HistoryError::TaskFailed(_) | HistoryError::NoRuntime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<FitnessBridge>,
    pub events: EventBus,
}

fn metric(name: &str) -> Result<DataType, AppError> {
    name.parse().map_err(AppError::not_found)
}

/// Read window; like the write bodies it accepts any JS number
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub start_time: f64,
    pub end_time: f64,
    /// Weight only
    #[serde(default)]
    pub unit: MassUnit,
}

/// Body of a save call; the host sends plain JS numbers
#[derive(Debug, Deserialize)]
pub struct SaveSampleBody {
    pub value: f64,
    pub date: f64,
    /// Weight only
    #[serde(default)]
    pub unit: MassUnit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSamplesBody {
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingBody {
    #[serde(default)]
    pub data_types: Vec<String>,
}

/// GET /api/health
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/history/{metric}?startTime=&endTime=
pub async fn history_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MetricSample>>, AppError> {
    let data_type = metric(&name)?;
    let history = state.bridge.history(data_type);
    let mut samples = history.fetch_history(query.start_time as i64, query.end_time as i64).await?;
    if data_type == DataType::Weight {
        for sample in &mut samples {
            sample.value = query.unit.from_kilograms(sample.value);
        }
    }
    Ok(Json(samples))
}

/// POST /api/history/{metric}
pub async fn save_sample_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SaveSampleBody>,
) -> Result<Json<bool>, AppError> {
    let data_type = metric(&name)?;
    let value = match data_type {
        DataType::Weight => body.unit.to_kilograms(body.value),
        _ => body.value,
    };
    let history = state.bridge.history(data_type);
    Ok(Json(history.save_sample(value as i64, body.date as i64)))
}

/// POST /api/history/{metric}/delete
pub async fn delete_samples_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<DeleteSamplesBody>,
) -> Result<Json<bool>, AppError> {
    let history = state.bridge.history(metric(&name)?);
    Ok(Json(history.delete_samples(body.start_time as i64, body.end_time as i64)))
}

/// POST /api/recording/{stream}
pub async fn subscribe_handler(State(state): State<AppState>, Path(stream_name): Path<String>) -> StatusCode {
    state.bridge.recording().subscribe(&stream_name);
    StatusCode::ACCEPTED
}

/// POST /api/recording
pub async fn subscribe_all_handler(State(state): State<AppState>, Json(body): Json<RecordingBody>) -> StatusCode {
    state.bridge.recording().subscribe_all(body.data_types.as_slice());
    StatusCode::ACCEPTED
}

/// GET /api/events
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscriber = state.events.subscribe(Vec::new());

    let events = stream::unfold(subscriber, |mut subscriber| async move {
        let event = subscriber.recv().await?;
        let sse = Event::default().event(event.name).json_data(event.payload);
        Some((sse, subscriber))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
