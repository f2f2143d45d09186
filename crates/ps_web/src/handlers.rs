use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ps_core::{DecodingParams, Error, Length, PipelineResult, Stage, Style, SAMPLE_TITLES};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub stage: Option<Stage>,
    pub error: String,
}

/// Pipeline errors rendered with the failing stage, so the form can tell a
/// failed abstract apart from a failed summary.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    stage: Option<Stage>,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, stage: Option<Stage>, message: impl Into<String>) -> Self {
        Self {
            status,
            stage,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match &error {
            Error::Configuration(_) => StatusCode::BAD_REQUEST,
            Error::Generation(_) | Error::Summarization(_) => StatusCode::BAD_GATEWAY,
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.stage(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            stage: self.stage,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct OptionEntry {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub styles: Vec<OptionEntry>,
    pub lengths: Vec<OptionEntry>,
    pub titles: Vec<&'static str>,
    pub generator: String,
    pub summarizer: String,
}

#[derive(Debug, Deserialize)]
pub struct ParamsQuery {
    pub style: String,
    pub length: String,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub title: String,
    pub style: String,
    pub length: String,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    #[serde(flatten)]
    pub result: PipelineResult,
    pub style: Style,
    pub length: Length,
    pub params: DecodingParams,
    pub completed_at: DateTime<Utc>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.pipeline.is_shut_down() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "shutting down" })),
        );
    }
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

pub async fn list_options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        styles: Style::ALL
            .iter()
            .map(|s| OptionEntry { id: s.id(), label: s.label() })
            .collect(),
        lengths: Length::ALL
            .iter()
            .map(|l| OptionEntry { id: l.id(), label: l.label() })
            .collect(),
        titles: SAMPLE_TITLES.to_vec(),
        generator: state.pipeline.generator().model_name().to_string(),
        summarizer: state.pipeline.summarizer().model_name().to_string(),
    })
}

pub async fn resolve_params(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ParamsQuery>,
) -> Result<Json<DecodingParams>, ApiError> {
    let params = state.pipeline.table().resolve_named(&query.style, &query.length)?;
    Ok(Json(params))
}

pub async fn run_pipeline(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            Some(Stage::Generation),
            "Please provide a paper title before continuing.",
        ));
    }

    let style: Style = request.style.parse()?;
    let length: Length = request.length.parse()?;
    let params = state.pipeline.resolve(style, length)?;

    tracing::info!("📄 Run requested for '{}' ({}, {})", request.title, style, length);
    let result = state
        .pipeline
        .run(&request.title, style, length)
        .await
        .map_err(|e| {
            // A run that loses the race with shutdown fails on the closed permit.
            if state.pipeline.is_shut_down() {
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    None,
                    "The model runtime is shutting down.",
                )
            } else {
                ApiError::from(e)
            }
        })?;

    Ok(Json(RunResponse {
        result,
        style,
        length,
        params,
        completed_at: Utc::now(),
    }))
}
