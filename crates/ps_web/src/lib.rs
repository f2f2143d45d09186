use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/options", get(handlers::list_options))
        .route("/api/params", get(handlers::resolve_params))
        .route("/api/run", post(handlers::run_pipeline))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serves the app until ctrl-c, then closes the model runtime.
pub async fn serve(state: AppState, addr: &str) -> ps_core::Result<()> {
    let pipeline = state.pipeline.clone();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            pipeline.shutdown();
        })
        .await?;
    Ok(())
}

pub mod prelude {
    pub use crate::AppState;
    pub use ps_core::{Error, PipelineResult, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use async_trait::async_trait;
    use ps_core::{
        AbstractBand, DecodingParams, DecodingTable, Error, Result, SummaryContext, TextGenerator,
        TextSummarizer,
    };
    use ps_inference::models::DummyModel;
    use ps_inference::{AbstractGenerator, Pipeline, StyleSummarizer};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[derive(Debug)]
    struct FailingModel;

    #[async_trait]
    impl TextGenerator for FailingModel {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn generate(&self, _title: &str, _params: &DecodingParams) -> Result<String> {
            Err(Error::Inference("backend returned 500".to_string()))
        }
    }

    #[async_trait]
    impl TextSummarizer for FailingModel {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn summarize(
            &self,
            _text: &str,
            _params: &DecodingParams,
            _context: &SummaryContext,
        ) -> Result<String> {
            Err(Error::Inference("backend returned 500".to_string()))
        }
    }

    fn pipeline_with(
        generator: Arc<dyn TextGenerator>,
        summarizer: Arc<dyn TextSummarizer>,
    ) -> Arc<Pipeline> {
        Arc::new(
            Pipeline::new(
                AbstractGenerator::new(generator, &AbstractBand::default()).unwrap(),
                StyleSummarizer::new(summarizer),
                DecodingTable::default(),
            )
            .unwrap(),
        )
    }

    fn pipeline() -> Arc<Pipeline> {
        pipeline_with(Arc::new(DummyModel::new()), Arc::new(DummyModel::new()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_run(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/run")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let app = create_app(AppState::new(pipeline()));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<form"));
    }

    #[tokio::test]
    async fn test_options_lists_closed_sets() {
        let app = create_app(AppState::new(pipeline()));
        let (status, body) = send(app, Request::get("/api/options").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["styles"].as_array().unwrap().len(), 5);
        assert_eq!(body["lengths"].as_array().unwrap().len(), 3);
        assert_eq!(body["titles"][0], "Attention Is All You Need");
        assert_eq!(body["generator"], "Dummy");
    }

    #[tokio::test]
    async fn test_params_endpoint() {
        let app = create_app(AppState::new(pipeline()));
        let (status, body) = send(
            app.clone(),
            Request::get("/api/params?style=technical&length=short").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "min_tokens": 24, "max_tokens": 60, "beam_count": 4 }));

        let (status, body) = send(
            app,
            Request::get("/api/params?style=poetic&length=short").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Unknown style"));
    }

    #[tokio::test]
    async fn test_run_returns_both_texts() {
        let app = create_app(AppState::new(pipeline()));
        let (status, body) = send(
            app,
            post_run(json!({
                "title": "Attention Is All You Need",
                "style": "Technical",
                "length": "short"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["abstract_text"].as_str().unwrap().contains("Attention Is All You Need"));
        assert!(body["summary_text"].as_str().unwrap().starts_with("[Technical]"));
        assert_eq!(body["style"], "technical");
        assert_eq!(body["params"]["max_tokens"], 60);
    }

    #[tokio::test]
    async fn test_run_reports_stage_for_empty_title() {
        let app = create_app(AppState::new(pipeline()));
        let (status, body) = send(
            app,
            post_run(json!({ "title": " ", "style": "technical", "length": "short" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["stage"], "generation");
    }

    #[tokio::test]
    async fn test_run_names_failing_generation_stage() {
        let app = create_app(AppState::new(pipeline_with(
            Arc::new(FailingModel),
            Arc::new(DummyModel::new()),
        )));
        let (status, body) = send(
            app,
            post_run(json!({ "title": "BERT", "style": "technical", "length": "short" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["stage"], "generation");
        assert!(body["error"].as_str().unwrap().contains("backend returned 500"));
    }

    #[tokio::test]
    async fn test_run_names_failing_summarization_stage() {
        let app = create_app(AppState::new(pipeline_with(
            Arc::new(DummyModel::new()),
            Arc::new(FailingModel),
        )));
        let (status, body) = send(
            app,
            post_run(json!({ "title": "BERT", "style": "beginner-friendly", "length": "medium" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["stage"], "summarization");
        assert!(body["error"].as_str().unwrap().contains("backend returned 500"));
    }

    #[tokio::test]
    async fn test_run_after_shutdown_is_unavailable() {
        let pipeline = pipeline();
        pipeline.shutdown();
        let app = create_app(AppState::new(pipeline));
        let (status, _) = send(
            app,
            post_run(json!({ "title": "BERT", "style": "technical", "length": "long" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
