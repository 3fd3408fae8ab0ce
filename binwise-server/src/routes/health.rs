use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use binwise_core::DetectorKind;

use super::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    model: String,
    version: String,
    detector: DetectorKind,
    detector_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    councils: usize,
    items: usize,
    timestamp: DateTime<Utc>,
    uptime_seconds: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProbeResponse {
    status: &'static str,
}

/// Always 200; `status` is `degraded` while the detector is not ready.
pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let detector = state.service.detector().clone();
    let readiness = state.service.health().await;
    let classifier = state.service.classifier();
    let now = Utc::now();

    Json(HealthResponse {
        status: if readiness.ready { "healthy" } else { "degraded" },
        model: detector.model,
        version: detector.version,
        detector: detector.kind,
        detector_ready: readiness.ready,
        detail: readiness.detail,
        councils: classifier.councils().len(),
        items: classifier.items().len(),
        timestamp: now,
        uptime_seconds: (now - state.started_at).num_seconds(),
    })
}

pub(crate) async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "alive" })
}

pub(crate) async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ProbeResponse>) {
    if state.service.health().await.ready {
        (StatusCode::OK, Json(ProbeResponse { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse { status: "not_ready" }),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{Router, http::StatusCode};

    use binwise_core::{
        Classifier, DecodedImage, DetectError, Detection, DetectionPort, DetectorHealth,
        DetectorKind, DetectorMeta, RecognitionService, ServiceConfig,
    };

    use crate::routes::test_support::{app, get_json};
    use crate::routes::{AppState, router};

    struct LoadingPort(DetectorMeta);

    #[async_trait]
    impl DetectionPort for LoadingPort {
        fn meta(&self) -> &DetectorMeta {
            &self.0
        }

        async fn detect(&self, _image: &DecodedImage) -> Result<Vec<Detection>, DetectError> {
            Err(DetectError::Unavailable("weights loading".to_owned()))
        }

        async fn health(&self) -> DetectorHealth {
            DetectorHealth::unavailable("weights loading")
        }
    }

    fn loading_app() -> Router {
        let port = LoadingPort(DetectorMeta {
            kind: DetectorKind::Remote,
            model: "models/yolov8n.pt".to_owned(),
            version: "1.0.0".to_owned(),
        });
        let classifier = Classifier::builtin().expect("builtin catalogs");
        let service =
            RecognitionService::new(Arc::new(classifier), Arc::new(port), ServiceConfig::default());
        router(AppState::new(service), 1024)
    }

    #[tokio::test]
    async fn health_reports_detector_and_catalog_sizes() {
        let (status, body) = get_json(app(), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "mock");
        assert_eq!(body["detector"], "stub");
        assert_eq!(body["councils"], 2);
        assert!(body["timestamp"].is_string(), "timestamp is RFC 3339");
    }

    #[tokio::test]
    async fn liveness_never_depends_on_the_detector() {
        let (status, body) = get_json(loading_app(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "alive");
    }

    #[tokio::test]
    async fn readiness_follows_the_detector() {
        let (status, _) = get_json(app(), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(loading_app(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not_ready");

        let (status, body) = get_json(loading_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["detail"], "weights loading");
    }
}
