//! Detection backend that forwards images to an HTTP inference service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use binwise_core::{
    model::{BoundingBox, Detection, ItemId},
    payload::DecodedImage,
    ports::{DetectError, DetectionPort, DetectorHealth, DetectorKind, DetectorMeta},
};

/// Upper bound for a single `GET /health` round trip.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Body of `POST {base_url}/detect`.
#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    image: String,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// Response from `POST {base_url}/detect`.
#[derive(Debug, Deserialize)]
struct DetectResponse {
    detections: Vec<WireDetection>,

    // the service may report which weights it actually loaded
    #[serde(default)]
    model: Option<String>,
}

/// Single detection as sent by the inference service.
#[derive(Debug, Deserialize)]
struct WireDetection {
    item_label: String,
    confidence: f64,
    bbox: [u32; 4],
}

/// Response from `GET {base_url}/health`.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default = "default_ready", alias = "model_loaded")]
    ready: bool,
    #[serde(default)]
    status: Option<String>,
}

fn default_ready() -> bool {
    true
}

/// Detection port calling a remote model over HTTP.
pub struct RemoteDetectionPort {
    client: Client,
    base_url: String,
    meta: DetectorMeta,
    health_timeout: Duration,
}

impl RemoteDetectionPort {
    /// Create a port for the service at `base_url` serving `model`.
    #[must_use]
    pub fn new(client: Client, base_url: &str, model: &str, version: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            meta: DetectorMeta {
                kind: DetectorKind::Remote,
                model: model.to_owned(),
                version: version.to_owned(),
            },
            health_timeout: HEALTH_TIMEOUT,
        }
    }

    /// Replace the deadline for health checks.
    #[must_use]
    pub fn with_health_timeout(mut self, limit: Duration) -> Self {
        self.health_timeout = limit;
        self
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DetectionPort for RemoteDetectionPort {
    fn meta(&self) -> &DetectorMeta {
        &self.meta
    }

    async fn detect(&self, image: &DecodedImage) -> Result<Vec<Detection>, DetectError> {
        let body = DetectRequest {
            image: image.to_base64(),
            width: image.width,
            height: image.height,
            model: Some(self.meta.model.as_str()),
        };

        let req = self
            .client
            .post(format!("{}/detect", self.base_url))
            .json(&body);

        let response = fetch_json::<DetectResponse>(req).await?;

        if let Some(model) = response.model.as_deref()
            && model != self.meta.model
        {
            tracing::debug!(configured = %self.meta.model, reported = model, "detector reported a different model");
        }

        Ok(into_detections(response))
    }

    async fn health(&self) -> DetectorHealth {
        let req = self.client.get(format!("{}/health", self.base_url));

        let Ok(outcome) =
            tokio::time::timeout(self.health_timeout, fetch_json::<HealthResponse>(req)).await
        else {
            tracing::warn!(
                base_url = %self.base_url,
                timeout_ms = self.health_timeout.as_millis(),
                "detector health check timed out"
            );
            return DetectorHealth::unavailable("health check timed out");
        };

        match outcome {
            Ok(HealthResponse { ready: true, .. }) => DetectorHealth::ready(),
            Ok(HealthResponse { ready: false, status }) => {
                DetectorHealth::unavailable(status.unwrap_or_else(|| "model not ready".to_owned()))
            }
            Err(err) => {
                tracing::warn!(error = %err, base_url = %self.base_url, "detector health check failed");
                DetectorHealth::unavailable(err.to_string())
            }
        }
    }
}

/// Build the detection port for the remote backend.
#[must_use]
pub fn adapter(
    client: Client,
    base_url: &str,
    model: &str,
    version: &str,
) -> Arc<dyn DetectionPort> {
    Arc::new(RemoteDetectionPort::new(client, base_url, model, version))
}

fn into_detections(response: DetectResponse) -> Vec<Detection> {
    response
        .detections
        .into_iter()
        .map(|wire| {
            let [x1, y1, x2, y2] = wire.bbox;
            Detection {
                item: ItemId(wire.item_label),
                confidence: wire.confidence,
                bbox: BoundingBox::new(x1, y1, x2, y2),
            }
        })
        .collect()
}

// Transport problems mean the service is unreachable, decode problems mean it answered garbage.
fn map_reqwest_error(err: &reqwest::Error) -> DetectError {
    if err.is_decode() {
        DetectError::Malformed(err.to_string())
    } else {
        DetectError::Unavailable(err.to_string())
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, DetectError> {
    req.send()
        .await
        .map_err(|err| map_reqwest_error(&err))?
        .error_for_status()
        .map_err(|err| map_reqwest_error(&err))?
        .json()
        .await
        .map_err(|err| map_reqwest_error(&err))
}
