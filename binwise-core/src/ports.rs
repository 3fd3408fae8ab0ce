//! Traits describing detection backends and the errors crossing that boundary.

use std::time::Duration;

use async_trait::async_trait;
use base64::DecodeError as Base64Error;
use image::ImageError;
use serde::{Deserialize, Serialize};

use crate::model::Detection;
use crate::payload::DecodedImage;

#[derive(thiserror::Error, Debug)]
/// Errors caused by caller-supplied input.
pub enum InputError {
    /// No image data was supplied.
    #[error("Image payload is empty")]
    EmptyImage,
    /// Payload is not valid base64.
    #[error("Image payload is not valid base64: {0}")]
    Base64(#[from] Base64Error),
    /// Decoded bytes do not look like a supported image format.
    #[error("Unrecognised image format")]
    UnknownImageFormat,
    /// Image header could not be read.
    #[error("Invalid image data: {0}")]
    Image(#[from] ImageError),
    /// Reading the decoded buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Postcode does not follow the UK format.
    #[error("Invalid postcode: {0}")]
    InvalidPostcode(String),
    /// Search query was blank.
    #[error("Search query is empty")]
    EmptyQuery,
}

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to a detection backend.
pub enum DetectError {
    /// Backend could not be reached or refused the request.
    #[error("Detector unavailable: {0}")]
    Unavailable(String),
    /// Backend did not answer within the configured duration.
    #[error("Detection timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// Backend answered with something that is not a valid detection list.
    #[error("Malformed detector response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which family of backend produced the detections.
pub enum DetectorKind {
    /// Deterministic or scripted stand-in.
    Stub,
    /// Model served over HTTP.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Static description of a detection backend.
pub struct DetectorMeta {
    /// Backend family.
    pub kind: DetectorKind,
    /// Model name or path reported to clients.
    pub model: String,
    /// Model version reported to clients.
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Readiness of a detection backend.
pub struct DetectorHealth {
    /// Backend can serve requests.
    pub ready: bool,
    /// Optional human-readable detail.
    pub detail: Option<String>,
}

impl DetectorHealth {
    /// Healthy backend without detail.
    #[must_use]
    pub fn ready() -> Self {
        Self {
            ready: true,
            detail: None,
        }
    }

    /// Unhealthy backend with a reason.
    #[must_use]
    pub fn unavailable<S: Into<String>>(detail: S) -> Self {
        Self {
            ready: false,
            detail: Some(detail.into()),
        }
    }
}

#[async_trait]
/// Detection adapter: turns an image into raw detections.
pub trait DetectionPort: Send + Sync {
    /// Metadata describing the backend.
    fn meta(&self) -> &DetectorMeta;

    /// Detect objects in the image.
    ///
    /// # Errors
    ///
    /// Returns a [`DetectError`] when the backend fails or answers with invalid data.
    async fn detect(&self, image: &DecodedImage) -> Result<Vec<Detection>, DetectError>;

    /// Report whether the backend is ready to serve requests.
    async fn health(&self) -> DetectorHealth;
}
