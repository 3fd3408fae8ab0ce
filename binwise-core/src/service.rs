//! High-level service facade combining the classifier with a detection backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::classify::Classifier;
use crate::model::{Detection, RecognitionResult};
use crate::payload::DecodedImage;
use crate::ports::{DetectError, DetectionPort, DetectorHealth, DetectorMeta, InputError};

/// Detection timeout used when none is configured.
pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
/// Errors returned by [`RecognitionService::recognize`].
pub enum RecognizeError {
    /// Caller sent an unusable payload.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Detection backend failed, timed out or answered with invalid data.
    #[error(transparent)]
    Detect(#[from] DetectError),
}

#[derive(Debug, Clone, Copy)]
/// Runtime knobs for [`RecognitionService`].
pub struct ServiceConfig {
    /// Upper bound for a single detection call.
    pub detect_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            detect_timeout: DEFAULT_DETECT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
/// Successful recognition together with timing and backend information.
pub struct Recognition {
    /// Classified and aggregated result.
    pub result: RecognitionResult,
    /// Wall time spent decoding, detecting and classifying.
    pub processing_time: Duration,
    /// Backend that produced the detections.
    pub detector: DetectorMeta,
}

/// Public entry point for recognising waste items in images.
pub struct RecognitionService {
    classifier: Arc<Classifier>,
    detector: Arc<dyn DetectionPort>,
    config: ServiceConfig,
}

impl RecognitionService {
    /// Create a new service bound to a classifier and a detection backend.
    #[must_use]
    pub fn new(
        classifier: Arc<Classifier>,
        detector: Arc<dyn DetectionPort>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            classifier,
            detector,
            config,
        }
    }

    /// Classifier used for every request.
    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Metadata of the configured detection backend.
    #[must_use]
    pub fn detector(&self) -> &DetectorMeta {
        self.detector.meta()
    }

    /// Readiness of the detection backend.
    pub async fn health(&self) -> DetectorHealth {
        self.detector.health().await
    }

    /// Decode a base64 image and recognise the waste items in it.
    ///
    /// # Errors
    ///
    /// Returns [`RecognizeError::Input`] for an unusable payload and
    /// [`RecognizeError::Detect`] when the backend fails or times out.
    pub async fn recognize(
        &self,
        image_base64: &str,
        location: &str,
    ) -> Result<Recognition, RecognizeError> {
        let started = Instant::now();
        let image = DecodedImage::from_base64(image_base64)?;
        self.recognize_decoded(&image, location, started).await
    }

    /// Recognise waste items in an already decoded image.
    ///
    /// # Errors
    ///
    /// Returns [`RecognizeError::Detect`] when the backend fails or times out.
    pub async fn recognize_image(
        &self,
        image: &DecodedImage,
        location: &str,
    ) -> Result<Recognition, RecognizeError> {
        self.recognize_decoded(image, location, Instant::now()).await
    }

    async fn recognize_decoded(
        &self,
        image: &DecodedImage,
        location: &str,
        started: Instant,
    ) -> Result<Recognition, RecognizeError> {
        let detections = self.detect(image).await?;
        let result = self.classifier.aggregate(&detections, location);
        let processing_time = started.elapsed();

        tracing::info!(
            council = %result.council,
            items = result.total_items,
            elapsed_ms = processing_time.as_millis(),
            "recognition complete"
        );

        Ok(Recognition {
            result,
            processing_time,
            detector: self.detector.meta().clone(),
        })
    }

    // Nothing is classified unless the backend answered in time with valid detections.
    async fn detect(&self, image: &DecodedImage) -> Result<Vec<Detection>, DetectError> {
        let limit = self.config.detect_timeout;
        let detections = tokio::time::timeout(limit, self.detector.detect(image))
            .await
            .map_err(|_elapsed| {
                tracing::warn!(timeout_ms = limit.as_millis(), "detector timed out");
                DetectError::Timeout(limit)
            })??;

        if let Some(invalid) = detections.iter().find(|detection| {
            !detection.has_valid_confidence() || !detection.bbox.fits_within(image.width, image.height)
        }) {
            return Err(DetectError::Malformed(format!(
                "detection {} (confidence {}, bbox {:?}) violates detection bounds for a {}x{} image",
                invalid.item, invalid.confidence, invalid.bbox, image.width, image.height
            )));
        }

        Ok(detections)
    }
}
