//! Stand-in detection backend used when no model service is configured.
//!
//! Two modes exist: a deterministic heuristic on the image shape, and named demo
//! scenarios whose confidences and boxes come from a seeded RNG.

/// Built-in demo scenarios.
pub mod scenario;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use binwise_core::{
    model::{BoundingBox, Detection},
    payload::DecodedImage,
    ports::{DetectError, DetectionPort, DetectorHealth, DetectorKind, DetectorMeta},
};

pub use scenario::{Complexity, SCENARIOS, Scenario};

const STUB_MODEL: &str = "mock";
const STUB_VERSION: &str = "1.0.0";

#[derive(thiserror::Error, Debug)]
/// Errors raised while configuring the stub detector.
pub enum StubError {
    /// The requested scenario does not exist.
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

#[derive(Debug, Clone, Copy)]
/// Strategy used to fabricate detections.
pub enum StubMode {
    /// Landscape images show a plastic bottle, everything else a banana.
    ImageShape,
    /// Replay a named scenario with a fixed seed.
    Scenario {
        /// Scenario to replay.
        scenario: &'static Scenario,
        /// RNG seed for confidences and boxes.
        seed: u64,
    },
}

/// Detection port that never talks to a model.
pub struct StubDetectionPort {
    meta: DetectorMeta,
    mode: StubMode,
    latency: Option<Duration>,
}

impl StubDetectionPort {
    /// Port using the image-shape heuristic.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: detector_meta(),
            mode: StubMode::ImageShape,
            latency: None,
        }
    }

    /// Port replaying the named scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::UnknownScenario`] when no scenario has that name.
    pub fn with_scenario(name: &str, seed: u64) -> Result<Self, StubError> {
        let scenario =
            scenario::find(name).ok_or_else(|| StubError::UnknownScenario(name.to_owned()))?;
        Ok(Self {
            meta: detector_meta(),
            mode: StubMode::Scenario { scenario, seed },
            latency: None,
        })
    }

    /// Delay every detection call, mimicking model inference time.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Active mode.
    #[must_use]
    pub fn mode(&self) -> StubMode {
        self.mode
    }
}

impl Default for StubDetectionPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DetectionPort for StubDetectionPort {
    fn meta(&self) -> &DetectorMeta {
        &self.meta
    }

    async fn detect(&self, image: &DecodedImage) -> Result<Vec<Detection>, DetectError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let detections = match self.mode {
            StubMode::ImageShape => shape_detections(image.width, image.height),
            StubMode::Scenario { scenario, seed } => {
                scenario.generate(seed, image.width, image.height)
            }
        };

        tracing::debug!(
            count = detections.len(),
            width = image.width,
            height = image.height,
            "stub detections generated"
        );

        Ok(detections)
    }

    async fn health(&self) -> DetectorHealth {
        DetectorHealth::ready()
    }
}

/// Build the detection port for the stub backend.
#[must_use]
pub fn adapter(port: StubDetectionPort) -> Arc<dyn DetectionPort> {
    Arc::new(port)
}

fn detector_meta() -> DetectorMeta {
    DetectorMeta {
        kind: DetectorKind::Stub,
        model: STUB_MODEL.to_owned(),
        version: STUB_VERSION.to_owned(),
    }
}

/// Heuristic detections for an image: landscape shots are treated as packaging.
#[must_use]
pub fn shape_detections(width: u32, height: u32) -> Vec<Detection> {
    let bbox = BoundingBox::new(width / 4, height / 4, width / 2, height / 2);
    if !bbox.is_well_formed() {
        return Vec::new();
    }

    let detection = if width > height {
        Detection::new("plastic_bottle", 87.5, bbox)
    } else {
        Detection::new("banana", 92.3, bbox)
    };
    vec![detection]
}
