use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use binwise_core::{
    BoundingBox, Classifier, DecodedImage, DetectError, Detection, DetectionPort, DetectorHealth,
    DetectorKind, DetectorMeta, InputError, RecognitionService, RecognizeError, ServiceConfig,
};
use image::{ImageBuffer, ImageFormat, Rgb};

enum Behaviour {
    Answer(Vec<Detection>),
    Hang,
    Fail,
}

struct FakePort {
    meta: DetectorMeta,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakePort {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            meta: DetectorMeta {
                kind: DetectorKind::Stub,
                model: "fake".to_owned(),
                version: "0.0.1".to_owned(),
            },
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl DetectionPort for FakePort {
    fn meta(&self) -> &DetectorMeta {
        &self.meta
    }

    async fn detect(&self, _image: &DecodedImage) -> Result<Vec<Detection>, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Answer(detections) => Ok(detections.clone()),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            }
            Behaviour::Fail => Err(DetectError::Unavailable("connection refused".to_owned())),
        }
    }

    async fn health(&self) -> DetectorHealth {
        DetectorHealth::ready()
    }
}

fn png_base64(width: u32, height: u32) -> String {
    let buffer = ImageBuffer::from_pixel(width, height, Rgb([0_u8, 0, 0]));
    let mut out = Cursor::new(Vec::new());
    buffer
        .write_to(&mut out, ImageFormat::Png)
        .expect("png encoding");
    STANDARD.encode(out.into_inner())
}

fn service(port: Arc<FakePort>, timeout: Duration) -> RecognitionService {
    let classifier = Arc::new(Classifier::builtin().expect("builtin catalogs"));
    RecognitionService::new(
        classifier,
        port,
        ServiceConfig {
            detect_timeout: timeout,
        },
    )
}

#[tokio::test]
async fn recognizes_and_classifies_in_order() {
    let port = FakePort::new(Behaviour::Answer(vec![
        Detection::new("banana", 92.3, BoundingBox::new(10, 20, 40, 60)),
        Detection::new("coffee_cup", 71.0, BoundingBox::new(50, 50, 90, 99)),
    ]));
    let service = service(Arc::clone(&port), Duration::from_secs(5));

    let recognition = service
        .recognize(&png_base64(100, 100), "E1 6AN")
        .await
        .expect("recognition succeeds");

    assert_eq!(recognition.result.council.as_str(), "Tower Hamlets");
    assert_eq!(recognition.result.total_items, 2);
    assert_eq!(
        recognition
            .result
            .detections
            .iter()
            .map(|detection| detection.item.as_str())
            .collect::<Vec<_>>(),
        ["banana", "coffee_cup"]
    );
    assert_eq!(recognition.detector.model, "fake");
    assert_eq!(port.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_detector_yields_timeout_error() {
    let port = FakePort::new(Behaviour::Hang);
    let service = service(port, Duration::from_millis(20));

    let outcome = service.recognize(&png_base64(10, 10), "SW1A 1AA").await;

    assert!(matches!(
        outcome,
        Err(RecognizeError::Detect(DetectError::Timeout(limit))) if limit == Duration::from_millis(20)
    ));
}

#[tokio::test]
async fn unavailable_detector_is_reported_distinctly() {
    let service = service(FakePort::new(Behaviour::Fail), Duration::from_secs(5));
    let outcome = service.recognize(&png_base64(10, 10), "SW1A 1AA").await;
    assert!(matches!(
        outcome,
        Err(RecognizeError::Detect(DetectError::Unavailable(_)))
    ));
}

#[tokio::test]
async fn bad_payload_never_reaches_the_detector() {
    let port = FakePort::new(Behaviour::Answer(Vec::new()));
    let service = service(Arc::clone(&port), Duration::from_secs(5));

    let outcome = service.recognize("base64_encoded_image_data", "SW1A 1AA").await;

    assert!(matches!(outcome, Err(RecognizeError::Input(InputError::Base64(_)))));
    assert_eq!(port.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn out_of_bounds_detections_are_rejected() {
    let port = FakePort::new(Behaviour::Answer(vec![
        Detection::new("apple", 90.0, BoundingBox::new(0, 0, 5, 5)),
        Detection::new("apple", 90.0, BoundingBox::new(0, 0, 500, 5)),
    ]));
    let service = service(port, Duration::from_secs(5));

    let outcome = service.recognize(&png_base64(20, 20), "SW1A 1AA").await;

    assert!(matches!(
        outcome,
        Err(RecognizeError::Detect(DetectError::Malformed(_)))
    ));
}

#[tokio::test]
async fn confidence_outside_percent_range_is_rejected() {
    let port = FakePort::new(Behaviour::Answer(vec![Detection::new(
        "apple",
        0.92 * 1000.0,
        BoundingBox::new(0, 0, 5, 5),
    )]));
    let service = service(port, Duration::from_secs(5));

    let outcome = service.recognize(&png_base64(20, 20), "SW1A 1AA").await;

    assert!(matches!(
        outcome,
        Err(RecognizeError::Detect(DetectError::Malformed(_)))
    ));
}

#[tokio::test]
async fn empty_detection_list_is_a_success() {
    let service = service(FakePort::new(Behaviour::Answer(Vec::new())), Duration::from_secs(5));
    let recognition = service
        .recognize(&png_base64(4, 4), "ZZ9 9ZZ")
        .await
        .expect("empty result is still a success");
    assert_eq!(recognition.result.total_items, 0);
    assert_eq!(recognition.result.council.as_str(), "Westminster");
}
