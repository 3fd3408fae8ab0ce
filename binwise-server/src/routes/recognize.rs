use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};

use binwise_core::{DecodedImage, DetectorKind, Recognition, RecognitionResult};

use super::AppState;
use crate::error::ApiError;

const DEFAULT_LOCATION: &str = "SW1A 1AA";

fn default_location() -> String {
    DEFAULT_LOCATION.to_owned()
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecognizeRequest {
    image: String,
    #[serde(default = "default_location")]
    location: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadQuery {
    #[serde(default = "default_location")]
    location: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModelInfo {
    model: String,
    version: String,
    detector: DetectorKind,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecognizeResponse {
    success: bool,
    /// Seconds, rounded to milliseconds.
    processing_time: f64,
    model_info: ModelInfo,
    #[serde(flatten)]
    result: RecognitionResult,
}

impl From<Recognition> for RecognizeResponse {
    fn from(recognition: Recognition) -> Self {
        Self {
            success: true,
            processing_time: round_seconds(recognition.processing_time),
            model_info: ModelInfo {
                model: recognition.detector.model,
                version: recognition.detector.version,
                detector: recognition.detector.kind,
            },
            result: recognition.result,
        }
    }
}

fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

pub(crate) async fn recognize(
    State(state): State<AppState>,
    payload: Result<Json<RecognizeRequest>, JsonRejection>,
) -> Result<Json<RecognizeResponse>, ApiError> {
    let Json(request) = payload?;
    let recognition = state
        .service
        .recognize(&request.image, &request.location)
        .await?;
    Ok(Json(recognition.into()))
}

/// Same as [`recognize`] but with the raw image file as body.
pub(crate) async fn recognize_upload(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<RecognizeResponse>, ApiError> {
    let Query(query) = query?;
    let image = DecodedImage::from_bytes(body.to_vec())?;
    let recognition = state
        .service
        .recognize_image(&image, &query.location)
        .await?;
    Ok(Json(recognition.into()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;

    use binwise_core::ServiceConfig;
    use binwise_detector_stub::StubDetectionPort;

    use crate::routes::test_support::{app, app_with, png_base64, png_bytes, post_json, send};

    #[tokio::test]
    async fn landscape_image_yields_a_blue_bin_bottle() {
        let (status, body) = post_json(
            app(),
            "/recognize",
            &json!({ "image": png_base64(64, 32), "location": "SW1A 1AA" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["council"], "Westminster");
        assert_eq!(body["location"], "SW1A 1AA");
        assert_eq!(body["total_items"], 1);
        assert_eq!(body["model_info"]["model"], "mock");
        assert_eq!(body["model_info"]["detector"], "stub");
        assert_eq!(body["detections"][0]["item"], "plastic_bottle");
        assert_eq!(body["detections"][0]["bin_color"], "blue");
        assert_eq!(body["detections"][0]["bbox"], json!([16, 8, 32, 16]));
        assert_eq!(body["environmental_impact"]["recyclable"], 1);
        assert!(body["processing_time"].is_f64(), "processing_time is seconds");
    }

    #[tokio::test]
    async fn location_defaults_to_westminster() {
        let (status, body) =
            post_json(app(), "/recognize", &json!({ "image": png_base64(32, 64) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"], "SW1A 1AA");
        assert_eq!(body["council"], "Westminster");
        assert_eq!(body["detections"][0]["item"], "banana");
        assert_eq!(
            body["detections"][0]["council_instruction"],
            "Food waste bin (brown) - collected weekly on Wednesdays"
        );
    }

    #[tokio::test]
    async fn garbage_payload_is_a_bad_request() {
        let (status, body) = post_json(
            app(),
            "/recognize",
            &json!({ "image": "base64_encoded_image_data", "location": "E1 6AN" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn compact_location_resolves_like_the_spaced_form() {
        let (status, body) = post_json(
            app(),
            "/recognize",
            &json!({ "image": png_base64(32, 64), "location": "E16AN" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"], "E16AN");
        assert_eq!(body["council"], "Tower Hamlets");
    }

    #[tokio::test]
    async fn missing_image_field_is_a_json_bad_request() {
        let (status, body) =
            post_json(app(), "/recognize", &json!({ "location": "E1 6AN" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_input");
        assert!(body["message"].as_str().is_some_and(|message| message.contains("image")));
    }

    #[tokio::test]
    async fn body_without_json_content_type_is_a_json_bad_request() {
        let request = Request::post("/recognize")
            .body(Body::from(r#"{"image":"aGVsbG8="}"#))
            .expect("request");
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn unparseable_json_is_a_json_bad_request() {
        let request = Request::post("/recognize")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn slow_detector_is_a_gateway_timeout() {
        let app = app_with(
            StubDetectionPort::new().with_latency(Duration::from_secs(5)),
            ServiceConfig {
                detect_timeout: Duration::from_millis(10),
            },
        );
        let (status, body) =
            post_json(app, "/recognize", &json!({ "image": png_base64(8, 8) })).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "detector_timeout");
    }

    #[tokio::test]
    async fn scenario_results_are_classified_for_the_resolved_council() {
        let port = StubDetectionPort::with_scenario("Coffee Shop Waste", 11).expect("scenario");
        let app = app_with(port, ServiceConfig::default());
        let (status, body) = post_json(
            app,
            "/recognize",
            &json!({ "image": png_base64(640, 480), "location": "E14 5AB" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["council"], "Tower Hamlets");
        assert_eq!(body["total_items"], 4);
        let impact = &body["environmental_impact"];
        let sum = ["compostable", "recyclable", "general_waste", "special_disposal", "other"]
            .iter()
            .filter_map(|bucket| impact[*bucket].as_u64())
            .sum::<u64>();
        assert_eq!(sum, 4);
    }

    #[tokio::test]
    async fn raw_upload_is_recognized() {
        let request = Request::post("/recognize/upload?location=E1%206AN")
            .body(Body::from(png_bytes(30, 60)))
            .expect("request");
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["council"], "Tower Hamlets");
        assert_eq!(body["detections"][0]["item"], "banana");
    }

    #[tokio::test]
    async fn empty_upload_is_a_bad_request() {
        let request = Request::post("/recognize/upload")
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
