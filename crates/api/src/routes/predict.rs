//! Prediction Route

use axum::{body::Bytes, extract::State, Json};
use data_validator::FeatureRequest;
use inference_engine::{run_inference, InferenceError, PredictionRows, SampleBatch};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::SharedState;

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: PredictionRows,
}

/// Run the model on the request's features.
///
/// The body is parsed as JSON whatever its `Content-Type`. The model check
/// comes first so an absent model always answers 500.
pub async fn predict(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let model = state.model.clone().ok_or(ApiError::ModelUnavailable)?;

    let body: Value = serde_json::from_slice(&body)?;
    let request = FeatureRequest::from_value(&body)?;
    let batch = SampleBatch::single_feature(&request.features)?;

    let result = tokio::task::spawn_blocking(move || run_inference(model.as_ref(), &batch))
        .await
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))??;

    debug!(
        "Predicted {} rows in {}ms",
        result.rows.len(),
        result.latency_ms
    );

    Ok(Json(PredictResponse {
        predictions: result.rows,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{app_with, Failing, Linear, Panicking, TwoOutputs};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post(app: Router, body: impl Into<Body>, content_type: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method("POST").uri("/predict");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }

        let response = app.oneshot(request.body(body.into()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        post(app, body.to_string(), Some("application/json")).await
    }

    fn error_message(body: &Value) -> &str {
        body["error"].as_str().unwrap()
    }

    #[tokio::test]
    async fn test_single_feature() {
        let (status, body) = post_json(app_with(Some(Linear)), json!({ "features": [5.08] })).await;
        assert_eq!(status, StatusCode::OK);

        let rows = body["predictions"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_keeps_order() {
        let (status, body) = post_json(app_with(Some(Linear)), json!({ "features": [1.0, 2.0, 3.0] })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "predictions": [[3.0], [5.0], [7.0]] }));
    }

    #[tokio::test]
    async fn test_multi_output_model() {
        let (status, body) = post_json(app_with(Some(TwoOutputs)), json!({ "features": [1.0, 2.0] })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "predictions": [[1.0, -1.0], [2.0, -2.0]] }));
    }

    #[tokio::test]
    async fn test_content_type_ignored() {
        let body = json!({ "features": [1.0] }).to_string();

        let (status, _) = post(app_with(Some(Linear)), body.clone(), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post(app_with(Some(Linear)), body, Some("text/plain")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_features() {
        let (status, body) = post_json(app_with(Some(Linear)), json!({ "features": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "The \"features\" key must be a non-empty list.");
    }

    #[tokio::test]
    async fn test_missing_features() {
        let (status, body) = post_json(app_with(Some(Linear)), json!({ "values": [1.0] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "The \"features\" key must be a non-empty list.");
    }

    #[tokio::test]
    async fn test_features_not_a_list() {
        for features in [json!(5.08), json!("5.08")] {
            let (status, body) = post_json(app_with(Some(Linear)), json!({ "features": features })).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(!error_message(&body).is_empty());
        }
    }

    #[tokio::test]
    async fn test_non_numeric_element() {
        let (status, body) = post_json(app_with(Some(Linear)), json!({ "features": [1.0, "two"] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "features[1] is not a number");
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (status, body) = post(app_with(Some(Linear)), "{\"features\": [1.0,", Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_inference_error_is_bad_request() {
        let (status, body) = post_json(app_with(Some(Failing)), json!({ "features": [1.0] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).contains("expected 3 features"));
    }

    #[tokio::test]
    async fn test_model_panic_is_bad_request() {
        let (status, body) = post_json(app_with(Some(Panicking)), json!({ "features": [1.0] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).starts_with("Inference failed"));
    }

    #[tokio::test]
    async fn test_model_unavailable() {
        let requests = [
            json!({ "features": [5.08] }).to_string(),
            json!({ "features": [] }).to_string(),
            "not json".to_string(),
        ];

        for body in requests {
            let (status, response) = post(app_with::<Linear>(None), body, Some("application/json")).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(error_message(&response), "The model is not available.");
        }
    }

    /// Body well past axum's default 2 MB limit
    fn large_body(samples: usize) -> String {
        let values = vec!["123.4567"; samples].join(",");
        format!("{{\"features\": [{}]}}", values)
    }

    #[tokio::test]
    async fn test_large_request_is_not_rejected() {
        let body = large_body(400_000);
        assert!(body.len() > 3 * 1024 * 1024);

        let (status, response) = post(app_with(Some(Linear)), body, Some("application/json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["predictions"].as_array().unwrap().len(), 400_000);
    }

    #[tokio::test]
    async fn test_large_request_without_model() {
        let (status, response) = post(app_with::<Linear>(None), large_body(400_000), Some("application/json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(&response), "The model is not available.");
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::ORIGIN, "http://dashboard.example")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "features": [1.0] }).to_string()))
            .unwrap();

        let response = app_with(Some(Linear)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    proptest! {
        #[test]
        fn prop_one_row_per_feature(values in prop::collection::vec(-1.0e3f64..1.0e3, 1..48)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let (status, body) = runtime.block_on(post_json(app_with(Some(Linear)), json!({ "features": values.clone() })));

            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(body["predictions"].as_array().unwrap().len(), values.len());
        }
    }
}
