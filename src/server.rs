use axum::{
    extract::{Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{ChatHandler, ScanHandler};
use crate::models::{ChatRequest, NutritionQuery, ScanResponse};
use crate::services::NutritionResolver;

pub struct AppState {
    pub scan_handler: Arc<ScanHandler>,
    pub chat_handler: Arc<ChatHandler>,
    pub resolver: Arc<NutritionResolver>,
    pub upload_dir: String,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/scan", post(scan_handler))
        .route("/chat", post(chat_handler))
        .route("/nutrition", get(nutrition_handler))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// POST /scan — multipart dish photo upload. Errors come back as
/// {"error": ...} with HTTP 200; the mobile client only inspects the body.
async fn scan_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Json<serde_json::Value> {
    match handle_scan(&state, multipart).await {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(value) => Json(value),
            Err(e) => Json(json!({"error": e.to_string()})),
        },
        Err(e) => {
            log::error!("❌ Scan error: {:#}", e);
            Json(json!({"error": e.to_string()}))
        }
    }
}

async fn handle_scan(state: &AppState, mut multipart: Multipart) -> anyhow::Result<ScanResponse> {
    let mut image_path = None;

    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload.jpg").to_string();
        let bytes = field.bytes().await?;
        log::info!("📸 Received file: {} ({} bytes)", original_name, bytes.len());

        std::fs::create_dir_all(&state.upload_dir)?;
        let filename = format!(
            "{}/scan_{}.jpg",
            state.upload_dir,
            chrono::Utc::now().timestamp_millis()
        );
        std::fs::write(&filename, &bytes)?;
        log::info!("💾 Saved uploaded image as {}", filename);

        image_path = Some(filename);
        break;
    }

    let image_path = image_path.ok_or_else(|| anyhow::anyhow!("no image file in upload"))?;
    state.scan_handler.scan(&image_path).await
}

/// POST /chat — free-form nutrition Q&A through the LLM chat layer.
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Json<serde_json::Value> {
    match state.chat_handler.ask(&request).await {
        Ok(reply) => Json(json!({"response": reply})),
        Err(e) => {
            log::error!("❌ Chat error: {:#}", e);
            Json(json!({"error": e.to_string()}))
        }
    }
}

/// GET /nutrition?dish=...&barcode=... — runs the nutrition waterfall
/// directly, without a scan.
async fn nutrition_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NutritionQuery>,
) -> Json<serde_json::Value> {
    match state
        .resolver
        .resolve(query.dish.as_deref(), query.barcode.as_deref())
        .await
    {
        Ok(profile) => Json(json!({"dish": query.dish, "nutrition": profile})),
        Err(e) => Json(json!({"error": e.to_string()})),
    }
}

async fn root_handler() -> &'static str {
    "Food Scanner Backend - POST /scan with a dish photo, POST /chat for nutrition questions"
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use crate::services::{
        CohereClient, DeepAiClient, EdamamClient, EnsembleClassifier, HealthContextEstimator,
        HuggingFaceClient, LocalModelClient, NutritionDataset, NutritionResolver,
        SpoonacularClient, UsdaClient,
    };

    fn test_state() -> Arc<AppState> {
        let cohere = Arc::new(CohereClient::new("test_key".to_string()));
        let deepai = Arc::new(DeepAiClient::new(None));

        let classifier = EnsembleClassifier::new(
            Arc::new(LocalModelClient::new("model1", "http://127.0.0.1:1/predict")),
            Arc::new(LocalModelClient::new("model2", "http://127.0.0.1:1/predict")),
            Arc::new(HuggingFaceClient::new(None)),
        );

        let resolver = Arc::new(NutritionResolver::new(
            Arc::new(EdamamClient::new("id".to_string(), "key".to_string())),
            Arc::new(SpoonacularClient::new("key".to_string())),
            Arc::new(UsdaClient::new("key".to_string())),
            Arc::new(HealthContextEstimator::new(cohere.clone(), deepai.clone())),
        ));

        Arc::new(AppState {
            scan_handler: Arc::new(ScanHandler::new(
                classifier,
                NutritionDataset::from_records(Vec::new()),
                resolver.clone(),
            )),
            chat_handler: Arc::new(ChatHandler::new(cohere, deepai)),
            resolver,
            upload_dir: std::env::temp_dir().to_string_lossy().into_owned(),
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_describes_the_api() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_rejects_invalid_body() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scan_without_file_reports_error_body() {
        let app = create_router(test_state());
        let boundary = "test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
            b = boundary
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scan")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Scan failures keep HTTP 200 and report through the body
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"].as_str().unwrap().contains("no image file"));
    }
}
