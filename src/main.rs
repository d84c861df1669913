mod handlers;
mod models;
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use handlers::{ChatHandler, ScanHandler};
use server::{create_router, AppState};
use services::{
    CohereClient, DeepAiClient, EdamamClient, EnsembleClassifier, HealthContextEstimator,
    HuggingFaceClient, LocalModelClient, NutritionDataset, NutritionResolver, SpoonacularClient,
    UsdaClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Food Scanner Backend...");

    // LLM providers
    let cohere_api_key = env::var("COHERE_API_KEY")
        .expect("COHERE_API_KEY must be set in .env file");
    let cohere = Arc::new(CohereClient::new(cohere_api_key));

    let deepai_api_key = env::var("DEEPAI_API_KEY").ok();
    if deepai_api_key.is_none() {
        log::warn!("⚠️ DEEPAI_API_KEY not set, LLM fallback will be unavailable");
    }
    let deepai = Arc::new(DeepAiClient::new(deepai_api_key));
    log::info!("✅ LLM providers initialized");

    // Classifier ensemble: two local inference sidecars + HuggingFace
    let model1_url = env::var("MODEL1_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8501/predict".to_string());
    let model2_url = env::var("MODEL2_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8502/predict".to_string());

    let hf_api_token = env::var("HF_API_TOKEN").ok();
    if hf_api_token.is_none() {
        log::warn!("⚠️ HF_API_TOKEN not set, HuggingFace predictions will be skipped");
    }

    let classifier = EnsembleClassifier::new(
        Arc::new(LocalModelClient::new("model1", model1_url)),
        Arc::new(LocalModelClient::new("model2", model2_url)),
        Arc::new(HuggingFaceClient::new(hf_api_token)),
    );
    log::info!("✅ Classifier ensemble initialized");

    // Local nutrition dataset
    let dataset_path = env::var("NUTRITION_DATA_PATH")
        .unwrap_or_else(|_| "data/all_non_veg_dishes_health_info.json".to_string());
    let dataset = NutritionDataset::load(&dataset_path)?;
    log::info!("✅ Nutrition dataset loaded ({} dishes)", dataset.len());

    // Nutrition provider waterfall
    let edamam_app_id = env::var("EDAMAM_APP_ID")
        .expect("EDAMAM_APP_ID must be set in .env file");
    let edamam_app_key = env::var("EDAMAM_APP_KEY")
        .expect("EDAMAM_APP_KEY must be set in .env file");
    let spoonacular_api_key = env::var("SPOONACULAR_API_KEY")
        .expect("SPOONACULAR_API_KEY must be set in .env file");
    let usda_api_key = env::var("USDA_API_KEY")
        .expect("USDA_API_KEY must be set in .env file");

    let resolver = Arc::new(NutritionResolver::new(
        Arc::new(EdamamClient::new(edamam_app_id, edamam_app_key)),
        Arc::new(SpoonacularClient::new(spoonacular_api_key)),
        Arc::new(UsdaClient::new(usda_api_key)),
        Arc::new(HealthContextEstimator::new(cohere.clone(), deepai.clone())),
    ));
    log::info!("✅ Nutrition providers initialized");

    let scan_handler = Arc::new(ScanHandler::new(classifier, dataset, resolver.clone()));
    let chat_handler = Arc::new(ChatHandler::new(cohere, deepai));

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "data/uploads".to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());

    let state = Arc::new(AppState {
        scan_handler,
        chat_handler,
        resolver,
        upload_dir,
    });
    let app = create_router(state);

    log::info!("🌐 Listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
