pub mod classifier;
pub mod cohere; // Cohere generate/chat + health-context estimation
pub mod dataset;
pub mod deepai; // DeepAI text-generator (secondary LLM provider)
pub mod edamam;
pub mod huggingface; // HuggingFace Inference API classifier
pub mod nutrition;
pub mod spoonacular;
pub mod usda;

pub use classifier::{DishClassifier, EnsembleClassifier, LocalModelClient};
pub use cohere::{CohereClient, HealthContextEstimator};
pub use dataset::NutritionDataset;
pub use deepai::DeepAiClient;
pub use edamam::EdamamClient;
pub use huggingface::HuggingFaceClient;
pub use nutrition::{HealthEstimator, NutritionProvider, NutritionResolver};
pub use spoonacular::SpoonacularClient;
pub use usda::UsdaClient;
