use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Single classifier output: a dish label plus softmax confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub dish: String,
    pub confidence: f64,
}

/// Which ensemble member produced the winning prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    Model1,
    Model2,
    Huggingface,
}

impl std::fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModelBackend::Model1 => "model1",
            ModelBackend::Model2 => "model2",
            ModelBackend::Huggingface => "huggingface",
        };
        write!(f, "{}", s)
    }
}

/// Where a nutrition profile came from (waterfall order: dataset first,
/// then the REST providers, finally the LLM estimate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutritionSource {
    Dataset,
    Edamam,
    Spoonacular,
    Usda,
    Cohere,
    DeepAi,
}

/// Per-100g nutrition and health record. Wire keys mirror the mobile
/// client's existing contract (capitalized nutrient names).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutritionProfile {
    #[serde(rename = "Calories")]
    pub calories: Option<f64>,
    #[serde(rename = "Protein")]
    pub protein: Option<f64>,
    #[serde(rename = "Fats")]
    pub fats: Option<f64>,
    #[serde(rename = "Carbs")]
    pub carbs: Option<f64>,
    #[serde(rename = "Iron", skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(rename = "Calcium", skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(rename = "Fiber", skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(rename = "Sugar", skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(rename = "Cholesterol", skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    #[serde(rename = "Sodium", skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(rename = "Health Benefits", default)]
    pub health_benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub health_tags: Vec<String>,
    #[serde(rename = "Suitability", default)]
    pub suitability: BTreeMap<String, String>,
    #[serde(rename = "Healthier Substitute")]
    pub healthier_substitute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<NutritionSource>,
}

impl NutritionProfile {
    /// A verdict is only computed when all four macros and the substitute
    /// are present; anything less reads as missing data to the client.
    pub fn is_complete(&self) -> bool {
        self.calories.is_some()
            && self.protein.is_some()
            && self.fats.is_some()
            && self.carbs.is_some()
            && self.healthier_substitute.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthVerdict {
    pub warning: String,
    pub suggested: String,
}

/// Threshold verdict, or a plain message when nutrition data is incomplete.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HealthAdvice {
    Verdict(HealthVerdict),
    Unavailable(String),
}

/// Full /scan response: winning prediction plus all three raw predictions,
/// the resolved nutrition profile and the health verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub dish: String,
    pub model_used: ModelBackend,
    pub confidence: f64,
    pub model1_prediction: Prediction,
    pub model2_prediction: Prediction,
    pub huggingface_prediction: Prediction,
    pub nutrition: NutritionProfile,
    pub health_verdict: HealthAdvice,
}

/// /chat request. `action` selects a prompt template ("scan", "search",
/// "meal_plan", "recipe", "fun_fact"); anything else falls back to the
/// general assistant persona with the raw query appended.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub dish_name: Option<String>,
    #[serde(default)]
    pub nutrition_info: Option<String>,
    #[serde(default)]
    pub health_conditions: Option<String>,
    #[serde(default)]
    pub diet_preferences: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub calorie_limit: Option<u32>,
    #[serde(default)]
    pub ingredient_name: Option<String>,
}

/// /nutrition query parameters. The barcode, when present, is used as the
/// USDA search term in place of the dish name.
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionQuery {
    #[serde(default)]
    pub dish: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}
