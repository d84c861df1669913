use anyhow::Result;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{NutritionProfile, NutritionSource};

const NUTRITION_DATA_URL: &str = "https://api.edamam.com/api/nutrition-data";

/// Edamam nutrition-data API client. First REST provider in the waterfall;
/// the only one that returns micros, health labels and a suitability map.
pub struct EdamamClient {
    app_id: String,
    app_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NutritionData {
    #[serde(default)]
    calories: f64,
    #[serde(rename = "totalNutrients", default)]
    total_nutrients: HashMap<String, Nutrient>,
    #[serde(rename = "healthLabels", default)]
    health_labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Nutrient {
    #[serde(default)]
    quantity: f64,
}

impl EdamamClient {
    pub fn new(app_id: String, app_key: String) -> Self {
        Self {
            app_id,
            app_key,
            client: reqwest::Client::new(),
        }
    }

    /// Returns Ok(None) when Edamam has nothing usable (non-200 status or
    /// zero calories); the waterfall then moves on.
    pub async fn guess(&self, dish_name: &str) -> Result<Option<NutritionProfile>> {
        let response = self
            .client
            .get(NUTRITION_DATA_URL)
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("ingr", dish_name),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            log::warn!("⚠️ Edamam returned HTTP {} for '{}'", response.status(), dish_name);
            return Ok(None);
        }

        let data: NutritionData = response.json().await?;
        if data.calories <= 0.0 {
            log::debug!("Edamam has no calorie data for '{}'", dish_name);
            return Ok(None);
        }

        let quantity = |key: &str| data.total_nutrients.get(key).map_or(0.0, |n| n.quantity);

        let sugar = quantity("SUGAR");
        let sodium = quantity("NA");
        let fat = quantity("FAT");
        let protein = quantity("PROCNT");
        let carbs = quantity("CHOCDF");

        Ok(Some(NutritionProfile {
            calories: Some(data.calories),
            protein: Some(protein),
            fats: Some(fat),
            carbs: Some(carbs),
            iron: Some(quantity("FE")),
            calcium: Some(quantity("CA")),
            fiber: Some(quantity("FIBTG")),
            sugar: Some(sugar),
            cholesterol: Some(quantity("CHOLE")),
            sodium: Some(sodium),
            health_benefits: Vec::new(),
            health_tags: data.health_labels,
            suitability: derive_suitability(sugar, sodium, fat, carbs),
            healthier_substitute: Some("Use less oil/salt and prefer grilled version".to_string()),
            source: Some(NutritionSource::Edamam),
        }))
    }
}

/// Fixed-threshold suitability map derived from the Edamam nutrients.
pub fn derive_suitability(sugar: f64, sodium: f64, fat: f64, carbs: f64) -> BTreeMap<String, String> {
    let mut suitability = BTreeMap::new();
    suitability.insert(
        "diabetes".to_string(),
        if sugar > 15.0 || carbs > 50.0 { "avoid" } else { "acceptable" }.to_string(),
    );
    suitability.insert(
        "high_BP".to_string(),
        if sodium > 800.0 { "not recommended" } else { "acceptable" }.to_string(),
    );
    suitability.insert(
        "heart_disease".to_string(),
        if fat > 30.0 { "caution" } else { "acceptable" }.to_string(),
    );
    suitability.insert(
        "high_cholesterol".to_string(),
        if fat > 25.0 { "not recommended" } else { "acceptable" }.to_string(),
    );
    suitability.insert("low_BP".to_string(), "acceptable".to_string());
    suitability.insert("kidney".to_string(), "caution".to_string());
    suitability
}
