use anyhow::Result;
use serde::Deserialize;

use crate::models::{NutritionProfile, NutritionSource};

const GUESS_NUTRITION_URL: &str = "https://api.spoonacular.com/recipes/guessNutrition";

/// Spoonacular guessNutrition client. Second REST provider in the waterfall;
/// macros only, no micros or health context.
pub struct SpoonacularClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GuessNutritionResponse {
    calories: NutrientValue,
    protein: NutrientValue,
    fat: NutrientValue,
    carbs: NutrientValue,
}

#[derive(Debug, Deserialize)]
struct NutrientValue {
    value: f64,
}

impl SpoonacularClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub async fn guess(&self, dish_name: &str) -> Result<Option<NutritionProfile>> {
        let response = self
            .client
            .get(GUESS_NUTRITION_URL)
            .query(&[("title", dish_name), ("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            log::warn!(
                "⚠️ Spoonacular returned HTTP {} for '{}'",
                response.status(),
                dish_name
            );
            return Ok(None);
        }

        let data: GuessNutritionResponse = response.json().await?;

        Ok(Some(NutritionProfile {
            calories: Some(round2(data.calories.value)),
            protein: Some(round2(data.protein.value)),
            fats: Some(round2(data.fat.value)),
            carbs: Some(round2(data.carbs.value)),
            source: Some(NutritionSource::Spoonacular),
            ..Default::default()
        }))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
