use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{NutritionProfile, NutritionSource};

const SEARCH_URL: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";
const FOOD_DETAIL_URL: &str = "https://api.nal.usda.gov/fdc/v1/food";

/// USDA FoodData Central client. Last REST provider in the waterfall; also
/// the only one queried with a barcode when the client supplies one.
pub struct UsdaClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodHit>,
}

#[derive(Debug, Deserialize)]
struct FoodHit {
    #[serde(rename = "fdcId")]
    fdc_id: i64,
}

#[derive(Debug, Deserialize)]
struct FoodDetail {
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrient {
    #[serde(rename = "nutrientName", default)]
    nutrient_name: String,
    #[serde(default)]
    value: f64,
}

impl UsdaClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Two-step lookup: search for the best matching fdcId, then fetch its
    /// nutrient detail. Ok(None) when the search has no hits.
    pub async fn search(&self, search_term: &str) -> Result<Option<NutritionProfile>> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", search_term),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            log::warn!("⚠️ USDA search returned HTTP {} for '{}'", response.status(), search_term);
            return Ok(None);
        }

        let search: SearchResponse = response.json().await?;
        let Some(hit) = search.foods.first() else {
            log::debug!("USDA has no match for '{}'", search_term);
            return Ok(None);
        };

        let detail_url = format!("{}/{}", FOOD_DETAIL_URL, hit.fdc_id);
        let response = self
            .client
            .get(&detail_url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("USDA food detail error ({}): {}", status, error_text);
        }

        let detail: FoodDetail = response.json().await?;
        let nutrients: HashMap<String, f64> = detail
            .food_nutrients
            .into_iter()
            .map(|n| (n.nutrient_name, n.value))
            .collect();

        Ok(Some(profile_from_nutrients(&nutrients)))
    }
}

/// USDA reports nutrients by display name; absent ones read as zero.
fn profile_from_nutrients(nutrients: &HashMap<String, f64>) -> NutritionProfile {
    let value = |name: &str| nutrients.get(name).copied().unwrap_or(0.0);

    NutritionProfile {
        calories: Some(value("Energy")),
        protein: Some(value("Protein")),
        fats: Some(value("Total lipid (fat)")),
        carbs: Some(value("Carbohydrate, by difference")),
        iron: Some(value("Iron, Fe")),
        calcium: Some(value("Calcium, Ca")),
        fiber: Some(value("Fiber, total dietary")),
        sugar: Some(value("Sugars, total including NLEA")),
        cholesterol: Some(value("Cholesterol")),
        sodium: Some(value("Sodium, Na")),
        source: Some(NutritionSource::Usda),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrient_name_mapping() {
        let detail: FoodDetail = serde_json::from_str(
            r#"{
                "foodNutrients": [
                    {"nutrientName": "Energy", "value": 239.0, "unitName": "KCAL"},
                    {"nutrientName": "Protein", "value": 27.3, "unitName": "G"},
                    {"nutrientName": "Total lipid (fat)", "value": 13.6, "unitName": "G"},
                    {"nutrientName": "Sodium, Na", "value": 82.0, "unitName": "MG"}
                ]
            }"#,
        )
        .unwrap();

        let nutrients: HashMap<String, f64> = detail
            .food_nutrients
            .into_iter()
            .map(|n| (n.nutrient_name, n.value))
            .collect();
        let profile = profile_from_nutrients(&nutrients);

        assert_eq!(profile.calories, Some(239.0));
        assert_eq!(profile.protein, Some(27.3));
        assert_eq!(profile.fats, Some(13.6));
        assert_eq!(profile.sodium, Some(82.0));
        // Unreported nutrients default to zero, not None
        assert_eq!(profile.carbs, Some(0.0));
        assert_eq!(profile.source, Some(NutritionSource::Usda));
    }

    #[test]
    fn test_empty_search_response() {
        let search: SearchResponse = serde_json::from_str(r#"{"totalHits": 0}"#).unwrap();
        assert!(search.foods.is_empty());
    }
}
