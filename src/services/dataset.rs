use anyhow::Result;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{NutritionProfile, NutritionSource};

/// Curated per-dish health records, loaded once at startup and keyed by
/// lowercased dish name. First stop of the nutrition waterfall.
pub struct NutritionDataset {
    dishes: HashMap<String, DishRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DishRecord {
    pub dish: String,
    #[serde(default)]
    pub nutrition: DishNutrition,
    #[serde(default)]
    pub health_benefits: Vec<String>,
    #[serde(default)]
    pub suitability: BTreeMap<String, String>,
    #[serde(default)]
    pub healthier_substitute: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishNutrition {
    #[serde(default)]
    pub calories_kcal: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
}

impl NutritionDataset {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<DishRecord> = serde_json::from_str(&raw)?;
        log::info!("📚 Loaded {} dishes from {}", records.len(), path);
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<DishRecord>) -> Self {
        let dishes = records
            .into_iter()
            .map(|record| (record.dish.to_lowercase(), record))
            .collect();
        Self { dishes }
    }

    /// Exact lowercase match on the predicted dish name.
    pub fn lookup(&self, dish_name: &str) -> Option<NutritionProfile> {
        self.dishes
            .get(&dish_name.to_lowercase())
            .map(|record| NutritionProfile {
                calories: record.nutrition.calories_kcal,
                protein: record.nutrition.protein_g,
                fats: record.nutrition.fat_g,
                carbs: record.nutrition.carbs_g,
                health_benefits: record.health_benefits.clone(),
                suitability: record.suitability.clone(),
                healthier_substitute: record.healthier_substitute.clone(),
                source: Some(NutritionSource::Dataset),
                ..Default::default()
            })
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }
}
