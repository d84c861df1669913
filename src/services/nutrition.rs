use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{EdamamClient, HealthContextEstimator, SpoonacularClient, UsdaClient};
use crate::models::{NutritionProfile, NutritionSource};
use crate::services::cohere::HealthContext;

/// Trait for REST nutrition providers so the waterfall ordering stays
/// testable, mirroring the classifier's `DishClassifier` seam.
#[async_trait::async_trait]
pub trait NutritionProvider: Send + Sync {
    /// Ok(None) means the provider has nothing usable for this term.
    async fn lookup(&self, term: &str) -> Result<Option<NutritionProfile>>;
}

#[async_trait::async_trait]
impl NutritionProvider for EdamamClient {
    async fn lookup(&self, term: &str) -> Result<Option<NutritionProfile>> {
        self.guess(term).await
    }
}

#[async_trait::async_trait]
impl NutritionProvider for SpoonacularClient {
    async fn lookup(&self, term: &str) -> Result<Option<NutritionProfile>> {
        self.guess(term).await
    }
}

#[async_trait::async_trait]
impl NutritionProvider for UsdaClient {
    async fn lookup(&self, term: &str) -> Result<Option<NutritionProfile>> {
        self.search(term).await
    }
}

/// LLM estimation seam: estimate a full profile from a dish name, or just
/// the health context from structured nutrition data.
#[async_trait::async_trait]
pub trait HealthEstimator: Send + Sync {
    async fn estimate_for_dish(&self, dish_name: &str) -> Result<(HealthContext, NutritionSource)>;
    async fn estimate_for_nutrition(
        &self,
        nutrition: &BTreeMap<String, f64>,
    ) -> Result<(HealthContext, NutritionSource)>;
}

#[async_trait::async_trait]
impl HealthEstimator for HealthContextEstimator {
    async fn estimate_for_dish(&self, dish_name: &str) -> Result<(HealthContext, NutritionSource)> {
        self.estimate(None, Some(dish_name)).await
    }

    async fn estimate_for_nutrition(
        &self,
        nutrition: &BTreeMap<String, f64>,
    ) -> Result<(HealthContext, NutritionSource)> {
        self.estimate(Some(nutrition), None).await
    }
}

/// Multi-source nutrition waterfall: Edamam, then Spoonacular, then USDA
/// (with barcode support), finally an LLM estimate. First usable result
/// wins; a failing or empty source is logged and skipped. Macros-only
/// results from Spoonacular/USDA get their health context filled in by
/// the LLM when it is reachable.
pub struct NutritionResolver {
    edamam: Arc<dyn NutritionProvider>,
    spoonacular: Arc<dyn NutritionProvider>,
    usda: Arc<dyn NutritionProvider>,
    estimator: Arc<dyn HealthEstimator>,
}

impl NutritionResolver {
    pub fn new(
        edamam: Arc<dyn NutritionProvider>,
        spoonacular: Arc<dyn NutritionProvider>,
        usda: Arc<dyn NutritionProvider>,
        estimator: Arc<dyn HealthEstimator>,
    ) -> Self {
        Self {
            edamam,
            spoonacular,
            usda,
            estimator,
        }
    }

    pub async fn resolve(
        &self,
        dish_name: Option<&str>,
        barcode: Option<&str>,
    ) -> Result<NutritionProfile> {
        if let Some(dish) = dish_name {
            match self.edamam.lookup(dish).await {
                Ok(Some(profile)) => {
                    log::info!("📊 Nutrition for '{}' resolved via Edamam", dish);
                    return Ok(profile);
                }
                Ok(None) => {}
                Err(e) => log::warn!("⚠️ Edamam lookup failed: {:#}", e),
            }

            match self.spoonacular.lookup(dish).await {
                Ok(Some(profile)) => {
                    log::info!("📊 Nutrition for '{}' resolved via Spoonacular", dish);
                    return Ok(self.enrich(profile).await);
                }
                Ok(None) => {}
                Err(e) => log::warn!("⚠️ Spoonacular lookup failed: {:#}", e),
            }
        }

        // USDA accepts a barcode as the search term when one is supplied
        if let Some(term) = barcode.or(dish_name) {
            match self.usda.lookup(term).await {
                Ok(Some(profile)) => {
                    log::info!("📊 Nutrition for '{}' resolved via USDA", term);
                    return Ok(self.enrich(profile).await);
                }
                Ok(None) => {}
                Err(e) => log::warn!("⚠️ USDA lookup failed: {:#}", e),
            }
        }

        if let Some(dish) = dish_name {
            log::info!("🤖 No REST provider has '{}', asking the LLM for an estimate", dish);
            match self.estimator.estimate_for_dish(dish).await {
                Ok((context, source)) => return Ok(profile_from_context(context, source)),
                Err(e) => log::warn!("⚠️ LLM estimation failed: {:#}", e),
            }
        }

        anyhow::bail!("No nutrition found from APIs")
    }

    /// Spoonacular and USDA report numbers but no health context; ask the
    /// LLM to fill tags/suitability/substitute from the structured data.
    /// Enrichment failures never fail the waterfall.
    async fn enrich(&self, mut profile: NutritionProfile) -> NutritionProfile {
        if !profile.suitability.is_empty() || profile.healthier_substitute.is_some() {
            return profile;
        }

        let nutrition = nutrient_map(&profile);
        if nutrition.is_empty() {
            return profile;
        }

        match self.estimator.estimate_for_nutrition(&nutrition).await {
            Ok((context, _)) => {
                profile.health_tags = context.health_tags;
                profile.suitability = context.suitability;
                profile.healthier_substitute = context.healthier_substitute;
            }
            Err(e) => log::warn!("⚠️ Health-context enrichment failed: {:#}", e),
        }

        profile
    }
}

/// Flattens a profile's known nutrient values into the lowercase-keyed map
/// the estimation prompt expects.
fn nutrient_map(profile: &NutritionProfile) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    let mut insert = |key: &str, value: Option<f64>| {
        if let Some(v) = value {
            map.insert(key.to_string(), v);
        }
    };

    insert("calories", profile.calories);
    insert("protein", profile.protein);
    insert("fat", profile.fats);
    insert("carbs", profile.carbs);
    insert("iron", profile.iron);
    insert("calcium", profile.calcium);
    insert("fiber", profile.fiber);
    insert("sugar", profile.sugar);
    insert("cholesterol", profile.cholesterol);
    insert("sodium", profile.sodium);

    map
}

/// Converts an LLM health context into a nutrition profile. The model is
/// prompted for lowercase nutrient keys but drifts, so a few aliases are
/// accepted per field.
pub fn profile_from_context(context: HealthContext, source: NutritionSource) -> NutritionProfile {
    let nutrient = |keys: &[&str]| -> Option<f64> {
        keys.iter()
            .find_map(|key| context.estimated_nutrition.get(*key).copied())
    };

    NutritionProfile {
        calories: nutrient(&["calories", "calories_kcal", "energy"]),
        protein: nutrient(&["protein", "protein_g"]),
        fats: nutrient(&["fat", "fats", "fat_g"]),
        carbs: nutrient(&["carbs", "carbohydrates", "carbs_g"]),
        iron: nutrient(&["iron"]),
        calcium: nutrient(&["calcium"]),
        fiber: nutrient(&["fiber"]),
        sugar: nutrient(&["sugar", "sugars"]),
        cholesterol: nutrient(&["cholesterol"]),
        sodium: nutrient(&["sodium"]),
        health_benefits: Vec::new(),
        health_tags: context.health_tags,
        suitability: context.suitability,
        healthier_substitute: context.healthier_substitute,
        source: Some(source),
    }
}
