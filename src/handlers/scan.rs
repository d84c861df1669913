use anyhow::Result;
use std::sync::Arc;

use super::health::health_verdict;
use crate::models::{NutritionProfile, ScanResponse};
use crate::services::{EnsembleClassifier, NutritionDataset, NutritionResolver};

/// Scan orchestration: classify the uploaded image through the ensemble,
/// resolve a nutrition profile (local dataset first, then the waterfall)
/// and derive the health verdict.
pub struct ScanHandler {
    classifier: EnsembleClassifier,
    dataset: NutritionDataset,
    resolver: Arc<NutritionResolver>,
}

impl ScanHandler {
    pub fn new(
        classifier: EnsembleClassifier,
        dataset: NutritionDataset,
        resolver: Arc<NutritionResolver>,
    ) -> Self {
        Self {
            classifier,
            dataset,
            resolver,
        }
    }

    pub async fn scan(&self, image_path: &str) -> Result<ScanResponse> {
        let outcome = self.classifier.predict(image_path).await?;

        log::info!(
            "🍽️ Predicted dish: {} (from {}, confidence={:.3})",
            outcome.best.dish,
            outcome.model_used,
            outcome.best.confidence
        );
        log::debug!(
            "Model 1: {} (conf={:.3}) | Model 2: {} (conf={:.3}) | HuggingFace: {} (conf={:.3})",
            outcome.model1.dish,
            outcome.model1.confidence,
            outcome.model2.dish,
            outcome.model2.confidence,
            outcome.huggingface.dish,
            outcome.huggingface.confidence
        );

        let nutrition = match self.dataset.lookup(&outcome.best.dish) {
            Some(profile) => {
                log::info!("📊 '{}' found in the local dataset", outcome.best.dish);
                profile
            }
            None => {
                log::info!(
                    "🔎 '{}' not in the local dataset, trying nutrition providers",
                    outcome.best.dish
                );
                match self.resolver.resolve(Some(&outcome.best.dish), None).await {
                    Ok(profile) => profile,
                    Err(e) => {
                        log::warn!("⚠️ Nutrition resolution failed: {:#}", e);
                        NutritionProfile::default()
                    }
                }
            }
        };

        let health_verdict = health_verdict(&outcome.best.dish, &nutrition);

        Ok(ScanResponse {
            dish: outcome.best.dish,
            model_used: outcome.model_used,
            confidence: outcome.best.confidence,
            model1_prediction: outcome.model1,
            model2_prediction: outcome.model2,
            huggingface_prediction: outcome.huggingface,
            nutrition,
            health_verdict,
        })
    }
}
