use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;

use super::HuggingFaceClient;
use crate::models::{ModelBackend, Prediction};

/// Trait for dish classifiers (local inference sidecars, remote APIs)
#[async_trait::async_trait]
pub trait DishClassifier: Send + Sync {
    async fn predict(&self, image_path: &str) -> Result<Prediction>;
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Client for a local inference sidecar serving one fine-tuned food model.
/// The sidecar accepts raw image bytes and answers with a ranked
/// `[{"label": ..., "score": ...}]` list; we take the top-1 entry.
pub struct LocalModelClient {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl LocalModelClient {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl DishClassifier for LocalModelClient {
    async fn predict(&self, image_path: &str) -> Result<Prediction> {
        let image_bytes = std::fs::read(image_path)?;
        log::debug!("📸 {}: sending {} bytes to {}", self.name, image_bytes.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/octet-stream")
            .body(image_bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("{} inference error ({}): {}", self.name, status, error_text);
        }

        let predictions: Vec<LabelScore> = response.json().await?;
        let top = predictions
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("{} returned no predictions", self.name))?;

        Ok(Prediction {
            dish: clean_label(&top.label),
            confidence: top.score,
        })
    }
}

/// Training labels use underscores ("butter_chicken"); nutrition lookups
/// expect spaces.
pub fn clean_label(label: &str) -> String {
    label.replace('_', " ")
}

/// Result of a full ensemble pass: the winner plus all three raw predictions.
#[derive(Debug, Clone)]
pub struct EnsembleOutcome {
    pub best: Prediction,
    pub model_used: ModelBackend,
    pub model1: Prediction,
    pub model2: Prediction,
    pub huggingface: Prediction,
}

/// Three-way max-confidence ensemble over two local model backends and the
/// HuggingFace Inference API. Local backend failures propagate; the
/// HuggingFace leg degrades to a zero-confidence sentinel.
pub struct EnsembleClassifier {
    model1: Arc<dyn DishClassifier>,
    model2: Arc<dyn DishClassifier>,
    huggingface: Arc<HuggingFaceClient>,
}

impl EnsembleClassifier {
    pub fn new(
        model1: Arc<dyn DishClassifier>,
        model2: Arc<dyn DishClassifier>,
        huggingface: Arc<HuggingFaceClient>,
    ) -> Self {
        Self {
            model1,
            model2,
            huggingface,
        }
    }

    pub async fn predict(&self, image_path: &str) -> Result<EnsembleOutcome> {
        let model1 = self.model1.predict(image_path).await?;
        let model2 = self.model2.predict(image_path).await?;
        let huggingface = self.huggingface.predict_or_sentinel(image_path).await;

        Ok(select_best(model1, model2, huggingface))
    }
}

/// Tie-break rules: HuggingFace wins only with strictly higher confidence
/// than both local models; model 1 wins ties against model 2.
pub fn select_best(model1: Prediction, model2: Prediction, huggingface: Prediction) -> EnsembleOutcome {
    let (best, model_used) = if huggingface.confidence > model1.confidence.max(model2.confidence) {
        (huggingface.clone(), ModelBackend::Huggingface)
    } else if model1.confidence >= model2.confidence {
        (model1.clone(), ModelBackend::Model1)
    } else {
        (model2.clone(), ModelBackend::Model2)
    };

    EnsembleOutcome {
        best,
        model_used,
        model1,
        model2,
        huggingface,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(dish: &str, confidence: f64) -> Prediction {
        Prediction {
            dish: dish.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("butter_chicken"), "butter chicken");
        assert_eq!(clean_label("biryani"), "biryani");
    }

    #[test]
    fn test_huggingface_wins_with_strictly_higher_confidence() {
        let outcome = select_best(
            prediction("chicken curry", 0.70),
            prediction("fish fry", 0.65),
            prediction("butter_chicken", 0.90),
        );
        assert_eq!(outcome.model_used, ModelBackend::Huggingface);
        assert_eq!(outcome.best.dish, "butter_chicken");
    }

    #[test]
    fn test_huggingface_loses_on_equal_confidence() {
        let outcome = select_best(
            prediction("chicken curry", 0.70),
            prediction("fish fry", 0.65),
            prediction("butter_chicken", 0.70),
        );
        assert_eq!(outcome.model_used, ModelBackend::Model1);
        assert_eq!(outcome.best.dish, "chicken curry");
    }

    #[test]
    fn test_model1_wins_tie_against_model2() {
        let outcome = select_best(
            prediction("chicken curry", 0.65),
            prediction("fish fry", 0.65),
            prediction("HF unavailable", 0.0),
        );
        assert_eq!(outcome.model_used, ModelBackend::Model1);
    }

    #[test]
    fn test_model2_wins_with_higher_confidence() {
        let outcome = select_best(
            prediction("chicken curry", 0.40),
            prediction("fish fry", 0.80),
            prediction("HF API error", 0.0),
        );
        assert_eq!(outcome.model_used, ModelBackend::Model2);
        assert_eq!(outcome.best.dish, "fish fry");
    }

    #[test]
    fn test_all_raw_predictions_are_reported() {
        let outcome = select_best(
            prediction("a", 0.1),
            prediction("b", 0.2),
            prediction("c", 0.3),
        );
        assert_eq!(outcome.model1.dish, "a");
        assert_eq!(outcome.model2.dish, "b");
        assert_eq!(outcome.huggingface.dish, "c");
    }
}
