use anyhow::Result;
use serde::Deserialize;

use crate::models::Prediction;

const HF_MODEL_URL: &str = "https://api-inference.huggingface.co/models/nateraw/food";

/// HuggingFace Inference API classifier (food-101 fine-tune).
///
/// Unlike the local backends this leg never fails the scan: with no token
/// configured it reports ("HF unavailable", 0.0), and any API or network
/// error reports ("HF API error", 0.0) so the ensemble simply ignores it.
pub struct HuggingFaceClient {
    api_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl HuggingFaceClient {
    pub fn new(api_token: Option<String>) -> Self {
        Self {
            api_token,
            client: reqwest::Client::new(),
        }
    }

    pub async fn predict_or_sentinel(&self, image_path: &str) -> Prediction {
        let Some(token) = self.api_token.clone() else {
            log::warn!("⚠️ HF_API_TOKEN not configured, skipping HuggingFace prediction");
            return Prediction {
                dish: "HF unavailable".to_string(),
                confidence: 0.0,
            };
        };

        match self.predict_inner(&token, image_path).await {
            Ok(prediction) => {
                log::info!(
                    "🤗 HuggingFace prediction: {} (confidence={:.3})",
                    prediction.dish,
                    prediction.confidence
                );
                prediction
            }
            Err(e) => {
                log::error!("❌ HuggingFace API error: {:#}", e);
                Prediction {
                    dish: "HF API error".to_string(),
                    confidence: 0.0,
                }
            }
        }
    }

    async fn predict_inner(&self, token: &str, image_path: &str) -> Result<Prediction> {
        let image_bytes = std::fs::read(image_path)?;

        let response = self
            .client
            .post(HF_MODEL_URL)
            .header("Authorization", format!("Bearer {}", token))
            .body(image_bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("HuggingFace API error ({}): {}", status, error_text);
        }

        // The API answers either a prediction list or {"error": "..."}
        // (model loading, rate limits)
        let value: serde_json::Value = response.json().await?;
        if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
            anyhow::bail!("HuggingFace API error: {}", error);
        }

        let predictions: Vec<LabelScore> = serde_json::from_value(value)?;
        let top = predictions
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("HuggingFace returned no predictions"))?;

        Ok(Prediction {
            dish: top.label,
            confidence: top.score,
        })
    }
}
