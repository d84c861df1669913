use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::DeepAiClient;
use crate::models::NutritionSource;

const GENERATE_URL: &str = "https://api.cohere.ai/v1/generate";
const CHAT_URL: &str = "https://api.cohere.ai/v1/chat";
const MODEL: &str = "command-r-plus";

/// Cohere API client, the primary LLM provider for both health-context
/// estimation (generate) and the chatbot (chat).
pub struct CohereClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

#[derive(Debug, Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    message: &'a str,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatApiResponse {
    text: String,
}

impl CohereClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub async fn generate(&self, prompt: &str, temperature: f64, max_tokens: u32) -> Result<String> {
        let request = GenerateRequest {
            model: MODEL,
            prompt,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(GENERATE_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("Cohere API error ({}): {}", status, error_text);
        }

        let generate_response: GenerateResponse = response.json().await?;
        let generation = generate_response
            .generations
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Cohere returned no generations"))?;

        Ok(generation.text.trim().to_string())
    }

    pub async fn chat(&self, message: &str, temperature: f64) -> Result<String> {
        let request = ChatApiRequest {
            model: MODEL,
            message,
            temperature,
        };

        let response = self
            .client
            .post(CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("Cohere API error ({}): {}", status, error_text);
        }

        let chat_response: ChatApiResponse = response.json().await?;
        Ok(chat_response.text)
    }
}

/// Structured health context estimated by the LLM.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthContext {
    #[serde(default)]
    pub health_tags: Vec<String>,
    #[serde(default)]
    pub suitability: BTreeMap<String, String>,
    #[serde(default)]
    pub healthier_substitute: Option<String>,
    #[serde(default)]
    pub estimated_nutrition: BTreeMap<String, f64>,
    /// Raw fallback output kept when the fallback provider's JSON was unusable.
    #[serde(skip)]
    pub raw_output: Option<String>,
}

/// Primary/secondary LLM waterfall for health-context estimation: Cohere
/// generate with JSON repair, DeepAI text-generator on any Cohere failure.
pub struct HealthContextEstimator {
    cohere: Arc<CohereClient>,
    deepai: Arc<DeepAiClient>,
}

impl HealthContextEstimator {
    pub fn new(cohere: Arc<CohereClient>, deepai: Arc<DeepAiClient>) -> Self {
        Self { cohere, deepai }
    }

    pub async fn estimate(
        &self,
        nutrition: Option<&BTreeMap<String, f64>>,
        dish_name: Option<&str>,
    ) -> Result<(HealthContext, NutritionSource)> {
        let prompt = build_health_context_prompt(nutrition, dish_name)?;

        match self.try_cohere(&prompt).await {
            Ok(context) => Ok((context, NutritionSource::Cohere)),
            Err(e) => {
                log::error!("❌ Cohere error: {:#}, falling back to DeepAI", e);

                // The fallback never errors out; an unreachable DeepAI
                // yields an empty completion and the degraded context below.
                let output = self.deepai.completion(&prompt).await.unwrap_or_else(|e| {
                    log::warn!("⚠️ DeepAI error: {:#}", e);
                    String::new()
                });
                Ok((deepai_fallback_context(output), NutritionSource::DeepAi))
            }
        }
    }

    async fn try_cohere(&self, prompt: &str) -> Result<HealthContext> {
        let text = self.cohere.generate(prompt, 0.4, 350).await?;
        log::info!("🤖 Cohere response: {}", text);
        parse_health_context(&text)
    }
}

/// DeepAI completions come back as free text; when they do not parse as a
/// context the raw output is kept and the substitute pinned to "N/A".
fn deepai_fallback_context(output: String) -> HealthContext {
    match serde_json::from_str::<HealthContext>(&output) {
        Ok(context) => context,
        Err(parse_err) => {
            log::warn!("⚠️ DeepAI output is not valid JSON: {}", parse_err);
            HealthContext {
                healthier_substitute: Some("N/A".to_string()),
                raw_output: Some(output),
                ..Default::default()
            }
        }
    }
}

fn build_health_context_prompt(
    nutrition: Option<&BTreeMap<String, f64>>,
    dish_name: Option<&str>,
) -> Result<String> {
    if let Some(nutrition) = nutrition.filter(|n| !n.is_empty()) {
        let nutrition_json = serde_json::to_string_pretty(nutrition)?;
        Ok(format!(
            "You are a health-focused nutrition expert. Given the nutrition data of a \
             non-vegetarian dish per 100g, analyze and return the following fields in proper JSON:\n\
             \n\
             1. \"health_tags\": A list of 3-6 tags such as \"high protein\", \"low fat\", \"iron-rich\", etc.\n\
             2. \"suitability\": A dictionary with health conditions as keys (heart_disease, high_BP, low_BP, diabetes, high_cholesterol, kidney) and 1-line advice.\n\
             3. \"healthier_substitute\": One practical suggestion to make the dish healthier.\n\
             \n\
             Here is the nutrition data:\n\
             {}\n\
             \n\
             Respond only in JSON.",
            nutrition_json
        ))
    } else if let Some(dish_name) = dish_name {
        Ok(format!(
            "You are a health-focused nutrition expert. Given the name of a non-vegetarian \
             dish, estimate its typical nutrition profile and return the following fields in proper JSON:\n\
             \n\
             1. \"health_tags\": A list of 3-6 tags such as \"high protein\", \"low fat\", \"iron-rich\", etc.\n\
             2. \"suitability\": A dictionary with health conditions as keys (heart_disease, high_BP, low_BP, diabetes, high_cholesterol, kidney) and 1-line advice.\n\
             3. \"healthier_substitute\": One practical suggestion to make the dish healthier.\n\
             4. \"estimated_nutrition\": A dictionary with estimated values for calories, protein, fat, carbs, fiber, iron, sodium, cholesterol, etc. (per 100g).\n\
             \n\
             Dish name: \"{}\"\n\
             \n\
             Respond only in JSON.",
            dish_name
        ))
    } else {
        anyhow::bail!("either nutrition data or a dish name must be provided")
    }
}

/// Patches the usual LLM JSON mistakes: code fences, stray backslashes,
/// unit suffixes on numbers and trailing commas.
pub fn repair_json(raw: &str) -> Result<String> {
    let mut text = raw.trim().to_string();

    if text.starts_with("```json") {
        text = text.replace("```json", "").replace("```", "").trim().to_string();
    }

    let text = text.replace('\\', "");

    let units = Regex::new(r"(\d+(\.\d+)?)\s*(g|mg|kcal|mcg)")?;
    let text = units.replace_all(&text, "$1").to_string();

    let trailing_commas = Regex::new(r",(\s*[}\]])")?;
    let text = trailing_commas.replace_all(&text, "$1").to_string();

    Ok(text)
}

/// Repairs and parses a Cohere completion into a HealthContext. The model
/// sometimes emits `healthier_substitute` as an object; its `suggestion`
/// field is promoted to the string value, defaulting to "N/A".
pub fn parse_health_context(raw: &str) -> Result<HealthContext> {
    let text = repair_json(raw)?;
    let mut value: serde_json::Value = serde_json::from_str(&text)?;

    if let Some(object) = value.as_object_mut() {
        let substitute = match object.get("healthier_substitute") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Object(inner)) => inner
                .get("suggestion")
                .and_then(|v| v.as_str())
                .unwrap_or("N/A")
                .to_string(),
            _ => "N/A".to_string(),
        };
        object.insert(
            "healthier_substitute".to_string(),
            serde_json::Value::String(substitute),
        );
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_strips_code_fence() {
        let raw = "```json\n{\"health_tags\": [\"high protein\"]}\n```";
        let repaired = repair_json(raw).unwrap();
        assert_eq!(repaired, "{\"health_tags\": [\"high protein\"]}");
    }

    #[test]
    fn test_repair_strips_unit_suffixes() {
        let raw = r#"{"calories": 250kcal, "protein": 25.5 g, "iron": 1.5mg, "b12": 2mcg}"#;
        let repaired = repair_json(raw).unwrap();
        assert_eq!(
            repaired,
            r#"{"calories": 250, "protein": 25.5, "iron": 1.5, "b12": 2}"#
        );
    }

    #[test]
    fn test_repair_removes_trailing_commas() {
        let raw = r#"{"health_tags": ["high protein",], "suitability": {"kidney": "caution",},}"#;
        let repaired = repair_json(raw).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
    }

    #[test]
    fn test_repair_removes_stray_backslashes() {
        let raw = r#"{"healthier_substitute": "use \grilled chicken"}"#;
        let repaired = repair_json(raw).unwrap();
        assert!(!repaired.contains('\\'));
    }

    #[test]
    fn test_parse_health_context() {
        let raw = r#"```json
        {
            "health_tags": ["high protein", "iron-rich"],
            "suitability": {"diabetes": "fine in moderation", "kidney": "limit portion size"},
            "healthier_substitute": "Grill instead of deep frying",
            "estimated_nutrition": {"calories": 290kcal, "protein": 25g, "fat": 18g, "carbs": 6g}
        }
        ```"#;

        let context = parse_health_context(raw).unwrap();
        assert_eq!(context.health_tags.len(), 2);
        assert_eq!(context.suitability["kidney"], "limit portion size");
        assert_eq!(context.healthier_substitute.as_deref(), Some("Grill instead of deep frying"));
        assert_eq!(context.estimated_nutrition["calories"], 290.0);
        assert_eq!(context.estimated_nutrition["fat"], 18.0);
    }

    #[test]
    fn test_parse_promotes_substitute_object() {
        let raw = r#"{"healthier_substitute": {"suggestion": "bake it", "reason": "less oil"}}"#;
        let context = parse_health_context(raw).unwrap();
        assert_eq!(context.healthier_substitute.as_deref(), Some("bake it"));
    }

    #[test]
    fn test_parse_defaults_missing_substitute() {
        let raw = r#"{"health_tags": ["low fat"]}"#;
        let context = parse_health_context(raw).unwrap();
        assert_eq!(context.healthier_substitute.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_deepai_fallback_degrades_on_empty_output() {
        let context = deepai_fallback_context(String::new());
        assert!(context.health_tags.is_empty());
        assert!(context.suitability.is_empty());
        assert_eq!(context.healthier_substitute.as_deref(), Some("N/A"));
        assert_eq!(context.raw_output.as_deref(), Some(""));
    }

    #[test]
    fn test_deepai_fallback_keeps_unparseable_output() {
        let context = deepai_fallback_context("Chicken curry is rich in protein.".to_string());
        assert_eq!(context.healthier_substitute.as_deref(), Some("N/A"));
        assert_eq!(
            context.raw_output.as_deref(),
            Some("Chicken curry is rich in protein.")
        );
    }

    #[test]
    fn test_deepai_fallback_parses_valid_json() {
        let context = deepai_fallback_context(
            r#"{"health_tags": ["low carb"], "healthier_substitute": "steam it"}"#.to_string(),
        );
        assert_eq!(context.health_tags, vec!["low carb"]);
        assert_eq!(context.healthier_substitute.as_deref(), Some("steam it"));
        assert!(context.raw_output.is_none());
    }

    #[test]
    fn test_prompt_requires_some_input() {
        assert!(build_health_context_prompt(None, None).is_err());

        let prompt = build_health_context_prompt(None, Some("Butter Chicken")).unwrap();
        assert!(prompt.contains("Butter Chicken"));
        assert!(prompt.contains("estimated_nutrition"));

        let mut nutrition = BTreeMap::new();
        nutrition.insert("calories".to_string(), 250.0);
        let prompt = build_health_context_prompt(Some(&nutrition), None).unwrap();
        assert!(prompt.contains("\"calories\": 250"));
        assert!(!prompt.contains("estimated_nutrition"));
    }
}
