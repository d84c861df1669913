use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

const TEXT_GENERATOR_URL: &str = "https://api.deepai.org/api/text-generator";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// DeepAI text-generator client, the secondary LLM provider. Used only as
/// the single fallback hop when Cohere fails.
pub struct DeepAiClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    output: String,
}

impl DeepAiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub async fn completion(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DEEPAI_API_KEY not configured"))?;

        log::info!("🤖 Sending fallback request to DeepAI text-generator");

        let response = self
            .client
            .post(TEXT_GENERATOR_URL)
            .header("api-key", api_key)
            .timeout(REQUEST_TIMEOUT)
            .form(&[("text", prompt)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("DeepAI API error ({}): {}", status, error_text);
        }

        let completion: Completion = response.json().await?;
        Ok(completion.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_an_error() {
        let client = DeepAiClient::new(None);
        let result = client.completion("hello").await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DEEPAI_API_KEY"));
    }

    #[test]
    fn test_completion_parsing() {
        let completion: Completion =
            serde_json::from_str(r#"{"id": "abc", "output": "some text"}"#).unwrap();
        assert_eq!(completion.output, "some text");

        // Missing output field reads as empty
        let empty: Completion = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(empty.output, "");
    }
}
