use crate::error::{Result, StudyAssistantError};
use crate::llm::types::GenerateContentRequest;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Response};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Anything that turns a prompt into a raw generation result.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait]
impl GenerationApi for GeminiClient {
    /// Issues exactly one `generateContent` call; the body comes back untouched.
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value> {
        let payload = GenerateContentRequest::from_prompt(prompt);

        debug!(
            "Calling {} with a {} character prompt",
            self.model,
            prompt.chars().count()
        );

        let res = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(without_url)?;
        let status = res.status();

        if !status.is_success() {
            let details = error_details(res).await.map_err(|e| match e {
                StudyAssistantError::Http(e) => without_url(e),
                other => other,
            })?;
            error!("Gemini API error (status {}): {}", status, details);
            return Err(StudyAssistantError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        res.json().await.map_err(without_url)
    }
}

/// The endpoint URL carries the API key, so it must never reach logs or callers.
fn without_url(e: reqwest::Error) -> StudyAssistantError {
    StudyAssistantError::Http(e.without_url())
}

/// Error payload of a failed response: parsed JSON when possible, the raw text otherwise.
pub(crate) async fn error_details(res: Response) -> Result<serde_json::Value> {
    let text = res.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_layout() {
        let client = GeminiClient::new("abc".to_string()).with_base_url("http://127.0.0.1:9/v1/");
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1/models/gemini-2.0-flash:generateContent?key=abc"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_hides_the_key() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let client = GeminiClient::new("SECRET-KEY-123".to_string())
            .with_base_url("http://127.0.0.1:9/v1");
        let err = client.generate("ciao").await.unwrap_err();
        assert!(matches!(err, StudyAssistantError::Http(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
    }
}
