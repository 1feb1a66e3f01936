use crate::config::ClientConfig;
use crate::error::{Result, StudyAssistantError};
use crate::llm::client::{error_details, GenerationApi};
use crate::llm::types::ProxyRequest;
use async_trait::async_trait;
use log::warn;
use reqwest::Client;

/// Client side of the proxy: what the front-end uses to reach `POST /gemini/generate`.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    api_url: String,
}

impl ProxyClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn generate_url(&self) -> String {
        format!("{}/gemini/generate", self.api_url)
    }
}

#[async_trait]
impl GenerationApi for ProxyClient {
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value> {
        let body = ProxyRequest {
            prompt: prompt.to_string(),
        };

        let res = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let details = error_details(res).await?;
            warn!("Proxy answered {}: {}", status, details);
            return Err(StudyAssistantError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        Ok(res.json().await?)
    }
}
