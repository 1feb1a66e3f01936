use crate::error::{Result, StudyAssistantError};
use crate::llm::client::GEMINI_BASE_URL;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:4200";
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Development,
    #[default]
    Production,
}

impl RuntimeEnvironment {
    /// Only an explicit `development` opts in; anything else, or no value, is production.
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => RuntimeEnvironment::Development,
            _ => RuntimeEnvironment::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeEnvironment::Development => "development",
            RuntimeEnvironment::Production => "production",
        }
    }

    /// Internal failure messages are only shown to callers in development.
    pub fn exposes_internal_errors(&self) -> bool {
        *self == RuntimeEnvironment::Development
    }
}

/// Settings for the generation proxy, read once at startup.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub port: u16,
    pub frontend_url: String,
    pub environment: RuntimeEnvironment,
    /// Upstream root; only overridden to point tests at a local fake.
    pub gemini_base_url: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_key", &"<redacted>")
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("environment", &self.environment)
            .field("gemini_base_url", &self.gemini_base_url)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Fails with [`StudyAssistantError::MissingCredential`] when no API key is
    /// available, so the process can refuse to start instead of failing every request.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .ok_or_else(|| StudyAssistantError::MissingCredential("GEMINI_API_KEY".into()))?;

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                StudyAssistantError::Config(format!("PORT '{}' is not a valid port: {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let environment = non_empty("NODE_ENV")
            .or_else(|| non_empty("APP_ENV"))
            .map(|v| RuntimeEnvironment::parse(&v))
            .unwrap_or_default();

        Ok(Self {
            api_key: api_key.trim().to_string(),
            port,
            frontend_url: non_empty("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            environment,
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the proxy API, without a trailing slash.
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        std::env::var("STUDY_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|api_url| Self {
                api_url: api_url.trim().trim_end_matches('/').to_string(),
            })
            .unwrap_or_default()
    }
}
