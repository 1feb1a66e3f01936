use serde::{Deserialize, Serialize};

/// Shown when the generation result does not carry any text.
pub const NO_RESPONSE_FALLBACK: &str = "Nessuna risposta generata.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Fixed sampling parameters used for every generation call.
    pub const fn study_defaults() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
            generation_config: GenerationConfig::study_defaults(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

/// The subset of a `generateContent` response the assistant reads.
/// Every level is optional; anything else in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if there is any.
    pub fn first_text(&self) -> Option<&str> {
        let candidate = self.candidates.as_deref()?.first()?;
        let part = candidate.content.as_ref()?.parts.as_deref()?.first()?;
        part.text.as_deref().filter(|text| !text.is_empty())
    }
}

/// Reads the generated text out of an untyped result body, falling back to
/// [`NO_RESPONSE_FALLBACK`] when the body has no usable text.
pub fn response_text(body: &serde_json::Value) -> String {
    serde_json::from_value::<GenerateContentResponse>(body.clone())
        .ok()
        .as_ref()
        .and_then(GenerateContentResponse::first_text)
        .map(str::to_string)
        .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string())
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyRequest {
    pub prompt: String,
}
