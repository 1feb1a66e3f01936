//! # Study Assistant
//!
//! Backend and client pieces of a small study-assistant application: the user
//! types text (or loads it from a PDF), picks a study mode, and the text is
//! wrapped in a fixed instruction and sent through a single-route proxy to the
//! Gemini `generateContent` API.
//!
//! ## Core Concepts
//!
//! - **Mode**: one of three fixed prompt transformations (explain, summarize, quiz)
//! - **Generation proxy**: an HTTP service that validates the prompt, calls the
//!   upstream API once with fixed sampling settings and relays the result
//! - **Assistant controller**: the client-side state machine that owns the input,
//!   the loading gate and the displayed response
//! - **Extraction**: turning an uploaded PDF into page-ordered plain text
//!
//! ## Example
//!
//! ```rust,ignore
//! use study_assistant::*;
//!
//! let api = ProxyClient::from_config(&ClientConfig::from_env());
//! let mut assistant = StudyAssistant::new(api, PdfExtractor);
//!
//! assistant.set_input_text("Explain photosynthesis");
//! assistant.select_mode(Mode::Summarize);
//! assistant.submit().await;
//!
//! println!("{}", assistant.ui().response_text);
//! ```

pub mod config;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod server;

pub use config::{ClientConfig, RuntimeEnvironment, ServerConfig};
pub use error::{Result, StudyAssistantError};
pub use ingestion::{is_pdf_media_type, join_pages, PdfExtractor, TextExtractor, Upload};
pub use llm::*;
pub use server::{prompt_length, router, serve, validate_prompt, AppState, MAX_PROMPT_CHARS};
