use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyAssistantError};
use crate::ingestion::{TextExtractor, Upload};
use crate::llm::client::GenerationApi;
use crate::llm::prompts::{build_prompt, Mode};
use crate::llm::types::response_text;

/// Shown in place of a response when the generation call fails.
pub const API_ERROR_MESSAGE: &str = "Errore nella chiamata API. Riprova.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AssistantState {
    #[default]
    Idle,
    AwaitingExtraction,
    Submitting,
}

/// Name of the file currently loaded into the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub file_name: String,
    pub media_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiState {
    pub input_text: String,
    pub selected_mode: Mode,
    pub response_text: String,
    pub loading: bool,
    pub validation_alert: bool,
    pub selected_file: Option<SelectedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A generation call was made and its outcome is in `response_text`.
    Completed,
    /// The input was blank; nothing was sent.
    ValidationFailed,
    /// Another operation is in flight; nothing was sent.
    Busy,
}

/// Front-end controller for one study session.
///
/// Transitions:
///
/// | from  | trigger            | guard           | to                 |
/// |-------|--------------------|-----------------|--------------------|
/// | Idle  | [`select_file`]    | media type PDF  | AwaitingExtraction |
/// | AwaitingExtraction | extraction ends | -   | Idle               |
/// | Idle  | [`submit`]         | non-blank input | Submitting         |
/// | Submitting | generation ends | -           | Idle               |
///
/// The `loading` flag gates both triggers, so at most one call is ever in flight.
///
/// [`select_file`]: StudyAssistant::select_file
/// [`submit`]: StudyAssistant::submit
pub struct StudyAssistant<A, E> {
    api: A,
    extractor: E,
    state: AssistantState,
    ui: UiState,
}

impl<A, E> StudyAssistant<A, E>
where
    A: GenerationApi,
    E: TextExtractor,
{
    pub fn new(api: A, extractor: E) -> Self {
        Self {
            api,
            extractor,
            state: AssistantState::Idle,
            ui: UiState::default(),
        }
    }

    pub fn state(&self) -> AssistantState {
        self.state
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.ui.input_text = text.into();
    }

    pub fn select_mode(&mut self, mode: Mode) {
        self.ui.selected_mode = mode;
    }

    pub fn dismiss_alert(&mut self) {
        self.ui.validation_alert = false;
    }

    /// Loads the text of an uploaded PDF into the input.
    ///
    /// Non-PDF uploads are refused before any extraction and leave the input
    /// untouched. When extraction fails the selection is cleared and the error
    /// is returned for the view to show. The controller is `Idle` again
    /// whenever this returns.
    pub async fn select_file(&mut self, upload: Upload) -> Result<()> {
        if self.ui.loading {
            return Err(StudyAssistantError::InvalidRequest(
                "Another operation is still running".to_string(),
            ));
        }

        if !upload.is_pdf() {
            warn!(
                "Refused upload '{}' with media type {}",
                upload.file_name, upload.media_type
            );
            self.ui.selected_file = None;
            return Err(StudyAssistantError::UnsupportedFile(upload.file_name));
        }

        self.ui.selected_file = Some(SelectedFile {
            file_name: upload.file_name.clone(),
            media_type: upload.media_type.clone(),
        });
        self.state = AssistantState::AwaitingExtraction;
        self.ui.loading = true;

        let outcome = self.extractor.extract_text(upload.bytes).await;

        self.ui.loading = false;
        self.state = AssistantState::Idle;

        match outcome {
            Ok(text) => {
                info!(
                    "Loaded {} characters from '{}'",
                    text.chars().count(),
                    upload.file_name
                );
                self.ui.input_text = text;
                Ok(())
            }
            Err(e) => {
                error!("Could not read '{}': {}", upload.file_name, e);
                self.ui.selected_file = None;
                Err(match e {
                    StudyAssistantError::Extraction(_) => e,
                    other => StudyAssistantError::Extraction(other.to_string()),
                })
            }
        }
    }

    /// Sends the current input, wrapped for the selected mode.
    ///
    /// Failures never escape: they end up as [`API_ERROR_MESSAGE`] in `response_text`.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.ui.loading {
            return SubmitOutcome::Busy;
        }

        if self.ui.input_text.trim().is_empty() {
            self.ui.validation_alert = true;
            return SubmitOutcome::ValidationFailed;
        }

        self.state = AssistantState::Submitting;
        self.ui.loading = true;
        self.ui.response_text.clear();
        self.ui.validation_alert = false;

        let prompt = build_prompt(&self.ui.input_text, self.ui.selected_mode);

        self.ui.response_text = match self.api.generate(&prompt).await {
            Ok(result) => response_text(&result),
            Err(e) => {
                error!("Generation request failed: {}", e);
                API_ERROR_MESSAGE.to_string()
            }
        };

        self.ui.input_text.clear();
        self.ui.loading = false;
        self.state = AssistantState::Idle;

        SubmitOutcome::Completed
    }
}
