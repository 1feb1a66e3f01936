// Instruction prefixes for the three study modes

use crate::error::StudyAssistantError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const EXPLAIN_INSTRUCTION: &str = "Spiega in modo semplice:";
pub const SUMMARIZE_INSTRUCTION: &str = "Riassumi i concetti chiave:";
pub const QUIZ_INSTRUCTION: &str = "Crea alcune domande di ripasso basate su questo testo:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    #[serde(alias = "explain-like-10")]
    Explain,
    Summarize,
    Quiz,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Explain, Mode::Summarize, Mode::Quiz];

    pub fn instruction(&self) -> &'static str {
        match self {
            Mode::Explain => EXPLAIN_INSTRUCTION,
            Mode::Summarize => SUMMARIZE_INSTRUCTION,
            Mode::Quiz => QUIZ_INSTRUCTION,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Explain => "explain",
            Mode::Summarize => "summarize",
            Mode::Quiz => "quiz",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = StudyAssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explain" | "explain-like-10" => Ok(Mode::Explain),
            "summarize" => Ok(Mode::Summarize),
            "quiz" => Ok(Mode::Quiz),
            other => Err(StudyAssistantError::InvalidRequest(format!(
                "Unknown mode '{}'",
                other
            ))),
        }
    }
}

/// Prefixes `text` with the fixed instruction for `mode`.
pub fn build_prompt(text: &str, mode: Mode) -> String {
    format!("{}\n\n{}", mode.instruction(), text)
}

/// Like [`build_prompt`], for a mode given by label. An unrecognized label
/// leaves the text unchanged.
pub fn build_prompt_for_label(text: &str, label: &str) -> String {
    match label.parse::<Mode>() {
        Ok(mode) => build_prompt(text, mode),
        Err(_) => text.to_string(),
    }
}
