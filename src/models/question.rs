//! Question is one multiple-choice item: a prompt, four options, one correct.
use serde::{Deserialize, Serialize};

/// Difficulty of a question; drives reward size and time budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Mid,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Mid => "mid",
            Difficulty::Hard => "hard",
        }
    }
}

/// Likely cause of a wrong answer, tagged by the generator.
///
/// `Timeout` is only ever recorded by the session runner. Persisted state and
/// export documents carry the string codes, so imported data with codes this
/// build does not know stays readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "E_FACT")]
    FactRecall,
    #[serde(rename = "E_PLACE")]
    PlaceValue,
    #[serde(rename = "E_PROC")]
    Procedural,
    #[serde(rename = "E_CONCEPT")]
    Conceptual,
    #[serde(rename = "E_TIME")]
    Timeout,
}

impl ErrorType {
    pub fn code(self) -> &'static str {
        match self {
            ErrorType::FactRecall => "E_FACT",
            ErrorType::PlaceValue => "E_PLACE",
            ErrorType::Procedural => "E_PROC",
            ErrorType::Conceptual => "E_CONCEPT",
            ErrorType::Timeout => "E_TIME",
        }
    }
}

/// One generated question. Lives only for the duration of a session; only
/// aggregated outcomes are persisted.
#[derive(Clone, Debug)]
pub struct Question {
    pub prompt: String,
    pub correct: String,
    pub options: Vec<String>,
    pub hint: String,
    pub skill_id: String,
    pub difficulty: Difficulty,
    pub error_type: ErrorType,
}
