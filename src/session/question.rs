use serde::{Deserialize, Serialize};

use crate::catalog::QuestionType;

/// Blank marker expected inside fill-in-the-blank prompts.
pub const BLANK_MARKER: &str = "___";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub term: String,
    pub definition: String,
}

/// A generated quiz question. The JSON shape matches what the provider
/// returns and what the question bank stores: a `type` tag plus the fields
/// of that kind only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuizQuestion {
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        question: String,
        options: Vec<String>,
        correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    FillInTheBlank {
        question: String,
        correct_answer: String,
    },
    Matching {
        question: String,
        pairs: Vec<MatchingPair>,
    },
}

impl QuizQuestion {
    /// Prompt text for choice/blank questions, instruction text for matching.
    pub fn prompt(&self) -> &str {
        match self {
            QuizQuestion::MultipleChoice { question, .. }
            | QuizQuestion::FillInTheBlank { question, .. }
            | QuizQuestion::Matching { question, .. } => question,
        }
    }

    pub fn kind(&self) -> QuestionType {
        match self {
            QuizQuestion::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuizQuestion::FillInTheBlank { .. } => QuestionType::FillInTheBlank,
            QuizQuestion::Matching { .. } => QuestionType::Matching,
        }
    }

    /// Structural sanity check applied to provider output. Options need not be
    /// unique, but the correct answer has to be among them; matching terms
    /// must be unique.
    pub fn is_well_formed(&self) -> bool {
        if self.prompt().trim().is_empty() {
            return false;
        }
        match self {
            QuizQuestion::MultipleChoice {
                options,
                correct_answer,
                ..
            } => !options.is_empty() && options.iter().any(|o| o == correct_answer),
            QuizQuestion::FillInTheBlank { correct_answer, .. } => {
                !correct_answer.trim().is_empty()
            }
            QuizQuestion::Matching { pairs, .. } => {
                if pairs.is_empty() {
                    return false;
                }
                let mut terms: Vec<&str> = pairs.iter().map(|p| p.term.as_str()).collect();
                terms.sort_unstable();
                terms.windows(2).all(|w| w[0] != w[1])
            }
        }
    }
}
