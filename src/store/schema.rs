use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Difficulty, Grade};
use crate::session::question::QuizQuestion;

pub const QUESTION_BANK_KEY: &str = "englishQuizQuestionBank";
pub const HIGH_SCORES_KEY: &str = "englishQuizHighScores";
pub const API_KEY_KEY: &str = "geminiApiKey";

/// A generated question plus where it came from. The question object is kept
/// whole under `question`, next to the provenance fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuestion {
    pub id: Uuid,
    pub question: QuizQuestion,
    pub grade: Grade,
    pub topic: String,
    pub difficulty: Difficulty,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl StoredQuestion {
    pub fn matches(&self, grade: Grade, difficulty: Difficulty) -> bool {
        self.grade == grade && self.difficulty == difficulty
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub grade: Grade,
    pub topic: String,
    pub difficulty: Difficulty,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}
