use std::collections::HashSet;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::{Difficulty, Grade};
use crate::session::question::QuizQuestion;
use crate::store::kv::KeyValueStore;
use crate::store::schema::{QUESTION_BANK_KEY, StoredQuestion};

/// Every question generated so far, kept as one JSON array under a single
/// store key.
pub struct QuestionBank {
    store: Rc<dyn KeyValueStore>,
}

impl QuestionBank {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> Vec<StoredQuestion> {
        let Some(raw) = self.store.get(QUESTION_BANK_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("question bank is unreadable, treating as empty: {e}");
            Vec::new()
        })
    }

    /// Add the questions whose prompt text is not in the bank yet. Returns how
    /// many were added; nothing is written when that is zero.
    pub fn append(
        &self,
        questions: &[QuizQuestion],
        grade: Grade,
        topic: &str,
        difficulty: Difficulty,
    ) -> usize {
        self.append_at(questions, grade, topic, difficulty, Utc::now())
    }

    pub fn append_at(
        &self,
        questions: &[QuizQuestion],
        grade: Grade,
        topic: &str,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> usize {
        let mut bank = self.get_all();
        let mut seen: HashSet<String> = bank
            .iter()
            .map(|q| q.question.prompt().to_string())
            .collect();

        let before = bank.len();
        for question in questions {
            if !seen.insert(question.prompt().to_string()) {
                continue;
            }
            bank.push(StoredQuestion {
                id: Uuid::new_v4(),
                question: question.clone(),
                grade,
                topic: topic.to_string(),
                difficulty,
                timestamp: now,
            });
        }

        let added = bank.len() - before;
        if added > 0 {
            self.save(&bank);
        }
        log::debug!("question bank: {added} of {} questions added", questions.len());
        added
    }

    /// Entries for one grade and difficulty, newest first.
    pub fn get_filtered(&self, grade: Grade, difficulty: Difficulty) -> Vec<StoredQuestion> {
        let mut entries: Vec<StoredQuestion> = self
            .get_all()
            .into_iter()
            .filter(|q| q.matches(grade, difficulty))
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub fn count_filtered(&self, grade: Grade, difficulty: Difficulty) -> usize {
        self.get_all()
            .iter()
            .filter(|q| q.matches(grade, difficulty))
            .count()
    }

    pub fn clear_filtered(&self, grade: Grade, difficulty: Difficulty) {
        let bank = self.get_all();
        let before = bank.len();
        let rest: Vec<StoredQuestion> = bank
            .into_iter()
            .filter(|q| !q.matches(grade, difficulty))
            .collect();
        if rest.len() != before {
            self.save(&rest);
        }
    }

    pub fn clear_all(&self) {
        self.store.remove(QUESTION_BANK_KEY);
    }

    fn save(&self, bank: &[StoredQuestion]) {
        match serde_json::to_string(bank) {
            Ok(json) => self.store.set(QUESTION_BANK_KEY, &json),
            Err(e) => log::warn!("failed to encode question bank: {e}"),
        }
    }
}
