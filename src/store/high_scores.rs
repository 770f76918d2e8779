use std::rc::Rc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::{Difficulty, Grade};
use crate::session::result::SessionResult;
use crate::store::kv::KeyValueStore;
use crate::store::schema::{HIGH_SCORES_KEY, HighScore};

pub const MAX_HIGH_SCORES: usize = 10;

/// Top-ten leaderboard ordered by score, then recency.
pub struct HighScores {
    store: Rc<dyn KeyValueStore>,
}

/// The quiz a score was earned on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizContext {
    pub grade: Grade,
    pub topic: String,
    pub difficulty: Difficulty,
}

impl HighScores {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> Vec<HighScore> {
        let Some(raw) = self.store.get(HIGH_SCORES_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("high scores are unreadable, treating as empty: {e}");
            Vec::new()
        })
    }

    /// Insert a finished session. Sessions without questions are not
    /// recorded. Returns the entry if it made the board.
    pub fn record(
        &self,
        name: &str,
        result: &SessionResult,
        context: &QuizContext,
    ) -> Option<HighScore> {
        self.record_at(name, result, context, Utc::now())
    }

    pub fn record_at(
        &self,
        name: &str,
        result: &SessionResult,
        context: &QuizContext,
        now: DateTime<Utc>,
    ) -> Option<HighScore> {
        if result.total_questions == 0 {
            return None;
        }
        let entry = HighScore {
            id: Uuid::new_v4(),
            name: name.to_string(),
            score: result.score,
            correct_answers: result.correct_answers,
            total_questions: result.total_questions,
            percentage: result.percentage(),
            grade: context.grade,
            topic: context.topic.clone(),
            difficulty: context.difficulty,
            timestamp: now,
        };

        let mut scores = self.get_all();
        scores.push(entry.clone());
        scores.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        scores.truncate(MAX_HIGH_SCORES);

        match serde_json::to_string(&scores) {
            Ok(json) => self.store.set(HIGH_SCORES_KEY, &json),
            Err(e) => log::warn!("failed to encode high scores: {e}"),
        }

        let kept = scores.iter().any(|s| s.id == entry.id);
        log::info!(
            "recorded score {} for {name} ({})",
            entry.score,
            if kept { "on the board" } else { "below the board" }
        );
        kept.then_some(entry)
    }

    pub fn clear_all(&self) {
        self.store.remove(HIGH_SCORES_KEY);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::store::kv::MemoryStore;

    fn context() -> QuizContext {
        QuizContext {
            grade: Grade::Five,
            topic: "Health".to_string(),
            difficulty: Difficulty::Easy,
        }
    }

    fn result(score: u32, correct: usize, total: usize) -> SessionResult {
        SessionResult {
            score,
            correct_answers: correct,
            total_questions: total,
            ended_early: false,
        }
    }

    fn board() -> HighScores {
        HighScores::new(Rc::new(MemoryStore::new()))
    }

    #[test]
    fn test_empty_session_is_not_recorded() {
        let scores = board();
        assert!(scores.record("Ana", &result(0, 0, 0), &context()).is_none());
        assert!(scores.get_all().is_empty());
    }

    #[test]
    fn test_percentage_is_rounded() {
        let scores = board();
        let entry = scores.record("Ana", &result(300, 2, 3), &context()).unwrap();
        assert_eq!(entry.percentage, 67);
        assert_eq!(entry.topic, "Health");
    }

    #[test]
    fn test_board_is_sorted_and_bounded() {
        let scores = board();
        let t0 = Utc::now();
        for i in 0..12u32 {
            scores.record_at(
                &format!("p{i}"),
                &result(i * 100, 1, 1),
                &context(),
                t0 + Duration::seconds(i as i64),
            );
        }
        let all = scores.get_all();
        assert_eq!(all.len(), MAX_HIGH_SCORES);
        assert_eq!(all[0].score, 1100);
        assert_eq!(all[9].score, 200);
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_put_newest_first() {
        let scores = board();
        let t0 = Utc::now();
        scores.record_at("old", &result(500, 1, 1), &context(), t0);
        scores.record_at("new", &result(500, 1, 1), &context(), t0 + Duration::seconds(1));
        let names: Vec<String> = scores.get_all().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["new".to_string(), "old".to_string()]);
    }

    #[test]
    fn test_low_score_never_enters_full_board() {
        let scores = board();
        let t0 = Utc::now();
        for i in 0..MAX_HIGH_SCORES as u32 {
            scores.record_at("p", &result(1000 + i, 1, 1), &context(), t0);
        }
        let before = scores.get_all();
        let later = t0 + Duration::seconds(60);
        assert!(scores.record_at("low", &result(999, 1, 1), &context(), later).is_none());
        assert_eq!(scores.get_all(), before);
    }

    #[test]
    fn test_clear_all() {
        let scores = board();
        scores.record("Ana", &result(100, 1, 1), &context());
        scores.clear_all();
        assert!(scores.get_all().is_empty());
    }
}
