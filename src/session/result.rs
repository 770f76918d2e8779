use crate::engine::scoring;

/// Exit value of a finished quiz session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionResult {
    pub score: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    /// The player ended the quiz before the last question.
    pub ended_early: bool,
}

impl SessionResult {
    pub fn percentage(&self) -> u32 {
        scoring::percentage(self.correct_answers, self.total_questions)
    }

    pub fn feedback_message(&self) -> &'static str {
        scoring::feedback_message(self.percentage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_and_message() {
        let result = SessionResult {
            score: 900,
            correct_answers: 4,
            total_questions: 5,
            ended_early: false,
        };
        assert_eq!(result.percentage(), 80);
        assert!(result.feedback_message().starts_with("Excellent"));
    }
}
