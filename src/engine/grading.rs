use crate::session::answer::Answer;
use crate::session::question::QuizQuestion;

/// Decide whether `answer` is correct for `question`. An answer of the wrong
/// shape for the question kind is simply incorrect.
pub fn is_correct(question: &QuizQuestion, answer: &Answer) -> bool {
    match (question, answer) {
        (QuizQuestion::MultipleChoice { correct_answer, .. }, Answer::Choice(selected)) => {
            selected == correct_answer
        }
        (QuizQuestion::FillInTheBlank { correct_answer, .. }, Answer::Text(text)) => {
            normalize(text) == normalize(correct_answer)
        }
        (QuizQuestion::Matching { pairs, .. }, Answer::Matches(chosen)) => pairs
            .iter()
            .all(|pair| chosen.get(&pair.term) == Some(&pair.definition)),
        _ => false,
    }
}

/// Number of correctly matched pairs; used for per-row feedback.
pub fn matched_pairs(question: &QuizQuestion, answer: &Answer) -> usize {
    match (question, answer) {
        (QuizQuestion::Matching { pairs, .. }, Answer::Matches(chosen)) => pairs
            .iter()
            .filter(|pair| chosen.get(&pair.term) == Some(&pair.definition))
            .count(),
        _ => 0,
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The answer shown to the player after a wrong answer or a timeout.
pub fn correct_answer_text(question: &QuizQuestion) -> String {
    match question {
        QuizQuestion::MultipleChoice { correct_answer, .. }
        | QuizQuestion::FillInTheBlank { correct_answer, .. } => correct_answer.clone(),
        QuizQuestion::Matching { pairs, .. } => pairs
            .iter()
            .map(|p| format!("{}: {}", p.term, p.definition))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
