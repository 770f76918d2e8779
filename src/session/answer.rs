use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::session::question::QuizQuestion;

/// What the player submits for a question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    /// Selected option text of a multiple-choice question.
    Choice(String),
    /// Typed answer for a fill-in-the-blank question.
    Text(String),
    /// Chosen definition per term of a matching question.
    Matches(BTreeMap<String, String>),
}

/// The answer currently being composed on the quiz screen. Text answers are
/// edited in a line input owned by the UI, so the draft only marks the kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerDraft {
    Choice {
        cursor: usize,
        len: usize,
    },
    Text,
    Matching {
        /// Definitions in display order (shuffled once per question).
        definitions: Vec<String>,
        /// Index into `definitions` chosen for each term, in pair order.
        choices: Vec<Option<usize>>,
        row: usize,
    },
}

impl AnswerDraft {
    pub fn for_question<R: Rng>(question: &QuizQuestion, rng: &mut R) -> Self {
        match question {
            QuizQuestion::MultipleChoice { options, .. } => AnswerDraft::Choice {
                cursor: 0,
                len: options.len(),
            },
            QuizQuestion::FillInTheBlank { .. } => AnswerDraft::Text,
            QuizQuestion::Matching { pairs, .. } => {
                let mut definitions: Vec<String> =
                    pairs.iter().map(|p| p.definition.clone()).collect();
                definitions.shuffle(rng);
                AnswerDraft::Matching {
                    definitions,
                    choices: vec![None; pairs.len()],
                    row: 0,
                }
            }
        }
    }

    pub fn next_row(&mut self) {
        match self {
            AnswerDraft::Choice { cursor, len } if *len > 0 => *cursor = (*cursor + 1) % *len,
            AnswerDraft::Matching { choices, row, .. } if !choices.is_empty() => {
                *row = (*row + 1) % choices.len()
            }
            _ => {}
        }
    }

    pub fn prev_row(&mut self) {
        match self {
            AnswerDraft::Choice { cursor, len } if *len > 0 => {
                *cursor = (*cursor + *len - 1) % *len
            }
            AnswerDraft::Matching { choices, row, .. } if !choices.is_empty() => {
                *row = (*row + choices.len() - 1) % choices.len()
            }
            _ => {}
        }
    }

    /// Jump straight to an option (multiple choice) by index.
    pub fn select(&mut self, index: usize) {
        if let AnswerDraft::Choice { cursor, len } = self {
            if index < *len {
                *cursor = index;
            }
        }
    }

    /// Cycle the definition chosen for the current matching row.
    pub fn cycle_definition(&mut self, forward: bool) {
        if let AnswerDraft::Matching {
            definitions,
            choices,
            row,
        } = self
        {
            let count = definitions.len();
            if count == 0 {
                return;
            }
            let Some(slot) = choices.get_mut(*row) else {
                return;
            };
            *slot = Some(match *slot {
                None if forward => 0,
                None => count - 1,
                Some(i) if forward => (i + 1) % count,
                Some(i) => (i + count - 1) % count,
            });
        }
    }

    /// Build the answer to submit. `None` while the draft is incomplete: an
    /// empty text answer, or a matching question with an unmatched term.
    pub fn to_answer(&self, question: &QuizQuestion, text: &str) -> Option<Answer> {
        match (self, question) {
            (AnswerDraft::Choice { cursor, .. }, QuizQuestion::MultipleChoice { options, .. }) => {
                options.get(*cursor).cloned().map(Answer::Choice)
            }
            (AnswerDraft::Text, QuizQuestion::FillInTheBlank { .. }) => {
                if text.is_empty() {
                    None
                } else {
                    Some(Answer::Text(text.to_string()))
                }
            }
            (
                AnswerDraft::Matching {
                    definitions,
                    choices,
                    ..
                },
                QuizQuestion::Matching { pairs, .. },
            ) => {
                let mut matches = BTreeMap::new();
                for (pair, choice) in pairs.iter().zip(choices) {
                    let definition = definitions.get((*choice)?)?;
                    matches.insert(pair.term.clone(), definition.clone());
                }
                Some(Answer::Matches(matches))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::session::question::MatchingPair;

    fn matching() -> QuizQuestion {
        QuizQuestion::Matching {
            question: "Match".to_string(),
            pairs: vec![
                MatchingPair {
                    term: "a".to_string(),
                    definition: "first".to_string(),
                },
                MatchingPair {
                    term: "b".to_string(),
                    definition: "second".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_choice_cursor_wraps() {
        let q = QuizQuestion::MultipleChoice {
            question: "Q".to_string(),
            options: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            correct_answer: "y".to_string(),
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let mut draft = AnswerDraft::for_question(&q, &mut rng);
        draft.prev_row();
        assert_eq!(draft.to_answer(&q, ""), Some(Answer::Choice("z".to_string())));
        draft.next_row();
        draft.next_row();
        assert_eq!(draft.to_answer(&q, ""), Some(Answer::Choice("y".to_string())));
        draft.select(0);
        assert_eq!(draft.to_answer(&q, ""), Some(Answer::Choice("x".to_string())));
    }

    #[test]
    fn test_text_draft_needs_input() {
        let q = QuizQuestion::FillInTheBlank {
            question: "___".to_string(),
            correct_answer: "x".to_string(),
        };
        let draft = AnswerDraft::Text;
        assert_eq!(draft.to_answer(&q, ""), None);
        assert_eq!(draft.to_answer(&q, " x"), Some(Answer::Text(" x".to_string())));
    }

    #[test]
    fn test_matching_draft_incomplete_until_every_term_chosen() {
        let q = matching();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut draft = AnswerDraft::for_question(&q, &mut rng);
        draft.cycle_definition(true);
        assert_eq!(draft.to_answer(&q, ""), None);
        draft.next_row();
        draft.cycle_definition(true);
        match draft.to_answer(&q, "") {
            Some(Answer::Matches(m)) => {
                assert_eq!(m.len(), 2);
                assert!(m.contains_key("a"));
                assert!(m.contains_key("b"));
            }
            other => panic!("expected matches, got {other:?}"),
        }
    }

    #[test]
    fn test_matching_definitions_are_a_permutation() {
        let q = matching();
        let mut rng = SmallRng::seed_from_u64(42);
        let draft = AnswerDraft::for_question(&q, &mut rng);
        if let AnswerDraft::Matching { mut definitions, .. } = draft {
            definitions.sort();
            assert_eq!(definitions, vec!["first".to_string(), "second".to_string()]);
        } else {
            panic!("expected matching draft");
        }
    }
}
