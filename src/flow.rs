use crate::catalog::{Difficulty, Grade};
use crate::generator::worker::GenerationOutcome;
use crate::generator::GenerationRequest;
use crate::session::question::QuizQuestion;
use crate::session::result::SessionResult;
use crate::store::high_scores::QuizContext;

pub const MAX_QUESTION_COUNT: usize = 10;
pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_NAME_LEN: usize = 20;
/// Topic recorded for quizzes drawn from the question bank.
pub const FROM_BANK_TOPIC: &str = "From Question Bank";

pub const EMPTY_QUIZ_MESSAGE: &str = "The generated quiz was empty. Please try again.";
pub const INVALID_KEY_MESSAGE: &str =
    "Your API Key appears to be invalid. Please select a valid key to continue.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Credentials,
    Welcome,
    Settings,
    Loading,
    Preview,
    NameEntry,
    Quiz,
    Results,
    GradePick,
    DifficultyPick,
    BankBrowse,
    HighScores,
    CountPick,
}

/// Why the grade/difficulty pickers were opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankIntent {
    View,
    Play,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizOrigin {
    Generated,
    Bank,
}

/// Parameters of the quiz being prepared or played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    pub grade: Grade,
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: usize,
    pub origin: QuizOrigin,
}

impl QuizSettings {
    pub fn context(&self) -> QuizContext {
        QuizContext {
            grade: self.grade,
            topic: self.topic.clone(),
            difficulty: self.difficulty,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowState {
    pub screen: Screen,
    pub credentials_ready: bool,
    pub selected_grade: Grade,
    pub selected_difficulty: Difficulty,
    pub bank_intent: Option<BankIntent>,
    pub settings: Option<QuizSettings>,
    pub questions: Vec<QuizQuestion>,
    pub candidates: Vec<QuizQuestion>,
    pub player_name: String,
    pub last_result: Option<SessionResult>,
    pub error: Option<String>,
    pub pending_job: Option<u64>,
    next_job: u64,
}

impl FlowState {
    pub fn new(credentials_ready: bool) -> Self {
        Self {
            screen: if credentials_ready {
                Screen::Welcome
            } else {
                Screen::Credentials
            },
            credentials_ready,
            selected_grade: Grade::Five,
            selected_difficulty: Difficulty::Easy,
            bank_intent: None,
            settings: None,
            questions: Vec::new(),
            candidates: Vec::new(),
            player_name: String::new(),
            last_result: None,
            error: None,
            pending_job: None,
            next_job: 1,
        }
    }

    /// Drop everything tied to the current quiz.
    fn clear_quiz(&mut self) {
        self.questions.clear();
        self.settings = None;
        self.player_name.clear();
        self.last_result = None;
    }

    /// Back to the settings screen with a blank slate.
    fn reset_quiz(&mut self) {
        self.clear_quiz();
        self.error = None;
        self.screen = Screen::Settings;
    }

    /// Back to the welcome screen. A pending error stays visible there.
    fn go_home(&mut self) {
        self.clear_quiz();
        self.bank_intent = None;
        self.candidates.clear();
        self.screen = Screen::Welcome;
    }
}

pub enum FlowEvent {
    CredentialsSaved,
    StartNewQuiz,
    StartFromBank,
    BrowseBank,
    ViewHighScores,
    Generate(GenerationRequest),
    GenerationFinished { job: u64, outcome: GenerationOutcome },
    BeginNameEntry,
    Regenerate,
    NameSubmitted(String),
    QuizFinished(SessionResult),
    PlayAgain,
    GoHome,
    Back,
    GradeChosen(Grade),
    DifficultyChosen(Difficulty),
    /// Bank questions for the selected grade and difficulty, already shuffled.
    BankCandidates(Vec<QuizQuestion>),
    CountChosen(usize),
}

/// Side effects a transition asks the app to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Generate {
        job: u64,
        request: GenerationRequest,
    },
    SaveToBank {
        questions: Vec<QuizQuestion>,
        grade: Grade,
        topic: String,
        difficulty: Difficulty,
    },
    LoadBankCandidates {
        grade: Grade,
        difficulty: Difficulty,
    },
    StartSession {
        questions: Vec<QuizQuestion>,
    },
    RecordHighScore {
        name: String,
        result: SessionResult,
        context: QuizContext,
    },
    InvalidateCredentials,
}

/// Trimmed player name, or `None` if it is empty or too long.
pub fn validate_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    let len = name.chars().count();
    (len > 0 && len <= MAX_NAME_LEN).then(|| name.to_string())
}

/// Upper bound and default for the number of bank questions to play.
pub fn bank_count_bounds(available: usize) -> (usize, usize) {
    let max = available.min(MAX_QUESTION_COUNT);
    (max, max.min(DEFAULT_QUESTION_COUNT))
}

pub fn empty_bank_message(grade: Grade, difficulty: Difficulty) -> String {
    format!(
        "No questions found in the bank for Grade {grade} ({difficulty}). Please generate some first!"
    )
}

/// The navigation state machine. Events that do not apply to the current
/// screen leave the state untouched.
pub fn transition(mut state: FlowState, event: FlowEvent) -> (FlowState, Vec<Effect>) {
    let mut effects = Vec::new();
    let from = state.screen;

    match (state.screen, event) {
        (Screen::Credentials, FlowEvent::CredentialsSaved) => {
            state.credentials_ready = true;
            state.error = None;
            state.screen = Screen::Welcome;
        }

        (Screen::Welcome, FlowEvent::StartNewQuiz) => {
            state.error = None;
            state.screen = Screen::Settings;
        }
        (Screen::Welcome, FlowEvent::StartFromBank) => {
            state.error = None;
            state.bank_intent = Some(BankIntent::Play);
            state.screen = Screen::GradePick;
        }
        (Screen::Welcome, FlowEvent::BrowseBank) => {
            state.error = None;
            state.bank_intent = Some(BankIntent::View);
            state.screen = Screen::GradePick;
        }
        (Screen::Welcome, FlowEvent::ViewHighScores) => {
            state.screen = Screen::HighScores;
        }

        (Screen::Settings, FlowEvent::Generate(request)) => {
            if !state.credentials_ready {
                state.screen = Screen::Credentials;
            } else {
                let job = state.next_job;
                state.next_job += 1;
                state.pending_job = Some(job);
                state.error = None;
                state.settings = Some(QuizSettings {
                    grade: request.grade,
                    topic: request.topic.clone(),
                    difficulty: request.difficulty,
                    count: request.count,
                    origin: QuizOrigin::Generated,
                });
                state.screen = Screen::Loading;
                effects.push(Effect::Generate { job, request });
            }
        }

        (Screen::Loading, FlowEvent::GenerationFinished { job, outcome }) => {
            if state.pending_job != Some(job) {
                log::debug!("ignoring stale generation {job}");
                return (state, effects);
            }
            state.pending_job = None;
            match outcome {
                Ok(questions) if !questions.is_empty() => {
                    if let Some(settings) = &state.settings {
                        effects.push(Effect::SaveToBank {
                            questions: questions.clone(),
                            grade: settings.grade,
                            topic: settings.topic.clone(),
                            difficulty: settings.difficulty,
                        });
                    }
                    state.questions = questions;
                    state.screen = Screen::Preview;
                }
                Ok(_) => {
                    state.error = Some(EMPTY_QUIZ_MESSAGE.to_string());
                    state.screen = Screen::Settings;
                }
                Err(e) if e.is_credential_error() => {
                    log::warn!("provider rejected the API key: {e}");
                    state.error = Some(INVALID_KEY_MESSAGE.to_string());
                    state.credentials_ready = false;
                    state.screen = Screen::Credentials;
                    effects.push(Effect::InvalidateCredentials);
                }
                Err(e) => {
                    state.error = Some(e.to_string());
                    state.screen = Screen::Settings;
                }
            }
        }

        (Screen::Preview, FlowEvent::BeginNameEntry) => {
            state.screen = Screen::NameEntry;
        }
        (Screen::Preview, FlowEvent::Regenerate) | (Screen::Results, FlowEvent::PlayAgain) => {
            state.reset_quiz();
        }

        (Screen::NameEntry, FlowEvent::NameSubmitted(raw)) => {
            if let Some(name) = validate_name(&raw) {
                if !state.questions.is_empty() {
                    state.player_name = name;
                    state.last_result = None;
                    state.screen = Screen::Quiz;
                    effects.push(Effect::StartSession {
                        questions: state.questions.clone(),
                    });
                }
            }
        }
        (Screen::NameEntry, FlowEvent::Back) => {
            state.screen = match state.settings.as_ref().map(|s| s.origin) {
                Some(QuizOrigin::Bank) => Screen::CountPick,
                _ => Screen::Preview,
            };
        }

        (Screen::Quiz, FlowEvent::QuizFinished(result)) => {
            if let Some(settings) = &state.settings {
                effects.push(Effect::RecordHighScore {
                    name: state.player_name.clone(),
                    result,
                    context: settings.context(),
                });
            }
            state.last_result = Some(result);
            state.screen = Screen::Results;
        }

        (
            Screen::Settings
            | Screen::Preview
            | Screen::Results
            | Screen::GradePick
            | Screen::HighScores,
            FlowEvent::GoHome | FlowEvent::Back,
        ) => {
            state.go_home();
        }
        (Screen::BankBrowse, FlowEvent::GoHome) => state.go_home(),

        (Screen::GradePick, FlowEvent::GradeChosen(grade)) => {
            state.selected_grade = grade;
            state.screen = Screen::DifficultyPick;
        }
        (Screen::DifficultyPick, FlowEvent::Back) => {
            state.screen = Screen::GradePick;
        }
        (Screen::DifficultyPick, FlowEvent::DifficultyChosen(difficulty)) => {
            state.selected_difficulty = difficulty;
            match state.bank_intent {
                Some(BankIntent::Play) => effects.push(Effect::LoadBankCandidates {
                    grade: state.selected_grade,
                    difficulty,
                }),
                _ => state.screen = Screen::BankBrowse,
            }
        }
        (Screen::DifficultyPick, FlowEvent::BankCandidates(candidates)) => {
            if candidates.is_empty() {
                state.error = Some(empty_bank_message(
                    state.selected_grade,
                    state.selected_difficulty,
                ));
                state.go_home();
            } else {
                state.candidates = candidates;
                state.screen = Screen::CountPick;
            }
        }
        (Screen::BankBrowse | Screen::CountPick, FlowEvent::Back) => {
            state.screen = Screen::DifficultyPick;
        }
        (Screen::CountPick, FlowEvent::CountChosen(count)) => {
            let (max, _) = bank_count_bounds(state.candidates.len());
            let count = count.clamp(1, max.max(1)).min(state.candidates.len());
            if count > 0 {
                state.questions = state.candidates[..count].to_vec();
                state.settings = Some(QuizSettings {
                    grade: state.selected_grade,
                    topic: FROM_BANK_TOPIC.to_string(),
                    difficulty: state.selected_difficulty,
                    count,
                    origin: QuizOrigin::Bank,
                });
                state.screen = Screen::NameEntry;
            }
        }

        _ => {}
    }

    if state.screen != from {
        log::debug!("screen {from:?} -> {:?}", state.screen);
    }
    (state, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QuestionType;
    use crate::generator::ProviderError;

    fn mc(prompt: &str) -> QuizQuestion {
        QuizQuestion::MultipleChoice {
            question: prompt.to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer: "a".to_string(),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            grade: Grade::Five,
            topic: "Health".to_string(),
            difficulty: Difficulty::Easy,
            question_type: QuestionType::MultipleChoice,
            count: 1,
        }
    }

    fn step(state: FlowState, event: FlowEvent) -> FlowState {
        transition(state, event).0
    }

    fn at_loading() -> (FlowState, u64) {
        let state = step(FlowState::new(true), FlowEvent::StartNewQuiz);
        let (state, effects) = transition(state, FlowEvent::Generate(request()));
        let job = match effects.as_slice() {
            [Effect::Generate { job, .. }] => *job,
            other => panic!("unexpected effects {other:?}"),
        };
        (state, job)
    }

    #[test]
    fn test_starts_on_credentials_without_key() {
        assert_eq!(FlowState::new(false).screen, Screen::Credentials);
        let state = step(FlowState::new(false), FlowEvent::CredentialsSaved);
        assert_eq!(state.screen, Screen::Welcome);
        assert!(state.credentials_ready);
    }

    #[test]
    fn test_generation_success_saves_and_previews() {
        let (state, job) = at_loading();
        assert_eq!(state.screen, Screen::Loading);
        let (state, effects) = transition(
            state,
            FlowEvent::GenerationFinished {
                job,
                outcome: Ok(vec![mc("Q")]),
            },
        );
        assert_eq!(state.screen, Screen::Preview);
        assert_eq!(state.questions.len(), 1);
        assert!(matches!(
            effects.as_slice(),
            [Effect::SaveToBank { topic, .. }] if topic == "Health"
        ));
    }

    #[test]
    fn test_loading_ignores_other_events() {
        let (state, job) = at_loading();
        let (state, effects) = transition(state, FlowEvent::Generate(request()));
        assert!(effects.is_empty());
        let state = step(state, FlowEvent::GoHome);
        let state = step(state, FlowEvent::Back);
        assert_eq!(state.screen, Screen::Loading);
        assert_eq!(state.pending_job, Some(job));
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let (state, job) = at_loading();
        let state = step(
            state,
            FlowEvent::GenerationFinished {
                job: job + 100,
                outcome: Ok(vec![mc("Q")]),
            },
        );
        assert_eq!(state.screen, Screen::Loading);
        assert!(state.questions.is_empty());
    }

    #[test]
    fn test_empty_generation_returns_to_settings_with_error() {
        let (state, job) = at_loading();
        let state = step(
            state,
            FlowEvent::GenerationFinished {
                job,
                outcome: Ok(Vec::new()),
            },
        );
        assert_eq!(state.screen, Screen::Settings);
        assert_eq!(state.error.as_deref(), Some(EMPTY_QUIZ_MESSAGE));

        // Retrying clears the message.
        let state = step(state, FlowEvent::Generate(request()));
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_generic_error_keeps_message() {
        let (state, job) = at_loading();
        let state = step(
            state,
            FlowEvent::GenerationFinished {
                job,
                outcome: Err(ProviderError::Api("quota exceeded".to_string())),
            },
        );
        assert_eq!(state.screen, Screen::Settings);
        assert_eq!(state.error.as_deref(), Some("quota exceeded"));
        assert!(state.credentials_ready);
    }

    #[test]
    fn test_credential_error_forces_credentials_screen() {
        let (state, job) = at_loading();
        let (state, effects) = transition(
            state,
            FlowEvent::GenerationFinished {
                job,
                outcome: Err(ProviderError::Api("API key not valid.".to_string())),
            },
        );
        assert_eq!(state.screen, Screen::Credentials);
        assert!(!state.credentials_ready);
        assert_eq!(state.error.as_deref(), Some(INVALID_KEY_MESSAGE));
        assert_eq!(effects, vec![Effect::InvalidateCredentials]);

        let state = step(state, FlowEvent::CredentialsSaved);
        assert_eq!(state.screen, Screen::Welcome);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_name_entry_and_quiz_to_results() {
        let (state, job) = at_loading();
        let state = step(
            state,
            FlowEvent::GenerationFinished {
                job,
                outcome: Ok(vec![mc("Q")]),
            },
        );
        let state = step(state, FlowEvent::BeginNameEntry);
        assert_eq!(state.screen, Screen::NameEntry);

        // Blank and over-long names are refused.
        let state = step(state, FlowEvent::NameSubmitted("   ".to_string()));
        assert_eq!(state.screen, Screen::NameEntry);
        let state = step(state, FlowEvent::NameSubmitted("x".repeat(21)));
        assert_eq!(state.screen, Screen::NameEntry);

        let (state, effects) = transition(state, FlowEvent::NameSubmitted("  Ana ".to_string()));
        assert_eq!(state.screen, Screen::Quiz);
        assert_eq!(state.player_name, "Ana");
        assert!(matches!(
            effects.as_slice(),
            [Effect::StartSession { questions }] if questions.len() == 1
        ));

        let result = SessionResult {
            score: 450,
            correct_answers: 1,
            total_questions: 1,
            ended_early: false,
        };
        let (state, effects) = transition(state, FlowEvent::QuizFinished(result));
        assert_eq!(state.screen, Screen::Results);
        assert_eq!(
            effects,
            vec![Effect::RecordHighScore {
                name: "Ana".to_string(),
                result,
                context: QuizContext {
                    grade: Grade::Five,
                    topic: "Health".to_string(),
                    difficulty: Difficulty::Easy,
                },
            }]
        );

        let state = step(state, FlowEvent::PlayAgain);
        assert_eq!(state.screen, Screen::Settings);
        assert!(state.questions.is_empty());
        assert!(state.player_name.is_empty());
        assert!(state.settings.is_none());
    }

    #[test]
    fn test_name_entry_back_depends_on_origin() {
        let (state, job) = at_loading();
        let state = step(
            state,
            FlowEvent::GenerationFinished {
                job,
                outcome: Ok(vec![mc("Q")]),
            },
        );
        let state = step(state, FlowEvent::BeginNameEntry);
        assert_eq!(step(state, FlowEvent::Back).screen, Screen::Preview);

        let state = step(FlowState::new(true), FlowEvent::StartFromBank);
        let state = step(state, FlowEvent::GradeChosen(Grade::Six));
        let state = step(state, FlowEvent::DifficultyChosen(Difficulty::Hard));
        let state = step(state, FlowEvent::BankCandidates(vec![mc("A"), mc("B")]));
        let state = step(state, FlowEvent::CountChosen(2));
        assert_eq!(state.screen, Screen::NameEntry);
        assert_eq!(step(state, FlowEvent::Back).screen, Screen::CountPick);
    }

    #[test]
    fn test_bank_play_flow() {
        let state = step(FlowState::new(true), FlowEvent::StartFromBank);
        assert_eq!(state.screen, Screen::GradePick);
        let state = step(state, FlowEvent::GradeChosen(Grade::Seven));
        let (state, effects) = transition(state, FlowEvent::DifficultyChosen(Difficulty::Medium));
        assert_eq!(
            effects,
            vec![Effect::LoadBankCandidates {
                grade: Grade::Seven,
                difficulty: Difficulty::Medium,
            }]
        );
        let candidates: Vec<QuizQuestion> = (0..12).map(|i| mc(&format!("Q{i}"))).collect();
        let state = step(state, FlowEvent::BankCandidates(candidates));
        assert_eq!(state.screen, Screen::CountPick);

        // Requests above the cap are clamped.
        let state = step(state, FlowEvent::CountChosen(50));
        assert_eq!(state.questions.len(), MAX_QUESTION_COUNT);
        let settings = state.settings.as_ref().unwrap();
        assert_eq!(settings.topic, FROM_BANK_TOPIC);
        assert_eq!(settings.grade, Grade::Seven);
        assert_eq!(settings.origin, QuizOrigin::Bank);
        assert_eq!(state.questions[0].prompt(), "Q0");
    }

    #[test]
    fn test_empty_bank_goes_home_with_message() {
        let state = step(FlowState::new(true), FlowEvent::StartFromBank);
        let state = step(state, FlowEvent::GradeChosen(Grade::Eight));
        let state = step(state, FlowEvent::DifficultyChosen(Difficulty::Hard));
        let state = step(state, FlowEvent::BankCandidates(Vec::new()));
        assert_eq!(state.screen, Screen::Welcome);
        assert_eq!(
            state.error.as_deref(),
            Some("No questions found in the bank for Grade 8 (Hard). Please generate some first!")
        );
        assert_eq!(state.bank_intent, None);

        // Starting something new clears it.
        let state = step(state, FlowEvent::StartNewQuiz);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_bank_browse_navigation() {
        let state = step(FlowState::new(true), FlowEvent::BrowseBank);
        let state = step(state, FlowEvent::GradeChosen(Grade::Six));
        let (state, effects) = transition(state, FlowEvent::DifficultyChosen(Difficulty::Easy));
        assert!(effects.is_empty());
        assert_eq!(state.screen, Screen::BankBrowse);
        let state = step(state, FlowEvent::Back);
        assert_eq!(state.screen, Screen::DifficultyPick);
        let state = step(state, FlowEvent::Back);
        assert_eq!(state.screen, Screen::GradePick);
        let state = step(state, FlowEvent::Back);
        assert_eq!(state.screen, Screen::Welcome);
    }

    #[test]
    fn test_bank_count_bounds() {
        assert_eq!(bank_count_bounds(3), (3, 3));
        assert_eq!(bank_count_bounds(7), (7, 5));
        assert_eq!(bank_count_bounds(40), (10, 5));
    }

    #[test]
    fn test_validate_name_counts_characters() {
        assert_eq!(validate_name(" Zoë "), Some("Zoë".to_string()));
        assert_eq!(validate_name(&"é".repeat(20)), Some("é".repeat(20)));
        assert_eq!(validate_name(&"é".repeat(21)), None);
        assert_eq!(validate_name(""), None);
    }
}
