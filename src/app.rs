use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::catalog::{self, Difficulty, Grade, QuestionType};
use crate::config::Config;
use crate::flow::{self, Effect, FlowEvent, FlowState, MAX_NAME_LEN, MAX_QUESTION_COUNT, Screen};
use crate::generator::gemini::{GeminiProvider, GeminiSettings};
use crate::generator::worker::GenerationJob;
use crate::generator::{GenerationRequest, ProviderError, QuestionProvider};
use crate::session::answer::AnswerDraft;
use crate::session::quiz::{QuizSession, SessionEvent, Transition};
use crate::store::credentials::CredentialStore;
use crate::store::high_scores::HighScores;
use crate::store::kv::KeyValueStore;
use crate::store::question_bank::QuestionBank;
use crate::store::schema::{HighScore, StoredQuestion};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Entries of the welcome menu: key, label, description.
pub const MENU_ITEMS: [(&str, &str, &str); 4] = [
    ("1", "New Quiz", "Generate fresh questions for a grade and topic"),
    ("2", "Play from Question Bank", "Replay questions generated earlier"),
    ("3", "Browse Question Bank", "Review or clear saved questions"),
    ("4", "High Scores", "Top ten results of this session"),
];

/// How the app gets a question provider.
pub enum ProviderSetup {
    /// A provider that needs no API key.
    Keyless(Arc<dyn QuestionProvider>),
    /// Gemini, built per request with the current API key; the template's
    /// `api_key` is ignored.
    Gemini(GeminiSettings),
}

/// Everything `App::new` needs from the outside world.
pub struct AppParts {
    pub config: Config,
    pub theme: &'static Theme,
    pub store: Rc<dyn KeyValueStore>,
    pub provider: ProviderSetup,
    /// Key from the command line or environment; the stored key is the fallback.
    pub api_key: Option<String>,
}

/// A y/n prompt waiting for an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirm {
    ClearBank,
    ClearScores,
    EndQuiz,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Grade,
    Topic,
    Difficulty,
    QuestionType,
    Count,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Grade,
        FormField::Topic,
        FormField::Difficulty,
        FormField::QuestionType,
        FormField::Count,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Grade => "Grade",
            FormField::Topic => "Topic",
            FormField::Difficulty => "Difficulty",
            FormField::QuestionType => "Question Type",
            FormField::Count => "Questions",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopicChoice {
    Catalog(usize),
    Custom,
}

/// The new-quiz settings screen.
pub struct QuizForm {
    pub grade: Grade,
    pub topic: TopicChoice,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub count: usize,
    pub field: FormField,
    pub custom_topic: LineInput,
    pub editing_topic: bool,
    /// Local validation message, shown next to the flow error.
    pub notice: Option<String>,
}

impl QuizForm {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grade: config.default_grade,
            topic: TopicChoice::Catalog(0),
            difficulty: config.default_difficulty,
            question_type: config.default_question_type,
            count: config.default_question_count.clamp(1, MAX_QUESTION_COUNT),
            field: FormField::Grade,
            custom_topic: LineInput::new("").with_max_chars(60),
            editing_topic: false,
            notice: None,
        }
    }

    pub fn next_field(&mut self) {
        self.field = catalog::cycle(&FormField::ALL, self.field, true);
    }

    pub fn prev_field(&mut self) {
        self.field = catalog::cycle(&FormField::ALL, self.field, false);
    }

    pub fn cycle_forward(&mut self) {
        self.cycle(true);
    }

    pub fn cycle_backward(&mut self) {
        self.cycle(false);
    }

    fn cycle(&mut self, forward: bool) {
        self.notice = None;
        match self.field {
            FormField::Grade => {
                self.grade = catalog::cycle(&Grade::ALL, self.grade, forward);
                self.topic = TopicChoice::Catalog(0);
            }
            FormField::Topic => {
                // Catalog topics followed by one custom slot.
                let slots = self.grade.topics().len() + 1;
                let idx = match self.topic {
                    TopicChoice::Catalog(i) => i,
                    TopicChoice::Custom => slots - 1,
                };
                let next = if forward {
                    (idx + 1) % slots
                } else {
                    (idx + slots - 1) % slots
                };
                self.topic = if next == slots - 1 {
                    TopicChoice::Custom
                } else {
                    TopicChoice::Catalog(next)
                };
            }
            FormField::Difficulty => {
                self.difficulty = catalog::cycle(&Difficulty::ALL, self.difficulty, forward);
            }
            FormField::QuestionType => {
                self.question_type =
                    catalog::cycle(&QuestionType::ALL, self.question_type, forward);
            }
            FormField::Count => {
                self.count = if forward {
                    (self.count + 1).min(MAX_QUESTION_COUNT)
                } else {
                    self.count.saturating_sub(1).max(1)
                };
            }
        }
    }

    /// The chosen topic; `None` for a blank custom topic.
    pub fn topic(&self) -> Option<String> {
        match self.topic {
            TopicChoice::Catalog(i) => self
                .grade
                .topics()
                .get(i)
                .map(|t| t.to_string())
                .or_else(|| Some(self.grade.default_topic().to_string())),
            TopicChoice::Custom => {
                let topic = self.custom_topic.value().trim();
                (!topic.is_empty()).then(|| topic.to_string())
            }
        }
    }

    pub fn request(&self) -> Option<GenerationRequest> {
        Some(GenerationRequest {
            grade: self.grade,
            topic: self.topic()?,
            difficulty: self.difficulty,
            question_type: self.question_type,
            count: self.count,
        })
    }
}

pub struct App {
    pub flow: FlowState,
    pub session: Option<QuizSession>,
    pub draft: Option<AnswerDraft>,
    pub form: QuizForm,
    pub name_input: LineInput,
    pub answer_input: LineInput,
    pub key_input: LineInput,
    pub menu_selected: usize,
    pub pick_selected: usize,
    pub count_choice: usize,
    pub scroll: usize,
    pub confirm: Option<Confirm>,
    pub bank_view: Vec<StoredQuestion>,
    pub scores_view: Vec<HighScore>,
    /// High score entry made by the last finished quiz.
    pub recorded_score: Option<HighScore>,
    pub theme: &'static Theme,
    pub config: Config,
    pub should_quit: bool,
    bank: QuestionBank,
    scores: HighScores,
    credentials: CredentialStore,
    provider: ProviderSetup,
    api_key: Option<String>,
    job: Option<GenerationJob>,
    rng: SmallRng,
}

impl App {
    pub fn new(parts: AppParts) -> Self {
        let AppParts {
            config,
            theme,
            store,
            provider,
            api_key,
        } = parts;

        let bank = QuestionBank::new(store.clone());
        let scores = HighScores::new(store.clone());
        let credentials = CredentialStore::new(store);

        if config.purge_stores {
            log::info!("purging question bank and high scores");
            bank.clear_all();
            scores.clear_all();
        }

        let api_key = api_key.or_else(|| credentials.get());
        let ready = matches!(provider, ProviderSetup::Keyless(_)) || api_key.is_some();

        Self {
            flow: FlowState::new(ready),
            session: None,
            draft: None,
            form: QuizForm::from_config(&config),
            name_input: LineInput::new("").with_max_chars(MAX_NAME_LEN),
            answer_input: LineInput::new("").with_max_chars(80),
            key_input: LineInput::new("").masked(),
            menu_selected: 0,
            pick_selected: 0,
            count_choice: 1,
            scroll: 0,
            confirm: None,
            bank_view: Vec::new(),
            scores_view: Vec::new(),
            recorded_score: None,
            theme,
            config,
            should_quit: false,
            bank,
            scores,
            credentials,
            provider,
            api_key,
            job: None,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.flow.screen
    }

    /// Run one flow transition and carry out its effects.
    pub fn dispatch(&mut self, event: FlowEvent) {
        let before = self.flow.screen;
        let state = std::mem::replace(&mut self.flow, FlowState::new(false));
        let (state, effects) = flow::transition(state, event);
        self.flow = state;
        let after = self.flow.screen;

        for effect in effects {
            self.apply(effect);
        }

        // An effect may have dispatched again and already entered a newer screen.
        if after != before && self.flow.screen == after {
            self.enter_screen(after);
        }
    }

    fn apply(&mut self, effect: Effect) {
        log::debug!("effect: {}", effect_name(&effect));
        match effect {
            Effect::Generate { job, request } => match self.provider() {
                Some(provider) => {
                    self.job = Some(GenerationJob::spawn(job, provider, request));
                }
                None => self.dispatch(FlowEvent::GenerationFinished {
                    job,
                    outcome: Err(ProviderError::MissingKey),
                }),
            },
            Effect::SaveToBank {
                questions,
                grade,
                topic,
                difficulty,
            } => {
                self.bank.append(&questions, grade, &topic, difficulty);
            }
            Effect::LoadBankCandidates { grade, difficulty } => {
                let mut candidates: Vec<_> = self
                    .bank
                    .get_filtered(grade, difficulty)
                    .into_iter()
                    .map(|q| q.question)
                    .collect();
                candidates.shuffle(&mut self.rng);
                self.dispatch(FlowEvent::BankCandidates(candidates));
            }
            Effect::StartSession { questions } => {
                match QuizSession::start(questions, Instant::now()) {
                    Ok(session) => {
                        self.draft = Some(AnswerDraft::for_question(
                            session.current_question(),
                            &mut self.rng,
                        ));
                        self.answer_input.clear();
                        self.session = Some(session);
                    }
                    Err(e) => log::error!("could not start quiz: {e}"),
                }
            }
            Effect::RecordHighScore {
                name,
                result,
                context,
            } => {
                self.recorded_score = self.scores.record(&name, &result, &context);
            }
            Effect::InvalidateCredentials => {
                self.credentials.clear();
                self.api_key = None;
                self.key_input.clear();
            }
        }
    }

    fn enter_screen(&mut self, screen: Screen) {
        self.scroll = 0;
        self.confirm = None;
        if screen != Screen::Quiz {
            self.session = None;
            self.draft = None;
        }
        match screen {
            Screen::Welcome => self.menu_selected = 0,
            Screen::Settings => {
                self.form.editing_topic = false;
                self.form.notice = None;
            }
            Screen::GradePick => {
                self.pick_selected = Grade::ALL
                    .iter()
                    .position(|g| *g == self.flow.selected_grade)
                    .unwrap_or(0);
            }
            Screen::DifficultyPick => {
                self.pick_selected = Difficulty::ALL
                    .iter()
                    .position(|d| *d == self.flow.selected_difficulty)
                    .unwrap_or(0);
            }
            Screen::CountPick => {
                self.count_choice = flow::bank_count_bounds(self.flow.candidates.len()).1;
            }
            Screen::NameEntry => self.name_input.clear(),
            Screen::BankBrowse => self.refresh_bank_view(),
            Screen::HighScores | Screen::Results => self.refresh_scores_view(),
            Screen::Credentials => self.key_input.clear(),
            _ => {}
        }
    }

    fn provider(&self) -> Option<Arc<dyn QuestionProvider>> {
        match &self.provider {
            ProviderSetup::Keyless(provider) => Some(provider.clone()),
            ProviderSetup::Gemini(template) => {
                let api_key = self.api_key.clone()?;
                Some(Arc::new(GeminiProvider::new(GeminiSettings {
                    api_key,
                    ..template.clone()
                })))
            }
        }
    }

    /// Poll background work and timers.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(job) = &self.job {
            if let Some(outcome) = job.try_finish() {
                let id = job.id();
                self.job = None;
                self.dispatch(FlowEvent::GenerationFinished { job: id, outcome });
            }
        }

        if let Some(session) = self.session.as_mut() {
            let transitions = session.poll_clock(now);
            for transition in transitions {
                self.after_transition(transition);
            }
        }
    }

    /// How long the current generation has been running.
    pub fn generation_elapsed(&self) -> Option<Duration> {
        self.job.as_ref().map(|j| j.elapsed())
    }

    pub fn is_keyless(&self) -> bool {
        matches!(self.provider, ProviderSetup::Keyless(_))
    }

    // Credentials

    pub fn submit_credentials(&mut self) {
        let key = self.key_input.value().trim().to_string();
        if key.is_empty() {
            return;
        }
        self.credentials.save(&key);
        self.api_key = Some(key);
        self.key_input.clear();
        self.dispatch(FlowEvent::CredentialsSaved);
    }

    // Welcome

    pub fn menu_next(&mut self) {
        self.menu_selected = (self.menu_selected + 1) % MENU_ITEMS.len();
    }

    pub fn menu_prev(&mut self) {
        self.menu_selected = (self.menu_selected + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
    }

    pub fn menu_activate(&mut self, index: usize) {
        let event = match index {
            0 => FlowEvent::StartNewQuiz,
            1 => FlowEvent::StartFromBank,
            2 => FlowEvent::BrowseBank,
            3 => FlowEvent::ViewHighScores,
            _ => return,
        };
        self.dispatch(event);
    }

    // Settings

    pub fn start_generation(&mut self) {
        match self.form.request() {
            Some(request) => {
                self.form.notice = None;
                self.dispatch(FlowEvent::Generate(request));
            }
            None => self.form.notice = Some("Please enter a custom topic first.".to_string()),
        }
    }

    // Grade / difficulty / count pickers

    pub fn pick_next(&mut self) {
        let len = self.pick_len();
        if len > 0 {
            self.pick_selected = (self.pick_selected + 1) % len;
        }
    }

    pub fn pick_prev(&mut self) {
        let len = self.pick_len();
        if len > 0 {
            self.pick_selected = (self.pick_selected + len - 1) % len;
        }
    }

    fn pick_len(&self) -> usize {
        match self.flow.screen {
            Screen::GradePick => Grade::ALL.len(),
            Screen::DifficultyPick => Difficulty::ALL.len(),
            _ => 0,
        }
    }

    pub fn pick_confirm(&mut self) {
        match self.flow.screen {
            Screen::GradePick => {
                if let Some(grade) = Grade::ALL.get(self.pick_selected) {
                    self.dispatch(FlowEvent::GradeChosen(*grade));
                }
            }
            Screen::DifficultyPick => {
                if let Some(difficulty) = Difficulty::ALL.get(self.pick_selected) {
                    self.dispatch(FlowEvent::DifficultyChosen(*difficulty));
                }
            }
            _ => {}
        }
    }

    pub fn count_max(&self) -> usize {
        flow::bank_count_bounds(self.flow.candidates.len()).0
    }

    pub fn count_up(&mut self) {
        self.count_choice = (self.count_choice + 1).min(self.count_max().max(1));
    }

    pub fn count_down(&mut self) {
        self.count_choice = self.count_choice.saturating_sub(1).max(1);
    }

    pub fn choose_count(&mut self) {
        self.dispatch(FlowEvent::CountChosen(self.count_choice));
    }

    // Name entry

    pub fn submit_name(&mut self) {
        let name = self.name_input.value().to_string();
        if flow::validate_name(&name).is_some() {
            self.dispatch(FlowEvent::NameSubmitted(name));
        }
    }

    // Quiz

    pub fn answer_next(&mut self) {
        if let Some(draft) = self.draft.as_mut() {
            draft.next_row();
        }
    }

    pub fn answer_prev(&mut self) {
        if let Some(draft) = self.draft.as_mut() {
            draft.prev_row();
        }
    }

    pub fn answer_cycle(&mut self, forward: bool) {
        if let Some(draft) = self.draft.as_mut() {
            draft.cycle_definition(forward);
        }
    }

    /// Pick a multiple-choice option by index and submit it.
    pub fn answer_option(&mut self, index: usize, now: Instant) {
        let in_range = matches!(self.draft, Some(AnswerDraft::Choice { len, .. }) if index < len);
        if !in_range {
            return;
        }
        if let Some(draft) = self.draft.as_mut() {
            draft.select(index);
        }
        self.submit_answer(now);
    }

    pub fn submit_answer(&mut self, now: Instant) {
        let (Some(session), Some(draft)) = (self.session.as_mut(), self.draft.as_ref()) else {
            return;
        };
        let Some(answer) = draft.to_answer(session.current_question(), self.answer_input.value())
        else {
            return;
        };
        let transition = session.handle(SessionEvent::Submit(answer), now);
        self.after_transition(transition);
    }

    pub fn request_end_quiz(&mut self) {
        if self.session.as_ref().is_some_and(|s| !s.is_finished()) {
            self.confirm = Some(Confirm::EndQuiz);
        }
    }

    pub fn end_quiz(&mut self, now: Instant) {
        self.confirm = None;
        if let Some(session) = self.session.as_mut() {
            let transition = session.handle(SessionEvent::EndQuiz, now);
            self.after_transition(transition);
        }
    }

    fn after_transition(&mut self, transition: Transition) {
        match transition {
            Transition::NextQuestion { .. } => {
                if let Some(session) = &self.session {
                    self.draft = Some(AnswerDraft::for_question(
                        session.current_question(),
                        &mut self.rng,
                    ));
                }
                self.answer_input.clear();
            }
            Transition::Finished => {
                if let Some(result) = self.session.as_ref().map(|s| s.result()) {
                    self.dispatch(FlowEvent::QuizFinished(result));
                }
            }
            Transition::Submitted(verdict) => log::debug!("answer: {verdict:?}"),
            Transition::Ticked { .. } | Transition::Ignored => {}
        }
    }

    // Bank browsing and high scores

    pub fn refresh_bank_view(&mut self) {
        self.bank_view = self
            .bank
            .get_filtered(self.flow.selected_grade, self.flow.selected_difficulty);
    }

    pub fn refresh_scores_view(&mut self) {
        self.scores_view = self.scores.get_all();
    }

    /// 1-based place of the last recorded score on the table.
    pub fn recorded_rank(&self) -> Option<usize> {
        let id = self.recorded_score.as_ref()?.id;
        self.scores_view.iter().position(|s| s.id == id).map(|i| i + 1)
    }

    pub fn request_clear(&mut self) {
        self.confirm = match self.flow.screen {
            Screen::BankBrowse if !self.bank_view.is_empty() => Some(Confirm::ClearBank),
            Screen::HighScores if !self.scores_view.is_empty() => Some(Confirm::ClearScores),
            _ => None,
        };
    }

    /// Answer the pending y/n prompt.
    pub fn resolve_confirm(&mut self, yes: bool, now: Instant) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        if !yes {
            return;
        }
        match confirm {
            Confirm::ClearBank => {
                self.bank
                    .clear_filtered(self.flow.selected_grade, self.flow.selected_difficulty);
                self.refresh_bank_view();
                self.scroll = 0;
            }
            Confirm::ClearScores => {
                self.scores.clear_all();
                self.refresh_scores_view();
                self.scroll = 0;
            }
            Confirm::EndQuiz => self.end_quiz(now),
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Purge the stores on the way out when configured to.
    pub fn shutdown(&mut self) {
        if self.config.purge_stores {
            self.bank.clear_all();
            self.scores.clear_all();
        }
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::Generate { .. } => "generate",
        Effect::SaveToBank { .. } => "save to bank",
        Effect::LoadBankCandidates { .. } => "load bank candidates",
        Effect::StartSession { .. } => "start session",
        Effect::RecordHighScore { .. } => "record high score",
        Effect::InvalidateCredentials => "invalidate credentials",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryStore;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_form_grade_change_resets_topic() {
        let mut form = QuizForm::from_config(&config());
        form.field = FormField::Topic;
        form.cycle_forward();
        form.cycle_forward();
        assert_eq!(form.topic().as_deref(), Some("Games & Hobbies"));

        form.field = FormField::Grade;
        form.cycle_forward();
        assert_eq!(form.grade, Grade::Six);
        assert_eq!(form.topic().as_deref(), Some("Life"));
    }

    #[test]
    fn test_form_custom_topic() {
        let mut form = QuizForm::from_config(&config());
        form.field = FormField::Topic;
        form.cycle_backward();
        assert_eq!(form.topic, TopicChoice::Custom);
        assert!(form.request().is_none());

        form.custom_topic.set("  Space travel ");
        let request = form.request().unwrap();
        assert_eq!(request.topic, "Space travel");
        form.cycle_forward();
        assert_eq!(form.topic, TopicChoice::Catalog(0));
    }

    #[test]
    fn test_form_count_is_bounded() {
        let mut form = QuizForm::from_config(&config());
        form.field = FormField::Count;
        for _ in 0..20 {
            form.cycle_forward();
        }
        assert_eq!(form.count, MAX_QUESTION_COUNT);
        for _ in 0..20 {
            form.cycle_backward();
        }
        assert_eq!(form.count, 1);
    }

    #[test]
    fn test_gemini_without_key_opens_credentials() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut app = App::new(AppParts {
            config: config(),
            theme: Box::leak(Box::new(Theme::default())),
            store,
            provider: ProviderSetup::Gemini(GeminiSettings {
                api_key: String::new(),
                model: "gemini-2.5-flash".to_string(),
                base_url: "https://example.invalid".to_string(),
                timeout: Duration::from_secs(5),
                temperature: 0.8,
            }),
            api_key: None,
        });
        assert_eq!(app.screen(), Screen::Credentials);

        // A blank key is refused.
        app.submit_credentials();
        assert_eq!(app.screen(), Screen::Credentials);

        app.key_input.set("my-key");
        app.submit_credentials();
        assert_eq!(app.screen(), Screen::Welcome);
        assert_eq!(app.credentials.get().as_deref(), Some("my-key"));
    }

    #[test]
    fn test_stored_key_is_used_and_stores_are_purged() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        CredentialStore::new(store.clone()).save("stored-key");
        QuestionBank::new(store.clone()).append(
            &[crate::session::question::QuizQuestion::FillInTheBlank {
                question: "I ___".to_string(),
                correct_answer: "am".to_string(),
            }],
            Grade::Five,
            "Health",
            Difficulty::Easy,
        );

        let app = App::new(AppParts {
            config: config(),
            theme: Box::leak(Box::new(Theme::default())),
            store: store.clone(),
            provider: ProviderSetup::Gemini(GeminiSettings {
                api_key: String::new(),
                model: "m".to_string(),
                base_url: "https://example.invalid".to_string(),
                timeout: Duration::from_secs(5),
                temperature: 0.8,
            }),
            api_key: None,
        });
        assert_eq!(app.screen(), Screen::Welcome);
        assert!(QuestionBank::new(store).get_all().is_empty());
    }
}
