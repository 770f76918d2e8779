use std::time::{Duration, Instant};

use thiserror::Error;

use crate::engine::grading;
use crate::engine::scoring;
use crate::session::answer::Answer;
use crate::session::question::QuizQuestion;
use crate::session::result::SessionResult;
use crate::session::timer::{Deadline, Ticker};

/// Seconds on the clock for every question.
pub const QUESTION_TIME_SECS: u32 = 40;
/// How long feedback stays on screen before the next question.
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1500);

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    NoQuestions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    TimedOut,
}

impl Verdict {
    pub fn headline(self) -> &'static str {
        match self {
            Verdict::Correct => "Correct!",
            Verdict::Incorrect => "Incorrect.",
            Verdict::TimedOut => "Time's up!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub verdict: Verdict,
    pub points: u32,
    /// What the player submitted; `None` on timeout.
    pub answer: Option<Answer>,
    pub correct_answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingAnswer { time_left: u32 },
    Submitted { feedback: Feedback },
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// One second of the question clock has passed.
    SecondElapsed,
    Submit(Answer),
    /// The feedback delay after a submission is over.
    FeedbackElapsed,
    /// The player ended the quiz early.
    EndQuiz,
}

/// What a handled event did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The event does not apply in the current phase.
    Ignored,
    Ticked { time_left: u32 },
    Submitted(Verdict),
    NextQuestion { index: usize },
    Finished,
}

/// An in-progress quiz over a fixed, ordered list of questions.
///
/// `handle` is the transition function; `poll_clock` turns the scheduled
/// per-question ticker and the feedback delay into events. Both scheduled
/// tasks are cancelled on every exit from the phase that owns them.
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    index: usize,
    score: u32,
    correct_count: usize,
    phase: Phase,
    ticker: Ticker,
    feedback_delay: Deadline,
    ended_early: bool,
}

impl QuizSession {
    pub fn start(questions: Vec<QuizQuestion>, now: Instant) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            questions,
            index: 0,
            score: 0,
            correct_count: 0,
            phase: Phase::AwaitingAnswer {
                time_left: QUESTION_TIME_SECS,
            },
            ticker: Ticker::start(TICK_PERIOD, now),
            feedback_delay: Deadline::default(),
            ended_early: false,
        })
    }

    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> Transition {
        if matches!(event, SessionEvent::Submit(_))
            && matches!(self.phase, Phase::AwaitingAnswer { .. })
        {
            // Seconds already due at `now` run first; an answer after expiry is a timeout.
            let caught_up = self.poll_clock(now);
            if let Some(expired @ Transition::Submitted(_)) = caught_up.last().copied() {
                return expired;
            }
        }
        match (&self.phase, event) {
            (Phase::Finished, _) => Transition::Ignored,
            (_, SessionEvent::EndQuiz) => {
                self.ended_early = true;
                self.finish();
                Transition::Finished
            }
            (Phase::AwaitingAnswer { time_left }, SessionEvent::SecondElapsed) => {
                let time_left = time_left.saturating_sub(1);
                if time_left == 0 {
                    self.submit(None, now)
                } else {
                    self.phase = Phase::AwaitingAnswer { time_left };
                    Transition::Ticked { time_left }
                }
            }
            (Phase::AwaitingAnswer { .. }, SessionEvent::Submit(answer)) => {
                self.submit(Some(answer), now)
            }
            (Phase::Submitted { .. }, SessionEvent::FeedbackElapsed) => self.advance(now),
            _ => Transition::Ignored,
        }
    }

    /// Fire whatever scheduled work is due at `now`.
    pub fn poll_clock(&mut self, now: Instant) -> Vec<Transition> {
        let mut transitions = Vec::new();
        match self.phase {
            Phase::AwaitingAnswer { .. } => {
                for _ in 0..self.ticker.poll(now) {
                    let transition = self.handle(SessionEvent::SecondElapsed, now);
                    transitions.push(transition);
                    if !matches!(transition, Transition::Ticked { .. }) {
                        break;
                    }
                }
            }
            Phase::Submitted { .. } => {
                if self.feedback_delay.fired(now) {
                    transitions.push(self.handle(SessionEvent::FeedbackElapsed, now));
                }
            }
            Phase::Finished => {}
        }
        transitions
    }

    /// `None` is the timeout path: always incorrect, never any points.
    fn submit(&mut self, answer: Option<Answer>, now: Instant) -> Transition {
        let Phase::AwaitingAnswer { time_left } = self.phase else {
            return Transition::Ignored;
        };
        let question = &self.questions[self.index];

        let (verdict, points) = match &answer {
            None => (Verdict::TimedOut, 0),
            Some(a) if grading::is_correct(question, a) => {
                (Verdict::Correct, scoring::points_for_correct(time_left))
            }
            Some(_) => (Verdict::Incorrect, 0),
        };

        if verdict == Verdict::Correct {
            self.score += points;
            self.correct_count += 1;
        }

        let feedback = Feedback {
            verdict,
            points,
            answer,
            correct_answer: grading::correct_answer_text(question),
        };
        self.ticker.cancel();
        self.feedback_delay = Deadline::after(FEEDBACK_DELAY, now);
        self.phase = Phase::Submitted { feedback };
        Transition::Submitted(verdict)
    }

    fn advance(&mut self, now: Instant) -> Transition {
        self.feedback_delay.cancel();
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.phase = Phase::AwaitingAnswer {
                time_left: QUESTION_TIME_SECS,
            };
            self.ticker = Ticker::start(TICK_PERIOD, now);
            Transition::NextQuestion { index: self.index }
        } else {
            self.finish();
            Transition::Finished
        }
    }

    fn finish(&mut self) {
        self.ticker.cancel();
        self.feedback_delay.cancel();
        self.phase = Phase::Finished;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn question_number(&self) -> usize {
        self.index + 1
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn time_left(&self) -> u32 {
        match self.phase {
            Phase::AwaitingAnswer { time_left } => time_left,
            _ => 0,
        }
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        match &self.phase {
            Phase::Submitted { feedback } => Some(feedback),
            _ => None,
        }
    }

    pub fn timer_running(&self) -> bool {
        self.ticker.is_active()
    }

    pub fn result(&self) -> SessionResult {
        SessionResult {
            score: self.score,
            correct_answers: self.correct_count,
            total_questions: self.questions.len(),
            ended_early: self.ended_early,
        }
    }
}
