use std::sync::Arc;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::generator::{GenerationRequest, ProviderError, QuestionProvider};
use crate::session::question::QuizQuestion;

pub type GenerationOutcome = Result<Vec<QuizQuestion>, ProviderError>;

/// A provider call running on its own thread. The UI loop polls it with
/// `try_finish` on every tick.
pub struct GenerationJob {
    id: u64,
    started: Instant,
    rx: mpsc::Receiver<GenerationOutcome>,
}

impl GenerationJob {
    pub fn spawn(id: u64, provider: Arc<dyn QuestionProvider>, request: GenerationRequest) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            log::info!(
                "generating {} {} question(s): grade {}, {}, {:?}",
                request.count,
                request.question_type,
                request.grade,
                request.difficulty,
                request.topic
            );
            let outcome = provider.generate(&request);
            // The receiver is gone if the app quit mid-request.
            let _ = tx.send(outcome);
        });
        Self {
            id,
            started: Instant::now(),
            rx,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// `None` while the call is still running.
    pub fn try_finish(&self) -> Option<GenerationOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => {
                match &outcome {
                    Ok(questions) => log::info!(
                        "generation {} finished with {} question(s) in {:.1}s",
                        self.id,
                        questions.len(),
                        self.elapsed().as_secs_f64()
                    ),
                    Err(e) => log::info!("generation {} failed: {e}", self.id),
                }
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ProviderError::Transport(
                "generation worker stopped unexpectedly".to_string(),
            ))),
        }
    }
}
