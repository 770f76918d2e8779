use rand::seq::SliceRandom;
use rust_embed::Embed;

use crate::catalog::QuestionType;
use crate::generator::{GenerationRequest, ProviderError, QuestionProvider, parse_questions};
use crate::session::question::QuizQuestion;

#[derive(Embed)]
#[folder = "assets/samples/"]
struct SampleAssets;

/// Offline provider drawing from a small embedded question set, one file
/// per question type. Ignores grade, topic and difficulty.
#[derive(Default)]
pub struct SampleProvider;

impl SampleProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn pool(question_type: QuestionType) -> Result<Vec<QuizQuestion>, ProviderError> {
        let filename = format!("{}.json", question_type.as_str());
        let file = SampleAssets::get(&filename)
            .ok_or_else(|| ProviderError::Malformed(format!("missing sample set {filename}")))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        parse_questions(content, question_type)
    }
}

impl QuestionProvider for SampleProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<QuizQuestion>, ProviderError> {
        let mut pool = Self::pool(request.question_type)?;
        pool.shuffle(&mut rand::thread_rng());
        pool.truncate(request.count);
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, Grade};

    #[test]
    fn test_every_type_has_samples() {
        for t in QuestionType::ALL {
            let pool = SampleProvider::pool(t).unwrap();
            assert!(pool.len() >= 5, "{t} has only {} samples", pool.len());
            assert!(pool.iter().all(|q| q.kind() == t && q.is_well_formed()));
        }
    }

    #[test]
    fn test_generate_respects_count() {
        let provider = SampleProvider::new();
        let request = GenerationRequest {
            grade: Grade::Six,
            topic: "Life".to_string(),
            difficulty: Difficulty::Medium,
            question_type: QuestionType::FillInTheBlank,
            count: 3,
        };
        let qs = provider.generate(&request).unwrap();
        assert_eq!(qs.len(), 3);
    }
}
