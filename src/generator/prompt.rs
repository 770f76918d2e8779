use serde_json::{Value, json};

use crate::catalog::QuestionType;
use crate::generator::GenerationRequest;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert English language teacher and curriculum \
designer. Your task is to create high-quality, engaging, and age-appropriate quiz questions for \
students. Strive for creativity and avoid repetitive or stereotypical questions. Each quiz should \
feel fresh and unique.";

/// Pairs requested per matching question. A single matching question still
/// gets four pairs.
pub fn matching_pair_count(count: usize) -> usize {
    if count > 1 { count } else { 4 }
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    let GenerationRequest {
        grade,
        topic,
        difficulty,
        question_type,
        count,
    } = request;
    let kind = question_type.as_str();
    let pairs = matching_pair_count(*count);

    format!(
        r#"Generate {count} high-quality quiz questions for a grade {grade} English language student.
The topic is "{topic}".
The difficulty level must be "{difficulty}".
The question type must be "{kind}".

**General Quality Guidelines:**
- All questions must be clear, unambiguous, and grammatically perfect.
- Questions should be educationally valuable and test meaningful knowledge for the specified grade level.
- Avoid trivial or overly simple questions. The difficulty should be challenging but fair.
- Ensure the content is engaging and relevant to a student of this age.

**Variety Requirement:**
- Ensure the questions are varied in their approach to the topic. For example, if the topic is 'Friendship', don't just ask for definitions. Ask about scenarios, idioms, or feelings related to friendship.
- Each question in this batch should test a different aspect of the topic if possible.

**Instructions for question type "{kind}":**
- 'multiple-choice': Provide exactly 4 options. The correct answer must be clearly correct. The other three options (distractors) must be plausible and common mistakes a student might make, but definitively incorrect. Avoid silly or obviously wrong distractors.
- 'fill-in-the-blank': The 'question' sentence must be natural and contain '___' where the answer should go. The blank should test a specific vocabulary word or grammar concept.
- 'matching': Provide exactly {pairs} pairs of terms and definitions. The terms and definitions should be closely related to the topic to create a meaningful matching challenge.

Return the result as a JSON array of objects, strictly following the provided schema for the '{kind}' type.
Do not include any markdown formatting like ```json. The output must be only the raw JSON array."#
    )
}

/// Response schema for one question of the given type, in the provider's
/// OpenAPI subset.
pub fn question_schema(question_type: QuestionType) -> Value {
    match question_type {
        QuestionType::MultipleChoice => json!({
            "type": "OBJECT",
            "properties": {
                "type": { "type": "STRING" },
                "question": { "type": "STRING" },
                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                "correctAnswer": { "type": "STRING" }
            },
            "required": ["type", "question", "options", "correctAnswer"]
        }),
        QuestionType::FillInTheBlank => json!({
            "type": "OBJECT",
            "properties": {
                "type": { "type": "STRING" },
                "question": {
                    "type": "STRING",
                    "description": "The question sentence with \"___\" for the blank."
                },
                "correctAnswer": { "type": "STRING" }
            },
            "required": ["type", "question", "correctAnswer"]
        }),
        QuestionType::Matching => json!({
            "type": "OBJECT",
            "properties": {
                "type": { "type": "STRING" },
                "question": {
                    "type": "STRING",
                    "description": "The instruction for the matching question, e.g., \"Match the words to their definitions.\""
                },
                "pairs": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "term": { "type": "STRING" },
                            "definition": { "type": "STRING" }
                        },
                        "required": ["term", "definition"]
                    }
                }
            },
            "required": ["type", "question", "pairs"]
        }),
    }
}

pub fn response_schema(question_type: QuestionType) -> Value {
    json!({
        "type": "ARRAY",
        "items": question_schema(question_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, Grade};

    fn request(question_type: QuestionType, count: usize) -> GenerationRequest {
        GenerationRequest {
            grade: Grade::Seven,
            topic: "Wild Animals".to_string(),
            difficulty: Difficulty::Hard,
            question_type,
            count,
        }
    }

    #[test]
    fn test_prompt_carries_parameters() {
        let prompt = build_prompt(&request(QuestionType::FillInTheBlank, 3));
        assert!(prompt.starts_with("Generate 3 high-quality quiz questions for a grade 7"));
        assert!(prompt.contains(r#"The topic is "Wild Animals"."#));
        assert!(prompt.contains(r#"The difficulty level must be "Hard"."#));
        assert!(prompt.contains(r#"The question type must be "fill-in-the-blank"."#));
    }

    #[test]
    fn test_matching_pair_count() {
        assert_eq!(matching_pair_count(1), 4);
        assert_eq!(matching_pair_count(6), 6);
        assert!(build_prompt(&request(QuestionType::Matching, 1)).contains("exactly 4 pairs"));
        assert!(build_prompt(&request(QuestionType::Matching, 7)).contains("exactly 7 pairs"));
    }

    #[test]
    fn test_schema_required_fields_per_type() {
        let required = |t| {
            question_schema(t)["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        };
        assert!(required(QuestionType::MultipleChoice).contains(&"options".to_string()));
        assert!(required(QuestionType::Matching).contains(&"pairs".to_string()));
        assert!(!required(QuestionType::FillInTheBlank).contains(&"options".to_string()));
        assert_eq!(response_schema(QuestionType::Matching)["type"], "ARRAY");
    }
}
