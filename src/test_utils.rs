#[cfg(test)]
pub mod fixtures {
    use crate::auth::{Claims, Session};
    use crate::models::domain::{CorrectAnswer, GradeResult, Question, QuestionKind};

    /// A four-option choice question whose correct answer is the second option.
    pub fn choice_question(id: u32) -> Question {
        Question {
            id,
            kind: QuestionKind::Choice,
            prompt: format!("Which organelle produces ATP? ({})", id),
            choices: vec![
                "1. Nucleus".to_string(),
                "2. Mitochondria".to_string(),
                "3. Ribosome".to_string(),
                "4. Golgi apparatus".to_string(),
            ],
            correct_answer: CorrectAnswer::Ordinal(2),
            explanation: "Mitochondria carry out cellular respiration.".to_string(),
            intent: "Recall organelle functions.".to_string(),
        }
    }

    pub fn free_text_question(id: u32) -> Question {
        Question {
            id,
            kind: QuestionKind::FreeText,
            prompt: format!("Name the pigment that absorbs light in plants. ({})", id),
            choices: Vec::new(),
            correct_answer: CorrectAnswer::Text("Chlorophyll".to_string()),
            explanation: "Chlorophyll absorbs red and blue light.".to_string(),
            intent: "Recall photosynthesis basics.".to_string(),
        }
    }

    /// Choice, free text, choice; ids 0..3.
    pub fn sample_questions() -> Vec<Question> {
        vec![choice_question(0), free_text_question(1), choice_question(2)]
    }

    /// One result per question, in order, with feedback only on wrong answers.
    pub fn graded_results(questions: &[Question], correct: &[bool]) -> Vec<GradeResult> {
        questions
            .iter()
            .zip(correct.iter())
            .map(|(q, ok)| {
                let feedback = (!ok).then(|| format!("Review question {}", q.id + 1));
                GradeResult::new(q.id, *ok, feedback)
            })
            .collect()
    }

    pub fn test_session(email: &str) -> Session {
        let claims = Claims::new("uid-test", email, 1);
        Session::from_claims(&claims, "test-id-token")
    }
}
