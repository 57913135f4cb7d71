use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Answer, GradeResult, SubmissionPackage},
        dto::api::{GradeResponseItem, GradingItem, GradingRequest, SubmittedAnswer},
    },
    services::backend_client::ExamBackend,
};

static LEADING_ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)").expect("leading ordinal pattern is valid"));

/// Reduces a choice label such as `"3. Ribosome"` to its number. Labels
/// without a leading number fall back to the 1-based position.
pub fn parse_choice_ordinal(label: &str, position: usize) -> u32 {
    LEADING_ORDINAL
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(position as u32 + 1)
}

pub fn build_grading_request(package: &SubmissionPackage) -> AppResult<GradingRequest> {
    let results = package
        .questions
        .iter()
        .map(|question| {
            let answer = package.answers.get(&question.id).ok_or_else(|| {
                AppError::InvalidState(format!(
                    "Question {} has no answer in the submission",
                    question.id + 1
                ))
            })?;

            let user_answer = match answer {
                Answer::Choice(position) => {
                    let label = question.choice_label(*position).unwrap_or_default();
                    SubmittedAnswer::Ordinal(parse_choice_ordinal(label, *position))
                }
                Answer::Text(text) => SubmittedAnswer::Text(text.clone()),
            };

            Ok(GradingItem {
                index: question.id,
                question: question.prompt.clone(),
                choices: question.choices.clone(),
                correct_answer: question.correct_answer.clone(),
                user_answer,
                explanation: question.explanation.clone(),
                intent: question.intent.clone(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(GradingRequest { results })
}

/// Checks that the reply grades every submitted question exactly once and
/// returns the results in question order.
pub fn map_grades(
    package: &SubmissionPackage,
    items: Vec<GradeResponseItem>,
) -> AppResult<Vec<GradeResult>> {
    let expected: BTreeSet<u32> = package.questions.iter().map(|q| q.id).collect();
    let mut graded: BTreeMap<u32, GradeResult> = BTreeMap::new();

    for item in items {
        if !expected.contains(&item.index) {
            return Err(AppError::Transport(format!(
                "Grading reply refers to unknown question index {}",
                item.index
            )));
        }
        let index = item.index;
        if graded.insert(index, GradeResult::from(item)).is_some() {
            return Err(AppError::Transport(format!(
                "Grading reply grades question index {} more than once",
                index
            )));
        }
    }

    if graded.len() != expected.len() {
        let missing: Vec<String> = expected
            .iter()
            .filter(|id| !graded.contains_key(id))
            .map(|id| id.to_string())
            .collect();
        return Err(AppError::Transport(format!(
            "Grading reply is missing question indexes {}",
            missing.join(", ")
        )));
    }

    Ok(graded.into_values().collect())
}

pub struct GradingService {
    backend: Arc<dyn ExamBackend>,
}

impl GradingService {
    pub fn new(backend: Arc<dyn ExamBackend>) -> Self {
        Self { backend }
    }

    pub async fn grade(&self, package: &SubmissionPackage, bearer: &str) -> AppResult<Vec<GradeResult>> {
        let request = build_grading_request(package)?;
        let items = self.backend.grade_exam(&request, bearer).await?;
        map_grades(package, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::SessionSnapshot;
    use crate::services::backend_client::MockExamBackend;
    use crate::test_utils::fixtures::sample_questions;

    fn package() -> SubmissionPackage {
        let mut snapshot = SessionSnapshot::with_exam(sample_questions()).unwrap();
        snapshot.record_answer(0, Answer::Choice(1)).unwrap();
        snapshot
            .record_answer(1, Answer::Text("Chlorophyll".to_string()))
            .unwrap();
        snapshot.record_answer(2, Answer::Choice(3)).unwrap();
        snapshot.begin_submission().unwrap()
    }

    fn item(index: u32, is_correct: bool) -> GradeResponseItem {
        GradeResponseItem {
            index,
            is_correct,
            feedback: Some(format!("note {}", index)),
        }
    }

    #[test]
    fn ordinal_comes_from_label_prefix() {
        assert_eq!(parse_choice_ordinal("3. Ribosome", 0), 3);
        assert_eq!(parse_choice_ordinal("  12) Twelve", 0), 12);
    }

    #[test]
    fn ordinal_falls_back_to_position() {
        assert_eq!(parse_choice_ordinal("Ribosome", 2), 3);
        assert_eq!(parse_choice_ordinal("", 0), 1);
    }

    #[test]
    fn request_reduces_choices_and_keeps_text() {
        let request = build_grading_request(&package()).unwrap();

        assert_eq!(request.results.len(), 3);
        assert_eq!(request.results[0].user_answer, SubmittedAnswer::Ordinal(2));
        assert_eq!(
            request.results[1].user_answer,
            SubmittedAnswer::Text("Chlorophyll".to_string())
        );
        assert_eq!(request.results[2].user_answer, SubmittedAnswer::Ordinal(4));
    }

    #[test]
    fn complete_reply_maps_in_question_order() {
        let results =
            map_grades(&package(), vec![item(2, true), item(0, false), item(1, true)]).unwrap();

        let order: Vec<u32> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(results[0].feedback.as_deref(), Some("note 0"));
        assert_eq!(results[1].feedback, None);
    }

    #[test]
    fn reply_with_unknown_duplicate_or_missing_index_is_rejected() {
        let unknown = map_grades(&package(), vec![item(0, true), item(1, true), item(9, true)]);
        let duplicate = map_grades(&package(), vec![item(0, true), item(0, true), item(1, true)]);
        let missing = map_grades(&package(), vec![item(0, true), item(1, true)]);

        assert!(matches!(unknown, Err(AppError::Transport(_))));
        assert!(matches!(duplicate, Err(AppError::Transport(_))));
        assert!(matches!(missing, Err(AppError::Transport(_))));
    }

    #[tokio::test]
    async fn grade_sends_bearer_and_maps_reply() {
        let mut backend = MockExamBackend::new();
        backend
            .expect_grade_exam()
            .withf(|request, bearer| request.results.len() == 3 && bearer == "token")
            .times(1)
            .returning(|_, _| Ok(vec![item(0, true), item(1, false), item(2, true)]));

        let service = GradingService::new(Arc::new(backend));
        let results = service.grade(&package(), "token").await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(!results[1].is_correct);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let mut backend = MockExamBackend::new();
        backend
            .expect_grade_exam()
            .returning(|_, _| Err(AppError::Transport("connection refused".to_string())));

        let service = GradingService::new(Arc::new(backend));
        let result = service.grade(&package(), "token").await;
        assert!(matches!(result, Err(AppError::Transport(_))));
    }
}
