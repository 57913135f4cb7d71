use serde::{Deserialize, Deserializer, Serialize};

/// Outcome for one question. `feedback` is only kept when the answer was wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub index: u32,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl GradeResult {
    pub fn new(index: u32, is_correct: bool, feedback: Option<String>) -> Self {
        Self {
            index,
            is_correct,
            feedback: if is_correct { None } else { feedback },
        }
    }

    pub fn correctness(&self) -> Correctness {
        if self.is_correct {
            Correctness::Correct
        } else {
            Correctness::Incorrect
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correctness {
    Correct,
    Incorrect,
}

/// Number of correct results.
pub fn score(results: &[GradeResult]) -> u32 {
    results.iter().filter(|r| r.is_correct).count() as u32
}

/// The grading service reports correctness as `true`/`false` or `1`/`0`.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(1) => Ok(true),
        Flag::Int(0) => Ok(false),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "expected 0 or 1 for isCorrect, got {}",
            other
        ))),
    }
}
