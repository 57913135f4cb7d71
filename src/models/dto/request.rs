use serde::Deserialize;
use validator::Validate;

use crate::models::dto::api::ExamSetting;

/// Query string of `POST /upload`; the file itself is the request body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UploadQuery {
    #[validate(length(min = 1, max = 255))]
    pub filename: Option<String>,

    #[validate(range(max = 100))]
    pub multiple_choice: Option<u32>,

    #[validate(range(max = 100))]
    pub short_answer: Option<u32>,

    #[validate(range(max = 100))]
    pub essay: Option<u32>,

    #[validate(range(min = 1, max = 100))]
    pub exam_number: Option<u32>,

    #[validate(length(max = 2000))]
    pub custom_prompt: Option<String>,

    #[validate(length(max = 2000))]
    pub custom_image_prompt: Option<String>,

    pub text_centered: Option<bool>,

    pub lecture_only: Option<bool>,
}

impl UploadQuery {
    pub fn exam_setting(&self) -> ExamSetting {
        let defaults = ExamSetting::default();
        ExamSetting {
            multiple_choice: self.multiple_choice.unwrap_or(defaults.multiple_choice),
            short_answer: self.short_answer.unwrap_or(defaults.short_answer),
            essay: self.essay.unwrap_or(defaults.essay),
            exam_number: self.exam_number.unwrap_or(defaults.exam_number),
            custom_prompt: self.custom_prompt.clone().unwrap_or_default(),
            custom_image_prompt: self.custom_image_prompt.clone().unwrap_or_default(),
            is_text_centered: self.text_centered.unwrap_or(defaults.is_text_centered),
            is_lecture_only: self.lecture_only.unwrap_or(defaults.is_lecture_only),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HistoryPageQuery {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
}

impl HistoryPageQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }
}
