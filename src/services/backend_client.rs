use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::{
    errors::{AppError, AppResult},
    models::dto::api::{ExamSetting, GeneratedQuestion, GradeResponseItem, GradingRequest},
};

/// Which generation endpoint a file goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Image,
}

impl UploadKind {
    pub fn from_mime(content_type: &str) -> AppResult<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "application/pdf" {
            Ok(UploadKind::Pdf)
        } else if mime.starts_with("image/") && mime.len() > "image/".len() {
            Ok(UploadKind::Image)
        } else {
            Err(AppError::ValidationError(format!(
                "Unsupported file type '{}': upload a PDF or an image",
                content_type
            )))
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            UploadKind::Pdf => "/upload/pdf",
            UploadKind::Image => "/upload/image",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            UploadKind::Pdf => "upload.pdf",
            UploadKind::Image => "upload.img",
        }
    }
}

/// A file as received from the user.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn kind(&self) -> AppResult<UploadKind> {
        UploadKind::from_mime(&self.content_type)
    }

    pub fn part_name(&self) -> AppResult<String> {
        let kind = self.kind()?;
        Ok(self
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| kind.default_file_name().to_string()))
    }
}

/// The generation and grading API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamBackend: Send + Sync {
    async fn generate_exam(
        &self,
        file: &UploadFile,
        setting: &ExamSetting,
        bearer: &str,
    ) -> AppResult<Vec<GeneratedQuestion>>;

    async fn grade_exam(
        &self,
        request: &GradingRequest,
        bearer: &str,
    ) -> AppResult<Vec<GradeResponseItem>>;
}

pub struct HttpExamBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExamBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Turns a non-2xx reply into a transport error carrying the body text.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    what: &str,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read response body".to_string());
    log::error!("{} failed with status {}: {}", what, status, body);
    Err(AppError::Transport(format!("{} returned {}: {}", what, status, body)))
}

#[async_trait]
impl ExamBackend for HttpExamBackend {
    async fn generate_exam(
        &self,
        file: &UploadFile,
        setting: &ExamSetting,
        bearer: &str,
    ) -> AppResult<Vec<GeneratedQuestion>> {
        let kind = file.kind()?;
        let url = format!("{}{}", self.base_url, kind.path());

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.part_name()?)
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("examSetting", serde_json::to_string(setting)?);

        log::info!("Requesting exam generation from {} ({} bytes)", url, file.bytes.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(bearer)
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response, "Exam generation").await?;

        let generated: Vec<GeneratedQuestion> = response.json().await.map_err(|e| {
            AppError::Transport(format!("Malformed exam generation response: {}", e))
        })?;
        log::info!("Exam generation returned {} questions", generated.len());
        Ok(generated)
    }

    async fn grade_exam(
        &self,
        request: &GradingRequest,
        bearer: &str,
    ) -> AppResult<Vec<GradeResponseItem>> {
        let url = format!("{}/feedback/", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(bearer)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response, "Grading").await?;

        response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Malformed grading response: {}", e)))
    }
}
