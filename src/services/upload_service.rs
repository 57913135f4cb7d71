use std::sync::Arc;

use crate::{
    auth::Session,
    errors::{AppError, AppResult},
    models::{
        domain::Question,
        dto::api::{into_questions, ExamSetting},
    },
    services::{
        backend_client::{ExamBackend, UploadFile},
        blob_store::{pdf_blob_path, BlobStore},
    },
};

pub struct UploadService {
    backend: Arc<dyn ExamBackend>,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
}

impl UploadService {
    pub fn new(backend: Arc<dyn ExamBackend>, blobs: Arc<dyn BlobStore>, max_upload_bytes: usize) -> Self {
        Self {
            backend,
            blobs,
            max_upload_bytes,
        }
    }

    /// Checks size and type locally, then asks the generation service for an
    /// exam. Nothing is sent when a local check fails.
    pub async fn generate_exam(
        &self,
        file: UploadFile,
        setting: ExamSetting,
        session: &Session,
    ) -> AppResult<Vec<Question>> {
        if file.bytes.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File is {} bytes; the limit is {} bytes",
                file.bytes.len(),
                self.max_upload_bytes
            )));
        }
        if file.bytes.is_empty() {
            return Err(AppError::ValidationError("Uploaded file is empty".to_string()));
        }
        let kind = file.kind()?;

        let setting = setting.normalized();
        log::info!(
            "Generating exam from {:?} upload for {} ({} multiple choice, {} short answer)",
            kind,
            session.email,
            setting.multiple_choice,
            setting.short_answer
        );

        let generated = self
            .backend
            .generate_exam(&file, &setting, session.bearer())
            .await
            .map_err(|e| {
                log::error!("Exam generation failed: {}", e);
                e
            })?;

        if generated.is_empty() {
            return Err(AppError::Transport(
                "Exam generation returned no questions".to_string(),
            ));
        }

        Ok(into_questions(generated))
    }

    /// The PDF this user uploaded earlier, if the blob store still has it.
    pub async fn preview(&self, session: &Session) -> AppResult<Option<Vec<u8>>> {
        let path = pdf_blob_path(session.email_local_part());
        self.blobs.download(&path, session.bearer()).await
    }

    /// Best effort; failures are only logged.
    pub async fn discard_uploaded_file(&self, session: &Session) {
        let path = pdf_blob_path(session.email_local_part());
        if let Err(e) = self.blobs.delete(&path, session.bearer()).await {
            log::warn!("Could not delete uploaded file {}: {}", path, e);
        }
    }
}
