use actix_web::{get, http::header::CONTENT_TYPE, post, web, HttpRequest, HttpResponse};
use futures::StreamExt;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::ActiveSession,
    errors::{AppError, AppResult},
    models::dto::{
        request::UploadQuery,
        response::{ExamView, Page},
    },
    services::backend_client::UploadFile,
};

/// Buffers the request body, failing as soon as it grows past `limit`.
async fn read_upload(mut payload: web::Payload, limit: usize) -> AppResult<Vec<u8>> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|e| AppError::ValidationError(format!("Upload could not be read: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the limit of {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.to_vec())
}

/// The file is the raw request body; its `Content-Type` is the file's MIME type.
#[post("/upload")]
pub async fn upload_file(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    payload: web::Payload,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.validate()?;
    state.exam_session_service.ensure_idle().await?;
    let bytes = read_upload(payload, state.config.max_upload_bytes).await?;

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let file = UploadFile {
        file_name: query.filename.clone(),
        content_type,
        bytes,
    };

    let questions = state
        .upload_service
        .generate_exam(file, query.exam_setting(), &session.0)
        .await?;
    let snapshot = state.exam_session_service.load_exam(questions).await?;

    Ok(HttpResponse::Created().json(Page::new(Some(&session.0.email), ExamView::from(&snapshot))))
}

#[get("/upload/preview")]
pub async fn upload_preview(
    state: web::Data<AppState>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    match state.upload_service.preview(&session.0).await? {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type("application/pdf")
            .body(bytes)),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}
