use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::ActiveSession,
    errors::AppError,
    models::{
        domain::Answer,
        dto::response::{DiscussResponse, ExamView, Page, SubmitResponse},
    },
};

async fn exam_page(state: &AppState, session: &ActiveSession) -> HttpResponse {
    let snapshot = state.exam_session_service.view().await;
    HttpResponse::Ok().json(Page::new(Some(&session.0.email), ExamView::from(&snapshot)))
}

#[get("/")]
pub async fn home(state: web::Data<AppState>, session: ActiveSession) -> HttpResponse {
    exam_page(&state, &session).await
}

#[get("/upload")]
pub async fn upload_page(state: web::Data<AppState>, session: ActiveSession) -> HttpResponse {
    exam_page(&state, &session).await
}

#[put("/exam/answers/{question_id}")]
pub async fn record_answer(
    state: web::Data<AppState>,
    question_id: web::Path<u32>,
    answer: web::Json<Answer>,
    _session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let snapshot = state
        .exam_session_service
        .record_answer(question_id.into_inner(), answer.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ExamView::from(&snapshot)))
}

#[post("/exam/submit")]
pub async fn submit_exam(
    state: web::Data<AppState>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let outcome = state.exam_session_service.submit(&session.0).await?;
    if outcome.persisted {
        state.history_service.clear().await;
    }
    let snapshot = state.exam_session_service.view().await;

    Ok(HttpResponse::Ok().json(SubmitResponse {
        score: outcome.score,
        total: outcome.total,
        record_id: outcome.record_id,
        persisted: outcome.persisted,
        exam: ExamView::from(&snapshot),
    }))
}

#[post("/exam/explanations")]
pub async fn toggle_explanations(
    state: web::Data<AppState>,
    _session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.exam_session_service.toggle_explanations().await?;
    Ok(HttpResponse::Ok().json(ExamView::from(&snapshot)))
}

#[post("/exam/reset")]
pub async fn reset_exam(
    state: web::Data<AppState>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.exam_session_service.reset().await?;
    state.upload_service.discard_uploaded_file(&session.0).await;

    Ok(HttpResponse::Ok().json(Page::new(Some(&session.0.email), ExamView::from(&snapshot))))
}

#[post("/exam/questions/{question_id}/discuss")]
pub async fn discuss_question(
    state: web::Data<AppState>,
    question_id: web::Path<u32>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let (question, answer) = state
        .exam_session_service
        .discussion_subject(question_id.into_inner())
        .await?;
    let (thread_id, message) = state
        .chat_service
        .discuss(&session.0, &question, answer.as_ref())
        .await?;

    Ok(HttpResponse::Accepted().json(DiscussResponse {
        thread_id,
        message: message.message,
    }))
}
