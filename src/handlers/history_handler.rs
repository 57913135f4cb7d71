use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::ActiveSession,
    errors::AppError,
    models::dto::{
        request::HistoryPageQuery,
        response::{MessageResponse, Page, ToggleResponse},
    },
};

#[get("/checklist")]
pub async fn history_page(
    state: web::Data<AppState>,
    query: web::Query<HistoryPageQuery>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    query.validate()?;

    let view = state.history_service.page(&session.0, query.page()).await?;
    Ok(HttpResponse::Ok().json(Page::new(Some(&session.0.email), view)))
}

#[post("/checklist/reload")]
pub async fn reload_history(
    state: web::Data<AppState>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let view = state.history_service.reload(&session.0).await?;
    Ok(HttpResponse::Ok().json(Page::new(Some(&session.0.email), view)))
}

#[post("/checklist/{id}/toggle")]
pub async fn toggle_record(
    state: web::Data<AppState>,
    id: web::Path<String>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let value = state.history_service.toggle_expanded(&session.0, &id).await?;
    Ok(HttpResponse::Ok().json(ToggleResponse { id, value }))
}

#[post("/checklist/{id}/answers")]
pub async fn toggle_answers(
    state: web::Data<AppState>,
    id: web::Path<String>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let value = state.history_service.toggle_answers(&session.0, &id).await?;
    Ok(HttpResponse::Ok().json(ToggleResponse { id, value }))
}

#[delete("/checklist/{id}")]
pub async fn delete_record(
    state: web::Data<AppState>,
    id: web::Path<String>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    state.history_service.delete(&session.0, &id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Exam record '{}' deleted", id),
    }))
}
