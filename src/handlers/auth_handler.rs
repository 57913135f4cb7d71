use actix_web::{get, post, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;

use crate::{
    app_state::AppState,
    auth::{ActiveSession, Session, SessionContext},
    errors::AppError,
    models::dto::response::{LoginStatusView, MessageResponse, Page},
};

fn status_view(session: Option<&Session>) -> Page<LoginStatusView> {
    Page::new(
        session.map(|s| s.email.as_str()),
        LoginStatusView {
            signed_in: session.is_some(),
            email: session.map(|s| s.email.clone()),
            expires_at: session.map(|s| s.expires_at),
        },
    )
}

#[get("/login")]
pub async fn login_status(context: web::Data<SessionContext>) -> HttpResponse {
    let session = context.current();
    HttpResponse::Ok().json(status_view(session.as_ref()))
}

/// Signs in with an ID token from the auth provider.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    credentials: BearerAuth,
) -> Result<HttpResponse, AppError> {
    let claims = state.jwt_service.validate_token(credentials.token())?;
    let session = Session::from_claims(&claims, credentials.token());

    let previous = state.session.current();
    if previous.as_ref().map(|s| s.user_id.as_str()) != Some(session.user_id.as_str()) {
        state.history_service.clear().await;
    }

    log::info!("Signed in {}", session.email);
    state.session.install(session.clone());
    Ok(HttpResponse::Ok().json(status_view(Some(&session))))
}

#[post("/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    session: ActiveSession,
) -> Result<HttpResponse, AppError> {
    state.session.clear();
    state.history_service.clear().await;

    log::info!("Signed out {}", session.0.email);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Signed out".to_string(),
    }))
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
