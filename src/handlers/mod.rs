pub mod auth_handler;
pub mod exam_handler;
pub mod history_handler;
pub mod upload_handler;

use actix_web::web;

use crate::{app_state::AppState, auth::SessionGate};

pub use auth_handler::{health_check, login, login_status, logout};

/// Registers shared state and every route. Everything except sign-in and
/// health sits behind the session gate.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(state.session.clone()))
            .app_data(state.clone())
            .service(health_check)
            .service(login_status)
            .service(login)
            .service(
                web::scope("")
                    .wrap(SessionGate)
                    .service(logout)
                    .service(exam_handler::home)
                    .service(exam_handler::upload_page)
                    .service(upload_handler::upload_preview)
                    .service(upload_handler::upload_file)
                    .service(exam_handler::record_answer)
                    .service(exam_handler::submit_exam)
                    .service(exam_handler::toggle_explanations)
                    .service(exam_handler::reset_exam)
                    .service(exam_handler::discuss_question)
                    .service(history_handler::history_page)
                    .service(history_handler::reload_history)
                    .service(history_handler::toggle_record)
                    .service(history_handler::toggle_answers)
                    .service(history_handler::delete_record),
            );
    }
}
