use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::LOCATION,
    web, Error, FromRequest, HttpRequest, HttpResponse,
};
use futures::future::LocalBoxFuture;

use crate::{
    auth::session::{Session, SessionContext},
    errors::AppError,
};

pub const LOGIN_PATH: &str = "/login";

/// Redirects requests to the login flow unless someone is signed in.
pub struct SessionGate;

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let signed_in = req
                .app_data::<web::Data<SessionContext>>()
                .and_then(|context| context.current())
                .is_some();

            if !signed_in {
                log::info!("Redirecting unauthenticated request for {} to {}", req.path(), LOGIN_PATH);
                let redirect = HttpResponse::Found()
                    .insert_header((LOCATION, LOGIN_PATH))
                    .finish()
                    .map_into_right_body();
                return Ok(req.into_response(redirect));
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Extractor for the signed-in session in handlers.
pub struct ActiveSession(pub Session);

impl FromRequest for ActiveSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let session = req
            .app_data::<web::Data<SessionContext>>()
            .and_then(|context| context.current())
            .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()));

        ready(session.map(ActiveSession))
    }
}
