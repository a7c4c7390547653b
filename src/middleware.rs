//! Session handling shared by every route.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::{Error, FromRequest, HttpRequest, HttpResponse};

use crate::domain::auth::AuthenticatedUser;

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";

fn is_public(path: &str) -> bool {
    path == LOGIN_PATH
}

/// Let requests through only when a session identity is present.
///
/// Anything else, apart from the login page itself, gets a temporary
/// redirect to [`LOGIN_PATH`].
pub async fn require_session<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    if is_public(req.path()) || req.get_identity().is_ok() {
        let res = next.call(req).await?;
        return Ok(res.map_into_left_body());
    }

    log::debug!("Redirecting unauthenticated request for {}", req.path());
    let response = HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .finish();
    Ok(req.into_response(response).map_into_right_body())
}

fn user_from_request(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let identity = req
        .get_identity()
        .map_err(|_| actix_web::error::ErrorUnauthorized("not authenticated"))?;
    let email = identity.id().map_err(|e| {
        log::warn!("Session identity could not be read: {e}");
        actix_web::error::ErrorUnauthorized("not authenticated")
    })?;

    Ok(AuthenticatedUser {
        sub: email.clone(),
        email,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(user_from_request(req))
    }
}
