use actix_identity::Identity;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};

use crate::forms::auth::{LoginForm, LoginFormPayload};
use crate::middleware::LOGIN_PATH;
use crate::models::config::ServerConfig;
use crate::routes::error_response;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Sign in</title></head>
<body>
<form method="post" action="/login">
<input type="email" name="email" placeholder="Email" required>
<input type="password" name="password" placeholder="Password" required>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#;

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[get("/login")]
pub async fn login_page(identity: Option<Identity>) -> impl Responder {
    if identity.is_some() {
        return see_other("/test-sets");
    }
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(LOGIN_PAGE)
}

#[post("/login")]
pub async fn login(
    request: HttpRequest,
    form: web::Form<LoginForm>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let payload: LoginFormPayload = match form.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    if !payload.matches(&server_config.admin_email, &server_config.admin_password) {
        log::warn!("Failed sign in attempt for {}", payload.email);
        return error_response(StatusCode::UNAUTHORIZED, "invalid email or password");
    }

    if let Err(e) = Identity::login(&request.extensions(), payload.email.clone()) {
        log::error!("Failed to start session for {}: {e}", payload.email);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to start session");
    }

    log::info!("Signed in {}", payload.email);
    see_other("/test-sets")
}

#[post("/logout")]
pub async fn logout(identity: Identity) -> impl Responder {
    identity.logout();
    see_other(LOGIN_PATH)
}
