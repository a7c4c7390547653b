use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;

use crate::services::ServiceError;

pub mod auth;
pub mod test_sets;

/// JSON body returned with every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        error: message.into(),
    })
}

pub fn service_error_response(err: &ServiceError) -> HttpResponse {
    let status = match err {
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
        ServiceError::Rejected(_) | ServiceError::RolledBack(_) => StatusCode::CONFLICT,
        ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/test-sets"))
        .finish()
}

/// Register every route of the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::logout)
        .service(test_sets::list_test_sets)
        .service(test_sets::create_test_set)
        .service(test_sets::get_test_set)
        .service(test_sets::update_test_set)
        .service(test_sets::delete_test_set)
        .service(test_sets::test_set_usage);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(
            service_error_response(&ServiceError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            service_error_response(&ServiceError::Form("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            service_error_response(&ServiceError::RolledBack("x".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            service_error_response(&ServiceError::Internal).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
