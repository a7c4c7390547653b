use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use serde::Serialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::TestSetId;
use crate::forms::test_sets::{
    TestSetForm, TestSetFormPayload, UpdateTestSetForm, UpdateTestSetFormPayload,
};
use crate::repository::DieselRepository;
use crate::routes::{error_response, service_error_response};
use crate::services::{ServiceError, test_sets};

#[derive(Serialize)]
struct UsageBody {
    in_use: bool,
}

fn parse_id(raw: i32) -> Result<TestSetId, HttpResponse> {
    TestSetId::new(raw).map_err(|_| error_response(StatusCode::NOT_FOUND, "test set not found"))
}

#[get("/test-sets")]
pub async fn list_test_sets(repo: web::Data<DieselRepository>) -> impl Responder {
    HttpResponse::Ok().json(test_sets::list_test_sets(repo.get_ref()))
}

#[get("/test-sets/{id}")]
pub async fn get_test_set(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match test_sets::get_test_set(id, repo.get_ref()) {
        Some(test_set) => HttpResponse::Ok().json(test_set),
        None => service_error_response(&ServiceError::NotFound),
    }
}

#[post("/test-sets")]
pub async fn create_test_set(
    user: AuthenticatedUser,
    form: web::Json<TestSetForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload: TestSetFormPayload = match form.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Rejected test set form: {e}");
            return service_error_response(&ServiceError::from(e));
        }
    };

    match test_sets::create_test_set(
        payload.fields,
        &payload.categories,
        Some(&user),
        repo.get_ref(),
    ) {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => service_error_response(&e),
    }
}

/// Update a test set. The category set is replaced only when the body
/// carries a `categories` list.
#[put("/test-sets/{id}")]
pub async fn update_test_set(
    _user: AuthenticatedUser,
    path: web::Path<i32>,
    form: web::Json<UpdateTestSetForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload: UpdateTestSetFormPayload = match form.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Rejected test set form: {e}");
            return service_error_response(&ServiceError::from(e));
        }
    };

    let result = match &payload.categories {
        Some(categories) => test_sets::update_test_set_with_categories(
            id,
            &payload.changes,
            categories,
            repo.get_ref(),
        ),
        None => test_sets::update_test_set(id, &payload.changes, repo.get_ref()),
    };

    match result {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => service_error_response(&e),
    }
}

#[get("/test-sets/{id}/usage")]
pub async fn test_set_usage(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match test_sets::check_test_set_usage(id, repo.get_ref()) {
        Ok(in_use) => HttpResponse::Ok().json(UsageBody { in_use }),
        Err(e) => service_error_response(&e),
    }
}

#[delete("/test-sets/{id}")]
pub async fn delete_test_set(
    _user: AuthenticatedUser,
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match parse_id(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match test_sets::delete_test_set(id, repo.get_ref()) {
        Ok(outcome) if outcome.success => HttpResponse::Ok().json(outcome),
        Ok(outcome) => HttpResponse::Conflict().json(outcome),
        Err(e) => service_error_response(&e),
    }
}
