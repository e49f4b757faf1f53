use std::convert::Infallible;

use axum::Json;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::error::AppError;
use crate::models::{EnrolledCourse, Enrollment};
use crate::services::{CatalogPage, CatalogService, CourseDetail, CourseFilter, EnrollmentService};
use crate::state::AppState;

/// Identity handed down by the upstream auth layer. Absent or blank header
/// means an anonymous request; the workflows decide whether that rejects.
pub struct CurrentUser(pub Option<String>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        Ok(CurrentUser(user))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(catalog))
        .route("/courses/{id}", get(course_detail))
        .route("/courses/{id}/enroll", post(enroll))
        .route("/me/courses", get(my_courses))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn catalog(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Result<Json<CatalogPage>, AppError> {
    let service = CatalogService::new(state.db.clone(), state.cache.clone());
    let page = service.catalog(&filter).await?;
    Ok(Json(page))
}

async fn course_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CourseDetail>, AppError> {
    let service = EnrollmentService::new(state.db.clone());
    let detail = service.course_detail(id).await?;
    Ok(Json(detail))
}

async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let service = EnrollmentService::new(state.db.clone());
    let enrollment = service.enroll(user.as_deref(), id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn my_courses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<EnrolledCourse>>, AppError> {
    let service = EnrollmentService::new(state.db.clone());
    let courses = service.my_courses(user.as_deref()).await?;
    Ok(Json(courses))
}
