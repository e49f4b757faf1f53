use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, EnrolledCourse, Enrollment};

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub available_slots: i64,
}

pub struct EnrollmentService {
    db: SqlitePool,
}

impl EnrollmentService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Enrollment pipeline: authentication, course existence, duplicate,
    /// capacity, schedule overlap, then persist. Stops at the first failing
    /// gate; only the final insert may produce a retryable rejection.
    pub async fn enroll(
        &self,
        user_id: Option<&str>,
        course_id: i64,
    ) -> Result<Enrollment, AppError> {
        let user_id = user_id.ok_or(AppError::NotAuthenticated)?;

        let course = repository::find_course_by_id(&self.db, course_id)
            .await?
            .filter(|c| c.active)
            .ok_or(AppError::NotFound)?;

        if repository::has_live_enrollment(&self.db, course.id, user_id).await? {
            return Err(AppError::Rejected(
                "You are already enrolled in this course.".to_string(),
            ));
        }

        let taken = repository::count_live_enrollments(&self.db, course.id).await?;
        if taken >= i64::from(course.max_capacity) {
            return Err(AppError::Rejected(
                "No slots are available for this course.".to_string(),
            ));
        }

        let enrolled_courses = repository::fetch_user_live_courses(&self.db, user_id).await?;
        if let Some(clash) = enrolled_courses.iter().find(|c| c.overlaps_with(&course)) {
            return Err(AppError::Rejected(format!(
                "This course's schedule overlaps with '{}' ({} - {}).",
                clash.name,
                clash.starts_at.format("%H:%M"),
                clash.ends_at.format("%H:%M"),
            )));
        }

        // The gates above are read-then-write; a concurrent identical
        // request can slip past them and lose the race at the partial
        // unique index instead.
        match repository::insert_enrollment(&self.db, course.id, user_id).await {
            Ok(enrollment) => {
                info!(
                    "user {} enrolled in {} (enrollment {})",
                    user_id, course.code, enrollment.id
                );
                Ok(enrollment)
            }
            Err(e) if is_constraint_violation(&e) => {
                warn!(
                    "enrollment insert lost a constraint race for user {} on {}: {}",
                    user_id, course.code, e
                );
                Err(AppError::Transient(
                    "Could not process your enrollment. Please try again.".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Course page data: the course plus its remaining capacity.
    pub async fn course_detail(&self, course_id: i64) -> Result<CourseDetail, AppError> {
        let course = repository::find_course_by_id(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let taken = repository::count_live_enrollments(&self.db, course.id).await?;
        let available_slots = i64::from(course.max_capacity) - taken;

        Ok(CourseDetail {
            course,
            available_slots,
        })
    }

    /// The user's enrollment history with course data, most recent first.
    pub async fn my_courses(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<EnrolledCourse>, AppError> {
        let user_id = user_id.ok_or(AppError::NotAuthenticated)?;
        Ok(repository::fetch_user_enrollments(&self.db, user_id).await?)
    }
}

fn is_constraint_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation() || db_err.is_check_violation())
}
