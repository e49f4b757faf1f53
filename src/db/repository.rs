use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Course, EnrolledCourse, Enrollment, EnrollmentStatus, NewCourse};

pub async fn fetch_active_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, name, credits, max_capacity, starts_at, ends_at, active
         FROM courses
         WHERE active = 1
         ORDER BY code",
    )
    .fetch_all(db)
    .await
}

/// Store-side half of the catalog search: one static statement, each
/// predicate disabled by a NULL bind. `instr` keeps the substring match
/// case-sensitive (SQLite `LIKE` is not, for ASCII).
pub async fn search_active_courses(
    db: &SqlitePool,
    name: Option<&str>,
    credits_min: Option<i32>,
    credits_max: Option<i32>,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, name, credits, max_capacity, starts_at, ends_at, active
         FROM courses
         WHERE active = 1
           AND (?1 IS NULL OR instr(code, ?1) > 0 OR instr(name, ?1) > 0)
           AND (?2 IS NULL OR credits >= ?2)
           AND (?3 IS NULL OR credits <= ?3)
         ORDER BY code",
    )
    .bind(name)
    .bind(credits_min)
    .bind(credits_max)
    .fetch_all(db)
    .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: i64) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, name, credits, max_capacity, starts_at, ends_at, active
         FROM courses
         WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourse) -> Result<Course, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO courses (code, name, credits, max_capacity, starts_at, ends_at, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&req.code)
    .bind(&req.name)
    .bind(req.credits)
    .bind(req.max_capacity)
    .bind(req.starts_at)
    .bind(req.ends_at)
    .bind(req.active)
    .execute(db)
    .await?;

    Ok(Course {
        id: result.last_insert_rowid(),
        code: req.code,
        name: req.name,
        credits: req.credits,
        max_capacity: req.max_capacity,
        starts_at: req.starts_at,
        ends_at: req.ends_at,
        active: req.active,
    })
}

pub async fn count_courses(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
        .fetch_one(db)
        .await
}

/// Live = not cancelled. Cancelled rows keep their history but never count
/// against capacity or uniqueness.
pub async fn count_live_enrollments(db: &SqlitePool, course_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM enrollments WHERE course_id = ?1 AND status <> 'cancelled'",
    )
    .bind(course_id)
    .fetch_one(db)
    .await
}

pub async fn has_live_enrollment(
    db: &SqlitePool,
    course_id: i64,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM enrollments
         WHERE course_id = ?1 AND user_id = ?2 AND status <> 'cancelled'",
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(count > 0)
}

/// Courses the user currently holds a live enrollment in, for the
/// schedule-overlap gate.
pub async fn fetch_user_live_courses(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.code, c.name, c.credits, c.max_capacity, c.starts_at, c.ends_at, c.active
         FROM courses c
         JOIN enrollments e ON e.course_id = c.id
         WHERE e.user_id = ?1 AND e.status <> 'cancelled'",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn insert_enrollment(
    db: &SqlitePool,
    course_id: i64,
    user_id: &str,
) -> Result<Enrollment, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let registered_at = Utc::now();
    let status = EnrollmentStatus::Pending;

    sqlx::query(
        "INSERT INTO enrollments (id, course_id, user_id, registered_at, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&id)
    .bind(course_id)
    .bind(user_id)
    .bind(registered_at)
    .bind(status)
    .execute(db)
    .await?;

    Ok(Enrollment {
        id,
        course_id,
        user_id: user_id.to_string(),
        registered_at,
        status,
    })
}

/// Full enrollment history for one user, most recent first.
pub async fn fetch_user_enrollments(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<EnrolledCourse>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledCourse>(
        "SELECT e.id AS enrollment_id, e.status, e.registered_at,
                c.id AS course_id, c.code, c.name, c.credits, c.starts_at, c.ends_at
         FROM enrollments e
         JOIN courses c ON c.id = e.course_id
         WHERE e.user_id = ?1
         ORDER BY e.registered_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
