use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: String,
    pub course_id: i64,
    pub user_id: String,
    pub registered_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
}

/// Row shape for the "my courses" listing: one enrollment joined with the
/// course it points at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrolledCourse {
    pub enrollment_id: String,
    pub status: EnrollmentStatus,
    pub registered_at: DateTime<Utc>,
    pub course_id: i64,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}
