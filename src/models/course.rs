use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub max_capacity: i32,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub max_capacity: i32,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub active: bool,
}

impl Course {
    /// Half-open interval test: back-to-back courses do not overlap.
    pub fn overlaps_with(&self, other: &Course) -> bool {
        crate::schedule::overlaps(self.starts_at, self.ends_at, other.starts_at, other.ends_at)
    }
}
