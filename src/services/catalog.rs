use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::db::repository;
use crate::error::AppError;
use crate::models::Course;

const ACTIVE_COURSES_KEY: &str = "catalog:active_courses";
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Catalog search parameters as they arrive from the query string. Blank
/// strings count as absent, matching how the form submits empty fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub name: Option<String>,
    pub credits_min: Option<i32>,
    pub credits_max: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl CourseFilter {
    pub fn validate(&self) -> Result<(), AppError> {
        if matches!(self.credits_min, Some(min) if min < 0) {
            return Err(AppError::Validation(
                "Minimum credits cannot be negative.".to_string(),
            ));
        }
        if matches!(self.credits_max, Some(max) if max < 0) {
            return Err(AppError::Validation(
                "Maximum credits cannot be negative.".to_string(),
            ));
        }

        // Only rejects when both ends are present and parseable; unparsable
        // strings fall through and are later skipped, not errored.
        if let (Some(start), Some(end)) = (self.start_bound(), self.end_bound())
            && end < start
        {
            return Err(AppError::Validation(
                "End time cannot be earlier than start time.".to_string(),
            ));
        }

        Ok(())
    }

    /// True when no filter is in effect, which routes the request to the
    /// cached active-course list instead of the query engine.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.name)
            && self.credits_min.is_none()
            && self.credits_max.is_none()
            && is_blank(&self.start_time)
            && is_blank(&self.end_time)
    }

    pub fn name_pattern(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Zero means "no filter", not "credits >= 0".
    pub fn credits_min_bound(&self) -> Option<i32> {
        self.credits_min.filter(|&min| min > 0)
    }

    pub fn credits_max_bound(&self) -> Option<i32> {
        self.credits_max.filter(|&max| max > 0)
    }

    pub fn start_bound(&self) -> Option<NaiveTime> {
        self.start_time.as_deref().and_then(parse_time)
    }

    pub fn end_bound(&self) -> Option<NaiveTime> {
        self.end_time.as_deref().and_then(parse_time)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub courses: Vec<Course>,
    pub from_cache: bool,
}

pub struct CatalogService {
    db: SqlitePool,
    cache: Arc<dyn Cache>,
}

impl CatalogService {
    pub fn new(db: SqlitePool, cache: Arc<dyn Cache>) -> Self {
        Self { db, cache }
    }

    /// Catalog listing entry point. Zero filters serve the cached active
    /// list; any filter bypasses the cache and runs the query engine.
    pub async fn catalog(&self, filter: &CourseFilter) -> Result<CatalogPage, AppError> {
        filter.validate()?;

        if filter.is_empty() {
            let (courses, from_cache) = self.active_courses().await?;
            return Ok(CatalogPage { courses, from_cache });
        }

        let courses = self.search(filter).await?;
        Ok(CatalogPage {
            courses,
            from_cache: false,
        })
    }

    /// Read-through over the unfiltered active-course list, 60 second
    /// absolute expiry from write.
    pub async fn active_courses(&self) -> Result<(Vec<Course>, bool), AppError> {
        if let Some(bytes) = self.cache.get(ACTIVE_COURSES_KEY).await {
            match serde_json::from_slice::<Vec<Course>>(&bytes) {
                Ok(courses) => {
                    debug!("catalog served from cache ({} courses)", courses.len());
                    return Ok((courses, true));
                }
                Err(e) => {
                    // Treat an undecodable entry as a miss and overwrite it.
                    warn!("discarding corrupt catalog cache entry: {}", e);
                }
            }
        }

        let courses = repository::fetch_active_courses(&self.db).await?;
        if let Ok(bytes) = serde_json::to_vec(&courses) {
            self.cache.set(ACTIVE_COURSES_KEY, bytes, CACHE_TTL).await;
        }
        Ok((courses, false))
    }

    /// Query engine: name and credit predicates run in the store, the time
    /// window is applied after materializing. Unparsable time strings skip
    /// their predicate silently.
    pub async fn search(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
        let mut courses = repository::search_active_courses(
            &self.db,
            filter.name_pattern(),
            filter.credits_min_bound(),
            filter.credits_max_bound(),
        )
        .await?;

        if let Some(start) = filter.start_bound() {
            courses.retain(|c| c.starts_at >= start);
        }
        if let Some(end) = filter.end_bound() {
            courses.retain(|c| c.ends_at <= end);
        }

        Ok(courses)
    }

    /// Drops the cached listing unconditionally. Must be called after any
    /// course create/update/deactivate; course mutations live in the
    /// external admin workflow, so that caller owns the obligation.
    pub async fn invalidate(&self) {
        self.cache.remove(ACTIVE_COURSES_KEY).await;
    }
}
