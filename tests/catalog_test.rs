use std::sync::Arc;

use chrono::NaiveTime;
use portal_backend::cache::MemoryCache;
use portal_backend::db::repository;
use portal_backend::error::AppError;
use portal_backend::models::NewCourse;
use portal_backend::services::{CatalogService, CourseFilter};
use sqlx::SqlitePool;

async fn setup_db() -> SqlitePool {
    // One connection: every pooled connection to :memory: is a separate
    // database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite://:memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

async fn seed_demo_courses(pool: &SqlitePool) {
    let demo = [
        ("BD101", "Base de Datos", 4, time(8, 0), time(10, 0)),
        ("IO201", "Investigación Operativa I", 5, time(10, 0), time(12, 0)),
        ("PROG101", "Programación I", 4, time(14, 0), time(16, 0)),
    ];
    for (code, name, credits, starts_at, ends_at) in demo {
        repository::insert_course(
            pool,
            NewCourse {
                code: code.to_string(),
                name: name.to_string(),
                credits,
                max_capacity: 30,
                starts_at,
                ends_at,
                active: true,
            },
        )
        .await
        .expect("Failed to seed course");
    }
}

fn service(pool: &SqlitePool) -> CatalogService {
    CatalogService::new(pool.clone(), Arc::new(MemoryCache::new()))
}

#[tokio::test]
async fn unfiltered_catalog_is_served_from_cache_on_repeat() {
    let pool = setup_db().await;
    seed_demo_courses(&pool).await;
    let catalog = service(&pool);

    let first = catalog.catalog(&CourseFilter::default()).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.courses.len(), 3);

    let second = catalog.catalog(&CourseFilter::default()).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.courses, first.courses);
}

#[tokio::test]
async fn cached_catalog_is_stale_until_invalidated() {
    let pool = setup_db().await;
    seed_demo_courses(&pool).await;
    let catalog = service(&pool);

    let first = catalog.catalog(&CourseFilter::default()).await.unwrap();
    assert_eq!(first.courses.len(), 3);

    sqlx::query("UPDATE courses SET active = 0 WHERE code = 'BD101'")
        .execute(&pool)
        .await
        .unwrap();

    // Within the TTL the listing does not see the change.
    let stale = catalog.catalog(&CourseFilter::default()).await.unwrap();
    assert!(stale.from_cache);
    assert_eq!(stale.courses.len(), 3);

    catalog.invalidate().await;

    let fresh = catalog.catalog(&CourseFilter::default()).await.unwrap();
    assert!(!fresh.from_cache);
    assert_eq!(fresh.courses.len(), 2);
}

#[tokio::test]
async fn any_filter_bypasses_the_cache() {
    let pool = setup_db().await;
    seed_demo_courses(&pool).await;
    let catalog = service(&pool);

    // Warm the cache, then change the store underneath it.
    catalog.catalog(&CourseFilter::default()).await.unwrap();
    sqlx::query("UPDATE courses SET active = 0 WHERE code = 'BD101'")
        .execute(&pool)
        .await
        .unwrap();

    let filtered = catalog
        .catalog(&CourseFilter {
            credits_min: Some(1),
            ..CourseFilter::default()
        })
        .await
        .unwrap();
    assert!(!filtered.from_cache);
    assert_eq!(filtered.courses.len(), 2);
}

#[tokio::test]
async fn credit_range_and_name_filters_match_seed_data() {
    let pool = setup_db().await;
    seed_demo_courses(&pool).await;
    let catalog = service(&pool);

    let by_credits = catalog
        .catalog(&CourseFilter {
            credits_min: Some(4),
            credits_max: Some(5),
            ..CourseFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_credits.courses.len(), 3);

    let by_name = catalog
        .catalog(&CourseFilter {
            name: Some("BD".to_string()),
            ..CourseFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.courses.len(), 1);
    assert_eq!(by_name.courses[0].code, "BD101");
}

#[tokio::test]
async fn name_filter_matches_code_or_name() {
    let pool = setup_db().await;
    seed_demo_courses(&pool).await;
    let catalog = service(&pool);

    // "Datos" only appears in the course name, not the code.
    let page = catalog
        .catalog(&CourseFilter {
            name: Some("Datos".to_string()),
            ..CourseFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(page.courses.len(), 1);
    assert_eq!(page.courses[0].code, "BD101");
}

#[tokio::test]
async fn time_window_filters_apply_after_materializing() {
    let pool = setup_db().await;
    seed_demo_courses(&pool).await;
    let catalog = service(&pool);

    let morning_onwards = catalog
        .catalog(&CourseFilter {
            start_time: Some("10:00".to_string()),
            ..CourseFilter::default()
        })
        .await
        .unwrap();
    let codes: Vec<_> = morning_onwards.courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["IO201", "PROG101"]);

    let until_noon = catalog
        .catalog(&CourseFilter {
            end_time: Some("12:00".to_string()),
            ..CourseFilter::default()
        })
        .await
        .unwrap();
    let codes: Vec<_> = until_noon.courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["BD101", "IO201"]);
}

#[tokio::test]
async fn unparsable_time_filter_is_skipped_not_rejected() {
    let pool = setup_db().await;
    seed_demo_courses(&pool).await;
    let catalog = service(&pool);

    let page = catalog
        .catalog(&CourseFilter {
            start_time: Some("whenever".to_string()),
            credits_min: Some(4),
            ..CourseFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(page.courses.len(), 3);
}

#[tokio::test]
async fn invalid_filters_reject_before_any_query() {
    let pool = setup_db().await;
    let catalog = service(&pool);

    let err = catalog
        .catalog(&CourseFilter {
            credits_min: Some(-1),
            ..CourseFilter::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = catalog
        .catalog(&CourseFilter {
            start_time: Some("12:00".to_string()),
            end_time: Some("08:00".to_string()),
            ..CourseFilter::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
