use chrono::NaiveTime;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::models::NewCourse;

/// Seeds the three demo courses on an empty database. Courses are otherwise
/// managed by the external admin workflow; this is the only course write in
/// this service.
pub async fn seed_courses(db: &SqlitePool) -> Result<bool, sqlx::Error> {
    if repository::count_courses(db).await? > 0 {
        return Ok(false);
    }

    let courses = [
        NewCourse {
            code: "BD101".to_string(),
            name: "Base de Datos".to_string(),
            credits: 4,
            max_capacity: 30,
            starts_at: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            ends_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            active: true,
        },
        NewCourse {
            code: "IO201".to_string(),
            name: "Investigación Operativa I".to_string(),
            credits: 5,
            max_capacity: 25,
            starts_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            ends_at: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            active: true,
        },
        NewCourse {
            code: "PROG101".to_string(),
            name: "Programación I".to_string(),
            credits: 4,
            max_capacity: 35,
            starts_at: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            ends_at: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            active: true,
        },
    ];

    for course in courses {
        repository::insert_course(db, course).await?;
    }

    info!("seeded initial course catalog");
    Ok(true)
}
