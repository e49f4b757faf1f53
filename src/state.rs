use std::sync::Arc;

use sqlx::SqlitePool;

use crate::cache::Cache;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub cache: Arc<dyn Cache>,
}
