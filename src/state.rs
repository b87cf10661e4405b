use sqlx::SqlitePool;

use crate::schema::SchemaInfo;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub schema: SchemaInfo,
}
