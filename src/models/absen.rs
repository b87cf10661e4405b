use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RuangEntry {
    pub ruang: String,
}

/// One student on an attendance sheet, resolved either through enrollment
/// rows or through approved KRS rows (fallback).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceStudent {
    pub nim: String,
    pub nama: String,
    pub krs_id: i64,
}
