use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Matkul {
    pub id: i64,
    pub kode: String,
    pub nama: String,
    pub sks: i64,
    pub prodi_id: Option<String>,
}

/// Course listing shape used by the grading screens.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MatkulNilai {
    pub id: i64,
    pub kode_matkul: String,
    pub nama_matkul: String,
    pub sks: i64,
}
