use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mahasiswa {
    pub id: i64,
    pub nim: String,
    pub nama: String,
    pub email: String,
    pub prodi_id: Option<String>,
    pub tahun_angkatan: Option<String>,
}

/// Instructor record. `can_acc_krs` is the blanket approval authority used by
/// the KRS decision workflow; without it an instructor can only decide
/// registrations for courses they teach.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dosen {
    pub id: i64,
    pub nama: String,
    pub email: String,
    pub can_acc_krs: bool,
}
