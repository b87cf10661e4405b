use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Jadwal {
    pub id: i64,
    pub kode_matkul: String,
    pub semester: i64,
    pub tahun_ajaran: String,
    pub hari: Option<String>,
    pub waktu_mulai: Option<String>,
    pub waktu_selesai: Option<String>,
    pub ruang: Option<String>,
    pub dosen_id: Option<i64>,
}

/// One line of a student's weekly schedule: the slot joined with its course
/// and (optionally) the instructor teaching it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JadwalEntry {
    pub id: i64,
    pub hari: Option<String>,
    pub waktu_mulai: Option<String>,
    pub waktu_selesai: Option<String>,
    pub ruang: Option<String>,
    pub kode: String,
    pub nama_matkul: String,
    pub sks: i64,
    pub nama_dosen: Option<String>,
    pub status_krs: String,
}
