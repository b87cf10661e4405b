use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-student per-course grade components. One row per
/// (student, course, academic year), enforced by a unique index.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentScore {
    pub id: i64,
    pub student_id: i64,
    pub kehadiran: i64,
    pub tugas: i64,
    pub uts: i64,
    pub uas: i64,
    pub nilai_akhir: i64,
    pub huruf: String,
    pub kode_matkul: String,
    pub tahun_ajaran: String,
    pub updated_at: String,
}

/// Body of `POST /students/{id}/scores`. Raw component values are accepted as
/// floats and clamped/rounded server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default)]
    pub kehadiran: f64,
    #[serde(default)]
    pub tugas: f64,
    #[serde(default)]
    pub uts: f64,
    #[serde(default)]
    pub uas: f64,
    pub kode_matkul: Option<String>,
    pub tahun_ajaran: Option<String>,
    pub nama_matkul: Option<String>,
    pub sks: Option<i64>,
}

/// Finalized per-term grade record (transcript line).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Khs {
    pub id: i64,
    pub student_id: i64,
    pub kode_matkul: String,
    pub nama_matkul: Option<String>,
    pub sks: i64,
    pub huruf: Option<String>,
    pub semester: Option<i64>,
    pub tahun_ajaran: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KhsUpdate {
    pub sks: Option<i64>,
    pub huruf: Option<String>,
}

/// Roster line for the grade-entry screen: a registered student plus their
/// existing score record, if any.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_id: i64,
    pub nim: String,
    pub nama: String,
    pub existing_score: Option<StudentScore>,
}

/// Course taught by an instructor together with how many approved
/// registrations it has for the requested term.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MatkulNilaiRow {
    pub id: i64,
    pub kode: String,
    pub nama: String,
    pub sks: i64,
    pub semester: Option<i64>,
    pub tahun_ajaran: Option<String>,
    pub jumlah_mahasiswa_terdaftar: i64,
}

/// Score record joined with course metadata, for the student-facing listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScoresAllRow {
    pub id: i64,
    pub student_id: i64,
    pub kode_matkul: String,
    pub nama_matkul: String,
    pub sks: i64,
    pub huruf: String,
    pub nilai_akhir: i64,
    pub tahun_ajaran: String,
    pub semester: Option<i64>,
    pub kehadiran: i64,
    pub tugas: i64,
    pub uts: i64,
    pub uas: i64,
    pub updated_at: String,
}

/// Cumulative GPA summary. `source` says which table produced it: `khs`,
/// `student_scores` (fallback) or `none`.
#[derive(Debug, Clone, Serialize)]
pub struct IpkSummary {
    pub ipk: Option<f64>,
    pub total_sks: i64,
    pub total_points: f64,
    pub source: &'static str,
}
