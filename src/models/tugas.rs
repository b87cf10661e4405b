use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Instructor-authored assignment. `prodi`, `tahun_angkatan` and
/// `kode_matkul` narrow which students see it; all three are optional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tugas {
    pub id: String,
    pub judul: String,
    pub dosen_id: Option<i64>,
    pub prodi: Option<String>,
    pub tahun_angkatan: Option<String>,
    pub kode_matkul: Option<String>,
    pub deskripsi: Option<String>,
    pub deadline: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTugasRequest {
    pub judul: String,
    pub prodi: Option<String>,
    pub tahun_angkatan: Option<String>,
    pub kode_matkul: Option<String>,
    pub deskripsi: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: String,
    pub tugas_id: String,
    pub nim: String,
    pub nama: Option<String>,
    pub komentar: Option<String>,
    pub submitted_at: String,
    pub grade: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub nim: Option<String>,
    pub nama: Option<String>,
    pub komentar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeSubmissionRequest {
    pub grade: Option<String>,
    pub feedback: Option<String>,
}

/// Submission joined with its assignment title, for the instructor inbox.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DosenSubmissionRow {
    pub id: String,
    pub tugas_id: String,
    pub judul: String,
    pub nim: String,
    pub nama: Option<String>,
    pub komentar: Option<String>,
    pub submitted_at: String,
    pub grade: Option<String>,
    pub feedback: Option<String>,
}
