use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course-registration request. Status moves pending -> approved|rejected
/// and never back; enrollment rows exist only for approved registrations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Krs {
    pub id: i64,
    pub nim: String,
    pub kode_matkul: String,
    pub semester: i64,
    pub tahun_ajaran: String,
    pub status: String,
    pub created_at: String,
}

/// Registration joined with its course, as returned by `GET /krs/{nim}`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KrsRow {
    pub id: i64,
    pub nim: String,
    pub kode_matkul: String,
    pub semester: i64,
    pub tahun_ajaran: String,
    pub status: String,
    pub created_at: String,
    pub nama: String,
    pub sks: i64,
    pub prodi_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KrsSubmitRequest {
    pub nim: String,
    pub matkul_list: Vec<String>,
    pub semester: i64,
    pub tahun_ajaran: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KrsSubmitResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl DecisionAction {
    pub fn target_status(self) -> &'static str {
        match self {
            DecisionAction::Approve => "approved",
            DecisionAction::Reject => "rejected",
        }
    }
}

/// Batch decision request: one instructor deciding several registrations.
#[derive(Debug, Clone, Deserialize)]
pub struct DecideRequest {
    pub dosen_id: i64,
    pub krs_ids: Vec<i64>,
    pub action: DecisionAction,
}
