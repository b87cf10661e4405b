use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::db;
use crate::error::AppError;
use crate::models::{IpkSummary, ScoreSubmission, StudentScore};

pub const BOBOT_KEHADIRAN: f64 = 0.10;
pub const BOBOT_TUGAS: f64 = 0.20;
pub const BOBOT_UTS: f64 = 0.30;
pub const BOBOT_UAS: f64 = 0.40;

/// Clamps a raw component value into [0, 100] and rounds it. Non-finite
/// input counts as zero.
pub fn clamp_score(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalGrade {
    pub score: i64,
    pub huruf: char,
}

/// Weighted final score over the four components, with the fixed letter
/// thresholds 80/70/60/50.
pub fn final_grade(kehadiran: i64, tugas: i64, uts: i64, uas: i64) -> FinalGrade {
    let score = (kehadiran as f64 * BOBOT_KEHADIRAN
        + tugas as f64 * BOBOT_TUGAS
        + uts as f64 * BOBOT_UTS
        + uas as f64 * BOBOT_UAS)
        .round() as i64;
    FinalGrade {
        score,
        huruf: letter_for(score),
    }
}

pub fn letter_for(score: i64) -> char {
    if score >= 80 {
        'A'
    } else if score >= 70 {
        'B'
    } else if score >= 60 {
        'C'
    } else if score >= 50 {
        'D'
    } else {
        'E'
    }
}

/// Grade points on the 4-point scale; anything below D earns none.
pub fn grade_points(huruf: &str) -> i64 {
    match huruf.trim().to_uppercase().as_str() {
        "A" => 4,
        "B" => 3,
        "C" => 2,
        "D" => 1,
        _ => 0,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Debug, Serialize)]
pub struct ScoreSaveResult {
    pub saved: StudentScore,
    pub khs_inserted: bool,
    pub khs_updated: bool,
    pub ipk: Option<f64>,
}

pub struct GradingService {
    db: SqlitePool,
}

impl GradingService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Stores one student's components for a course and term, then syncs the
    /// transcript. The upsert is authoritative; the KHS sync and IPK
    /// recomputation are best-effort extras whose failure is logged and
    /// reflected in the flags, never surfaced as an error.
    pub async fn save_scores(
        &self,
        student_id: i64,
        input: &ScoreSubmission,
    ) -> Result<ScoreSaveResult, AppError> {
        let kode_matkul = input
            .kode_matkul
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::BadRequest("kode_matkul and tahun_ajaran required".to_string()))?;
        let tahun_ajaran = input
            .tahun_ajaran
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("kode_matkul and tahun_ajaran required".to_string()))?;

        let kehadiran = clamp_score(input.kehadiran);
        let tugas = clamp_score(input.tugas);
        let uts = clamp_score(input.uts);
        let uas = clamp_score(input.uas);
        let grade = final_grade(kehadiran, tugas, uts, uas);
        let huruf = grade.huruf.to_string();

        let saved = db::nilai::upsert_score(
            &self.db,
            student_id,
            kehadiran,
            tugas,
            uts,
            uas,
            grade.score,
            &huruf,
            kode_matkul,
            tahun_ajaran,
        )
        .await?;

        let (khs_inserted, khs_updated) = self
            .sync_khs(student_id, kode_matkul, tahun_ajaran, &huruf, input)
            .await;

        let ipk = match self.ipk(student_id).await {
            Ok(summary) => summary.ipk,
            Err(err) => {
                warn!(student_id, error = %err, "ipk recomputation failed");
                None
            }
        };

        Ok(ScoreSaveResult {
            saved,
            khs_inserted,
            khs_updated,
            ipk,
        })
    }

    async fn sync_khs(
        &self,
        student_id: i64,
        kode_matkul: &str,
        tahun_ajaran: &str,
        huruf: &str,
        input: &ScoreSubmission,
    ) -> (bool, bool) {
        match db::nilai::update_khs_letter(&self.db, student_id, kode_matkul, tahun_ajaran, huruf)
            .await
        {
            Ok(affected) if affected > 0 => return (false, true),
            Ok(_) => {}
            Err(err) => {
                warn!(student_id, kode_matkul, error = %err, "khs letter update failed");
                return (false, false);
            }
        }

        let mut sks = input.sks.unwrap_or(0);
        if sks <= 0 {
            match db::matkul::sks_for_kode(&self.db, kode_matkul).await {
                Ok(found) => sks = found.unwrap_or(0),
                Err(err) => {
                    warn!(kode_matkul, error = %err, "matkul lookup for sks fallback failed");
                }
            }
        }

        match db::nilai::insert_khs(
            &self.db,
            student_id,
            kode_matkul,
            input.nama_matkul.as_deref(),
            sks,
            huruf,
            tahun_ajaran,
        )
        .await
        {
            Ok(()) => (true, false),
            Err(err) => {
                warn!(student_id, kode_matkul, error = %err, "khs insert failed");
                (false, false)
            }
        }
    }

    /// Cumulative GPA: grade points weighted by credit hours over the
    /// transcript, falling back to the raw score table when no transcript
    /// rows carry a letter yet.
    pub async fn ipk(&self, student_id: i64) -> Result<IpkSummary, AppError> {
        let (total_sks, total_points) = db::nilai::khs_point_totals(&self.db, student_id).await?;
        if total_sks > 0 {
            return Ok(IpkSummary {
                ipk: Some(round3(total_points as f64 / total_sks as f64)),
                total_sks,
                total_points: total_points as f64,
                source: "khs",
            });
        }

        let (total_sks, total_points) = db::nilai::score_point_totals(&self.db, student_id).await?;
        if total_sks > 0 {
            return Ok(IpkSummary {
                ipk: Some(round3(total_points as f64 / total_sks as f64)),
                total_sks,
                total_points: total_points as f64,
                source: "student_scores",
            });
        }

        Ok(IpkSummary {
            ipk: None,
            total_sks: 0,
            total_points: 0.0,
            source: "none",
        })
    }
}
