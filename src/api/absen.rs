use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::warn;

use crate::db;
use crate::error::AppError;
use crate::models::{AttendanceStudent, RuangEntry};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RuangParams {
    pub dosen: Option<String>,
}

pub async fn ruang_list(
    State(state): State<AppState>,
    Query(params): Query<RuangParams>,
) -> Result<Json<Vec<RuangEntry>>, AppError> {
    let rows = db::jadwal::list_ruang(&state.db, params.dosen.as_deref()).await?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct AttendanceParams {
    pub ruang: Option<String>,
    pub semester: Option<i64>,
    pub tahun_ajaran: Option<String>,
}

/// Attendance sheet for a room. Enrollment rows are authoritative; approved
/// KRS rows for the same courses are the fallback for terms recorded before
/// enrollment existed.
pub async fn attendance_students(
    State(state): State<AppState>,
    Query(params): Query<AttendanceParams>,
) -> Result<Json<Vec<AttendanceStudent>>, AppError> {
    let ruang = params
        .ruang
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest("parameter ruang required".to_string()))?;

    let slots = db::jadwal::fetch_by_ruang(
        &state.db,
        ruang,
        params.semester,
        params.tahun_ajaran.as_deref(),
    )
    .await?;
    if slots.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let jadwal_ids: Vec<i64> = slots.iter().map(|s| s.id).collect();
    match db::jadwal::students_by_enrollment(&state.db, &jadwal_ids).await {
        Ok(rows) if !rows.is_empty() => return Ok(Json(rows)),
        Ok(_) => {}
        Err(err) => {
            warn!(error = %err, "enrollment attendance query failed, falling back to krs");
        }
    }

    let semester = params.semester.unwrap_or(slots[0].semester);
    let tahun_ajaran = params
        .tahun_ajaran
        .clone()
        .unwrap_or_else(|| slots[0].tahun_ajaran.clone());

    let mut kode_list: Vec<String> = slots.into_iter().map(|s| s.kode_matkul).collect();
    kode_list.sort();
    kode_list.dedup();

    let rows = db::jadwal::students_by_krs(&state.db, &kode_list, semester, &tahun_ajaran).await?;
    Ok(Json(rows))
}
