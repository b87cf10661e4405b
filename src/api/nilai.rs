use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::auth::Actor;
use crate::db;
use crate::error::AppError;
use crate::models::{
    IpkSummary, Khs, KhsUpdate, MatkulNilaiRow, RosterEntry, ScoreSubmission, ScoresAllRow,
};
use crate::services::{GradingService, ScoreSaveResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TermParams {
    pub semester: Option<i64>,
    pub tahun_ajaran: Option<String>,
}

#[derive(Serialize)]
pub struct MatkulNilaiResponse {
    pub source: &'static str,
    pub rows: Vec<MatkulNilaiRow>,
}

pub async fn dosen_matkul_nilai(
    State(state): State<AppState>,
    Path(dosen_id): Path<i64>,
    Query(params): Query<TermParams>,
) -> Result<Json<MatkulNilaiResponse>, AppError> {
    let (source, rows) = db::nilai::matkul_nilai_for_dosen(
        &state.db,
        &state.schema,
        dosen_id,
        params.semester,
        params.tahun_ajaran.as_deref(),
    )
    .await?;
    Ok(Json(MatkulNilaiResponse { source, rows }))
}

#[derive(Serialize)]
pub struct RosterResponse {
    pub rows: Vec<RosterEntry>,
}

pub async fn matkul_mahasiswa(
    State(state): State<AppState>,
    Path((dosen_id, kode)): Path<(i64, String)>,
    Query(params): Query<TermParams>,
) -> Result<Json<RosterResponse>, AppError> {
    let teaches = db::jadwal::dosen_teaches(
        &state.db,
        dosen_id,
        &kode,
        params.semester,
        params.tahun_ajaran.as_deref(),
    )
    .await?;
    if !teaches {
        warn!(dosen_id, kode = %kode, "instructor has no schedule slot for requested roster");
    }

    let rows = db::nilai::roster_for_matkul(
        &state.db,
        &kode,
        params.semester,
        params.tahun_ajaran.as_deref(),
    )
    .await?;
    Ok(Json(RosterResponse { rows }))
}

pub async fn save_scores(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(input): Json<ScoreSubmission>,
) -> Result<Json<ScoreSaveResult>, AppError> {
    actor.require_dosen()?;
    let service = GradingService::new(state.db.clone());
    let result = service.save_scores(id, &input).await?;
    Ok(Json(result))
}

pub async fn student_khs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Khs>>, AppError> {
    let rows = db::nilai::fetch_khs(&state.db, id).await?;
    Ok(Json(rows))
}

pub async fn update_khs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<KhsUpdate>,
) -> Result<Json<Khs>, AppError> {
    let row = db::nilai::update_khs(&state.db, id, &update)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(row))
}

pub async fn delete_khs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    db::nilai::delete_khs(&state.db, id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn student_ipk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IpkSummary>, AppError> {
    let service = GradingService::new(state.db.clone());
    let summary = service.ipk(id).await?;
    Ok(Json(summary))
}

pub async fn student_scores_all(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ScoresAllRow>>, AppError> {
    let rows = db::nilai::fetch_scores_all(&state.db, id).await?;
    Ok(Json(rows))
}
