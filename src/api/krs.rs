use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::db;
use crate::error::AppError;
use crate::models::{DecideRequest, JadwalEntry, KrsRow, KrsSubmitRequest, KrsSubmitResponse};
use crate::services::{DecisionOutcome, KrsDecisionService};
use crate::state::AppState;

pub async fn submit_krs(
    State(state): State<AppState>,
    Json(req): Json<KrsSubmitRequest>,
) -> Result<Json<KrsSubmitResponse>, AppError> {
    if req.nim.trim().is_empty() || req.matkul_list.is_empty() || req.tahun_ajaran.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "nim, matkul_list and tahun_ajaran are required".to_string(),
        ));
    }

    let count = db::krs::replace_for_term(
        &state.db,
        req.nim.trim(),
        &req.matkul_list,
        req.semester,
        req.tahun_ajaran.trim(),
    )
    .await?;

    Ok(Json(KrsSubmitResponse {
        success: true,
        count,
    }))
}

/// Batch approve/reject, see `KrsDecisionService` for the skip semantics.
pub async fn decide_krs(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<DecisionOutcome>, AppError> {
    let service = KrsDecisionService::new(state.db.clone(), state.schema.clone());
    let outcome = service.decide(&req).await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
pub struct TermParams {
    pub semester: Option<i64>,
    pub tahun_ajaran: Option<String>,
}

pub async fn get_krs(
    State(state): State<AppState>,
    Path(nim): Path<String>,
    Query(params): Query<TermParams>,
) -> Result<Json<Vec<KrsRow>>, AppError> {
    let rows = db::krs::fetch_for_student(
        &state.db,
        &nim,
        params.semester,
        params.tahun_ajaran.as_deref(),
    )
    .await?;
    Ok(Json(rows))
}

pub async fn get_jadwal(
    State(state): State<AppState>,
    Path(nim): Path<String>,
    Query(params): Query<TermParams>,
) -> Result<Json<Vec<JadwalEntry>>, AppError> {
    let (Some(semester), Some(tahun_ajaran)) = (params.semester, params.tahun_ajaran.as_deref())
    else {
        return Err(AppError::BadRequest(
            "semester and tahun_ajaran are required".to_string(),
        ));
    };

    let rows = db::krs::fetch_jadwal_for_student(&state.db, &nim, semester, tahun_ajaran).await?;
    Ok(Json(rows))
}
