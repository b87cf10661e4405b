use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Actor;
use crate::db;
use crate::db::tugas::TugasFilter;
use crate::error::AppError;
use crate::models::{
    DosenSubmissionRow, GradeSubmissionRequest, NewTugasRequest, SubmitRequest, Submission, Tugas,
};
use crate::state::AppState;

pub async fn create_tugas(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewTugasRequest>,
) -> Result<(StatusCode, Json<Tugas>), AppError> {
    let dosen_id = actor.require_dosen()?;
    if req.judul.trim().is_empty() {
        return Err(AppError::BadRequest("judul is required".to_string()));
    }

    let tugas = db::tugas::insert_tugas(&state.db, dosen_id, req).await?;
    Ok((StatusCode::CREATED, Json(tugas)))
}

#[derive(Deserialize)]
pub struct TugasListParams {
    pub prodi: Option<String>,
    pub tahun_angkatan: Option<String>,
    pub kode_matkul: Option<String>,
    pub dosen_id: Option<i64>,
}

pub async fn list_tugas(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<TugasListParams>,
) -> Result<Json<Vec<Tugas>>, AppError> {
    let filter = TugasFilter {
        prodi: params.prodi,
        tahun_angkatan: params.tahun_angkatan,
        kode_matkul: params.kode_matkul,
        // An instructor browsing without a filter sees their own assignments.
        dosen_id: params.dosen_id.or(actor.dosen_id),
    };
    let rows = db::tugas::fetch_tugas(&state.db, &filter).await?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct AvailableParams {
    pub nim: Option<String>,
}

pub async fn available_tugas(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<AvailableParams>,
) -> Result<Json<Vec<Tugas>>, AppError> {
    let nim = params
        .nim
        .or(actor.nim)
        .ok_or_else(|| AppError::BadRequest("nim required".to_string()))?;

    let rows = db::tugas::fetch_available(&state.db, &state.schema, &nim)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(rows))
}

/// One submission per student per assignment; a resubmission gets 409 with
/// the original attached so clients can mark the task as already handed in.
pub async fn submit_tugas(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Response, AppError> {
    let nim = req
        .nim
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or(actor.nim)
        .ok_or_else(|| AppError::BadRequest("nim required".to_string()))?;

    db::tugas::find_tugas(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(existing) = db::tugas::find_submission(&state.db, &id, &nim).await? {
        let body = Json(json!({
            "error": "already submitted",
            "submission": existing,
        }));
        return Ok((StatusCode::CONFLICT, body).into_response());
    }

    let submission = db::tugas::insert_submission(
        &state.db,
        &id,
        &nim,
        req.nama.as_deref(),
        req.komentar.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(submission)).into_response())
}

pub async fn tugas_submissions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let rows = db::tugas::submissions_for_tugas(&state.db, &id).await?;
    Ok(Json(rows))
}

pub async fn dosen_submissions(
    State(state): State<AppState>,
    Path(dosen_id): Path<i64>,
) -> Result<Json<Vec<DosenSubmissionRow>>, AppError> {
    let rows = db::tugas::submissions_for_dosen(&state.db, dosen_id).await?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct MySubmissionsParams {
    pub nim: Option<String>,
}

pub async fn my_submissions(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<MySubmissionsParams>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let nim = params
        .nim
        .or(actor.nim)
        .ok_or_else(|| AppError::BadRequest("nim required".to_string()))?;
    let rows = db::tugas::submissions_for_nim(&state.db, &nim).await?;
    Ok(Json(rows))
}

pub async fn grade_submission(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(req): Json<GradeSubmissionRequest>,
) -> Result<Json<Submission>, AppError> {
    actor.require_dosen()?;
    let row = db::tugas::grade_submission(&state.db, &id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(row))
}
