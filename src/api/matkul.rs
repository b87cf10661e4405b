use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::auth::Actor;
use crate::db;
use crate::error::AppError;
use crate::models::{Matkul, MatkulNilai};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MatkulListParams {
    pub dosen_id: Option<i64>,
}

/// Course listing for grade entry; the instructor filter defaults to the
/// caller's own id when present.
pub async fn list_matkul(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<MatkulListParams>,
) -> Result<Json<Vec<MatkulNilai>>, AppError> {
    let dosen_id = params.dosen_id.or(actor.dosen_id);
    let rows = db::matkul::fetch_listing(&state.db, &state.schema, dosen_id).await?;
    Ok(Json(rows))
}

pub async fn matkul_by_prodi(
    State(state): State<AppState>,
    Path(prodi_id): Path<String>,
) -> Result<Json<Vec<Matkul>>, AppError> {
    let rows = db::matkul::fetch_by_prodi(&state.db, &prodi_id).await?;
    Ok(Json(rows))
}
