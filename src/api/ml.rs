use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db;
use crate::error::AppError;
use crate::models::{MlModel, Prediction};
use crate::state::AppState;

/// Stored parameter row with its JSON columns decoded for the response.
#[derive(Serialize)]
pub struct MlModelView {
    pub id: i64,
    pub w: f64,
    pub b: f64,
    pub params: Option<Value>,
    pub metrics: Option<Value>,
    pub scaler: Option<Value>,
    pub trained_rows: Option<i64>,
    pub trained_at: String,
}

impl From<MlModel> for MlModelView {
    fn from(model: MlModel) -> Self {
        let parse = |raw: &Option<String>| {
            raw.as_deref().and_then(|v| serde_json::from_str(v).ok())
        };
        Self {
            id: model.id,
            w: model.w,
            b: model.b,
            params: parse(&model.params),
            metrics: parse(&model.metrics),
            scaler: parse(&model.scaler),
            trained_rows: model.trained_rows,
            trained_at: model.trained_at,
        }
    }
}

#[derive(Serialize)]
pub struct MlModelResponse {
    pub model: Option<MlModelView>,
}

pub async fn latest_model(
    State(state): State<AppState>,
) -> Result<Json<MlModelResponse>, AppError> {
    let model = db::ml::latest_model(&state.db).await?;
    Ok(Json(MlModelResponse {
        model: model.map(MlModelView::from),
    }))
}

#[derive(Deserialize)]
pub struct PredictParams {
    pub ipk: Option<String>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

pub async fn predict(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
) -> Result<Json<Prediction>, AppError> {
    let raw = params
        .ipk
        .ok_or_else(|| AppError::BadRequest("ipk required".to_string()))?;
    let ipk: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("ipk must be numeric".to_string()))?;

    let model = db::ml::latest_model(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let scaled = match model.scaler() {
        Some(scaler) if scaler.std != 0.0 => (ipk - scaler.mean) / scaler.std,
        Some(scaler) => ipk - scaler.mean,
        None => ipk,
    };
    let probability = sigmoid(model.b + model.w * scaled);

    Ok(Json(Prediction {
        ipk,
        probability,
        used_model_id: model.id,
    }))
}
