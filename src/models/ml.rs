use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored logistic-regression parameter row. Training happens outside this
/// service; only the newest row is ever read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MlModel {
    pub id: i64,
    pub w: f64,
    pub b: f64,
    pub params: Option<String>,
    pub metrics: Option<String>,
    pub scaler: Option<String>,
    pub trained_rows: Option<i64>,
    pub trained_at: String,
}

impl MlModel {
    /// Parse the stored scaler JSON, tolerating missing or malformed values
    /// the same way the prediction path always has.
    pub fn scaler(&self) -> Option<Scaler> {
        self.scaler
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub ipk: f64,
    pub probability: f64,
    pub used_model_id: i64,
}
