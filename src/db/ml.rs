use sqlx::SqlitePool;

use crate::models::MlModel;

/// The most recently trained parameter row, if any. Prediction always uses
/// the newest model.
pub async fn latest_model(db: &SqlitePool) -> Result<Option<MlModel>, sqlx::Error> {
    sqlx::query_as::<_, MlModel>(
        "SELECT id, w, b, params, metrics, scaler, trained_rows, trained_at \
         FROM ml_model ORDER BY trained_at DESC, id DESC LIMIT 1",
    )
    .fetch_optional(db)
    .await
}
