use axum::{Router, extract::State, http::StatusCode, routing::get, routing::post, routing::put};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub mod absen;
pub mod krs;
pub mod matkul;
pub mod ml;
pub mod nilai;
pub mod tugas;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/matkul", get(matkul::list_matkul))
        .route("/matkul/{prodi_id}", get(matkul::matkul_by_prodi))
        .route("/krs/submit", post(krs::submit_krs))
        .route("/krs/decide", post(krs::decide_krs))
        .route("/krs/{nim}", get(krs::get_krs))
        .route("/jadwal/{nim}", get(krs::get_jadwal))
        .route("/dosen/{dosen_id}/matkul-nilai", get(nilai::dosen_matkul_nilai))
        .route(
            "/dosen/{dosen_id}/matkul/{kode}/mahasiswa",
            get(nilai::matkul_mahasiswa),
        )
        .route("/dosen/{dosen_id}/submissions", get(tugas::dosen_submissions))
        .route("/students/{id}/scores", post(nilai::save_scores))
        .route("/students/{id}/khs", get(nilai::student_khs))
        .route("/students/{id}/ipk", get(nilai::student_ipk))
        .route("/students/{id}/scores-all", get(nilai::student_scores_all))
        .route("/khs/{id}", put(nilai::update_khs).delete(nilai::delete_khs))
        .route("/ruang/list", get(absen::ruang_list))
        .route("/attendance/students", get(absen::attendance_students))
        .route("/tugas", get(tugas::list_tugas).post(tugas::create_tugas))
        .route("/tugas/available", get(tugas::available_tugas))
        .route("/tugas/{id}/submit", post(tugas::submit_tugas))
        .route("/tugas/{id}/submissions", get(tugas::tugas_submissions))
        .route("/submissions", get(tugas::my_submissions))
        .route("/submissions/{id}/grade", put(tugas::grade_submission))
        .route("/ml/model", get(ml::latest_model))
        .route("/ml/predict", get(ml::predict));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
