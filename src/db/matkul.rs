use sqlx::SqlitePool;

use crate::models::{Matkul, MatkulNilai};
use crate::schema::SchemaInfo;

pub async fn fetch_by_prodi(db: &SqlitePool, prodi_id: &str) -> Result<Vec<Matkul>, sqlx::Error> {
    sqlx::query_as::<_, Matkul>(
        "SELECT id, kode, nama, sks, prodi_id FROM matkul WHERE prodi_id = ? ORDER BY kode",
    )
    .bind(prodi_id)
    .fetch_all(db)
    .await
}

/// Course listing for the grading screens. When an instructor id is given and
/// the legacy `matkul_dosen` table exists, the list is restricted to that
/// instructor's assigned courses.
pub async fn fetch_listing(
    db: &SqlitePool,
    schema: &SchemaInfo,
    dosen_id: Option<i64>,
) -> Result<Vec<MatkulNilai>, sqlx::Error> {
    match dosen_id {
        Some(dosen_id) if schema.has_matkul_dosen => {
            sqlx::query_as::<_, MatkulNilai>(
                "SELECT m.id, m.kode AS kode_matkul, m.nama AS nama_matkul, m.sks \
                 FROM matkul m \
                 JOIN matkul_dosen md ON md.matkul_id = m.id \
                 WHERE md.dosen_id = ? \
                 ORDER BY m.kode, m.nama",
            )
            .bind(dosen_id)
            .fetch_all(db)
            .await
        }
        _ => {
            sqlx::query_as::<_, MatkulNilai>(
                "SELECT id, kode AS kode_matkul, nama AS nama_matkul, sks \
                 FROM matkul ORDER BY kode, nama",
            )
            .fetch_all(db)
            .await
        }
    }
}

pub async fn find_by_kode(db: &SqlitePool, kode: &str) -> Result<Option<Matkul>, sqlx::Error> {
    sqlx::query_as::<_, Matkul>("SELECT id, kode, nama, sks, prodi_id FROM matkul WHERE kode = ?")
        .bind(kode)
        .fetch_optional(db)
        .await
}

pub async fn sks_for_kode(db: &SqlitePool, kode: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COALESCE(sks, 0) FROM matkul WHERE kode = ? LIMIT 1")
        .bind(kode)
        .fetch_optional(db)
        .await
}
