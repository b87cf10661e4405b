use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{JadwalEntry, KrsRow};

/// Replaces the student's registration for one term: every existing row for
/// (nim, semester, tahun_ajaran) is dropped and the submitted course list is
/// inserted as `pending`, all inside one transaction.
pub async fn replace_for_term(
    db: &SqlitePool,
    nim: &str,
    matkul_list: &[String],
    semester: i64,
    tahun_ajaran: &str,
) -> Result<usize, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM krs WHERE nim = ? AND semester = ? AND tahun_ajaran = ?")
        .bind(nim)
        .bind(semester)
        .bind(tahun_ajaran)
        .execute(&mut *tx)
        .await?;

    for kode_matkul in matkul_list {
        sqlx::query(
            "INSERT INTO krs (nim, kode_matkul, semester, tahun_ajaran, status, created_at) \
             VALUES (?, ?, ?, ?, 'pending', ?)",
        )
        .bind(nim)
        .bind(kode_matkul)
        .bind(semester)
        .bind(tahun_ajaran)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(matkul_list.len())
}

pub async fn fetch_for_student(
    db: &SqlitePool,
    nim: &str,
    semester: Option<i64>,
    tahun_ajaran: Option<&str>,
) -> Result<Vec<KrsRow>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT k.id, k.nim, k.kode_matkul, k.semester, k.tahun_ajaran, k.status, k.created_at, \
         m.nama, m.sks, m.prodi_id \
         FROM krs k \
         JOIN matkul m ON k.kode_matkul = m.kode \
         WHERE k.nim = ",
    );
    qb.push_bind(nim);
    if let Some(semester) = semester {
        qb.push(" AND k.semester = ").push_bind(semester);
    }
    if let Some(tahun_ajaran) = tahun_ajaran {
        qb.push(" AND k.tahun_ajaran = ").push_bind(tahun_ajaran);
    }
    qb.push(" ORDER BY k.created_at DESC");

    qb.build_query_as::<KrsRow>().fetch_all(db).await
}

/// The student's approved weekly schedule for one term, ordered Senin..Sabtu
/// then by start time.
pub async fn fetch_jadwal_for_student(
    db: &SqlitePool,
    nim: &str,
    semester: i64,
    tahun_ajaran: &str,
) -> Result<Vec<JadwalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JadwalEntry>(
        "SELECT j.id, j.hari, j.waktu_mulai, j.waktu_selesai, j.ruang, \
         m.kode, m.nama AS nama_matkul, m.sks, d.nama AS nama_dosen, k.status AS status_krs \
         FROM krs k \
         JOIN matkul m ON k.kode_matkul = m.kode \
         JOIN jadwal j ON m.kode = j.kode_matkul \
             AND j.semester = k.semester \
             AND j.tahun_ajaran = k.tahun_ajaran \
         LEFT JOIN dosen d ON j.dosen_id = d.id \
         WHERE k.nim = ? AND k.semester = ? AND k.tahun_ajaran = ? AND k.status = 'approved' \
         ORDER BY CASE j.hari \
             WHEN 'Senin' THEN 1 \
             WHEN 'Selasa' THEN 2 \
             WHEN 'Rabu' THEN 3 \
             WHEN 'Kamis' THEN 4 \
             WHEN 'Jumat' THEN 5 \
             WHEN 'Sabtu' THEN 6 \
             ELSE 7 END, \
             j.waktu_mulai",
    )
    .bind(nim)
    .bind(semester)
    .bind(tahun_ajaran)
    .fetch_all(db)
    .await
}
