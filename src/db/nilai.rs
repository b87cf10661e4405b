use std::collections::HashMap;

use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::models::{Khs, KhsUpdate, MatkulNilaiRow, RosterEntry, ScoresAllRow, StudentScore};
use crate::schema::SchemaInfo;

pub async fn find_score(
    db: &SqlitePool,
    student_id: i64,
    kode_matkul: &str,
    tahun_ajaran: &str,
) -> Result<Option<StudentScore>, sqlx::Error> {
    sqlx::query_as::<_, StudentScore>(
        "SELECT id, student_id, kehadiran, tugas, uts, uas, nilai_akhir, huruf, \
         kode_matkul, tahun_ajaran, updated_at \
         FROM student_scores \
         WHERE student_id = ? AND kode_matkul = ? AND tahun_ajaran = ?",
    )
    .bind(student_id)
    .bind(kode_matkul)
    .bind(tahun_ajaran)
    .fetch_optional(db)
    .await
}

/// Upserts the grade-component row keyed (student, course, academic year) and
/// returns the stored state.
pub async fn upsert_score(
    db: &SqlitePool,
    student_id: i64,
    kehadiran: i64,
    tugas: i64,
    uts: i64,
    uas: i64,
    nilai_akhir: i64,
    huruf: &str,
    kode_matkul: &str,
    tahun_ajaran: &str,
) -> Result<StudentScore, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let mut tx = db.begin().await?;
    sqlx::query(
        "INSERT INTO student_scores \
         (student_id, kehadiran, tugas, uts, uas, nilai_akhir, huruf, kode_matkul, tahun_ajaran, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (student_id, kode_matkul, tahun_ajaran) DO UPDATE SET \
             kehadiran = excluded.kehadiran, \
             tugas = excluded.tugas, \
             uts = excluded.uts, \
             uas = excluded.uas, \
             nilai_akhir = excluded.nilai_akhir, \
             huruf = excluded.huruf, \
             updated_at = excluded.updated_at",
    )
    .bind(student_id)
    .bind(kehadiran)
    .bind(tugas)
    .bind(uts)
    .bind(uas)
    .bind(nilai_akhir)
    .bind(huruf)
    .bind(kode_matkul)
    .bind(tahun_ajaran)
    .bind(&now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    find_score(db, student_id, kode_matkul, tahun_ajaran)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

#[derive(Debug, Clone, FromRow)]
struct RosterStudent {
    student_id: i64,
    nim: String,
    nama: String,
}

/// Approved roster of a course for a term, each student paired with their
/// existing score record when one is stored for that academic year.
pub async fn roster_for_matkul(
    db: &SqlitePool,
    kode_matkul: &str,
    semester: Option<i64>,
    tahun_ajaran: Option<&str>,
) -> Result<Vec<RosterEntry>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT mhs.id AS student_id, k.nim, mhs.nama \
         FROM krs k \
         JOIN mahasiswa mhs ON k.nim = mhs.nim \
         WHERE k.kode_matkul = ",
    );
    qb.push_bind(kode_matkul);
    qb.push(" AND COALESCE(k.status, '') = 'approved'");
    if let Some(semester) = semester {
        qb.push(" AND k.semester = ").push_bind(semester);
    }
    if let Some(tahun_ajaran) = tahun_ajaran {
        qb.push(" AND k.tahun_ajaran = ").push_bind(tahun_ajaran);
    }
    qb.push(" ORDER BY mhs.nama");

    let students = qb.build_query_as::<RosterStudent>().fetch_all(db).await?;

    let mut scores: HashMap<i64, StudentScore> = HashMap::new();
    if let Some(tahun_ajaran) = tahun_ajaran {
        let rows = sqlx::query_as::<_, StudentScore>(
            "SELECT id, student_id, kehadiran, tugas, uts, uas, nilai_akhir, huruf, \
             kode_matkul, tahun_ajaran, updated_at \
             FROM student_scores \
             WHERE kode_matkul = ? AND tahun_ajaran = ?",
        )
        .bind(kode_matkul)
        .bind(tahun_ajaran)
        .fetch_all(db)
        .await?;
        scores = rows.into_iter().map(|s| (s.student_id, s)).collect();
    }

    Ok(students
        .into_iter()
        .map(|s| {
            let existing_score = scores.remove(&s.student_id);
            RosterEntry {
                student_id: s.student_id,
                nim: s.nim,
                nama: s.nama,
                existing_score,
            }
        })
        .collect())
}

/// Courses an instructor teaches (per `jadwal`) with approved-registration
/// counts. Falls back to the legacy `matkul_dosen` assignments when the
/// schedule has no rows for the filter. Returns the source table name with
/// the rows so callers can tell which shape they got.
pub async fn matkul_nilai_for_dosen(
    db: &SqlitePool,
    schema: &SchemaInfo,
    dosen_id: i64,
    semester: Option<i64>,
    tahun_ajaran: Option<&str>,
) -> Result<(&'static str, Vec<MatkulNilaiRow>), sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT m.id, m.kode, m.nama, m.sks, \
         j.semester AS semester, j.tahun_ajaran AS tahun_ajaran, \
         (SELECT COUNT(DISTINCT k.nim) FROM krs k \
          WHERE k.kode_matkul = m.kode \
            AND COALESCE(k.status, '') = 'approved' \
            AND k.tahun_ajaran = ",
    );
    match tahun_ajaran {
        Some(tahun_ajaran) => {
            qb.push_bind(tahun_ajaran);
        }
        None => {
            qb.push("j.tahun_ajaran");
        }
    }
    if let Some(semester) = semester {
        qb.push(" AND k.semester = ").push_bind(semester);
    }
    qb.push(
        ") AS jumlah_mahasiswa_terdaftar \
         FROM jadwal j \
         JOIN matkul m ON j.kode_matkul = m.kode \
         WHERE j.dosen_id = ",
    );
    qb.push_bind(dosen_id);
    if let Some(tahun_ajaran) = tahun_ajaran {
        qb.push(" AND j.tahun_ajaran = ").push_bind(tahun_ajaran);
    }
    if let Some(semester) = semester {
        qb.push(" AND j.semester = ").push_bind(semester);
    }
    qb.push(
        " GROUP BY m.id, m.kode, m.nama, m.sks, j.semester, j.tahun_ajaran \
         ORDER BY m.kode",
    );

    let rows = qb.build_query_as::<MatkulNilaiRow>().fetch_all(db).await?;
    if !rows.is_empty() {
        return Ok(("jadwal", rows));
    }

    if schema.has_matkul_dosen {
        let fallback = sqlx::query_as::<_, MatkulNilaiRow>(
            "SELECT m.id, m.kode, m.nama, m.sks, \
             NULL AS semester, NULL AS tahun_ajaran, 0 AS jumlah_mahasiswa_terdaftar \
             FROM matkul_dosen md \
             JOIN matkul m ON md.matkul_id = m.id \
             WHERE md.dosen_id = ? \
             ORDER BY m.kode",
        )
        .bind(dosen_id)
        .fetch_all(db)
        .await?;
        return Ok(("matkul_dosen", fallback));
    }

    Ok(("jadwal", rows))
}

pub async fn find_khs(db: &SqlitePool, id: i64) -> Result<Option<Khs>, sqlx::Error> {
    sqlx::query_as::<_, Khs>(
        "SELECT id, student_id, kode_matkul, nama_matkul, sks, huruf, semester, tahun_ajaran, \
         created_at, updated_at \
         FROM khs WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_khs(db: &SqlitePool, student_id: i64) -> Result<Vec<Khs>, sqlx::Error> {
    sqlx::query_as::<_, Khs>(
        "SELECT id, student_id, kode_matkul, nama_matkul, sks, huruf, semester, tahun_ajaran, \
         created_at, updated_at \
         FROM khs WHERE student_id = ? \
         ORDER BY tahun_ajaran IS NULL, tahun_ajaran, kode_matkul",
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}

pub async fn update_khs(
    db: &SqlitePool,
    id: i64,
    update: &KhsUpdate,
) -> Result<Option<Khs>, sqlx::Error> {
    let huruf = update.huruf.as_ref().map(|h| h.to_uppercase());
    let affected = sqlx::query(
        "UPDATE khs SET sks = COALESCE(?, sks), huruf = COALESCE(?, huruf) WHERE id = ?",
    )
    .bind(update.sks)
    .bind(huruf)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_khs(db, id).await
}

pub async fn delete_khs(db: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM khs WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Marks the transcript line for (student, course, year) with a new letter.
/// Course codes are compared trimmed and case-insensitively; legacy rows were
/// entered by hand.
pub async fn update_khs_letter(
    db: &SqlitePool,
    student_id: i64,
    kode_matkul: &str,
    tahun_ajaran: &str,
    huruf: &str,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "UPDATE khs SET huruf = ?, updated_at = ? \
         WHERE student_id = ? \
           AND TRIM(LOWER(COALESCE(kode_matkul, ''))) = TRIM(LOWER(?)) \
           AND tahun_ajaran = ?",
    )
    .bind(huruf)
    .bind(&now)
    .bind(student_id)
    .bind(kode_matkul)
    .bind(tahun_ajaran)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn insert_khs(
    db: &SqlitePool,
    student_id: i64,
    kode_matkul: &str,
    nama_matkul: Option<&str>,
    sks: i64,
    huruf: &str,
    tahun_ajaran: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO khs (student_id, kode_matkul, nama_matkul, sks, huruf, tahun_ajaran, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(student_id)
    .bind(kode_matkul)
    .bind(nama_matkul)
    .bind(sks)
    .bind(huruf)
    .bind(tahun_ajaran)
    .bind(&now)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn fetch_scores_all(
    db: &SqlitePool,
    student_id: i64,
) -> Result<Vec<ScoresAllRow>, sqlx::Error> {
    sqlx::query_as::<_, ScoresAllRow>(
        "SELECT ss.id, ss.student_id, ss.kode_matkul, \
         COALESCE(m.nama, ss.kode_matkul) AS nama_matkul, \
         COALESCE(m.sks, 0) AS sks, \
         ss.huruf, ss.nilai_akhir, ss.tahun_ajaran, \
         (SELECT j.semester FROM jadwal j \
          WHERE j.kode_matkul = ss.kode_matkul AND j.tahun_ajaran = ss.tahun_ajaran \
          ORDER BY j.id LIMIT 1) AS semester, \
         ss.kehadiran, ss.tugas, ss.uts, ss.uas, ss.updated_at \
         FROM student_scores ss \
         LEFT JOIN matkul m ON ss.kode_matkul = m.kode \
         WHERE ss.student_id = ? \
         ORDER BY ss.tahun_ajaran DESC, ss.kode_matkul",
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}

/// (total credit hours, total grade points) for one student from `khs`.
pub async fn khs_point_totals(
    db: &SqlitePool,
    student_id: i64,
) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT COALESCE(SUM(sks), 0), \
         COALESCE(SUM((CASE WHEN UPPER(huruf) = 'A' THEN 4 \
                            WHEN UPPER(huruf) = 'B' THEN 3 \
                            WHEN UPPER(huruf) = 'C' THEN 2 \
                            WHEN UPPER(huruf) = 'D' THEN 1 \
                            ELSE 0 END) * sks), 0) \
         FROM khs WHERE student_id = ? AND huruf IS NOT NULL",
    )
    .bind(student_id)
    .fetch_one(db)
    .await
}

/// Same totals computed from `student_scores` joined with course credits; the
/// fallback when no transcript rows exist yet.
pub async fn score_point_totals(
    db: &SqlitePool,
    student_id: i64,
) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT COALESCE(SUM(COALESCE(m.sks, 0)), 0), \
         COALESCE(SUM((CASE WHEN UPPER(ss.huruf) = 'A' THEN 4 \
                            WHEN UPPER(ss.huruf) = 'B' THEN 3 \
                            WHEN UPPER(ss.huruf) = 'C' THEN 2 \
                            WHEN UPPER(ss.huruf) = 'D' THEN 1 \
                            ELSE 0 END) * COALESCE(m.sks, 0)), 0) \
         FROM student_scores ss \
         LEFT JOIN matkul m ON ss.kode_matkul = m.kode \
         WHERE ss.student_id = ?",
    )
    .bind(student_id)
    .fetch_one(db)
    .await
}
