use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{DosenSubmissionRow, GradeSubmissionRequest, NewTugasRequest, Submission, Tugas};
use crate::schema::SchemaInfo;

pub async fn insert_tugas(
    db: &SqlitePool,
    dosen_id: i64,
    req: NewTugasRequest,
) -> Result<Tugas, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let status = "aktif".to_string();

    sqlx::query(
        "INSERT INTO tugas \
         (id, judul, dosen_id, prodi, tahun_angkatan, kode_matkul, deskripsi, deadline, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.judul)
    .bind(dosen_id)
    .bind(&req.prodi)
    .bind(&req.tahun_angkatan)
    .bind(&req.kode_matkul)
    .bind(&req.deskripsi)
    .bind(&req.deadline)
    .bind(&status)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Tugas {
        id,
        judul: req.judul,
        dosen_id: Some(dosen_id),
        prodi: req.prodi,
        tahun_angkatan: req.tahun_angkatan,
        kode_matkul: req.kode_matkul,
        deskripsi: req.deskripsi,
        deadline: req.deadline,
        status,
        created_at: now,
    })
}

#[derive(Debug, Clone, Default)]
pub struct TugasFilter {
    pub prodi: Option<String>,
    pub tahun_angkatan: Option<String>,
    pub kode_matkul: Option<String>,
    pub dosen_id: Option<i64>,
}

const TUGAS_COLUMNS: &str = "id, judul, dosen_id, prodi, tahun_angkatan, kode_matkul, \
                             deskripsi, deadline, status, created_at";

pub async fn fetch_tugas(db: &SqlitePool, filter: &TugasFilter) -> Result<Vec<Tugas>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {TUGAS_COLUMNS} FROM tugas WHERE 1 = 1"));
    if let Some(prodi) = &filter.prodi {
        qb.push(" AND LOWER(TRIM(prodi)) = LOWER(TRIM(").push_bind(prodi).push("))");
    }
    if let Some(tahun_angkatan) = &filter.tahun_angkatan {
        qb.push(" AND TRIM(tahun_angkatan) = TRIM(").push_bind(tahun_angkatan).push(")");
    }
    if let Some(kode_matkul) = &filter.kode_matkul {
        qb.push(" AND LOWER(TRIM(kode_matkul)) = LOWER(TRIM(").push_bind(kode_matkul).push("))");
    }
    if let Some(dosen_id) = filter.dosen_id {
        qb.push(" AND dosen_id = ").push_bind(dosen_id);
    }
    qb.push(" ORDER BY created_at DESC");

    qb.build_query_as::<Tugas>().fetch_all(db).await
}

/// Assignments visible to one student: program/intake must match when the
/// student record carries them, and course-scoped assignments require a KRS
/// row for that course. Returns None for an unknown nim.
pub async fn fetch_available(
    db: &SqlitePool,
    schema: &SchemaInfo,
    nim: &str,
) -> Result<Option<Vec<Tugas>>, sqlx::Error> {
    let student_id: Option<i64> = sqlx::query_scalar("SELECT id FROM mahasiswa WHERE nim = ?")
        .bind(nim)
        .fetch_optional(db)
        .await?;
    if student_id.is_none() {
        return Ok(None);
    }

    // Program/intake columns vary across deployments; SchemaInfo resolved the
    // actual names at startup. The column names come from a fixed candidate
    // list, never from input.
    let prodi = match &schema.mahasiswa_prodi_col {
        Some(col) => sqlx::query_scalar::<_, String>(&format!(
            "SELECT TRIM(COALESCE({col}, '')) FROM mahasiswa WHERE nim = ?"
        ))
        .bind(nim)
        .fetch_one(db)
        .await?,
        None => String::new(),
    };
    let tahun_angkatan = match &schema.mahasiswa_angkatan_col {
        Some(col) => sqlx::query_scalar::<_, String>(&format!(
            "SELECT TRIM(COALESCE({col}, '')) FROM mahasiswa WHERE nim = ?"
        ))
        .bind(nim)
        .fetch_one(db)
        .await?,
        None => String::new(),
    };

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT DISTINCT t.id, t.judul, t.dosen_id, t.prodi, t.tahun_angkatan, t.kode_matkul, \
         t.deskripsi, t.deadline, t.status, t.created_at \
         FROM tugas t \
         LEFT JOIN krs k ON k.nim = ",
    );
    qb.push_bind(nim);
    qb.push(
        " AND TRIM(COALESCE(k.kode_matkul, '')) <> '' \
         AND TRIM(k.kode_matkul) = TRIM(t.kode_matkul) \
         WHERE 1 = 1",
    );
    if !prodi.is_empty() {
        qb.push(" AND (t.prodi IS NULL OR LOWER(TRIM(t.prodi)) = LOWER(")
            .push_bind(prodi)
            .push("))");
    }
    if !tahun_angkatan.is_empty() {
        qb.push(" AND (t.tahun_angkatan IS NULL OR TRIM(t.tahun_angkatan) = ")
            .push_bind(tahun_angkatan)
            .push(")");
    }
    qb.push(
        " AND (t.kode_matkul IS NULL OR TRIM(t.kode_matkul) = '' OR k.nim IS NOT NULL) \
         ORDER BY t.created_at DESC",
    );

    qb.build_query_as::<Tugas>().fetch_all(db).await.map(Some)
}

pub async fn find_tugas(db: &SqlitePool, id: &str) -> Result<Option<Tugas>, sqlx::Error> {
    sqlx::query_as::<_, Tugas>(&format!("SELECT {TUGAS_COLUMNS} FROM tugas WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

const SUBMISSION_COLUMNS: &str =
    "id, tugas_id, nim, nama, komentar, submitted_at, grade, feedback";

pub async fn find_submission(
    db: &SqlitePool,
    tugas_id: &str,
    nim: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE tugas_id = ? AND nim = ?"
    ))
    .bind(tugas_id)
    .bind(nim)
    .fetch_optional(db)
    .await
}

pub async fn insert_submission(
    db: &SqlitePool,
    tugas_id: &str,
    nim: &str,
    nama: Option<&str>,
    komentar: Option<&str>,
) -> Result<Submission, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO submissions (id, tugas_id, nim, nama, komentar, submitted_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(tugas_id)
    .bind(nim)
    .bind(nama)
    .bind(komentar)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Submission {
        id,
        tugas_id: tugas_id.to_string(),
        nim: nim.to_string(),
        nama: nama.map(str::to_string),
        komentar: komentar.map(str::to_string),
        submitted_at: now,
        grade: None,
        feedback: None,
    })
}

pub async fn submissions_for_tugas(
    db: &SqlitePool,
    tugas_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE tugas_id = ? ORDER BY submitted_at DESC"
    ))
    .bind(tugas_id)
    .fetch_all(db)
    .await
}

pub async fn submissions_for_dosen(
    db: &SqlitePool,
    dosen_id: i64,
) -> Result<Vec<DosenSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, DosenSubmissionRow>(
        "SELECT s.id, s.tugas_id, t.judul, s.nim, s.nama, s.komentar, s.submitted_at, \
         s.grade, s.feedback \
         FROM submissions s \
         JOIN tugas t ON t.id = s.tugas_id \
         WHERE t.dosen_id = ? \
         ORDER BY s.submitted_at DESC",
    )
    .bind(dosen_id)
    .fetch_all(db)
    .await
}

pub async fn submissions_for_nim(
    db: &SqlitePool,
    nim: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE nim = ? ORDER BY submitted_at DESC"
    ))
    .bind(nim)
    .fetch_all(db)
    .await
}

pub async fn grade_submission(
    db: &SqlitePool,
    id: &str,
    req: &GradeSubmissionRequest,
) -> Result<Option<Submission>, sqlx::Error> {
    let affected = sqlx::query(
        "UPDATE submissions SET grade = COALESCE(?, grade), feedback = COALESCE(?, feedback) \
         WHERE id = ?",
    )
    .bind(&req.grade)
    .bind(&req.feedback)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}
