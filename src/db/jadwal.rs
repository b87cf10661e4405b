use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::models::{AttendanceStudent, RuangEntry};

/// Schedule slot identity as needed by the attendance queries.
#[derive(Debug, Clone, FromRow)]
pub struct JadwalTermRow {
    pub id: i64,
    pub kode_matkul: String,
    pub semester: i64,
    pub tahun_ajaran: String,
}

/// Returns the id of a schedule slot for (course, term), creating a
/// placeholder slot (no day/room/instructor yet) when none exists.
pub async fn find_or_create_slot(
    db: &SqlitePool,
    kode_matkul: &str,
    semester: i64,
    tahun_ajaran: &str,
) -> Result<i64, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM jadwal \
         WHERE kode_matkul = ? AND semester = ? AND tahun_ajaran = ? \
         ORDER BY id LIMIT 1",
    )
    .bind(kode_matkul)
    .bind(semester)
    .bind(tahun_ajaran)
    .fetch_optional(db)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let result = sqlx::query(
        "INSERT INTO jadwal (kode_matkul, semester, tahun_ajaran) VALUES (?, ?, ?)",
    )
    .bind(kode_matkul)
    .bind(semester)
    .bind(tahun_ajaran)
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Whether the instructor has a schedule slot for the course, optionally
/// narrowed to a term.
pub async fn dosen_teaches(
    db: &SqlitePool,
    dosen_id: i64,
    kode_matkul: &str,
    semester: Option<i64>,
    tahun_ajaran: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM jadwal WHERE kode_matkul = ");
    qb.push_bind(kode_matkul);
    qb.push(" AND dosen_id = ").push_bind(dosen_id);
    if let Some(semester) = semester {
        qb.push(" AND semester = ").push_bind(semester);
    }
    if let Some(tahun_ajaran) = tahun_ajaran {
        qb.push(" AND tahun_ajaran = ").push_bind(tahun_ajaran);
    }
    qb.push(" LIMIT 1");

    let found: Option<i64> = qb.build_query_scalar().fetch_optional(db).await?;
    Ok(found.is_some())
}

pub async fn create_enrollment(
    db: &SqlitePool,
    krs_id: i64,
    jadwal_id: i64,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO enrollment (krs_id, jadwal_id, created_at) VALUES (?, ?, ?)")
        .bind(krs_id)
        .bind(jadwal_id)
        .bind(&now)
        .execute(db)
        .await?;
    Ok(())
}

/// Distinct non-empty room names, optionally narrowed to slots taught by an
/// instructor whose name matches the filter.
pub async fn list_ruang(
    db: &SqlitePool,
    dosen: Option<&str>,
) -> Result<Vec<RuangEntry>, sqlx::Error> {
    match dosen.map(str::trim).filter(|d| !d.is_empty()) {
        Some(dosen) => {
            let pattern = format!("%{}%", dosen.to_lowercase());
            sqlx::query_as::<_, RuangEntry>(
                "SELECT DISTINCT TRIM(COALESCE(j.ruang, '')) AS ruang \
                 FROM jadwal j \
                 JOIN dosen d ON d.id = j.dosen_id \
                 WHERE TRIM(COALESCE(j.ruang, '')) <> '' AND LOWER(d.nama) LIKE ? \
                 ORDER BY ruang",
            )
            .bind(pattern)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, RuangEntry>(
                "SELECT DISTINCT TRIM(COALESCE(ruang, '')) AS ruang \
                 FROM jadwal \
                 WHERE TRIM(COALESCE(ruang, '')) <> '' \
                 ORDER BY ruang",
            )
            .fetch_all(db)
            .await
        }
    }
}

/// Slots matching a normalized room name, newest term first.
pub async fn fetch_by_ruang(
    db: &SqlitePool,
    ruang: &str,
    semester: Option<i64>,
    tahun_ajaran: Option<&str>,
) -> Result<Vec<JadwalTermRow>, sqlx::Error> {
    let normalized = ruang.trim().to_lowercase();

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, kode_matkul, semester, tahun_ajaran FROM jadwal \
         WHERE LOWER(TRIM(COALESCE(ruang, ''))) = ",
    );
    qb.push_bind(normalized);
    if let Some(semester) = semester {
        qb.push(" AND semester = ").push_bind(semester);
    }
    if let Some(tahun_ajaran) = tahun_ajaran {
        qb.push(" AND tahun_ajaran = ").push_bind(tahun_ajaran);
    }
    qb.push(" ORDER BY tahun_ajaran DESC, semester DESC");

    qb.build_query_as::<JadwalTermRow>().fetch_all(db).await
}

/// Attendance roster through enrollment rows for the given slots.
pub async fn students_by_enrollment(
    db: &SqlitePool,
    jadwal_ids: &[i64],
) -> Result<Vec<AttendanceStudent>, sqlx::Error> {
    if jadwal_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT DISTINCT m.nim, m.nama, k.id AS krs_id \
         FROM enrollment e \
         JOIN krs k ON e.krs_id = k.id \
         JOIN mahasiswa m ON k.nim = m.nim \
         WHERE e.jadwal_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in jadwal_ids {
        separated.push_bind(*id);
    }
    qb.push(") ORDER BY m.nama");

    qb.build_query_as::<AttendanceStudent>().fetch_all(db).await
}

/// Attendance roster fallback: approved KRS rows for the slot's courses in
/// the resolved term, for deployments predating enrollment records.
pub async fn students_by_krs(
    db: &SqlitePool,
    kode_list: &[String],
    semester: i64,
    tahun_ajaran: &str,
) -> Result<Vec<AttendanceStudent>, sqlx::Error> {
    if kode_list.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT DISTINCT m.nim, m.nama, k.id AS krs_id \
         FROM krs k \
         JOIN mahasiswa m ON k.nim = m.nim \
         WHERE LOWER(COALESCE(k.status, '')) = 'approved' AND k.kode_matkul IN (",
    );
    let mut separated = qb.separated(", ");
    for kode in kode_list {
        separated.push_bind(kode.as_str());
    }
    qb.push(") AND k.semester = ");
    qb.push_bind(semester);
    qb.push(" AND k.tahun_ajaran = ");
    qb.push_bind(tahun_ajaran);
    qb.push(" ORDER BY m.nama");

    qb.build_query_as::<AttendanceStudent>().fetch_all(db).await
}
