#![allow(dead_code)]

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database with the full schema applied.
pub async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    pool
}

pub async fn seed_prodi(db: &SqlitePool, id: &str, nama: &str) {
    sqlx::query("INSERT INTO prodi (id, nama_prodi) VALUES (?, ?)")
        .bind(id)
        .bind(nama)
        .execute(db)
        .await
        .expect("seed prodi");
}

pub async fn seed_mahasiswa(db: &SqlitePool, nim: &str, nama: &str) -> i64 {
    seed_mahasiswa_full(db, nim, nama, None, None).await
}

pub async fn seed_mahasiswa_full(
    db: &SqlitePool,
    nim: &str,
    nama: &str,
    prodi_id: Option<&str>,
    tahun_angkatan: Option<&str>,
) -> i64 {
    let email = format!("{nim}@kampus.test");
    sqlx::query(
        "INSERT INTO mahasiswa (nim, nama, email, prodi_id, tahun_angkatan) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(nim)
    .bind(nama)
    .bind(email)
    .bind(prodi_id)
    .bind(tahun_angkatan)
    .execute(db)
    .await
    .expect("seed mahasiswa")
    .last_insert_rowid()
}

pub async fn seed_dosen(db: &SqlitePool, nama: &str, can_acc_krs: bool) -> i64 {
    let email = format!("{}@kampus.test", nama.to_lowercase().replace(' ', "."));
    sqlx::query("INSERT INTO dosen (nama, email, can_acc_krs) VALUES (?, ?, ?)")
        .bind(nama)
        .bind(email)
        .bind(can_acc_krs)
        .execute(db)
        .await
        .expect("seed dosen")
        .last_insert_rowid()
}

pub async fn seed_matkul(db: &SqlitePool, kode: &str, nama: &str, sks: i64) -> i64 {
    sqlx::query("INSERT INTO matkul (kode, nama, sks) VALUES (?, ?, ?)")
        .bind(kode)
        .bind(nama)
        .bind(sks)
        .execute(db)
        .await
        .expect("seed matkul")
        .last_insert_rowid()
}

pub async fn seed_matkul_prodi(
    db: &SqlitePool,
    kode: &str,
    nama: &str,
    sks: i64,
    prodi_id: &str,
) -> i64 {
    sqlx::query("INSERT INTO matkul (kode, nama, sks, prodi_id) VALUES (?, ?, ?, ?)")
        .bind(kode)
        .bind(nama)
        .bind(sks)
        .bind(prodi_id)
        .execute(db)
        .await
        .expect("seed matkul")
        .last_insert_rowid()
}

pub async fn seed_jadwal(
    db: &SqlitePool,
    kode_matkul: &str,
    semester: i64,
    tahun_ajaran: &str,
    dosen_id: Option<i64>,
) -> i64 {
    seed_jadwal_full(db, kode_matkul, semester, tahun_ajaran, dosen_id, None, None).await
}

pub async fn seed_jadwal_full(
    db: &SqlitePool,
    kode_matkul: &str,
    semester: i64,
    tahun_ajaran: &str,
    dosen_id: Option<i64>,
    hari: Option<&str>,
    ruang: Option<&str>,
) -> i64 {
    sqlx::query(
        "INSERT INTO jadwal (kode_matkul, semester, tahun_ajaran, hari, waktu_mulai, waktu_selesai, ruang, dosen_id) \
         VALUES (?, ?, ?, ?, '08:00', '09:40', ?, ?)",
    )
    .bind(kode_matkul)
    .bind(semester)
    .bind(tahun_ajaran)
    .bind(hari)
    .bind(ruang)
    .bind(dosen_id)
    .execute(db)
    .await
    .expect("seed jadwal")
    .last_insert_rowid()
}

pub async fn seed_krs(
    db: &SqlitePool,
    nim: &str,
    kode_matkul: &str,
    semester: i64,
    tahun_ajaran: &str,
    status: &str,
) -> i64 {
    sqlx::query(
        "INSERT INTO krs (nim, kode_matkul, semester, tahun_ajaran, status, created_at) \
         VALUES (?, ?, ?, ?, ?, datetime('now'))",
    )
    .bind(nim)
    .bind(kode_matkul)
    .bind(semester)
    .bind(tahun_ajaran)
    .bind(status)
    .execute(db)
    .await
    .expect("seed krs")
    .last_insert_rowid()
}

pub async fn krs_status(db: &SqlitePool, id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM krs WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await
        .expect("fetch krs status")
}

pub async fn enrollment_count(db: &SqlitePool, krs_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM enrollment WHERE krs_id = ?")
        .bind(krs_id)
        .fetch_one(db)
        .await
        .expect("count enrollment")
}

pub async fn seed_khs(
    db: &SqlitePool,
    student_id: i64,
    kode_matkul: &str,
    sks: i64,
    huruf: &str,
    tahun_ajaran: &str,
) -> i64 {
    sqlx::query(
        "INSERT INTO khs (student_id, kode_matkul, sks, huruf, tahun_ajaran, created_at) \
         VALUES (?, ?, ?, ?, ?, datetime('now'))",
    )
    .bind(student_id)
    .bind(kode_matkul)
    .bind(sks)
    .bind(huruf)
    .bind(tahun_ajaran)
    .execute(db)
    .await
    .expect("seed khs")
    .last_insert_rowid()
}

/// Creates the legacy assignment table that only some deployments carry.
pub async fn create_matkul_dosen(db: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE matkul_dosen (\
             matkul_id INTEGER NOT NULL REFERENCES matkul(id), \
             dosen_id INTEGER NOT NULL REFERENCES dosen(id), \
             PRIMARY KEY (matkul_id, dosen_id))",
    )
    .execute(db)
    .await
    .expect("create matkul_dosen");
}

pub async fn seed_matkul_dosen(db: &SqlitePool, matkul_id: i64, dosen_id: i64) {
    sqlx::query("INSERT INTO matkul_dosen (matkul_id, dosen_id) VALUES (?, ?)")
        .bind(matkul_id)
        .bind(dosen_id)
        .execute(db)
        .await
        .expect("seed matkul_dosen");
}
