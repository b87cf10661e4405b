use sqlx::SqlitePool;

/// Schema facts resolved once at startup and carried in `AppState`.
///
/// Deployments migrated from the legacy system differ in two ways this
/// service has to tolerate: an optional `matkul_dosen` assignment table, and
/// several historical spellings of the student program/intake columns.
#[derive(Debug, Clone, Default)]
pub struct SchemaInfo {
    pub has_matkul_dosen: bool,
    pub mahasiswa_prodi_col: Option<String>,
    pub mahasiswa_angkatan_col: Option<String>,
}

const PRODI_CANDIDATES: &[&str] = &["prodi_id", "prodi", "program_studi", "jurusan"];
const ANGKATAN_CANDIDATES: &[&str] = &["tahun_angkatan", "angkatan", "tahun_masuk"];

impl SchemaInfo {
    pub async fn detect(db: &SqlitePool) -> Result<Self, sqlx::Error> {
        let matkul_dosen: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'matkul_dosen'",
        )
        .fetch_optional(db)
        .await?;

        let mahasiswa_cols: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('mahasiswa')")
                .fetch_all(db)
                .await?;

        Ok(Self {
            has_matkul_dosen: matkul_dosen.is_some(),
            mahasiswa_prodi_col: pick(&mahasiswa_cols, PRODI_CANDIDATES),
            mahasiswa_angkatan_col: pick(&mahasiswa_cols, ANGKATAN_CANDIDATES),
        })
    }
}

fn pick(cols: &[String], candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .copied()
        .find(|cand| cols.iter().any(|have| have.as_str() == *cand))
        .map(str::to_string)
}
