use std::collections::HashSet;

use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{info, warn};

use crate::db;
use crate::error::AppError;
use crate::models::{DecideRequest, DecisionAction, Dosen, Krs};
use crate::schema::SchemaInfo;

/// Batch decision over pending registrations.
///
/// The status flips happen in one transaction; ids that are unknown, already
/// decided, or outside the instructor's authority are skipped and reported
/// per category. Enrollment materialization runs after commit and is
/// best-effort: a failure there never revokes an approval.
pub struct KrsDecisionService {
    db: SqlitePool,
    schema: SchemaInfo,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentFailure {
    pub krs_id: i64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub action: DecisionAction,
    pub updated: u64,
    pub updated_ids: Vec<i64>,
    pub not_pending_ids: Vec<i64>,
    pub not_allowed_ids: Vec<i64>,
    pub enrollment_failures: Vec<EnrollmentFailure>,
}

impl KrsDecisionService {
    pub fn new(db: SqlitePool, schema: SchemaInfo) -> Self {
        Self { db, schema }
    }

    pub async fn decide(&self, req: &DecideRequest) -> Result<DecisionOutcome, AppError> {
        if req.krs_ids.is_empty() {
            return Err(AppError::BadRequest("krs_ids must not be empty".to_string()));
        }

        let dosen = sqlx::query_as::<_, Dosen>(
            "SELECT id, nama, email, can_acc_krs FROM dosen WHERE id = ?",
        )
        .bind(req.dosen_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound)?;

        let mut outcome = DecisionOutcome {
            action: req.action,
            updated: 0,
            updated_ids: Vec::new(),
            not_pending_ids: Vec::new(),
            not_allowed_ids: Vec::new(),
            enrollment_failures: Vec::new(),
        };
        let mut decided_rows: Vec<Krs> = Vec::new();

        let target_status = req.action.target_status();
        let mut seen = HashSet::new();

        let mut tx = self.db.begin().await?;
        for &krs_id in &req.krs_ids {
            if !seen.insert(krs_id) {
                continue;
            }

            let row = sqlx::query_as::<_, Krs>(
                "SELECT id, nim, kode_matkul, semester, tahun_ajaran, status, created_at \
                 FROM krs WHERE id = ?",
            )
            .bind(krs_id)
            .fetch_optional(&mut *tx)
            .await?;

            // Unknown ids land in the not-pending bucket: there is no pending
            // row to decide.
            let Some(row) = row else {
                outcome.not_pending_ids.push(krs_id);
                continue;
            };
            if row.status != "pending" {
                outcome.not_pending_ids.push(krs_id);
                continue;
            }

            if !self.is_authorized(&mut tx, &dosen, &row).await? {
                outcome.not_allowed_ids.push(krs_id);
                continue;
            }

            // Concurrent deciders may both have read `pending`; the status
            // guard on the update makes exactly one of them win.
            let affected = sqlx::query("UPDATE krs SET status = ? WHERE id = ? AND status = 'pending'")
                .bind(target_status)
                .bind(krs_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            if affected == 0 {
                outcome.not_pending_ids.push(krs_id);
                continue;
            }

            outcome.updated += affected;
            outcome.updated_ids.push(krs_id);
            decided_rows.push(row);
        }
        tx.commit().await?;

        info!(
            dosen_id = dosen.id,
            action = target_status,
            updated = outcome.updated,
            skipped_not_pending = outcome.not_pending_ids.len(),
            skipped_not_allowed = outcome.not_allowed_ids.len(),
            "krs decision batch committed"
        );

        // The approvals above are durable regardless of what happens here.
        if req.action == DecisionAction::Approve {
            for row in &decided_rows {
                if let Err(err) = self.materialize_enrollment(row).await {
                    warn!(krs_id = row.id, error = %err, "enrollment creation failed after approval");
                    outcome.enrollment_failures.push(EnrollmentFailure {
                        krs_id: row.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Approval authority: the blanket flag, a teaching assignment in the
    /// schedule for that course and term, or (legacy deployments only) a
    /// `matkul_dosen` mapping.
    async fn is_authorized(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        dosen: &Dosen,
        krs: &Krs,
    ) -> Result<bool, sqlx::Error> {
        if dosen.can_acc_krs {
            return Ok(true);
        }

        let teaches: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM jadwal \
             WHERE kode_matkul = ? AND semester = ? AND tahun_ajaran = ? AND dosen_id = ? \
             LIMIT 1",
        )
        .bind(&krs.kode_matkul)
        .bind(krs.semester)
        .bind(&krs.tahun_ajaran)
        .bind(dosen.id)
        .fetch_optional(&mut **tx)
        .await?;
        if teaches.is_some() {
            return Ok(true);
        }

        if self.schema.has_matkul_dosen {
            let mapped: Option<i64> = sqlx::query_scalar(
                "SELECT md.matkul_id FROM matkul_dosen md \
                 JOIN matkul m ON m.id = md.matkul_id \
                 WHERE m.kode = ? AND md.dosen_id = ? \
                 LIMIT 1",
            )
            .bind(&krs.kode_matkul)
            .bind(dosen.id)
            .fetch_optional(&mut **tx)
            .await?;
            return Ok(mapped.is_some());
        }

        Ok(false)
    }

    async fn materialize_enrollment(&self, krs: &Krs) -> Result<(), sqlx::Error> {
        let jadwal_id = db::jadwal::find_or_create_slot(
            &self.db,
            &krs.kode_matkul,
            krs.semester,
            &krs.tahun_ajaran,
        )
        .await?;
        db::jadwal::create_enrollment(&self.db, krs.id, jadwal_id).await
    }
}
