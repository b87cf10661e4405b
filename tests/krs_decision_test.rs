mod common;

use siakad_backend::error::AppError;
use siakad_backend::models::{DecideRequest, DecisionAction};
use siakad_backend::schema::SchemaInfo;
use siakad_backend::services::KrsDecisionService;

use common::*;

async fn service(db: &sqlx::SqlitePool) -> KrsDecisionService {
    let schema = SchemaInfo::detect(db).await.expect("detect schema");
    KrsDecisionService::new(db.clone(), schema)
}

#[tokio::test]
async fn approve_with_blanket_authority_creates_enrollment() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021001", "Budi Santoso").await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;
    seed_matkul(&db, "IF101", "Algoritma", 3).await;
    let krs_id = seed_krs(&db, "2021001", "IF101", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.updated_ids, vec![krs_id]);
    assert!(outcome.not_pending_ids.is_empty());
    assert!(outcome.not_allowed_ids.is_empty());
    assert!(outcome.enrollment_failures.is_empty());

    assert_eq!(krs_status(&db, krs_id).await, "approved");
    // A placeholder slot was created for the term and linked.
    assert_eq!(enrollment_count(&db, krs_id).await, 1);
}

#[tokio::test]
async fn approve_reuses_existing_schedule_slot() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021002", "Siti Aminah").await;
    let dosen_id = seed_dosen(&db, "Ibu Dosen", false).await;
    seed_matkul(&db, "IF102", "Struktur Data", 3).await;
    let jadwal_id = seed_jadwal(&db, "IF102", 5, "2024/2025", Some(dosen_id)).await;
    let krs_id = seed_krs(&db, "2021002", "IF102", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated, 1);

    let linked: i64 = sqlx::query_scalar("SELECT jadwal_id FROM enrollment WHERE krs_id = ?")
        .bind(krs_id)
        .fetch_one(&db)
        .await
        .expect("fetch enrollment");
    assert_eq!(linked, jadwal_id);

    let slots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jadwal")
        .fetch_one(&db)
        .await
        .expect("count jadwal");
    assert_eq!(slots, 1, "no duplicate slot should be created");
}

#[tokio::test]
async fn non_pending_rows_are_reported_and_unchanged() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021003", "Andi Wijaya").await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;
    seed_matkul(&db, "IF103", "Basis Data", 3).await;
    let krs_id = seed_krs(&db, "2021003", "IF103", 5, "2024/2025", "approved").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Reject,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.not_pending_ids, vec![krs_id]);
    assert_eq!(krs_status(&db, krs_id).await, "approved");
}

#[tokio::test]
async fn unauthorized_instructor_is_skipped() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021004", "Dewi Lestari").await;
    let dosen_id = seed_dosen(&db, "Dosen Lain", false).await;
    seed_matkul(&db, "IF104", "Jaringan", 2).await;
    let krs_id = seed_krs(&db, "2021004", "IF104", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.not_allowed_ids, vec![krs_id]);
    assert_eq!(krs_status(&db, krs_id).await, "pending");
    assert_eq!(enrollment_count(&db, krs_id).await, 0);
}

#[tokio::test]
async fn teaching_assignment_in_other_term_does_not_authorize() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021005", "Rizki Pratama").await;
    let dosen_id = seed_dosen(&db, "Ibu Dosen", false).await;
    seed_matkul(&db, "IF105", "Sistem Operasi", 3).await;
    // Teaches the course, but in a different academic year.
    seed_jadwal(&db, "IF105", 5, "2023/2024", Some(dosen_id)).await;
    let krs_id = seed_krs(&db, "2021005", "IF105", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.not_allowed_ids, vec![krs_id]);
    assert_eq!(krs_status(&db, krs_id).await, "pending");
}

#[tokio::test]
async fn legacy_matkul_dosen_mapping_authorizes() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021006", "Tono").await;
    let dosen_id = seed_dosen(&db, "Pak Legacy", false).await;
    let matkul_id = seed_matkul(&db, "IF106", "Pemrograman Web", 3).await;
    create_matkul_dosen(&db).await;
    seed_matkul_dosen(&db, matkul_id, dosen_id).await;
    let krs_id = seed_krs(&db, "2021006", "IF106", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated_ids, vec![krs_id]);
    assert_eq!(krs_status(&db, krs_id).await, "approved");
}

#[tokio::test]
async fn reject_does_not_touch_enrollment() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021007", "Rina").await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;
    seed_matkul(&db, "IF107", "Kecerdasan Buatan", 3).await;
    let krs_id = seed_krs(&db, "2021007", "IF107", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Reject,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated_ids, vec![krs_id]);
    assert_eq!(krs_status(&db, krs_id).await, "rejected");
    assert_eq!(enrollment_count(&db, krs_id).await, 0);
}

#[tokio::test]
async fn decisions_never_reverse() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021008", "Bayu").await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;
    seed_matkul(&db, "IF108", "Grafika", 3).await;
    let krs_id = seed_krs(&db, "2021008", "IF108", 5, "2024/2025", "pending").await;

    let svc = service(&db).await;
    let first = svc
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("first decision");
    assert_eq!(first.updated, 1);

    let second = svc
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Reject,
        })
        .await
        .expect("second decision");
    assert_eq!(second.updated, 0);
    assert_eq!(second.not_pending_ids, vec![krs_id]);
    assert_eq!(krs_status(&db, krs_id).await, "approved");
}

#[tokio::test]
async fn concurrent_decisions_have_a_single_winner() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021009", "Citra").await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;
    seed_matkul(&db, "IF109", "Keamanan", 3).await;
    let krs_id = seed_krs(&db, "2021009", "IF109", 5, "2024/2025", "pending").await;

    let approve_svc = service(&db).await;
    let reject_svc = service(&db).await;

    let approve_req = DecideRequest {
        dosen_id,
        krs_ids: vec![krs_id],
        action: DecisionAction::Approve,
    };
    let reject_req = DecideRequest {
        dosen_id,
        krs_ids: vec![krs_id],
        action: DecisionAction::Reject,
    };
    let approve = approve_svc.decide(&approve_req);
    let reject = reject_svc.decide(&reject_req);

    let (approve, reject) = tokio::join!(approve, reject);
    let approve = approve.expect("approve call");
    let reject = reject.expect("reject call");

    assert_eq!(
        approve.updated + reject.updated,
        1,
        "exactly one decision may take effect"
    );
    let status = krs_status(&db, krs_id).await;
    assert!(status == "approved" || status == "rejected");
}

#[tokio::test]
async fn enrollment_failure_is_reported_but_approval_stands() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021010", "Eka").await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;
    seed_matkul(&db, "IF110", "Etika Profesi", 2).await;
    let jadwal_id = seed_jadwal(&db, "IF110", 5, "2024/2025", None).await;
    let krs_id = seed_krs(&db, "2021010", "IF110", 5, "2024/2025", "pending").await;

    // Pre-existing link makes the post-commit enrollment insert collide.
    sqlx::query("INSERT INTO enrollment (krs_id, jadwal_id, created_at) VALUES (?, ?, datetime('now'))")
        .bind(krs_id)
        .bind(jadwal_id)
        .execute(&db)
        .await
        .expect("pre-seed enrollment");

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated_ids, vec![krs_id]);
    assert_eq!(outcome.enrollment_failures.len(), 1);
    assert_eq!(outcome.enrollment_failures[0].krs_id, krs_id);
    // The approval is durable despite the downstream failure.
    assert_eq!(krs_status(&db, krs_id).await, "approved");
}

#[tokio::test]
async fn mixed_batch_reports_each_category() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021011", "Fajar").await;
    seed_mahasiswa(&db, "2021012", "Gita").await;
    seed_mahasiswa(&db, "2021013", "Hadi").await;
    let dosen_id = seed_dosen(&db, "Ibu Dosen", false).await;
    seed_matkul(&db, "IF111", "Kalkulus", 3).await;
    seed_matkul(&db, "IF112", "Statistika", 3).await;
    seed_jadwal(&db, "IF111", 5, "2024/2025", Some(dosen_id)).await;

    let ok_id = seed_krs(&db, "2021011", "IF111", 5, "2024/2025", "pending").await;
    let decided_id = seed_krs(&db, "2021012", "IF111", 5, "2024/2025", "rejected").await;
    let foreign_id = seed_krs(&db, "2021013", "IF112", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![ok_id, decided_id, foreign_id, 99999],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated_ids, vec![ok_id]);
    assert_eq!(outcome.not_pending_ids, vec![decided_id, 99999]);
    assert_eq!(outcome.not_allowed_ids, vec![foreign_id]);
}

#[tokio::test]
async fn duplicate_ids_in_batch_are_processed_once() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021014", "Intan").await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;
    seed_matkul(&db, "IF113", "Aljabar", 3).await;
    let krs_id = seed_krs(&db, "2021014", "IF113", 5, "2024/2025", "pending").await;

    let outcome = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![krs_id, krs_id, krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect("decide");

    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.updated_ids, vec![krs_id]);
    assert_eq!(enrollment_count(&db, krs_id).await, 1);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let db = setup_db().await;
    let dosen_id = seed_dosen(&db, "Prof Kaprodi", true).await;

    let err = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id,
            krs_ids: vec![],
            action: DecisionAction::Approve,
        })
        .await
        .expect_err("empty batch must fail");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn unknown_instructor_is_not_found() {
    let db = setup_db().await;
    seed_mahasiswa(&db, "2021015", "Joko").await;
    seed_matkul(&db, "IF114", "Fisika", 3).await;
    let krs_id = seed_krs(&db, "2021015", "IF114", 5, "2024/2025", "pending").await;

    let err = service(&db)
        .await
        .decide(&DecideRequest {
            dosen_id: 424242,
            krs_ids: vec![krs_id],
            action: DecisionAction::Approve,
        })
        .await
        .expect_err("unknown instructor must fail");
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(krs_status(&db, krs_id).await, "pending");
}
