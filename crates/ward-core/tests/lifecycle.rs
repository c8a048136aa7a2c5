//! End-to-end lifecycle runs through the engine.
//!
//! The same scenarios run against the in-memory store and the SQLite
//! reference store: the engine must not care which one is underneath.

use chrono::Utc;
use ward_core::db::open_store_in_memory;
use ward_core::engine::Engine;
use ward_core::engine::lifecycle::ReportDraft;
use ward_core::error::WardError;
use ward_core::model::department::Department;
use ward_core::model::issue::{Priority, ProofOfWork, ProofStatus, Status};
use ward_core::model::post::{Post, PostStatus};
use ward_core::model::worker::Worker;
use ward_core::store::memory::MemoryStore;
use ward_core::store::{CivicStore, IssueStore, PostFeed, WorkerLedger};

fn citizen_post<S: CivicStore>(store: &S, body: &str) -> i64 {
    store
        .create_post(&Post {
            id: 0,
            author: "Jane Smith".into(),
            owner: "jane".into(),
            body: body.into(),
            status: PostStatus::Reported,
            issue_id: None,
            likes: 0,
            is_resolved: false,
            is_escalated: false,
            rating_work_avg: None,
            rating_escalation_avg: None,
            created_at: Utc::now(),
        })
        .expect("create citizen post")
}

fn register_worker<S: CivicStore>(store: &S, id: &str) {
    store
        .create_worker(&Worker::new(
            id.into(),
            "Mike Johnson".into(),
            Department::Water,
            "mike@civic.gov".into(),
        ))
        .expect("register worker");
}

fn report<S: CivicStore>(engine: &Engine<S>, post_id: i64) -> String {
    engine
        .report(ReportDraft {
            title: "Water main break on Oak Street".into(),
            description: "Flooding near Oak & 5th".into(),
            department: Department::Water,
            priority: Priority::Critical,
            location: Some("Oak St & 5th Ave".into()),
            reported_by: "Jane Smith".into(),
            original_post_id: Some(post_id),
        })
        .expect("report issue")
        .id
}

fn evidence() -> ProofOfWork {
    ProofOfWork {
        media_url: "https://media.civic.gov/proof/42.jpg".into(),
        timestamp: Utc::now(),
        location: Some("Oak St & 5th Ave".into()),
        geo_verified: true,
        notes: "Main repaired, road flushed".into(),
    }
}

fn happy_path<S: CivicStore>(store: S) -> (Engine<S>, String, i64) {
    let engine = Engine::new(store);
    let post_id = citizen_post(engine.store(), "Water everywhere on Oak Street!");
    register_worker(engine.store(), "w-7");

    let issue_id = report(&engine, post_id);
    let issue = engine.store().get_issue(&issue_id).expect("get");
    assert_eq!(issue.status, Status::Pending);

    let issue = engine
        .assign_task(&issue_id, "w-7", "dispatch")
        .expect("assign");
    assert_eq!(issue.status, Status::Assign);
    assert_eq!(
        engine.store().get_post(post_id).expect("post").status,
        PostStatus::Assigned
    );

    let issue = engine
        .submit_proof(&issue_id, evidence(), "w-7")
        .expect("submit proof");
    assert_eq!(issue.status, Status::PendingReview);
    // Citizen post stays at `assigned` until the review concludes.
    assert_eq!(
        engine.store().get_post(post_id).expect("post").status,
        PostStatus::Assigned
    );

    let issue = engine
        .approve_proof(&issue_id, "supervisor")
        .expect("approve proof");
    assert_eq!(issue.status, Status::Resolved);
    assert_eq!(
        issue.proof_review.as_ref().map(|r| r.status),
        Some(ProofStatus::Approved)
    );

    (engine, issue_id, post_id)
}

fn assert_resolution_effects<S: CivicStore>(engine: &Engine<S>, issue_id: &str, post_id: i64) {
    // Worker credited exactly once.
    let worker = engine.store().get_worker("w-7").expect("worker");
    assert_eq!(worker.tasks_completed, 1);
    assert_eq!(worker.civic_score, 100);

    // Citizen post mirrored to resolved.
    let post = engine.store().get_post(post_id).expect("post");
    assert_eq!(post.status, PostStatus::Resolved);
    assert!(post.is_resolved);

    // A disclosure post referencing the issue id exists.
    let disclosures = engine
        .store()
        .query_posts_by_author(&["Water Supply & Sewage".to_string()])
        .expect("disclosures");
    assert_eq!(disclosures.len(), 1);
    assert_eq!(disclosures[0].issue_id.as_deref(), Some(issue_id));
    assert!(disclosures[0].body.contains("Evidence: https://"));
}

#[test]
fn full_happy_path_in_memory() {
    let (engine, issue_id, post_id) = happy_path(MemoryStore::new());
    assert_resolution_effects(&engine, &issue_id, post_id);
}

#[test]
fn full_happy_path_on_sqlite() {
    let (engine, issue_id, post_id) = happy_path(open_store_in_memory().expect("open store"));
    assert_resolution_effects(&engine, &issue_id, post_id);
}

#[test]
fn re_approval_does_not_double_credit() {
    let (engine, issue_id, _) = happy_path(MemoryStore::new());

    let err = engine
        .approve_proof(&issue_id, "supervisor")
        .expect_err("second approval must fail");
    assert!(matches!(err, WardError::AlreadyApproved { .. }));

    let worker = engine.store().get_worker("w-7").expect("worker");
    assert_eq!(worker.tasks_completed, 1);
    assert_eq!(worker.civic_score, 100);
}

#[test]
fn assign_twice_fails_regardless_of_worker() {
    let engine = Engine::new(MemoryStore::new());
    let post_id = citizen_post(engine.store(), "Garbage not collected");
    register_worker(engine.store(), "w-7");
    register_worker(engine.store(), "w-8");

    let issue_id = report(&engine, post_id);
    engine
        .assign_task(&issue_id, "w-7", "dispatch")
        .expect("assign");

    let err = engine
        .assign_task(&issue_id, "w-8", "dispatch")
        .expect_err("reassignment must fail");
    assert!(matches!(err, WardError::AlreadyAssigned { .. }));
}

#[test]
fn inactive_worker_is_unavailable() {
    let engine = Engine::new(MemoryStore::new());
    let post_id = citizen_post(engine.store(), "Street light flickering");
    register_worker(engine.store(), "w-7");
    engine
        .store()
        .set_worker_active("w-7", false)
        .expect("deactivate");

    let issue_id = report(&engine, post_id);
    let err = engine
        .assign_task(&issue_id, "w-7", "dispatch")
        .expect_err("inactive worker");
    assert!(matches!(err, WardError::WorkerUnavailable { .. }));
}

#[test]
fn submit_requires_assign_and_refuses_concurrent_review() {
    let engine = Engine::new(MemoryStore::new());
    let post_id = citizen_post(engine.store(), "Broken swing in the park");
    register_worker(engine.store(), "w-7");
    let issue_id = report(&engine, post_id);

    // Still pending: no proof allowed.
    let err = engine
        .submit_proof(&issue_id, evidence(), "w-7")
        .expect_err("pending issue cannot take proof");
    assert!(matches!(err, WardError::InvalidTransition { .. }));

    engine
        .assign_task(&issue_id, "w-7", "dispatch")
        .expect("assign");
    engine
        .submit_proof(&issue_id, evidence(), "w-7")
        .expect("first proof");

    let err = engine
        .submit_proof(&issue_id, evidence(), "w-7")
        .expect_err("review already open");
    assert!(matches!(err, WardError::ReviewInProgress { .. }));
}

#[test]
fn rejection_returns_to_assign_and_keeps_worker() {
    let engine = Engine::new(MemoryStore::new());
    let post_id = citizen_post(engine.store(), "Overflowing drain");
    register_worker(engine.store(), "w-7");
    let issue_id = report(&engine, post_id);

    engine
        .assign_task(&issue_id, "w-7", "dispatch")
        .expect("assign");
    engine
        .submit_proof(&issue_id, evidence(), "w-7")
        .expect("submit");

    let issue = engine
        .reject_proof(&issue_id, "supervisor")
        .expect("reject");
    assert_eq!(issue.status, Status::Assign);
    assert_eq!(
        issue.proof_review.as_ref().map(|r| r.status),
        Some(ProofStatus::Rejected)
    );
    assert_eq!(
        issue.assigned_personnel.as_ref().map(|p| p.id.as_str()),
        Some("w-7")
    );
    assert_eq!(
        engine.store().get_post(post_id).expect("post").status,
        PostStatus::Assigned
    );

    // No credit for rejected work.
    let worker = engine.store().get_worker("w-7").expect("worker");
    assert_eq!(worker.tasks_completed, 0);

    // Resubmission after rejection is a fresh review cycle.
    engine
        .submit_proof(&issue_id, evidence(), "w-7")
        .expect("resubmit");
    let issue = engine
        .approve_proof(&issue_id, "supervisor")
        .expect("approve after rework");
    assert_eq!(issue.proof_of_work.len(), 2);
}

#[test]
fn reopen_returns_resolved_issue_to_active_work() {
    let (engine, issue_id, _) = happy_path(MemoryStore::new());

    let issue = engine.reopen(&issue_id, "jane").expect("reopen");
    assert_eq!(issue.status, Status::Assign);
    assert!(issue.assigned_personnel.is_some());
    assert!(
        issue
            .audit
            .iter()
            .any(|entry| entry.status == Status::Reopened)
    );

    // Only resolved issues can reopen.
    let err = engine.reopen(&issue_id, "jane").expect_err("not resolved");
    assert!(matches!(err, WardError::InvalidTransition { .. }));
}

#[test]
fn disabled_disclosure_skips_the_public_post_only() {
    let engine = Engine::new(MemoryStore::new()).with_disclosure(false);
    let post_id = citizen_post(engine.store(), "Water main break");
    register_worker(engine.store(), "w-7");
    let issue_id = report(&engine, post_id);

    engine
        .assign_task(&issue_id, "w-7", "dispatch")
        .expect("assign");
    engine
        .submit_proof(&issue_id, evidence(), "w-7")
        .expect("submit");
    engine
        .approve_proof(&issue_id, "supervisor")
        .expect("approve");

    // No disclosure post, but mirror and credit still ran.
    let disclosures = engine
        .store()
        .query_posts_by_author(&["Water Supply & Sewage".to_string()])
        .expect("disclosures");
    assert!(disclosures.is_empty());
    assert_eq!(
        engine.store().get_post(post_id).expect("post").status,
        PostStatus::Resolved
    );
    assert_eq!(
        engine.store().get_worker("w-7").expect("worker").civic_score,
        100
    );
}

#[test]
fn audit_trail_records_every_transition() {
    let (engine, issue_id, _) = happy_path(MemoryStore::new());
    let issue = engine.store().get_issue(&issue_id).expect("get");

    let statuses: Vec<Status> = issue.audit.iter().map(|entry| entry.status).collect();
    assert_eq!(
        statuses,
        vec![
            Status::Pending,
            Status::Assign,
            Status::PendingReview,
            Status::Resolved
        ]
    );
}
