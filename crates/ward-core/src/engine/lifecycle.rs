//! Pure transition functions for the primary issue lifecycle.
//!
//! Each function validates its precondition against the snapshot it is
//! given and returns the patch to write plus the ordered side effects the
//! transition requires. Nothing here touches the store; the [`super::Engine`]
//! re-validates the precondition through the store's compare-and-set write.

use chrono::{DateTime, Utc};

use super::effects::{DisclosureDraft, Effect};
use crate::error::{Result, WardError};
use crate::model::department::Department;
use crate::model::issue::{
    AuditEntry, Issue, Personnel, Priority, ProofOfWork, ProofReview, ProofStatus, PublicRatings,
    Status, new_issue_id,
};
use crate::model::post::PostStatus;
use crate::model::worker::Worker;
use crate::store::IssuePatch;

/// Citizen intake fields for a new report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub department: Department,
    pub priority: Priority,
    pub location: Option<String>,
    pub reported_by: String,
    pub original_post_id: Option<i64>,
}

/// Build a new `pending` issue from a citizen report.
#[must_use]
pub fn new_report(draft: ReportDraft, now: DateTime<Utc>) -> Issue {
    Issue {
        id: new_issue_id(draft.department, now),
        title: draft.title,
        description: draft.description,
        department: draft.department,
        priority: draft.priority,
        status: Status::Pending,
        location: draft.location,
        reported_by: draft.reported_by.clone(),
        assigned_personnel: None,
        proof_of_work: vec![],
        proof_review: None,
        escalation: None,
        public_ratings: PublicRatings::default(),
        original_post_id: draft.original_post_id,
        audit: vec![AuditEntry {
            status: Status::Pending,
            timestamp: now,
            updated_by: draft.reported_by,
        }],
        created_at: now,
        updated_at: now,
    }
}

fn audit(status: Status, now: DateTime<Utc>, actor: &str) -> AuditEntry {
    AuditEntry {
        status,
        timestamp: now,
        updated_by: actor.to_string(),
    }
}

/// Assign an unassigned issue to an active worker.
///
/// # Errors
/// `AlreadyAssigned` when personnel is present, `WorkerUnavailable` when
/// the worker is inactive.
pub fn assign(
    issue: &Issue,
    worker: &Worker,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(IssuePatch, Vec<Effect>)> {
    if let Some(personnel) = &issue.assigned_personnel {
        return Err(WardError::AlreadyAssigned {
            issue_id: issue.id.clone(),
            assignee: personnel.id.clone(),
        });
    }
    if !worker.active {
        return Err(WardError::WorkerUnavailable {
            worker_id: worker.id.clone(),
        });
    }

    let mut patch = IssuePatch::at(now);
    patch.status = Some(Status::Assign);
    patch.assigned_personnel = Some(Personnel {
        id: worker.id.clone(),
        name: worker.name.clone(),
        department: worker.department,
        contact: worker.contact.clone(),
    });
    patch.push_audit = Some(audit(Status::Assign, now, actor));

    let effects = mirror(issue, PostStatus::Assigned);
    Ok((patch, effects))
}

/// Submit evidence for an assigned issue, moving it under review.
///
/// # Errors
/// `ReviewInProgress` while a review is already open, `InvalidTransition`
/// for any other status.
pub fn submit_proof(
    issue: &Issue,
    evidence: ProofOfWork,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(IssuePatch, Vec<Effect>)> {
    match issue.status {
        Status::PendingReview => {
            return Err(WardError::ReviewInProgress {
                issue_id: issue.id.clone(),
            });
        }
        Status::Assign => {}
        other => {
            return Err(WardError::invalid_transition(
                &issue.id,
                "submit-proof",
                "assign",
                other,
            ));
        }
    }

    let mut patch = IssuePatch::at(now);
    patch.status = Some(Status::PendingReview);
    patch.push_proof = Some(evidence);
    patch.push_audit = Some(audit(Status::PendingReview, now, actor));

    // The citizen post stays at `assigned` until the review concludes.
    Ok((patch, vec![]))
}

/// Approve the open proof review, resolving the issue.
///
/// Effect order: post mirror, worker credit, public disclosure. The
/// disclosure carries the latest evidence reference and any known citizen
/// rating.
///
/// # Errors
/// `AlreadyApproved` when the issue is already resolved by approval,
/// `InvalidTransition` for any other status.
pub fn approve_proof(
    issue: &Issue,
    worker: Option<&Worker>,
    reviewer: &str,
    now: DateTime<Utc>,
) -> Result<(IssuePatch, Vec<Effect>)> {
    if issue.status == Status::Resolved
        || issue
            .proof_review
            .as_ref()
            .is_some_and(|review| review.status == ProofStatus::Approved)
    {
        return Err(WardError::AlreadyApproved {
            issue_id: issue.id.clone(),
        });
    }
    if issue.status != Status::PendingReview {
        return Err(WardError::invalid_transition(
            &issue.id,
            "approve-proof",
            "pending-review",
            issue.status,
        ));
    }

    let mut patch = IssuePatch::at(now);
    patch.status = Some(Status::Resolved);
    patch.proof_review = Some(ProofReview {
        status: ProofStatus::Approved,
        reviewed_by: reviewer.to_string(),
        reviewed_at: now,
    });
    patch.push_audit = Some(audit(Status::Resolved, now, reviewer));

    let mut effects = mirror(issue, PostStatus::Resolved);
    if let Some(worker) = worker {
        let (_, tasks, badges) = worker.credited();
        effects.push(Effect::CreditWorker {
            worker_id: worker.id.clone(),
            delta: crate::model::worker::CREDIT_PER_APPROVAL,
            new_tasks_completed: tasks,
            new_badge_count: badges,
        });
    }
    effects.push(Effect::PublishDisclosure(resolution_disclosure(issue)));

    Ok((patch, effects))
}

/// Reject the open proof review, returning the issue to active work. The
/// worker keeps the assignment.
///
/// # Errors
/// `InvalidTransition` unless the issue is under review.
pub fn reject_proof(
    issue: &Issue,
    reviewer: &str,
    now: DateTime<Utc>,
) -> Result<(IssuePatch, Vec<Effect>)> {
    if issue.status != Status::PendingReview {
        return Err(WardError::invalid_transition(
            &issue.id,
            "reject-proof",
            "pending-review",
            issue.status,
        ));
    }

    let mut patch = IssuePatch::at(now);
    patch.status = Some(Status::Assign);
    patch.proof_review = Some(ProofReview {
        status: ProofStatus::Rejected,
        reviewed_by: reviewer.to_string(),
        reviewed_at: now,
    });
    patch.push_audit = Some(audit(Status::Assign, now, reviewer));

    Ok((patch, mirror(issue, PostStatus::Assigned)))
}

/// Reopen a resolved issue after citizen dissatisfaction; work resumes in
/// `assign` with the existing personnel.
///
/// # Errors
/// `InvalidTransition` unless the issue is resolved.
pub fn reopen(issue: &Issue, actor: &str, now: DateTime<Utc>) -> Result<(IssuePatch, Vec<Effect>)> {
    if issue.status != Status::Resolved {
        return Err(WardError::invalid_transition(
            &issue.id,
            "reopen",
            "resolved",
            issue.status,
        ));
    }

    let mut patch = IssuePatch::at(now);
    patch.status = Some(Status::Assign);
    patch.push_audit = Some(audit(Status::Reopened, now, actor));

    Ok((patch, mirror(issue, PostStatus::Assigned)))
}

fn mirror(issue: &Issue, status: PostStatus) -> Vec<Effect> {
    issue
        .original_post_id
        .map(|post_id| Effect::MirrorPost { post_id, status })
        .into_iter()
        .collect()
}

fn resolution_disclosure(issue: &Issue) -> DisclosureDraft {
    DisclosureDraft {
        author: issue.department.name().to_string(),
        owner: format!("{}_dept", issue.department.id()),
        body: format!("Resolved: {} ({})", issue.title, issue.id),
        issue_id: issue.id.clone(),
        escalation: false,
        media_url: issue.latest_proof().map(|proof| proof.media_url.clone()),
        rating: issue.public_ratings.work.map(|r| r.average),
    }
}
