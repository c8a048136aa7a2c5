//! Transition orchestration: read, validate, compare-and-set, dispatch.
//!
//! Every operation follows the same shape: read the latest issue snapshot,
//! run the pure transition function, write the resulting patch through the
//! store's compare-and-set (re-validating the precondition at write time),
//! then dispatch the transition's side effects. Effects run after the
//! committed write as single best-effort attempts; failures are logged and
//! swallowed, never rolled back, never retried.

pub mod effects;
pub mod escalation;
pub mod lifecycle;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::issue::{Issue, ProofOfWork, Status};
use crate::model::post::Notification;
use crate::model::worker::Worker;
use crate::store::{CivicStore, Expected};
use effects::Effect;
use lifecycle::ReportDraft;

/// The lifecycle engine, generic over any [`CivicStore`] implementation.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
    disclosure_enabled: bool,
}

impl<S: CivicStore> Engine<S> {
    pub const fn new(store: S) -> Self {
        Self {
            store,
            disclosure_enabled: true,
        }
    }

    /// Toggle public disclosure posting (config `disclosure.enabled`).
    /// Mirrors, notifications, and credit are unaffected.
    #[must_use]
    pub fn with_disclosure(mut self, enabled: bool) -> Self {
        self.disclosure_enabled = enabled;
        self
    }

    /// The underlying store, for read paths that bypass the engine.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Citizen intake: persist a new `pending` issue.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn report(&self, draft: ReportDraft) -> Result<Issue> {
        let issue = lifecycle::new_report(draft, Utc::now());
        self.store.create_issue(&issue)?;
        info!(issue_id = %issue.id, department = %issue.department, "issue reported");
        Ok(issue)
    }

    /// Assign an unassigned issue to an active worker.
    ///
    /// # Errors
    /// `AlreadyAssigned`, `WorkerUnavailable`, `ConflictingTransition`,
    /// `IssueNotFound`, `WorkerNotFound`.
    pub fn assign_task(&self, issue_id: &str, worker_id: &str, actor: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let worker = self.store.get_worker(worker_id)?;
        let (patch, effects) = lifecycle::assign(&issue, &worker, actor, now)?;
        self.store
            .update_issue(issue_id, patch, Expected::Unassigned)?;
        info!(issue_id, worker_id, "task assigned");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    /// Submit proof of work, moving the issue under review.
    ///
    /// # Errors
    /// `ReviewInProgress`, `InvalidTransition`, `ConflictingTransition`,
    /// `IssueNotFound`.
    pub fn submit_proof(&self, issue_id: &str, evidence: ProofOfWork, actor: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let (patch, effects) = lifecycle::submit_proof(&issue, evidence, actor, now)?;
        self.store
            .update_issue(issue_id, patch, Expected::Status(Status::Assign))?;
        info!(issue_id, "proof submitted");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    /// Approve the open proof review, resolving the issue and crediting the
    /// assigned worker.
    ///
    /// # Errors
    /// `AlreadyApproved`, `InvalidTransition`, `ConflictingTransition`,
    /// `IssueNotFound`.
    pub fn approve_proof(&self, issue_id: &str, reviewer: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let worker = self.assigned_worker(&issue);
        let (patch, effects) = lifecycle::approve_proof(&issue, worker.as_ref(), reviewer, now)?;
        self.store
            .update_issue(issue_id, patch, Expected::Status(Status::PendingReview))?;
        info!(issue_id, reviewer, "proof approved, issue resolved");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    /// Reject the open proof review; the issue returns to active work with
    /// the same worker.
    ///
    /// # Errors
    /// `InvalidTransition`, `ConflictingTransition`, `IssueNotFound`.
    pub fn reject_proof(&self, issue_id: &str, reviewer: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let (patch, effects) = lifecycle::reject_proof(&issue, reviewer, now)?;
        self.store
            .update_issue(issue_id, patch, Expected::Status(Status::PendingReview))?;
        info!(issue_id, reviewer, "proof rejected");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    /// Reopen a resolved issue after citizen dissatisfaction.
    ///
    /// # Errors
    /// `InvalidTransition`, `ConflictingTransition`, `IssueNotFound`.
    pub fn reopen(&self, issue_id: &str, actor: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let (patch, effects) = lifecycle::reopen(&issue, actor, now)?;
        self.store
            .update_issue(issue_id, patch, Expected::Status(Status::Resolved))?;
        info!(issue_id, "issue reopened");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    /// Raise an escalation against an issue, regardless of primary status.
    ///
    /// # Errors
    /// `InvalidTransition` while one is pending, `ConflictingTransition`,
    /// `IssueNotFound`.
    pub fn escalate(&self, issue_id: &str, reason: &str, escalated_by: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let (patch, effects) =
            escalation::escalate(&issue, reason.to_string(), escalated_by.to_string(), now)?;
        self.store
            .update_issue(issue_id, patch, Expected::EscalationIdle)?;
        info!(issue_id, escalated_by, "issue escalated");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    /// Approve the pending escalation: disclose publicly, notify the
    /// reporting citizen, and return the issue to active work.
    ///
    /// # Errors
    /// `InvalidTransition`, `ConflictingTransition`, `IssueNotFound`.
    pub fn approve_escalation(&self, issue_id: &str, approver: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let (patch, effects) = escalation::approve(&issue, approver, now)?;
        self.store
            .update_issue(issue_id, patch, Expected::EscalationPending)?;
        info!(issue_id, approver, "escalation approved");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    /// Reject the pending escalation and return the issue to active work.
    ///
    /// # Errors
    /// `InvalidTransition`, `ConflictingTransition`, `IssueNotFound`.
    pub fn reject_escalation(&self, issue_id: &str, approver: &str) -> Result<Issue> {
        let now = Utc::now();
        let issue = self.store.get_issue(issue_id)?;
        let (patch, effects) = escalation::reject(&issue, approver, now)?;
        self.store
            .update_issue(issue_id, patch, Expected::EscalationPending)?;
        info!(issue_id, approver, "escalation rejected");
        self.dispatch(effects, now);
        self.store.get_issue(issue_id)
    }

    fn assigned_worker(&self, issue: &Issue) -> Option<Worker> {
        let personnel = issue.assigned_personnel.as_ref()?;
        match self.store.get_worker(&personnel.id) {
            Ok(worker) => Some(worker),
            Err(err) => {
                warn!(
                    issue_id = %issue.id,
                    worker_id = %personnel.id,
                    error = %err,
                    "assigned worker unavailable for credit"
                );
                None
            }
        }
    }

    /// Dispatch side effects in order, one best-effort attempt each.
    fn dispatch(&self, effects: Vec<Effect>, now: DateTime<Utc>) {
        for effect in effects {
            if let Err(err) = self.dispatch_one(effect, now) {
                warn!(error = %err, "side effect failed; issue state remains authoritative");
            }
        }
    }

    fn dispatch_one(&self, effect: Effect, now: DateTime<Utc>) -> Result<()> {
        match effect {
            Effect::MirrorPost { post_id, status } => self.store.set_post_status(post_id, status),
            Effect::PublishDisclosure(draft) => {
                if !self.disclosure_enabled {
                    debug!(issue_id = %draft.issue_id, "disclosure posting disabled");
                    return Ok(());
                }
                let post_id = self.store.create_post(&draft.into_post(now))?;
                info!(post_id, "disclosure post published");
                Ok(())
            }
            Effect::NotifyCitizen {
                original_post_id,
                issue_id,
                body,
            } => {
                let post = self.store.get_post(original_post_id)?;
                self.store.create_notification(&Notification {
                    recipient: post.owner,
                    issue_id: Some(issue_id),
                    body,
                    created_at: now,
                })
            }
            Effect::CreditWorker {
                worker_id,
                delta,
                new_tasks_completed,
                new_badge_count,
            } => self.store.increment_worker_credit(
                &worker_id,
                delta,
                new_tasks_completed,
                new_badge_count,
            ),
        }
    }
}

impl<S> Engine<S> {
    /// Consume the engine, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }
}
