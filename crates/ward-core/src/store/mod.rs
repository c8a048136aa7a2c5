//! Abstract store contracts the engine operates against.
//!
//! The surrounding application provides implementations over whatever
//! document store it uses; this crate ships two: the SQLite reference store
//! in [`crate::db`] and an in-memory store for tests. Writes that move a
//! state machine go through [`IssueStore::update_issue`], which is a
//! compare-and-set: the caller names the precondition it validated, and the
//! store fails with `ConflictingTransition` if the precondition no longer
//! holds at write time.

pub mod memory;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::department::Department;
use crate::model::issue::{
    AuditEntry, Escalation, EscalationStatus, Issue, Personnel, ProofOfWork, ProofReview,
    RatingSummary, Status,
};
use crate::model::post::{Notification, Post, PostStatus, RatingKind};
use crate::model::worker::Worker;

/// Filter for issue queries. All fields are conjunctive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IssueFilter {
    pub department: Option<Department>,
    pub status: Option<Status>,
    pub escalation: Option<EscalationStatus>,
    /// Only issues updated strictly after this watermark.
    pub updated_after: Option<DateTime<Utc>>,
}

impl IssueFilter {
    /// Whether `issue` matches this filter.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        if self.department.is_some_and(|d| d != issue.department) {
            return false;
        }
        if self.status.is_some_and(|s| s != issue.status) {
            return false;
        }
        if let Some(esc) = self.escalation {
            if issue.escalation.as_ref().map(|e| e.status) != Some(esc) {
                return false;
            }
        }
        if let Some(after) = self.updated_after {
            if issue.updated_at <= after {
                return false;
            }
        }
        true
    }
}

/// The precondition a transition was validated against. Checked again by
/// the store at write time, guarding against a second actor racing the
/// same transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Primary status must still equal this value.
    Status(Status),
    /// No personnel may be assigned yet.
    Unassigned,
    /// No escalation, or only a terminal one.
    EscalationIdle,
    /// An escalation must exist and still be pending.
    EscalationPending,
}

impl Expected {
    /// Evaluate the precondition against a live issue snapshot.
    #[must_use]
    pub fn holds(&self, issue: &Issue) -> bool {
        match self {
            Self::Status(status) => issue.status == *status,
            Self::Unassigned => issue.assigned_personnel.is_none(),
            Self::EscalationIdle => issue.escalation_idle(),
            Self::EscalationPending => issue
                .escalation
                .as_ref()
                .is_some_and(|esc| esc.status == EscalationStatus::Pending),
        }
    }
}

/// A partial update to one issue document. Append fields (`push_*`) are
/// append-only; everything else overwrites when present.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuePatch {
    pub status: Option<Status>,
    pub assigned_personnel: Option<Personnel>,
    pub push_proof: Option<ProofOfWork>,
    pub proof_review: Option<ProofReview>,
    pub escalation: Option<Escalation>,
    pub push_audit: Option<AuditEntry>,
    pub updated_at: DateTime<Utc>,
}

impl IssuePatch {
    /// An empty patch stamped with the transition time.
    #[must_use]
    pub const fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: None,
            assigned_personnel: None,
            push_proof: None,
            proof_review: None,
            escalation: None,
            push_audit: None,
            updated_at,
        }
    }

    /// Apply the patch to an in-memory issue snapshot.
    pub fn apply(self, issue: &mut Issue) {
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(personnel) = self.assigned_personnel {
            issue.assigned_personnel = Some(personnel);
        }
        if let Some(proof) = self.push_proof {
            issue.proof_of_work.push(proof);
        }
        if let Some(review) = self.proof_review {
            issue.proof_review = Some(review);
        }
        if let Some(escalation) = self.escalation {
            issue.escalation = Some(escalation);
        }
        if let Some(entry) = self.push_audit {
            issue.audit.push(entry);
        }
        issue.updated_at = self.updated_at;
    }
}

/// Point reads, filtered queries, and compare-and-set writes over issues.
pub trait IssueStore {
    /// Persist a freshly reported issue.
    ///
    /// # Errors
    /// Fails if the store is unreachable or the id already exists.
    fn create_issue(&self, issue: &Issue) -> Result<()>;

    /// Point read by id.
    ///
    /// # Errors
    /// `IssueNotFound` when absent.
    fn get_issue(&self, id: &str) -> Result<Issue>;

    /// All issues matching `filter`, in stable document order.
    ///
    /// # Errors
    /// Fails if the store is unreachable.
    fn query_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Compare-and-set update: applies `patch` only if `expected` still
    /// holds against the stored document.
    ///
    /// # Errors
    /// `ConflictingTransition` when the precondition is stale;
    /// `IssueNotFound` when absent.
    fn update_issue(&self, id: &str, patch: IssuePatch, expected: Expected) -> Result<()>;
}

/// The citizen feed: originating posts, disclosure posts, engagement.
pub trait PostFeed {
    /// Publish a post; returns the store-assigned post id.
    ///
    /// # Errors
    /// Fails if the feed is unreachable.
    fn create_post(&self, post: &Post) -> Result<i64>;

    /// Point read by id.
    ///
    /// # Errors
    /// `PostNotFound` when absent.
    fn get_post(&self, id: i64) -> Result<Post>;

    /// Mirror an issue status onto the post.
    ///
    /// # Errors
    /// `PostNotFound` when absent.
    fn set_post_status(&self, id: i64, status: PostStatus) -> Result<()>;

    /// Record one citizen like.
    ///
    /// # Errors
    /// `PostNotFound` when absent.
    fn like_post(&self, id: i64) -> Result<()>;

    /// Record a citizen rating average for one feedback channel. When the
    /// post links an issue, the issue's `public_ratings` mirror is updated
    /// in the same write.
    ///
    /// # Errors
    /// `PostNotFound` when absent.
    fn rate_post(&self, id: i64, kind: RatingKind, average: f64) -> Result<()>;

    /// Posts published under any of the given author display names.
    ///
    /// # Errors
    /// Fails if the feed is unreachable.
    fn query_posts_by_author(&self, authors: &[String]) -> Result<Vec<Post>>;
}

/// Worker registry plus the atomically incremented credit counters.
pub trait WorkerLedger {
    /// Register a worker.
    ///
    /// # Errors
    /// Fails if the store is unreachable or the id already exists.
    fn create_worker(&self, worker: &Worker) -> Result<()>;

    /// Point read by id.
    ///
    /// # Errors
    /// `WorkerNotFound` when absent.
    fn get_worker(&self, id: &str) -> Result<Worker>;

    /// All workers, optionally restricted to one department.
    ///
    /// # Errors
    /// Fails if the store is unreachable.
    fn query_workers(&self, department: Option<Department>) -> Result<Vec<Worker>>;

    /// Toggle assignment availability.
    ///
    /// # Errors
    /// `WorkerNotFound` when absent.
    fn set_worker_active(&self, id: &str, active: bool) -> Result<()>;

    /// Credit one approved resolution. Implementations must apply this as
    /// an atomic store-level increment (score `+= delta`, tasks `+= 1`)
    /// rather than writing the caller's snapshot back, so concurrent
    /// approvals for the same worker cannot lose updates. The badge count
    /// is a floor: the stored value only ever moves up to it.
    ///
    /// # Errors
    /// `WorkerNotFound` when absent.
    fn increment_worker_credit(
        &self,
        id: &str,
        delta: i64,
        new_tasks_completed: u32,
        new_badge_count: u8,
    ) -> Result<()>;
}

/// Fire-and-forget delivery of citizen notifications.
pub trait NotificationSink {
    /// Queue a notification for delivery.
    ///
    /// # Errors
    /// Fails if the sink is unreachable.
    fn create_notification(&self, notification: &Notification) -> Result<()>;
}

/// The full store surface the engine needs. Blanket-implemented for any
/// type providing all four contracts.
pub trait CivicStore: IssueStore + PostFeed + WorkerLedger + NotificationSink {}

impl<T: IssueStore + PostFeed + WorkerLedger + NotificationSink> CivicStore for T {}

/// Mirror a rating onto an issue's `public_ratings` sub-record.
pub(crate) fn apply_rating(issue: &mut Issue, kind: RatingKind, average: f64) {
    let summary = Some(RatingSummary { average });
    match kind {
        RatingKind::Work => issue.public_ratings.work = summary,
        RatingKind::Escalation => issue.public_ratings.escalation = summary,
    }
}

#[cfg(test)]
mod tests {
    use super::{Expected, IssueFilter, IssuePatch};
    use crate::model::department::Department;
    use crate::model::issue::{
        AuditEntry, Escalation, Issue, Priority, PublicRatings, Status,
    };
    use chrono::{TimeZone, Utc};

    fn issue(status: Status) -> Issue {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        Issue {
            id: "swm-2026-ab12".into(),
            title: "Garbage collection delay".into(),
            description: String::new(),
            department: Department::Swm,
            priority: Priority::Medium,
            status,
            location: Some("Residential District".into()),
            reported_by: "Citizens".into(),
            assigned_personnel: None,
            proof_of_work: vec![],
            proof_review: None,
            escalation: None,
            public_ratings: PublicRatings::default(),
            original_post_id: None,
            audit: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn filter_is_conjunctive() {
        let subject = issue(Status::Pending);
        let mut filter = IssueFilter {
            department: Some(Department::Swm),
            status: Some(Status::Pending),
            ..IssueFilter::default()
        };
        assert!(filter.matches(&subject));

        filter.status = Some(Status::Resolved);
        assert!(!filter.matches(&subject));
    }

    #[test]
    fn filter_escalation_requires_live_sub_record() {
        let mut subject = issue(Status::Assign);
        let filter = IssueFilter {
            escalation: Some(crate::model::issue::EscalationStatus::Pending),
            ..IssueFilter::default()
        };
        assert!(!filter.matches(&subject));

        subject.escalation = Some(Escalation::pending(
            "budget".into(),
            "John Doe".into(),
            subject.created_at,
        ));
        assert!(filter.matches(&subject));
    }

    #[test]
    fn expected_status_checks_live_value() {
        let subject = issue(Status::PendingReview);
        assert!(Expected::Status(Status::PendingReview).holds(&subject));
        assert!(!Expected::Status(Status::Assign).holds(&subject));
        assert!(Expected::Unassigned.holds(&subject));
        assert!(Expected::EscalationIdle.holds(&subject));
        assert!(!Expected::EscalationPending.holds(&subject));
    }

    #[test]
    fn patch_appends_audit_and_bumps_watermark() {
        let mut subject = issue(Status::Pending);
        let later = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let mut patch = IssuePatch::at(later);
        patch.status = Some(Status::Assign);
        patch.push_audit = Some(AuditEntry {
            status: Status::Assign,
            timestamp: later,
            updated_by: "dispatch".into(),
        });

        patch.apply(&mut subject);
        assert_eq!(subject.status, Status::Assign);
        assert_eq!(subject.audit.len(), 1);
        assert_eq!(subject.updated_at, later);
    }
}
