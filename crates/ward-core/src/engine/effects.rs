use chrono::{DateTime, Utc};

use crate::model::post::{Post, PostStatus};

/// A side effect a committed transition requires. Effects are produced by
/// the pure transition functions and dispatched after the store write, in
/// order, each as a single best-effort attempt. The committed issue
/// document stays authoritative whether or not its effects land.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Mirror the issue's new status onto the originating citizen post.
    MirrorPost { post_id: i64, status: PostStatus },
    /// Publish a public disclosure post.
    PublishDisclosure(DisclosureDraft),
    /// Notify the citizen who owns the originating post.
    NotifyCitizen {
        original_post_id: i64,
        issue_id: String,
        body: String,
    },
    /// Credit the assigned worker for an approved resolution.
    CreditWorker {
        worker_id: String,
        delta: i64,
        new_tasks_completed: u32,
        new_badge_count: u8,
    },
}

/// Content of a disclosure post before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct DisclosureDraft {
    /// Department display name the post is published under.
    pub author: String,
    /// Department feed account owning the post.
    pub owner: String,
    pub body: String,
    pub issue_id: String,
    /// Tagged as a priority escalation rather than a resolution.
    pub escalation: bool,
    pub media_url: Option<String>,
    pub rating: Option<f64>,
}

impl DisclosureDraft {
    /// Materialize the draft as a feed post.
    #[must_use]
    pub fn into_post(self, at: DateTime<Utc>) -> Post {
        let status = if self.escalation {
            PostStatus::EscalatedApproved
        } else {
            PostStatus::Resolved
        };
        let mut body = self.body;
        if let Some(url) = &self.media_url {
            body.push_str(&format!("\nEvidence: {url}"));
        }
        if let Some(avg) = self.rating {
            body.push_str(&format!("\nCitizen rating: {avg:.1}/5"));
        }
        Post {
            id: 0,
            author: self.author,
            owner: self.owner,
            body,
            status,
            issue_id: Some(self.issue_id),
            likes: 0,
            is_resolved: !self.escalation,
            is_escalated: self.escalation,
            rating_work_avg: None,
            rating_escalation_avg: None,
            created_at: at,
        }
    }
}
