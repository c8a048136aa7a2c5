//! In-memory store used by engine unit tests and the scoring tests.
//!
//! Same contracts as the SQLite store, minus durability. A single mutex
//! serializes all access, which also makes the compare-and-set and credit
//! increment semantics trivially atomic.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{Result, WardError};
use crate::model::department::Department;
use crate::model::issue::Issue;
use crate::model::post::{Notification, Post, PostStatus, RatingKind};
use crate::model::worker::Worker;
use crate::store::{
    Expected, IssueFilter, IssuePatch, IssueStore, NotificationSink, PostFeed, WorkerLedger,
    apply_rating,
};

#[derive(Debug, Default)]
struct Inner {
    issues: BTreeMap<String, Issue>,
    posts: Vec<Post>,
    workers: BTreeMap<String, Worker>,
    notifications: Vec<Notification>,
}

/// Mutex-guarded document store with the full [`crate::store::CivicStore`]
/// surface.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| WardError::DependencyUnavailable {
            reason: "memory store poisoned".into(),
        })
    }

    /// Snapshot of all notifications, for test assertions.
    ///
    /// # Errors
    /// Fails only if the store mutex is poisoned.
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        Ok(self.lock()?.notifications.clone())
    }

    /// Snapshot of all posts, for test assertions.
    ///
    /// # Errors
    /// Fails only if the store mutex is poisoned.
    pub fn posts(&self) -> Result<Vec<Post>> {
        Ok(self.lock()?.posts.clone())
    }
}

impl IssueStore for MemoryStore {
    fn create_issue(&self, issue: &Issue) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.issues.contains_key(&issue.id) {
            return Err(WardError::DependencyUnavailable {
                reason: format!("issue '{}' already exists", issue.id),
            });
        }
        inner.issues.insert(issue.id.clone(), issue.clone());
        Ok(())
    }

    fn get_issue(&self, id: &str) -> Result<Issue> {
        self.lock()?
            .issues
            .get(id)
            .cloned()
            .ok_or_else(|| WardError::IssueNotFound {
                issue_id: id.to_string(),
            })
    }

    fn query_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        Ok(self
            .lock()?
            .issues
            .values()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect())
    }

    fn update_issue(&self, id: &str, patch: IssuePatch, expected: Expected) -> Result<()> {
        let mut inner = self.lock()?;
        let issue = inner
            .issues
            .get_mut(id)
            .ok_or_else(|| WardError::IssueNotFound {
                issue_id: id.to_string(),
            })?;
        if !expected.holds(issue) {
            return Err(WardError::ConflictingTransition {
                issue_id: id.to_string(),
            });
        }
        patch.apply(issue);
        Ok(())
    }
}

impl PostFeed for MemoryStore {
    fn create_post(&self, post: &Post) -> Result<i64> {
        let mut inner = self.lock()?;
        let id = i64::try_from(inner.posts.len()).unwrap_or(i64::MAX) + 1;
        let mut stored = post.clone();
        stored.id = id;
        inner.posts.push(stored);
        Ok(id)
    }

    fn get_post(&self, id: i64) -> Result<Post> {
        self.lock()?
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or(WardError::PostNotFound { post_id: id })
    }

    fn set_post_status(&self, id: i64, status: PostStatus) -> Result<()> {
        let mut inner = self.lock()?;
        let post = inner
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(WardError::PostNotFound { post_id: id })?;
        post.status = status;
        match status {
            PostStatus::Resolved => post.is_resolved = true,
            PostStatus::EscalatedApproved => post.is_escalated = true,
            _ => {}
        }
        Ok(())
    }

    fn like_post(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        let post = inner
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(WardError::PostNotFound { post_id: id })?;
        post.likes += 1;
        Ok(())
    }

    fn rate_post(&self, id: i64, kind: RatingKind, average: f64) -> Result<()> {
        let mut inner = self.lock()?;
        let post = inner
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(WardError::PostNotFound { post_id: id })?;
        match kind {
            RatingKind::Work => post.rating_work_avg = Some(average),
            RatingKind::Escalation => post.rating_escalation_avg = Some(average),
        }
        let issue_id = post.issue_id.clone();
        if let Some(issue_id) = issue_id {
            if let Some(issue) = inner.issues.get_mut(&issue_id) {
                apply_rating(issue, kind, average);
            }
        }
        Ok(())
    }

    fn query_posts_by_author(&self, authors: &[String]) -> Result<Vec<Post>> {
        Ok(self
            .lock()?
            .posts
            .iter()
            .filter(|post| authors.contains(&post.author))
            .cloned()
            .collect())
    }
}

impl WorkerLedger for MemoryStore {
    fn create_worker(&self, worker: &Worker) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.workers.contains_key(&worker.id) {
            return Err(WardError::DependencyUnavailable {
                reason: format!("worker '{}' already exists", worker.id),
            });
        }
        inner.workers.insert(worker.id.clone(), worker.clone());
        Ok(())
    }

    fn get_worker(&self, id: &str) -> Result<Worker> {
        self.lock()?
            .workers
            .get(id)
            .cloned()
            .ok_or_else(|| WardError::WorkerNotFound {
                worker_id: id.to_string(),
            })
    }

    fn query_workers(&self, department: Option<Department>) -> Result<Vec<Worker>> {
        Ok(self
            .lock()?
            .workers
            .values()
            .filter(|worker| department.is_none_or(|d| d == worker.department))
            .cloned()
            .collect())
    }

    fn set_worker_active(&self, id: &str, active: bool) -> Result<()> {
        let mut inner = self.lock()?;
        let worker = inner
            .workers
            .get_mut(id)
            .ok_or_else(|| WardError::WorkerNotFound {
                worker_id: id.to_string(),
            })?;
        worker.active = active;
        Ok(())
    }

    fn increment_worker_credit(
        &self,
        id: &str,
        delta: i64,
        _new_tasks_completed: u32,
        new_badge_count: u8,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        let worker = inner
            .workers
            .get_mut(id)
            .ok_or_else(|| WardError::WorkerNotFound {
                worker_id: id.to_string(),
            })?;
        // Native increments, not the caller's snapshot; badges only ratchet up.
        worker.civic_score += delta;
        worker.tasks_completed += 1;
        worker.earned_badges = worker.earned_badges.max(new_badge_count);
        Ok(())
    }
}

impl NotificationSink for MemoryStore {
    fn create_notification(&self, notification: &Notification) -> Result<()> {
        self.lock()?.notifications.push(notification.clone());
        Ok(())
    }
}
