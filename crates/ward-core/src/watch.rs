//! Polling snapshot feed over the issue store.
//!
//! Real-time change subscription is a property of the backing document
//! store, not of this engine. The feed abstracts it as a restartable
//! polling producer: each [`SnapshotFeed::poll`] yields the issues updated
//! since the previous high-water mark, and the watermark can be persisted
//! and handed back to [`SnapshotFeed::resume`] after a restart. Rescoring
//! consumes these batches; nothing here assumes push semantics exist.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::model::issue::Issue;
use crate::store::{IssueFilter, IssueStore};

/// A restartable cursor over issue snapshots, keyed by `updated_at`.
#[derive(Debug)]
pub struct SnapshotFeed<'a, S> {
    store: &'a S,
    watermark: Option<DateTime<Utc>>,
}

impl<'a, S: IssueStore> SnapshotFeed<'a, S> {
    /// A feed starting from the beginning of history: the first poll
    /// yields every issue.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            watermark: None,
        }
    }

    /// Resume a feed from a previously persisted watermark.
    #[must_use]
    pub const fn resume(store: &'a S, watermark: DateTime<Utc>) -> Self {
        Self {
            store,
            watermark: Some(watermark),
        }
    }

    /// The current high-water mark, for persistence across restarts.
    #[must_use]
    pub const fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark
    }

    /// Fetch all issues updated since the watermark and advance it.
    ///
    /// At-least-once semantics: an issue whose effects were still landing
    /// when a poll ran will reappear on the next poll once its document is
    /// touched again. Consumers must tolerate duplicates, which the
    /// scoring engine does by recomputing from scratch.
    ///
    /// # Errors
    /// Propagates store read failures; the watermark is not advanced on
    /// failure, so the next poll retries the same window.
    pub fn poll(&mut self) -> Result<Vec<Issue>> {
        let filter = IssueFilter {
            updated_after: self.watermark,
            ..IssueFilter::default()
        };
        let batch = self.store.query_issues(&filter)?;

        if let Some(newest) = batch.iter().map(|issue| issue.updated_at).max() {
            self.watermark = Some(newest);
        }
        debug!(
            batch = batch.len(),
            watermark = ?self.watermark,
            "snapshot feed polled"
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotFeed;
    use crate::model::department::Department;
    use crate::model::issue::{Issue, Priority, PublicRatings, Status};
    use crate::store::memory::MemoryStore;
    use crate::store::{Expected, IssuePatch, IssueStore};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 10, minute, 0).unwrap()
    }

    fn seed(store: &MemoryStore, id: &str, minute: u32) {
        let issue = Issue {
            id: id.into(),
            title: "Fallen tree blocking footpath".into(),
            description: String::new(),
            department: Department::Environment,
            priority: Priority::Medium,
            status: Status::Pending,
            location: None,
            reported_by: "David Park".into(),
            assigned_personnel: None,
            proof_of_work: vec![],
            proof_review: None,
            escalation: None,
            public_ratings: PublicRatings::default(),
            original_post_id: None,
            audit: vec![],
            created_at: at(minute),
            updated_at: at(minute),
        };
        store.create_issue(&issue).expect("seed issue");
    }

    #[test]
    fn first_poll_yields_everything_then_drains() {
        let store = MemoryStore::new();
        seed(&store, "env-2026-0001", 0);
        seed(&store, "env-2026-0002", 1);

        let mut feed = SnapshotFeed::new(&store);
        assert_eq!(feed.poll().expect("poll").len(), 2);
        assert!(feed.poll().expect("poll").is_empty());
    }

    #[test]
    fn updates_reappear_after_the_watermark() {
        let store = MemoryStore::new();
        seed(&store, "env-2026-0003", 0);

        let mut feed = SnapshotFeed::new(&store);
        feed.poll().expect("poll");

        let mut patch = IssuePatch::at(at(5));
        patch.status = Some(Status::Assign);
        store
            .update_issue("env-2026-0003", patch, Expected::Status(Status::Pending))
            .expect("update");

        let batch = feed.poll().expect("poll");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].status, Status::Assign);
    }

    #[test]
    fn resume_from_persisted_watermark_skips_old_snapshots() {
        let store = MemoryStore::new();
        seed(&store, "env-2026-0004", 0);

        let mut first = SnapshotFeed::new(&store);
        first.poll().expect("poll");
        let watermark = first.watermark().expect("watermark set");

        let mut resumed = SnapshotFeed::resume(&store, watermark);
        assert!(resumed.poll().expect("poll").is_empty());

        seed(&store, "env-2026-0005", 9);
        let batch = resumed.poll().expect("poll");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, "env-2026-0005");
    }
}
