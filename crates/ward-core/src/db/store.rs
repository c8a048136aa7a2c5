//! Store contract implementations over a SQLite connection.
//!
//! Transition writes compile the caller's [`Expected`] precondition into
//! the UPDATE's WHERE clause, so the check-and-write is one statement and
//! a stale precondition simply matches zero rows. Worker credit uses
//! native column increments for the same reason: two concurrent approvals
//! can interleave freely without losing an update.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};
use std::str::FromStr;

use crate::error::{Result, WardError};
use crate::model::department::Department;
use crate::model::issue::{
    AuditEntry, Escalation, EscalationStatus, Issue, ParseEnumError, Personnel, Priority,
    ProofOfWork, ProofReview, ProofStatus, PublicRatings, RatingSummary, Status,
};
use crate::model::post::{Notification, Post, PostStatus, RatingKind};
use crate::model::worker::Worker;
use crate::store::{
    Expected, IssueFilter, IssuePatch, IssueStore, NotificationSink, PostFeed, WorkerLedger,
};

/// SQLite-backed implementation of the full store surface.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

const ISSUE_COLUMNS: &str = "issue_id, title, description, department, priority, status, \
     location, reported_by, assignee_id, assignee_name, assignee_department, assignee_contact, \
     proof_review_status, proof_reviewed_by, proof_reviewed_at, \
     escalation_status, escalation_reason, escalated_by, escalated_at, \
     escalation_approved_by, escalation_approved_at, escalation_rejected_by, \
     escalation_rejected_at, rating_work_avg, rating_escalation_avg, original_post_id, \
     created_at, updated_at";

const POST_COLUMNS: &str = "post_id, author, owner, body, status, issue_id, likes, \
     is_resolved, is_escalated, rating_work_avg, rating_escalation_avg, created_at";

impl SqliteStore {
    pub(crate) const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// The raw connection, for maintenance paths and tests.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Snapshot of the notification outbox, oldest first.
    ///
    /// # Errors
    /// Fails if the store is unreachable.
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT recipient, issue_id, body, created_at
             FROM notifications ORDER BY notification_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut notifications = Vec::new();
        for row in rows {
            let (recipient, issue_id, body, created_at) = row?;
            notifications.push(Notification {
                recipient,
                issue_id,
                body,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(notifications)
    }

    fn load_proofs(&self, issue_id: &str) -> Result<Vec<ProofOfWork>> {
        let mut stmt = self.conn.prepare(
            "SELECT media_url, submitted_at, location, geo_verified, notes
             FROM issue_proofs WHERE issue_id = ?1 ORDER BY proof_id",
        )?;
        let rows = stmt.query_map([issue_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut proofs = Vec::new();
        for row in rows {
            let (media_url, submitted_at, location, geo_verified, notes) = row?;
            proofs.push(ProofOfWork {
                media_url,
                timestamp: parse_ts(&submitted_at)?,
                location,
                geo_verified,
                notes,
            });
        }
        Ok(proofs)
    }

    fn load_audit(&self, issue_id: &str) -> Result<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, at, updated_by
             FROM issue_audit WHERE issue_id = ?1 ORDER BY audit_id",
        )?;
        let rows = stmt.query_map([issue_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut audit = Vec::new();
        for row in rows {
            let (status, at, updated_by) = row?;
            audit.push(AuditEntry {
                status: parse_enum(&status)?,
                timestamp: parse_ts(&at)?,
                updated_by,
            });
        }
        Ok(audit)
    }

    fn finish_issue(&self, raw: RawIssue) -> Result<Issue> {
        let proofs = self.load_proofs(&raw.issue_id)?;
        let audit = self.load_audit(&raw.issue_id)?;
        raw.into_issue(proofs, audit)
    }
}

/// All `issues` columns as stored, before enum/timestamp parsing.
struct RawIssue {
    issue_id: String,
    title: String,
    description: String,
    department: String,
    priority: String,
    status: String,
    location: Option<String>,
    reported_by: String,
    assignee_id: Option<String>,
    assignee_name: Option<String>,
    assignee_department: Option<String>,
    assignee_contact: Option<String>,
    proof_review_status: Option<String>,
    proof_reviewed_by: Option<String>,
    proof_reviewed_at: Option<String>,
    escalation_status: Option<String>,
    escalation_reason: Option<String>,
    escalated_by: Option<String>,
    escalated_at: Option<String>,
    escalation_approved_by: Option<String>,
    escalation_approved_at: Option<String>,
    escalation_rejected_by: Option<String>,
    escalation_rejected_at: Option<String>,
    rating_work_avg: Option<f64>,
    rating_escalation_avg: Option<f64>,
    original_post_id: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl RawIssue {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            issue_id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            department: row.get(3)?,
            priority: row.get(4)?,
            status: row.get(5)?,
            location: row.get(6)?,
            reported_by: row.get(7)?,
            assignee_id: row.get(8)?,
            assignee_name: row.get(9)?,
            assignee_department: row.get(10)?,
            assignee_contact: row.get(11)?,
            proof_review_status: row.get(12)?,
            proof_reviewed_by: row.get(13)?,
            proof_reviewed_at: row.get(14)?,
            escalation_status: row.get(15)?,
            escalation_reason: row.get(16)?,
            escalated_by: row.get(17)?,
            escalated_at: row.get(18)?,
            escalation_approved_by: row.get(19)?,
            escalation_approved_at: row.get(20)?,
            escalation_rejected_by: row.get(21)?,
            escalation_rejected_at: row.get(22)?,
            rating_work_avg: row.get(23)?,
            rating_escalation_avg: row.get(24)?,
            original_post_id: row.get(25)?,
            created_at: row.get(26)?,
            updated_at: row.get(27)?,
        })
    }

    fn into_issue(self, proof_of_work: Vec<ProofOfWork>, audit: Vec<AuditEntry>) -> Result<Issue> {
        let assigned_personnel = match (self.assignee_id, self.assignee_name) {
            (Some(id), Some(name)) => Some(Personnel {
                id,
                name,
                department: parse_enum(self.assignee_department.as_deref().unwrap_or_default())?,
                contact: self.assignee_contact.unwrap_or_default(),
            }),
            _ => None,
        };

        let proof_review = match self.proof_review_status {
            Some(status) => Some(ProofReview {
                status: parse_enum::<ProofStatus>(&status)?,
                reviewed_by: self.proof_reviewed_by.unwrap_or_default(),
                reviewed_at: parse_ts(self.proof_reviewed_at.as_deref().unwrap_or_default())?,
            }),
            None => None,
        };

        let escalation = match self.escalation_status {
            Some(status) => Some(Escalation {
                status: parse_enum::<EscalationStatus>(&status)?,
                reason: self.escalation_reason.unwrap_or_default(),
                escalated_by: self.escalated_by.unwrap_or_default(),
                escalated_at: parse_ts(self.escalated_at.as_deref().unwrap_or_default())?,
                approved_by: self.escalation_approved_by,
                approved_at: parse_opt_ts(self.escalation_approved_at.as_deref())?,
                rejected_by: self.escalation_rejected_by,
                rejected_at: parse_opt_ts(self.escalation_rejected_at.as_deref())?,
            }),
            None => None,
        };

        Ok(Issue {
            id: self.issue_id,
            title: self.title,
            description: self.description,
            department: parse_enum(&self.department)?,
            priority: parse_enum::<Priority>(&self.priority)?,
            status: parse_enum::<Status>(&self.status)?,
            location: self.location,
            reported_by: self.reported_by,
            assigned_personnel,
            proof_of_work,
            proof_review,
            escalation,
            public_ratings: PublicRatings {
                work: self.rating_work_avg.map(|average| RatingSummary { average }),
                escalation: self
                    .rating_escalation_avg
                    .map(|average| RatingSummary { average }),
            },
            original_post_id: self.original_post_id,
            audit,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

impl IssueStore for SqliteStore {
    fn create_issue(&self, issue: &Issue) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO issues (
                issue_id, title, description, department, priority, status,
                location, reported_by, rating_work_avg, rating_escalation_avg,
                original_post_id, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                issue.id,
                issue.title,
                issue.description,
                issue.department.id(),
                issue.priority.to_string(),
                issue.status.to_string(),
                issue.location,
                issue.reported_by,
                issue.public_ratings.work.map(|r| r.average),
                issue.public_ratings.escalation.map(|r| r.average),
                issue.original_post_id,
                to_sql_ts(issue.created_at),
                to_sql_ts(issue.updated_at),
            ],
        )?;
        for entry in &issue.audit {
            insert_audit(&tx, &issue.id, entry)?;
        }
        for proof in &issue.proof_of_work {
            insert_proof(&tx, &issue.id, proof)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_issue(&self, id: &str) -> Result<Issue> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE issue_id = ?1");
        let raw = self
            .conn
            .query_row(&sql, [id], RawIssue::from_row)
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => WardError::IssueNotFound {
                    issue_id: id.to_string(),
                },
                other => other.into(),
            })?;
        self.finish_issue(raw)
    }

    fn query_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(department) = filter.department {
            clauses.push("department = ?");
            args.push(Value::from(department.id().to_string()));
        }
        if let Some(status) = filter.status {
            clauses.push("status = ?");
            args.push(Value::from(status.to_string()));
        }
        if let Some(escalation) = filter.escalation {
            clauses.push("escalation_status = ?");
            args.push(Value::from(escalation.to_string()));
        }
        if let Some(after) = filter.updated_after {
            clauses.push("updated_at > ?");
            args.push(Value::from(to_sql_ts(after)));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues{where_sql} ORDER BY created_at, issue_id"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), RawIssue::from_row)?;
        let raws: Vec<RawIssue> = rows.collect::<rusqlite::Result<_>>()?;

        raws.into_iter()
            .map(|raw| self.finish_issue(raw))
            .collect()
    }

    fn update_issue(&self, id: &str, patch: IssuePatch, expected: Expected) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let mut sets: Vec<&str> = vec!["updated_at = ?"];
        let mut args: Vec<Value> = vec![Value::from(to_sql_ts(patch.updated_at))];

        if let Some(status) = patch.status {
            sets.push("status = ?");
            args.push(Value::from(status.to_string()));
        }
        if let Some(personnel) = &patch.assigned_personnel {
            sets.extend([
                "assignee_id = ?",
                "assignee_name = ?",
                "assignee_department = ?",
                "assignee_contact = ?",
            ]);
            args.push(Value::from(personnel.id.clone()));
            args.push(Value::from(personnel.name.clone()));
            args.push(Value::from(personnel.department.id().to_string()));
            args.push(Value::from(personnel.contact.clone()));
        }
        if let Some(review) = &patch.proof_review {
            sets.extend([
                "proof_review_status = ?",
                "proof_reviewed_by = ?",
                "proof_reviewed_at = ?",
            ]);
            args.push(Value::from(review.status.to_string()));
            args.push(Value::from(review.reviewed_by.clone()));
            args.push(Value::from(to_sql_ts(review.reviewed_at)));
        }
        if let Some(escalation) = &patch.escalation {
            sets.extend([
                "escalation_status = ?",
                "escalation_reason = ?",
                "escalated_by = ?",
                "escalated_at = ?",
                "escalation_approved_by = ?",
                "escalation_approved_at = ?",
                "escalation_rejected_by = ?",
                "escalation_rejected_at = ?",
            ]);
            args.push(Value::from(escalation.status.to_string()));
            args.push(Value::from(escalation.reason.clone()));
            args.push(Value::from(escalation.escalated_by.clone()));
            args.push(Value::from(to_sql_ts(escalation.escalated_at)));
            args.push(Value::from(escalation.approved_by.clone()));
            args.push(Value::from(escalation.approved_at.map(to_sql_ts)));
            args.push(Value::from(escalation.rejected_by.clone()));
            args.push(Value::from(escalation.rejected_at.map(to_sql_ts)));
        }

        let (guard_sql, guard_arg) = match expected {
            Expected::Status(status) => ("status = ?", Some(Value::from(status.to_string()))),
            Expected::Unassigned => ("assignee_id IS NULL", None),
            Expected::EscalationIdle => (
                "(escalation_status IS NULL OR escalation_status IN ('approved', 'rejected'))",
                None,
            ),
            Expected::EscalationPending => ("escalation_status = 'pending'", None),
        };

        args.push(Value::from(id.to_string()));
        if let Some(arg) = guard_arg {
            args.push(arg);
        }

        let sql = format!(
            "UPDATE issues SET {} WHERE issue_id = ? AND {guard_sql}",
            sets.join(", ")
        );
        let affected = tx.execute(&sql, params_from_iter(args))?;
        if affected == 0 {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM issues WHERE issue_id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            return Err(if exists {
                WardError::ConflictingTransition {
                    issue_id: id.to_string(),
                }
            } else {
                WardError::IssueNotFound {
                    issue_id: id.to_string(),
                }
            });
        }

        if let Some(proof) = &patch.push_proof {
            insert_proof(&tx, id, proof)?;
        }
        if let Some(entry) = &patch.push_audit {
            insert_audit(&tx, id, entry)?;
        }

        tx.commit()?;
        Ok(())
    }
}

impl PostFeed for SqliteStore {
    fn create_post(&self, post: &Post) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO posts (
                author, owner, body, status, issue_id, likes,
                is_resolved, is_escalated, rating_work_avg, rating_escalation_avg, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                post.author,
                post.owner,
                post.body,
                post.status.to_string(),
                post.issue_id,
                post.likes,
                post.is_resolved,
                post.is_escalated,
                post.rating_work_avg,
                post.rating_escalation_avg,
                to_sql_ts(post.created_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_post(&self, id: i64) -> Result<Post> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = ?1");
        self.conn
            .query_row(&sql, [id], raw_post_from_row)
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => WardError::PostNotFound { post_id: id },
                other => other.into(),
            })
            .and_then(RawPost::into_post)
    }

    fn set_post_status(&self, id: i64, status: PostStatus) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE posts SET status = ?1,
                    is_resolved = CASE WHEN ?1 = 'resolved' THEN 1 ELSE is_resolved END,
                    is_escalated = CASE WHEN ?1 = 'escalated-approved' THEN 1 ELSE is_escalated END
             WHERE post_id = ?2",
            params![status.to_string(), id],
        )?;
        if affected == 0 {
            return Err(WardError::PostNotFound { post_id: id });
        }
        Ok(())
    }

    fn like_post(&self, id: i64) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE posts SET likes = likes + 1 WHERE post_id = ?1",
            [id],
        )?;
        if affected == 0 {
            return Err(WardError::PostNotFound { post_id: id });
        }
        Ok(())
    }

    fn rate_post(&self, id: i64, kind: RatingKind, average: f64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let column = match kind {
            RatingKind::Work => "rating_work_avg",
            RatingKind::Escalation => "rating_escalation_avg",
        };
        let affected = tx.execute(
            &format!("UPDATE posts SET {column} = ?1 WHERE post_id = ?2"),
            params![average, id],
        )?;
        if affected == 0 {
            return Err(WardError::PostNotFound { post_id: id });
        }
        // Mirror onto the linked issue so disclosures can quote the rating.
        tx.execute(
            &format!(
                "UPDATE issues SET {column} = ?1
                 WHERE issue_id = (SELECT issue_id FROM posts WHERE post_id = ?2)"
            ),
            params![average, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn query_posts_by_author(&self, authors: &[String]) -> Result<Vec<Post>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; authors.len()].join(", ");
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author IN ({placeholders}) ORDER BY post_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(authors), raw_post_from_row)?;
        let raws: Vec<RawPost> = rows.collect::<rusqlite::Result<_>>()?;
        raws.into_iter().map(RawPost::into_post).collect()
    }
}

impl WorkerLedger for SqliteStore {
    fn create_worker(&self, worker: &Worker) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workers (
                worker_id, name, department, contact, active,
                civic_score, tasks_completed, earned_badges
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                worker.id,
                worker.name,
                worker.department.id(),
                worker.contact,
                worker.active,
                worker.civic_score,
                worker.tasks_completed,
                worker.earned_badges,
            ],
        )?;
        Ok(())
    }

    fn get_worker(&self, id: &str) -> Result<Worker> {
        self.conn
            .query_row(
                "SELECT worker_id, name, department, contact, active,
                        civic_score, tasks_completed, earned_badges
                 FROM workers WHERE worker_id = ?1",
                [id],
                raw_worker_from_row,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => WardError::WorkerNotFound {
                    worker_id: id.to_string(),
                },
                other => other.into(),
            })
            .and_then(RawWorker::into_worker)
    }

    fn query_workers(&self, department: Option<Department>) -> Result<Vec<Worker>> {
        let (sql, args) = department.map_or_else(
            || {
                (
                    "SELECT worker_id, name, department, contact, active,
                            civic_score, tasks_completed, earned_badges
                     FROM workers ORDER BY worker_id"
                        .to_string(),
                    Vec::new(),
                )
            },
            |d| {
                (
                    "SELECT worker_id, name, department, contact, active,
                            civic_score, tasks_completed, earned_badges
                     FROM workers WHERE department = ? ORDER BY worker_id"
                        .to_string(),
                    vec![Value::from(d.id().to_string())],
                )
            },
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), raw_worker_from_row)?;
        let raws: Vec<RawWorker> = rows.collect::<rusqlite::Result<_>>()?;
        raws.into_iter().map(RawWorker::into_worker).collect()
    }

    fn set_worker_active(&self, id: &str, active: bool) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE workers SET active = ?1 WHERE worker_id = ?2",
            params![active, id],
        )?;
        if affected == 0 {
            return Err(WardError::WorkerNotFound {
                worker_id: id.to_string(),
            });
        }
        Ok(())
    }

    fn increment_worker_credit(
        &self,
        id: &str,
        delta: i64,
        _new_tasks_completed: u32,
        new_badge_count: u8,
    ) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE workers SET
                civic_score = civic_score + ?1,
                tasks_completed = tasks_completed + 1,
                earned_badges = MAX(earned_badges, ?2)
             WHERE worker_id = ?3",
            params![delta, new_badge_count, id],
        )?;
        if affected == 0 {
            return Err(WardError::WorkerNotFound {
                worker_id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl NotificationSink for SqliteStore {
    fn create_notification(&self, notification: &Notification) -> Result<()> {
        self.conn.execute(
            "INSERT INTO notifications (recipient, issue_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                notification.recipient,
                notification.issue_id,
                notification.body,
                to_sql_ts(notification.created_at),
            ],
        )?;
        Ok(())
    }
}

struct RawPost {
    post_id: i64,
    author: String,
    owner: String,
    body: String,
    status: String,
    issue_id: Option<String>,
    likes: u32,
    is_resolved: bool,
    is_escalated: bool,
    rating_work_avg: Option<f64>,
    rating_escalation_avg: Option<f64>,
    created_at: String,
}

impl RawPost {
    fn into_post(self) -> Result<Post> {
        Ok(Post {
            id: self.post_id,
            author: self.author,
            owner: self.owner,
            body: self.body,
            status: parse_enum::<PostStatus>(&self.status)?,
            issue_id: self.issue_id,
            likes: self.likes,
            is_resolved: self.is_resolved,
            is_escalated: self.is_escalated,
            rating_work_avg: self.rating_work_avg,
            rating_escalation_avg: self.rating_escalation_avg,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

fn raw_post_from_row(row: &Row<'_>) -> rusqlite::Result<RawPost> {
    Ok(RawPost {
        post_id: row.get(0)?,
        author: row.get(1)?,
        owner: row.get(2)?,
        body: row.get(3)?,
        status: row.get(4)?,
        issue_id: row.get(5)?,
        likes: row.get(6)?,
        is_resolved: row.get(7)?,
        is_escalated: row.get(8)?,
        rating_work_avg: row.get(9)?,
        rating_escalation_avg: row.get(10)?,
        created_at: row.get(11)?,
    })
}

struct RawWorker {
    worker_id: String,
    name: String,
    department: String,
    contact: String,
    active: bool,
    civic_score: i64,
    tasks_completed: u32,
    earned_badges: u8,
}

impl RawWorker {
    fn into_worker(self) -> Result<Worker> {
        Ok(Worker {
            id: self.worker_id,
            name: self.name,
            department: parse_enum(&self.department)?,
            contact: self.contact,
            active: self.active,
            civic_score: self.civic_score,
            tasks_completed: self.tasks_completed,
            earned_badges: self.earned_badges,
        })
    }
}

fn raw_worker_from_row(row: &Row<'_>) -> rusqlite::Result<RawWorker> {
    Ok(RawWorker {
        worker_id: row.get(0)?,
        name: row.get(1)?,
        department: row.get(2)?,
        contact: row.get(3)?,
        active: row.get(4)?,
        civic_score: row.get(5)?,
        tasks_completed: row.get(6)?,
        earned_badges: row.get(7)?,
    })
}

fn insert_proof(conn: &Connection, issue_id: &str, proof: &ProofOfWork) -> Result<()> {
    conn.execute(
        "INSERT INTO issue_proofs (issue_id, media_url, submitted_at, location, geo_verified, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            issue_id,
            proof.media_url,
            to_sql_ts(proof.timestamp),
            proof.location,
            proof.geo_verified,
            proof.notes,
        ],
    )?;
    Ok(())
}

fn insert_audit(conn: &Connection, issue_id: &str, entry: &AuditEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO issue_audit (issue_id, status, at, updated_by)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            issue_id,
            entry.status.to_string(),
            to_sql_ts(entry.timestamp),
            entry.updated_by,
        ],
    )?;
    Ok(())
}

/// Fixed-width RFC 3339 with microseconds and a `Z` suffix, so stored
/// timestamps compare correctly as text.
fn to_sql_ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| WardError::DependencyUnavailable {
            reason: format!("corrupt timestamp '{text}': {err}"),
        })
}

fn parse_opt_ts(text: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    text.map(parse_ts).transpose()
}

fn parse_enum<T: FromStr<Err = ParseEnumError>>(text: &str) -> Result<T> {
    text.parse().map_err(|err: ParseEnumError| {
        WardError::DependencyUnavailable {
            reason: format!("corrupt column: {err}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::db::open_store_in_memory;
    use crate::error::WardError;
    use crate::model::department::Department;
    use crate::model::issue::{Issue, Priority, ProofOfWork, PublicRatings, Status};
    use crate::model::post::{Post, PostStatus, RatingKind};
    use crate::model::worker::Worker;
    use crate::store::{Expected, IssueFilter, IssuePatch, IssueStore, PostFeed, WorkerLedger};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap()
    }

    fn issue(id: &str, status: Status) -> Issue {
        Issue {
            id: id.into(),
            title: "Pothole on Main Street".into(),
            description: "Deep pothole near the bus stop".into(),
            department: Department::Pwd,
            priority: Priority::High,
            status,
            location: Some("Main St & 3rd Ave".into()),
            reported_by: "Jane Smith".into(),
            assigned_personnel: None,
            proof_of_work: vec![],
            proof_review: None,
            escalation: None,
            public_ratings: PublicRatings::default(),
            original_post_id: None,
            audit: vec![],
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn issue_roundtrips_through_sql() {
        let store = open_store_in_memory().expect("open store");
        let mut subject = issue("pwd-2026-r0nd", Status::Pending);
        subject.proof_of_work.push(ProofOfWork {
            media_url: "https://media.civic.gov/1.jpg".into(),
            timestamp: now(),
            location: None,
            geo_verified: false,
            notes: String::new(),
        });
        store.create_issue(&subject).expect("create");

        let loaded = store.get_issue("pwd-2026-r0nd").expect("get");
        assert_eq!(loaded, subject);
    }

    #[test]
    fn cas_guard_matches_zero_rows_when_stale() {
        let store = open_store_in_memory().expect("open store");
        store
            .create_issue(&issue("pwd-2026-cas1", Status::Assign))
            .expect("create");

        let mut patch = IssuePatch::at(now());
        patch.status = Some(Status::Resolved);
        let err = store
            .update_issue("pwd-2026-cas1", patch, Expected::Status(Status::PendingReview))
            .expect_err("stale guard");
        assert!(matches!(err, WardError::ConflictingTransition { .. }));

        let mut patch = IssuePatch::at(now());
        patch.status = Some(Status::PendingReview);
        let err = store
            .update_issue("pwd-2026-none", patch, Expected::Status(Status::Assign))
            .expect_err("missing issue");
        assert!(matches!(err, WardError::IssueNotFound { .. }));
    }

    #[test]
    fn query_filters_compose() {
        let store = open_store_in_memory().expect("open store");
        store
            .create_issue(&issue("pwd-2026-qf01", Status::Pending))
            .expect("create");
        let mut other = issue("wss-2026-qf02", Status::Resolved);
        other.department = Department::Water;
        store.create_issue(&other).expect("create");

        let pwd_only = store
            .query_issues(&IssueFilter {
                department: Some(Department::Pwd),
                ..IssueFilter::default()
            })
            .expect("query");
        assert_eq!(pwd_only.len(), 1);
        assert_eq!(pwd_only[0].id, "pwd-2026-qf01");

        let resolved = store
            .query_issues(&IssueFilter {
                status: Some(Status::Resolved),
                ..IssueFilter::default()
            })
            .expect("query");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "wss-2026-qf02");
    }

    #[test]
    fn credit_increment_is_native_and_badges_ratchet() {
        let store = open_store_in_memory().expect("open store");
        store
            .create_worker(&Worker::new(
                "w-1".into(),
                "John Doe".into(),
                Department::Pwd,
                String::new(),
            ))
            .expect("create worker");

        store.increment_worker_credit("w-1", 100, 1, 1).expect("credit");
        store.increment_worker_credit("w-1", 100, 2, 0).expect("credit");

        let worker = store.get_worker("w-1").expect("get worker");
        assert_eq!(worker.civic_score, 200);
        assert_eq!(worker.tasks_completed, 2);
        assert_eq!(worker.earned_badges, 1);
    }

    #[test]
    fn rating_mirrors_onto_linked_issue() {
        let store = open_store_in_memory().expect("open store");
        store
            .create_issue(&issue("pwd-2026-rt01", Status::Resolved))
            .expect("create");
        let post_id = store
            .create_post(&Post {
                id: 0,
                author: "Jane Smith".into(),
                owner: "jane".into(),
                body: "Pothole on Main Street".into(),
                status: PostStatus::Resolved,
                issue_id: Some("pwd-2026-rt01".into()),
                likes: 0,
                is_resolved: true,
                is_escalated: false,
                rating_work_avg: None,
                rating_escalation_avg: None,
                created_at: now(),
            })
            .expect("create post");

        store
            .rate_post(post_id, RatingKind::Work, 3.5)
            .expect("rate");

        let loaded = store.get_issue("pwd-2026-rt01").expect("get");
        assert_eq!(loaded.public_ratings.work.map(|r| r.average), Some(3.5));

        let post = store.get_post(post_id).expect("get post");
        assert_eq!(post.rating_work_avg, Some(3.5));
    }

    #[test]
    fn post_status_mirror_sets_feed_flags() {
        let store = open_store_in_memory().expect("open store");
        let post_id = store
            .create_post(&Post {
                id: 0,
                author: "Jane Smith".into(),
                owner: "jane".into(),
                body: "Pothole on Main Street".into(),
                status: PostStatus::Reported,
                issue_id: None,
                likes: 0,
                is_resolved: false,
                is_escalated: false,
                rating_work_avg: None,
                rating_escalation_avg: None,
                created_at: now(),
            })
            .expect("create post");

        store
            .set_post_status(post_id, PostStatus::Resolved)
            .expect("mirror");
        let post = store.get_post(post_id).expect("get post");
        assert_eq!(post.status, PostStatus::Resolved);
        assert!(post.is_resolved);

        store.like_post(post_id).expect("like");
        store.like_post(post_id).expect("like");
        assert_eq!(store.get_post(post_id).expect("get post").likes, 2);
    }
}
