//! Canonical SQLite schema for the ward reference store.
//!
//! The schema is normalized for queryability:
//! - `issues` keeps the latest aggregate fields, including the flattened
//!   escalation sub-record and proof-review stamp
//! - `issue_proofs` and `issue_audit` model the append-only sequences
//! - `workers` carries the atomically incremented credit counters
//! - `posts` holds both citizen reports and engine disclosure posts
//! - `notifications` is the fire-and-forget outbox

/// Migration v1: core normalized tables.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS issues (
    issue_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    department TEXT NOT NULL CHECK (department IN (
        'pwd', 'water', 'swm', 'traffic', 'health',
        'environment', 'electricity', 'disaster', 'admin'
    )),
    priority TEXT NOT NULL CHECK (priority IN ('critical', 'high', 'medium', 'low')),
    status TEXT NOT NULL CHECK (status IN (
        'pending', 'assign', 'pending-review', 'resolved', 'reopened'
    )),
    location TEXT,
    reported_by TEXT NOT NULL DEFAULT '',
    assignee_id TEXT,
    assignee_name TEXT,
    assignee_department TEXT,
    assignee_contact TEXT,
    proof_review_status TEXT CHECK (
        proof_review_status IS NULL OR proof_review_status IN ('approved', 'rejected')
    ),
    proof_reviewed_by TEXT,
    proof_reviewed_at TEXT,
    escalation_status TEXT CHECK (
        escalation_status IS NULL OR escalation_status IN ('pending', 'approved', 'rejected')
    ),
    escalation_reason TEXT,
    escalated_by TEXT,
    escalated_at TEXT,
    escalation_approved_by TEXT,
    escalation_approved_at TEXT,
    escalation_rejected_by TEXT,
    escalation_rejected_at TEXT,
    rating_work_avg REAL,
    rating_escalation_avg REAL,
    original_post_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS issue_proofs (
    proof_id INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id TEXT NOT NULL REFERENCES issues(issue_id) ON DELETE CASCADE,
    media_url TEXT NOT NULL,
    submitted_at TEXT NOT NULL,
    location TEXT,
    geo_verified INTEGER NOT NULL DEFAULT 0 CHECK (geo_verified IN (0, 1)),
    notes TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS issue_audit (
    audit_id INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id TEXT NOT NULL REFERENCES issues(issue_id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    at TEXT NOT NULL,
    updated_by TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS workers (
    worker_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    department TEXT NOT NULL CHECK (department IN (
        'pwd', 'water', 'swm', 'traffic', 'health',
        'environment', 'electricity', 'disaster', 'admin'
    )),
    contact TEXT NOT NULL DEFAULT '',
    active INTEGER NOT NULL DEFAULT 1 CHECK (active IN (0, 1)),
    civic_score INTEGER NOT NULL DEFAULT 0,
    tasks_completed INTEGER NOT NULL DEFAULT 0,
    earned_badges INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS posts (
    post_id INTEGER PRIMARY KEY AUTOINCREMENT,
    author TEXT NOT NULL,
    owner TEXT NOT NULL,
    body TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN (
        'reported', 'assigned', 'pending-review', 'resolved', 'escalated-approved'
    )),
    issue_id TEXT,
    likes INTEGER NOT NULL DEFAULT 0,
    is_resolved INTEGER NOT NULL DEFAULT 0 CHECK (is_resolved IN (0, 1)),
    is_escalated INTEGER NOT NULL DEFAULT 0 CHECK (is_escalated IN (0, 1)),
    rating_work_avg REAL,
    rating_escalation_avg REAL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipient TEXT NOT NULL,
    issue_id TEXT,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

/// Migration v2: read-path indexes for the filters the engine and the
/// scoring collector actually use.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_issues_department_status
    ON issues(department, status);

CREATE INDEX IF NOT EXISTS idx_issues_escalation_status
    ON issues(escalation_status)
    WHERE escalation_status IS NOT NULL;

CREATE INDEX IF NOT EXISTS idx_issues_updated_at
    ON issues(updated_at);

CREATE INDEX IF NOT EXISTS idx_posts_author
    ON posts(author);

CREATE INDEX IF NOT EXISTS idx_proofs_issue
    ON issue_proofs(issue_id);

CREATE INDEX IF NOT EXISTS idx_audit_issue
    ON issue_audit(issue_id);
";
