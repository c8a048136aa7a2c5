//! Typed error surface for engine and store operations.
//!
//! Every error carries a stable machine code (`E####`) so callers and agents
//! can branch without parsing messages. State-machine violations are always
//! surfaced to the caller; they must never be silently retried, since
//! retrying a stale transition can corrupt issue state.

use crate::model::issue::Status;

/// Result alias used across the engine and store layers.
pub type Result<T, E = WardError> = std::result::Result<T, E>;

/// Errors produced by lifecycle, escalation, and store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WardError {
    /// The referenced issue does not exist.
    #[error("issue '{issue_id}' not found")]
    IssueNotFound { issue_id: String },

    /// The referenced worker does not exist.
    #[error("worker '{worker_id}' not found")]
    WorkerNotFound { worker_id: String },

    /// The referenced post does not exist.
    #[error("post '{post_id}' not found")]
    PostNotFound { post_id: i64 },

    /// The operation is illegal for the issue's current state.
    #[error("{operation} requires status '{required}', issue '{issue_id}' is '{actual}'")]
    InvalidTransition {
        issue_id: String,
        operation: &'static str,
        required: &'static str,
        actual: String,
    },

    /// The precondition changed between read and write.
    #[error("conflicting transition on issue '{issue_id}': precondition no longer holds")]
    ConflictingTransition { issue_id: String },

    /// The worker exists but is not accepting assignments.
    #[error("worker '{worker_id}' is not active")]
    WorkerUnavailable { worker_id: String },

    /// Idempotency guard: the issue already has assigned personnel.
    #[error("issue '{issue_id}' is already assigned to '{assignee}'")]
    AlreadyAssigned { issue_id: String, assignee: String },

    /// Idempotency guard: the proof was already approved.
    #[error("proof for issue '{issue_id}' is already approved")]
    AlreadyApproved { issue_id: String },

    /// A proof is already awaiting review; no concurrent re-submission.
    #[error("issue '{issue_id}' already has a proof under review")]
    ReviewInProgress { issue_id: String },

    /// The store or a notification sink is unreachable.
    #[error("dependency unavailable: {reason}")]
    DependencyUnavailable { reason: String },
}

impl WardError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::IssueNotFound { .. } => "E2001",
            Self::InvalidTransition { .. } => "E2002",
            Self::ConflictingTransition { .. } => "E2003",
            Self::WorkerUnavailable { .. } => "E2004",
            Self::AlreadyAssigned { .. } => "E2005",
            Self::AlreadyApproved { .. } => "E2006",
            Self::ReviewInProgress { .. } => "E2007",
            Self::WorkerNotFound { .. } => "E2008",
            Self::PostNotFound { .. } => "E2009",
            Self::DependencyUnavailable { .. } => "E5001",
        }
    }

    /// Remediation hint surfaced to operators and agents.
    #[must_use]
    pub fn suggestion(&self) -> String {
        match self {
            Self::IssueNotFound { .. } => "Check the issue ID with 'wd list'.".to_string(),
            Self::WorkerNotFound { .. } => "Register the worker with 'wd worker add'.".to_string(),
            Self::PostNotFound { .. } => "Check the post ID with 'wd show <issue>'.".to_string(),
            Self::InvalidTransition { .. } | Self::ConflictingTransition { .. } => {
                "Someone else may have acted on this issue; re-check its state and retry."
                    .to_string()
            }
            Self::WorkerUnavailable { worker_id } => {
                format!("Reactivate '{worker_id}' or pick another active worker.")
            }
            Self::AlreadyAssigned { assignee, .. } => {
                format!("The issue is already being worked by '{assignee}'.")
            }
            Self::AlreadyApproved { .. } => {
                "The resolution already stands; no further review is needed.".to_string()
            }
            Self::ReviewInProgress { .. } => {
                "Wait for the pending review to be approved or rejected.".to_string()
            }
            Self::DependencyUnavailable { .. } => {
                "Transient store failure; retry the command.".to_string()
            }
        }
    }

    /// Shorthand constructor for transition violations.
    #[must_use]
    pub fn invalid_transition(
        issue_id: &str,
        operation: &'static str,
        required: &'static str,
        actual: Status,
    ) -> Self {
        Self::InvalidTransition {
            issue_id: issue_id.to_string(),
            operation,
            required,
            actual: actual.to_string(),
        }
    }
}

impl From<rusqlite::Error> for WardError {
    fn from(err: rusqlite::Error) -> Self {
        Self::DependencyUnavailable {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WardError;
    use std::collections::HashSet;

    fn all_variants() -> Vec<WardError> {
        vec![
            WardError::IssueNotFound {
                issue_id: "x".into(),
            },
            WardError::WorkerNotFound {
                worker_id: "x".into(),
            },
            WardError::PostNotFound { post_id: 1 },
            WardError::InvalidTransition {
                issue_id: "x".into(),
                operation: "approve-proof",
                required: "pending-review",
                actual: "pending".into(),
            },
            WardError::ConflictingTransition {
                issue_id: "x".into(),
            },
            WardError::WorkerUnavailable {
                worker_id: "x".into(),
            },
            WardError::AlreadyAssigned {
                issue_id: "x".into(),
                assignee: "w".into(),
            },
            WardError::AlreadyApproved {
                issue_id: "x".into(),
            },
            WardError::ReviewInProgress {
                issue_id: "x".into(),
            },
            WardError::DependencyUnavailable {
                reason: "down".into(),
            },
        ]
    }

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for err in all_variants() {
            assert!(
                seen.insert(err.error_code()),
                "duplicate code {}",
                err.error_code()
            );
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for err in all_variants() {
            let code = err.error_code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn every_error_has_a_suggestion() {
        for err in all_variants() {
            assert!(!err.suggestion().is_empty());
        }
    }
}
