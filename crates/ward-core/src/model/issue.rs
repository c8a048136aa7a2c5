use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::department::Department;

/// Primary lifecycle states of an issue.
///
/// `Reopened` is a transient marker written when a resolved issue is sent
/// back by a dissatisfied citizen; work always continues in `Assign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    Assign,
    PendingReview,
    Resolved,
    Reopened,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assign => "assign",
            Self::PendingReview => "pending-review",
            Self::Resolved => "resolved",
            Self::Reopened => "reopened",
        }
    }

    /// Whether the primary lifecycle permits moving to `target`.
    ///
    /// Legal moves:
    /// - `pending -> assign` (intake assignment)
    /// - `assign -> pending-review` (proof submitted)
    /// - `pending-review -> resolved` (proof approved)
    /// - `pending-review -> assign` (proof rejected)
    /// - `resolved -> reopened` and `reopened -> assign` (citizen reopen)
    ///
    /// Escalation terminals reset the status to `assign` from any state;
    /// that reset is owned by the escalation workflow and deliberately
    /// bypasses this table.
    #[must_use]
    pub const fn allows(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Assign)
                | (Self::Assign, Self::PendingReview)
                | (Self::PendingReview, Self::Resolved | Self::Assign)
                | (Self::Resolved, Self::Reopened)
                | (Self::Reopened, Self::Assign)
        )
    }
}

/// Issue priority, set at creation and immutable for scoring purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Verdict of a proof-of-work review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofStatus {
    Approved,
    Rejected,
}

impl ProofStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// States of the escalation sub-machine. `Approved` and `Rejected` are
/// terminal; a new escalation may be raised after either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationStatus {
    Pending,
    Approved,
    Rejected,
}

impl EscalationStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Terminal states permit a fresh escalation cycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Reference to the field worker an issue is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: String,
    pub name: String,
    pub department: Department,
    pub contact: String,
}

/// One evidence submission claiming task completion. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofOfWork {
    pub media_url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub geo_verified: bool,
    #[serde(default)]
    pub notes: String,
}

/// Reviewer verdict stamp attached once a proof review concludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofReview {
    pub status: ProofStatus,
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
}

/// The escalation sub-record, attachable independent of primary status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub status: EscalationStatus,
    pub reason: String,
    pub escalated_by: String,
    pub escalated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl Escalation {
    /// A freshly raised, pending escalation.
    #[must_use]
    pub const fn pending(reason: String, escalated_by: String, at: DateTime<Utc>) -> Self {
        Self {
            status: EscalationStatus::Pending,
            reason,
            escalated_by,
            escalated_at: at,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
        }
    }
}

/// Average citizen rating for one feedback channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
}

/// Citizen feedback averages mirrored onto the issue; read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PublicRatings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<RatingSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<RatingSummary>,
}

/// One entry in the issue's append-only transition trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub status: Status,
    pub timestamp: DateTime<Utc>,
    pub updated_by: String,
}

/// The central entity: a citizen-reported civic problem tracked through
/// resolution. `status` and `escalation` are orthogonal: an issue can be
/// `resolved` while an escalation is still `pending` against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub department: Department,
    pub priority: Priority,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub reported_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_personnel: Option<Personnel>,
    #[serde(default)]
    pub proof_of_work: Vec<ProofOfWork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_review: Option<ProofReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
    #[serde(default)]
    pub public_ratings: PublicRatings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_post_id: Option<i64>,
    #[serde(default)]
    pub audit: Vec<AuditEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Latest evidence submission, if any.
    #[must_use]
    pub fn latest_proof(&self) -> Option<&ProofOfWork> {
        self.proof_of_work.last()
    }

    /// Whether an escalation can currently be raised: none yet, or the
    /// previous cycle ended in a terminal state.
    #[must_use]
    pub fn escalation_idle(&self) -> bool {
        self.escalation
            .as_ref()
            .is_none_or(|esc| esc.status.is_terminal())
    }
}

/// Generate a new issue id: `<dept-code>-<year>-<base36 suffix>`,
/// e.g. `wss-2026-k3f9`. Matches the original municipal ticket shape.
#[must_use]
pub fn new_issue_id(department: Department, now: DateTime<Utc>) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect();
    format!(
        "{}-{}-{}",
        department.code().to_ascii_lowercase(),
        now.year(),
        suffix
    )
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "assign" => Ok(Self::Assign),
            "pending-review" => Ok(Self::PendingReview),
            "resolved" => Ok(Self::Resolved),
            "reopened" => Ok(Self::Reopened),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for ProofStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEnumError {
                expected: "proof status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for EscalationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEnumError {
                expected: "escalation status",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Department, Escalation, EscalationStatus, Issue, Priority, PublicRatings, Status,
        new_issue_id,
    };
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn blank_issue(status: Status) -> Issue {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        Issue {
            id: "wss-2026-test".into(),
            title: "Water main break on Oak Street".into(),
            description: String::new(),
            department: Department::Water,
            priority: Priority::High,
            status,
            location: None,
            reported_by: "Jane Smith".into(),
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
    fn status_json_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Status::PendingReview).unwrap(),
            "\"pending-review\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"pending-review\"").unwrap(),
            Status::PendingReview
        );
    }

    #[test]
    fn display_parse_roundtrips() {
        for value in [
            Status::Pending,
            Status::Assign,
            Status::PendingReview,
            Status::Resolved,
            Status::Reopened,
        ] {
            assert_eq!(Status::from_str(&value.to_string()).unwrap(), value);
        }
        for value in [
            Priority::Critical,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ] {
            assert_eq!(Priority::from_str(&value.to_string()).unwrap(), value);
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(Status::from_str("in-progress").is_err());
        assert!(Priority::from_str("urgent").is_err());
        assert!(EscalationStatus::from_str("open").is_err());
    }

    #[test]
    fn lifecycle_transition_table() {
        assert!(Status::Pending.allows(Status::Assign));
        assert!(Status::Assign.allows(Status::PendingReview));
        assert!(Status::PendingReview.allows(Status::Resolved));
        assert!(Status::PendingReview.allows(Status::Assign));
        assert!(Status::Resolved.allows(Status::Reopened));
        assert!(Status::Reopened.allows(Status::Assign));

        assert!(!Status::Pending.allows(Status::Resolved));
        assert!(!Status::Assign.allows(Status::Resolved));
        assert!(!Status::Resolved.allows(Status::PendingReview));
    }

    #[test]
    fn escalation_idle_requires_no_open_cycle() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let mut issue = blank_issue(Status::Resolved);
        assert!(issue.escalation_idle());

        issue.escalation = Some(Escalation::pending(
            "Exceeds department budget limit".into(),
            "John Doe".into(),
            at,
        ));
        assert!(!issue.escalation_idle());

        if let Some(esc) = issue.escalation.as_mut() {
            esc.status = EscalationStatus::Rejected;
        }
        assert!(issue.escalation_idle());
    }

    #[test]
    fn issue_ids_carry_department_and_year() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let id = new_issue_id(Department::Traffic, at);
        assert!(id.starts_with("trf-2026-"), "unexpected id {id}");
        assert_eq!(id.len(), "trf-2026-".len() + 4);
    }

    #[test]
    fn issue_json_roundtrips() {
        let issue = blank_issue(Status::Pending);
        let json = serde_json::to_string(&issue).unwrap();
        let back: Issue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, issue);
    }
}
