use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::issue::ParseEnumError;

/// Status values mirrored onto citizen-facing posts as the linked issue
/// moves through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostStatus {
    Reported,
    Assigned,
    PendingReview,
    Resolved,
    EscalatedApproved,
}

impl PostStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Reported => "reported",
            Self::Assigned => "assigned",
            Self::PendingReview => "pending-review",
            Self::Resolved => "resolved",
            Self::EscalatedApproved => "escalated-approved",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reported" => Ok(Self::Reported),
            "assigned" => Ok(Self::Assigned),
            "pending-review" => Ok(Self::PendingReview),
            "resolved" => Ok(Self::Resolved),
            "escalated-approved" => Ok(Self::EscalatedApproved),
            _ => Err(ParseEnumError {
                expected: "post status",
                got: s.to_string(),
            }),
        }
    }
}

/// Which citizen feedback channel a rating belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingKind {
    Work,
    Escalation,
}

/// A citizen-feed record: either the post that originated an issue, or a
/// disclosure post published by the engine. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: i64,
    /// Display name the post is published under. Department disclosure
    /// posts use one of the department's display-name variants.
    pub author: String,
    /// Account that owns the post and receives notifications about it.
    pub owner: String,
    pub body: String,
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub is_escalated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_work_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_escalation_avg: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A direct message to a citizen; fire-and-forget from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
