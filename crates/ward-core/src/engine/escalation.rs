//! Pure transitions for the escalation workflow.
//!
//! Escalation is a parallel sub-machine (`none -> pending -> approved |
//! rejected`) attachable regardless of the issue's primary status: a
//! resolved issue can carry a pending escalation. Both terminal
//! transitions reset the primary status to `assign` so the issue returns
//! to active work, even from `resolved`. That reset mirrors the source
//! system's behavior and is flagged in DESIGN.md as a product ambiguity;
//! it lives in [`terminal_patch`] so a decision changes one place.

use chrono::{DateTime, Utc};

use super::effects::{DisclosureDraft, Effect};
use crate::error::{Result, WardError};
use crate::model::issue::{AuditEntry, Escalation, EscalationStatus, Issue, Status};
use crate::model::post::PostStatus;
use crate::store::IssuePatch;

/// Raise a new escalation cycle against an issue.
///
/// # Errors
/// `InvalidTransition` while a prior escalation is still pending.
pub fn escalate(
    issue: &Issue,
    reason: String,
    escalated_by: String,
    now: DateTime<Utc>,
) -> Result<(IssuePatch, Vec<Effect>)> {
    if !issue.escalation_idle() {
        return Err(WardError::InvalidTransition {
            issue_id: issue.id.clone(),
            operation: "escalate",
            required: "no pending escalation",
            actual: EscalationStatus::Pending.to_string(),
        });
    }

    let mut patch = IssuePatch::at(now);
    patch.escalation = Some(Escalation::pending(reason, escalated_by, now));
    Ok((patch, vec![]))
}

/// Approve the pending escalation: stamp the approval, reset the issue to
/// active work, disclose publicly, and notify the reporting citizen.
///
/// # Errors
/// `InvalidTransition` unless an escalation is pending.
pub fn approve(
    issue: &Issue,
    approver: &str,
    now: DateTime<Utc>,
) -> Result<(IssuePatch, Vec<Effect>)> {
    let escalation = pending_escalation(issue, "approve-escalation")?;

    let mut stamped = escalation.clone();
    stamped.status = EscalationStatus::Approved;
    stamped.approved_by = Some(approver.to_string());
    stamped.approved_at = Some(now);

    let patch = terminal_patch(stamped, approver, now);

    let mut effects = Vec::new();
    if let Some(post_id) = issue.original_post_id {
        effects.push(Effect::MirrorPost {
            post_id,
            status: PostStatus::EscalatedApproved,
        });
    }
    effects.push(Effect::PublishDisclosure(DisclosureDraft {
        author: issue.department.name().to_string(),
        owner: format!("{}_dept", issue.department.id()),
        body: format!(
            "Priority escalation approved: {} ({}). Reason: {}",
            issue.title, issue.id, escalation.reason
        ),
        issue_id: issue.id.clone(),
        escalation: true,
        media_url: None,
        rating: issue.public_ratings.escalation.map(|r| r.average),
    }));
    if let Some(post_id) = issue.original_post_id {
        effects.push(Effect::NotifyCitizen {
            original_post_id: post_id,
            issue_id: issue.id.clone(),
            body: format!(
                "Your escalation of '{}' was approved; the issue has been returned to active work.",
                issue.title
            ),
        });
    }

    Ok((patch, effects))
}

/// Reject the pending escalation: stamp the rejection and reset the issue
/// to active work. No public disclosure.
///
/// # Errors
/// `InvalidTransition` unless an escalation is pending.
pub fn reject(
    issue: &Issue,
    approver: &str,
    now: DateTime<Utc>,
) -> Result<(IssuePatch, Vec<Effect>)> {
    let escalation = pending_escalation(issue, "reject-escalation")?;

    let mut stamped = escalation.clone();
    stamped.status = EscalationStatus::Rejected;
    stamped.rejected_by = Some(approver.to_string());
    stamped.rejected_at = Some(now);

    let patch = terminal_patch(stamped, approver, now);

    let effects = issue
        .original_post_id
        .map(|post_id| Effect::MirrorPost {
            post_id,
            status: PostStatus::Assigned,
        })
        .into_iter()
        .collect();

    Ok((patch, effects))
}

fn pending_escalation<'a>(issue: &'a Issue, operation: &'static str) -> Result<&'a Escalation> {
    match &issue.escalation {
        Some(escalation) if escalation.status == EscalationStatus::Pending => Ok(escalation),
        other => Err(WardError::InvalidTransition {
            issue_id: issue.id.clone(),
            operation,
            required: "pending escalation",
            actual: other
                .as_ref()
                .map_or_else(|| "none".to_string(), |esc| esc.status.to_string()),
        }),
    }
}

/// Both escalation terminals reset the primary status to `assign`,
/// reopening even resolved issues. Preserved as the source behaves;
/// see DESIGN.md before changing.
fn terminal_patch(stamped: Escalation, actor: &str, now: DateTime<Utc>) -> IssuePatch {
    let mut patch = IssuePatch::at(now);
    patch.escalation = Some(stamped);
    patch.status = Some(Status::Assign);
    patch.push_audit = Some(AuditEntry {
        status: Status::Assign,
        timestamp: now,
        updated_by: actor.to_string(),
    });
    patch
}

#[cfg(test)]
mod tests {
    use super::{approve, escalate, reject};
    use crate::engine::effects::Effect;
    use crate::engine::lifecycle::{ReportDraft, new_report};
    use crate::error::WardError;
    use crate::model::department::Department;
    use crate::model::issue::{EscalationStatus, Issue, Priority, Status};
    use crate::model::post::PostStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 15, 0, 0).unwrap()
    }

    fn resolved_issue() -> Issue {
        let mut issue = new_report(
            ReportDraft {
                title: "Major water main break affecting 500+ residents".into(),
                description: String::new(),
                department: Department::Water,
                priority: Priority::Critical,
                location: None,
                reported_by: "John Doe".into(),
                original_post_id: Some(7),
            },
            now(),
        );
        issue.status = Status::Resolved;
        issue
    }

    fn escalated(issue: &mut Issue) {
        let (patch, _) = escalate(
            issue,
            "Exceeds department budget limit".into(),
            "John Doe".into(),
            now(),
        )
        .expect("escalate");
        patch.apply(issue);
    }

    #[test]
    fn escalation_attaches_regardless_of_primary_status() {
        let mut issue = resolved_issue();
        escalated(&mut issue);
        assert_eq!(issue.status, Status::Resolved);
        assert_eq!(
            issue.escalation.as_ref().map(|e| e.status),
            Some(EscalationStatus::Pending)
        );
    }

    #[test]
    fn double_escalation_is_refused_while_pending() {
        let mut issue = resolved_issue();
        escalated(&mut issue);
        let err = escalate(&issue, "again".into(), "John Doe".into(), now())
            .expect_err("second escalation must fail");
        assert!(matches!(err, WardError::InvalidTransition { .. }));
    }

    #[test]
    fn re_escalation_allowed_after_terminal() {
        let mut issue = resolved_issue();
        escalated(&mut issue);
        let (patch, _) = reject(&issue, "commissioner", now()).expect("reject");
        patch.apply(&mut issue);

        assert!(escalate(&issue, "still unresolved".into(), "John Doe".into(), now()).is_ok());
    }

    #[test]
    fn approval_resets_to_assign_and_discloses() {
        let mut issue = resolved_issue();
        escalated(&mut issue);

        let (patch, effects) = approve(&issue, "commissioner", now()).expect("approve");
        assert_eq!(patch.status, Some(Status::Assign));
        let stamped = patch.escalation.as_ref().expect("escalation stamped");
        assert_eq!(stamped.status, EscalationStatus::Approved);
        assert_eq!(stamped.approved_by.as_deref(), Some("commissioner"));

        assert_eq!(effects.len(), 3);
        assert!(matches!(
            effects[0],
            Effect::MirrorPost {
                post_id: 7,
                status: PostStatus::EscalatedApproved
            }
        ));
        match &effects[1] {
            Effect::PublishDisclosure(disclosure) => {
                assert!(disclosure.escalation);
                assert!(disclosure.body.contains("Priority escalation approved"));
            }
            other => panic!("expected disclosure, got {other:?}"),
        }
        assert!(matches!(
            effects[2],
            Effect::NotifyCitizen {
                original_post_id: 7,
                ..
            }
        ));
    }

    #[test]
    fn rejection_resets_to_assign_without_disclosure() {
        let mut issue = resolved_issue();
        escalated(&mut issue);

        let (patch, effects) = reject(&issue, "commissioner", now()).expect("reject");
        assert_eq!(patch.status, Some(Status::Assign));
        assert_eq!(
            patch.escalation.as_ref().map(|e| e.status),
            Some(EscalationStatus::Rejected)
        );
        assert_eq!(
            effects,
            vec![Effect::MirrorPost {
                post_id: 7,
                status: PostStatus::Assigned
            }]
        );
    }

    #[test]
    fn terminal_repeat_is_refused() {
        let mut issue = resolved_issue();
        escalated(&mut issue);
        let (patch, _) = approve(&issue, "commissioner", now()).expect("approve");
        patch.apply(&mut issue);

        assert!(matches!(
            approve(&issue, "commissioner", now()),
            Err(WardError::InvalidTransition { .. })
        ));
        assert!(matches!(
            reject(&issue, "commissioner", now()),
            Err(WardError::InvalidTransition { .. })
        ));
    }
}
