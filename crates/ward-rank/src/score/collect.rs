//! Corpus collection feeding the pure scoring functions.
//!
//! Scoring is a display aggregate, not a record of truth: a failed read of
//! any sub-collection degrades to partial aggregates (whatever counts were
//! obtained) instead of failing the whole ranking. Failures are logged at
//! `warn` and the affected counts stay zero.

use tracing::warn;

use super::department::{DepartmentScore, ScoreInputs, rank_departments, rating_adjustment};
use ward_core::model::department::{ALL_DEPARTMENTS, Department};
use ward_core::model::issue::{EscalationStatus, Issue, Status};
use ward_core::model::post::Post;
use ward_core::store::{IssueFilter, IssueStore, PostFeed};

/// Gather one department's raw aggregates from the store.
pub fn collect_inputs<S: IssueStore + PostFeed>(store: &S, department: Department) -> ScoreInputs {
    let issues: Vec<Issue> = store
        .query_issues(&IssueFilter {
            department: Some(department),
            ..IssueFilter::default()
        })
        .unwrap_or_else(|err| {
            warn!(department = %department, error = %err, "issue read failed; scoring degrades");
            Vec::new()
        });

    let resolved_count = issues
        .iter()
        .filter(|issue| issue.status == Status::Resolved)
        .count() as u64;
    let escalated_count = issues
        .iter()
        .filter(|issue| {
            issue.escalation.as_ref().is_some_and(|esc| {
                matches!(
                    esc.status,
                    EscalationStatus::Pending | EscalationStatus::Approved
                )
            })
        })
        .count() as u64;

    let posts: Vec<Post> = store
        .query_posts_by_author(&department.display_names())
        .unwrap_or_else(|err| {
            warn!(department = %department, error = %err, "post read failed; scoring degrades");
            Vec::new()
        });

    let likes_total = posts.iter().map(|post| u64::from(post.likes)).sum();
    let adjustment = rating_adjustment(&posts);

    ScoreInputs {
        department,
        resolved_count,
        escalated_count,
        likes_total,
        rating_adjustment: adjustment,
    }
}

/// Compute the full department scoreboard from the corpus.
pub fn scoreboard<S: IssueStore + PostFeed>(store: &S) -> Vec<DepartmentScore> {
    let inputs = ALL_DEPARTMENTS
        .into_iter()
        .map(|department| collect_inputs(store, department))
        .collect();
    rank_departments(inputs)
}
