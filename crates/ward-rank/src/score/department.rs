//! Pure department score computation.
//!
//! Department scores are recomputed from the full corpus every evaluation
//! cycle, never incrementally mutated, so a lost update or replayed event
//! cannot drift the ranking. Worker credit is the deliberate asymmetry:
//! it is event-sourced at approval time (see `ward-core`) because
//! re-deriving per-worker history on every view would rescan the corpus.

use serde::{Deserialize, Serialize};
use std::fmt;

use ward_core::model::department::Department;
use ward_core::model::post::Post;

/// Points per resolved issue.
pub const POINTS_PER_RESOLVED: i64 = 100;

/// Points per citizen like across the department's posts.
pub const POINTS_PER_LIKE: i64 = 10;

/// Penalty per open-or-approved escalation.
pub const PENALTY_PER_ESCALATION: i64 = 50;

/// Raw aggregates for one department, gathered by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInputs {
    pub department: Department,
    pub resolved_count: u64,
    pub escalated_count: u64,
    pub likes_total: u64,
    pub rating_adjustment: i64,
}

/// Podium badge for the top three ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
}

impl RankBadge {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
        }
    }

    const fn for_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }
}

impl fmt::Display for RankBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scoreboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentScore {
    pub department: Department,
    pub resolved_count: u64,
    pub escalated_count: u64,
    pub likes_total: u64,
    pub rating_adjustment: i64,
    pub base_score: i64,
    pub score: i64,
    pub rank: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<RankBadge>,
    pub trend_label: String,
}

/// Citizen-rating adjustment over a department's posts.
///
/// Resolved posts reward good work ratings and punish bad ones. Escalated
/// posts run the other way: a high escalation rating means citizens judged
/// the escalation justified, which counts against the department; a low
/// one means the escalation was unjustified and the department recovers
/// points.
#[must_use]
pub fn rating_adjustment(posts: &[Post]) -> i64 {
    let mut adjustment = 0;
    for post in posts {
        if post.is_resolved {
            if let Some(avg) = post.rating_work_avg {
                adjustment += work_bracket(avg);
            }
        }
        if post.is_escalated {
            if let Some(avg) = post.rating_escalation_avg {
                adjustment += escalation_bracket(avg);
            }
        }
    }
    adjustment
}

fn work_bracket(avg: f64) -> i64 {
    if avg >= 4.0 {
        50
    } else if avg >= 3.0 {
        20
    } else if avg >= 2.0 {
        5
    } else {
        -30
    }
}

fn escalation_bracket(avg: f64) -> i64 {
    if avg >= 4.0 {
        -40
    } else if avg <= 2.0 {
        20
    } else {
        0
    }
}

/// `resolved*100 + likes*10 - escalated*50`, before the rating adjustment.
#[must_use]
pub fn base_score(inputs: &ScoreInputs) -> i64 {
    let resolved = i64::try_from(inputs.resolved_count).unwrap_or(i64::MAX);
    let likes = i64::try_from(inputs.likes_total).unwrap_or(i64::MAX);
    let escalated = i64::try_from(inputs.escalated_count).unwrap_or(i64::MAX);
    resolved * POINTS_PER_RESOLVED + likes * POINTS_PER_LIKE - escalated * PENALTY_PER_ESCALATION
}

/// Final score: floored at zero, never negative.
#[must_use]
pub fn final_score(inputs: &ScoreInputs) -> i64 {
    (base_score(inputs) + inputs.rating_adjustment).max(0)
}

/// The signed rating adjustment rendered for the scoreboard: `+N`, `-N`,
/// or `"0"`.
#[must_use]
pub fn trend_label(adjustment: i64) -> String {
    match adjustment {
        0 => "0".to_string(),
        n if n > 0 => format!("+{n}"),
        n => n.to_string(),
    }
}

/// Rank departments by score descending. Ties keep the input (roster)
/// order: acceptable since scores are integers and collisions are rare.
/// Ranks 1/2/3 carry gold/silver/bronze.
#[must_use]
pub fn rank_departments(inputs: Vec<ScoreInputs>) -> Vec<DepartmentScore> {
    let mut rows: Vec<DepartmentScore> = inputs
        .into_iter()
        .map(|inputs| DepartmentScore {
            department: inputs.department,
            resolved_count: inputs.resolved_count,
            escalated_count: inputs.escalated_count,
            likes_total: inputs.likes_total,
            rating_adjustment: inputs.rating_adjustment,
            base_score: base_score(&inputs),
            score: final_score(&inputs),
            rank: 0,
            badge: None,
            trend_label: trend_label(inputs.rating_adjustment),
        })
        .collect();

    rows.sort_by_key(|row| std::cmp::Reverse(row.score));
    for (index, row) in rows.iter_mut().enumerate() {
        let rank = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
        row.rank = rank;
        row.badge = RankBadge::for_rank(rank);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::{
        RankBadge, ScoreInputs, base_score, final_score, rank_departments, rating_adjustment,
        trend_label,
    };
    use chrono::{TimeZone, Utc};
    use ward_core::model::department::Department;
    use ward_core::model::post::{Post, PostStatus};

    fn inputs(department: Department, resolved: u64, escalated: u64, likes: u64) -> ScoreInputs {
        ScoreInputs {
            department,
            resolved_count: resolved,
            escalated_count: escalated,
            likes_total: likes,
            rating_adjustment: 0,
        }
    }

    fn post(is_resolved: bool, work: Option<f64>, is_escalated: bool, esc: Option<f64>) -> Post {
        Post {
            id: 0,
            author: "SWM".into(),
            owner: "swm_dept".into(),
            body: String::new(),
            status: PostStatus::Resolved,
            issue_id: None,
            likes: 0,
            is_resolved,
            is_escalated,
            rating_work_avg: work,
            rating_escalation_avg: esc,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn base_score_formula_matches_fixed_weights() {
        // 3*100 + 10*10 - 1*50 = 350
        let score = final_score(&inputs(Department::Water, 3, 1, 10));
        assert_eq!(score, 350);
    }

    #[test]
    fn score_floors_at_zero() {
        // 0*100 + 0*10 - 10*50 = -500 -> 0
        let subject = inputs(Department::Water, 0, 10, 0);
        assert_eq!(base_score(&subject), -500);
        assert_eq!(final_score(&subject), 0);
    }

    #[test]
    fn work_rating_brackets() {
        assert_eq!(rating_adjustment(&[post(true, Some(4.0), false, None)]), 50);
        assert_eq!(rating_adjustment(&[post(true, Some(3.5), false, None)]), 20);
        assert_eq!(rating_adjustment(&[post(true, Some(2.0), false, None)]), 5);
        assert_eq!(
            rating_adjustment(&[post(true, Some(1.9), false, None)]),
            -30
        );
        // Unrated or unresolved posts contribute nothing.
        assert_eq!(rating_adjustment(&[post(true, None, false, None)]), 0);
        assert_eq!(rating_adjustment(&[post(false, Some(5.0), false, None)]), 0);
    }

    #[test]
    fn escalation_rating_runs_against_the_department() {
        // Citizens judged the escalation valid: the department loses points.
        assert_eq!(
            rating_adjustment(&[post(false, None, true, Some(4.2))]),
            -40
        );
        // Citizens judged it unjustified: the department recovers points.
        assert_eq!(rating_adjustment(&[post(false, None, true, Some(1.5))]), 20);
        // The middle band is neutral.
        assert_eq!(rating_adjustment(&[post(false, None, true, Some(3.0))]), 0);
    }

    #[test]
    fn adjustments_sum_across_posts() {
        let posts = vec![
            post(true, Some(4.8), false, None),
            post(true, Some(1.0), false, None),
            post(false, None, true, Some(1.0)),
        ];
        assert_eq!(rating_adjustment(&posts), 50 - 30 + 20);
    }

    #[test]
    fn ranking_awards_podium_badges_in_score_order() {
        let rows = rank_departments(vec![
            inputs(Department::Pwd, 1, 0, 0),
            inputs(Department::Water, 5, 0, 0),
            inputs(Department::Swm, 3, 0, 0),
            inputs(Department::Traffic, 2, 0, 0),
        ]);

        let order: Vec<(Department, u32, Option<RankBadge>)> = rows
            .iter()
            .map(|row| (row.department, row.rank, row.badge))
            .collect();
        assert_eq!(
            order,
            vec![
                (Department::Water, 1, Some(RankBadge::Gold)),
                (Department::Swm, 2, Some(RankBadge::Silver)),
                (Department::Traffic, 3, Some(RankBadge::Bronze)),
                (Department::Pwd, 4, None),
            ]
        );
    }

    #[test]
    fn ties_keep_roster_order() {
        let rows = rank_departments(vec![
            inputs(Department::Pwd, 2, 0, 0),
            inputs(Department::Water, 2, 0, 0),
        ]);
        assert_eq!(rows[0].department, Department::Pwd);
        assert_eq!(rows[1].department, Department::Water);
    }

    #[test]
    fn trend_label_renders_signed_adjustment() {
        assert_eq!(trend_label(35), "+35");
        assert_eq!(trend_label(-40), "-40");
        assert_eq!(trend_label(0), "0");
    }

    #[test]
    fn scoreboard_row_serializes_for_the_api() {
        let rows = rank_departments(vec![inputs(Department::Water, 1, 0, 0)]);
        let json = serde_json::to_value(&rows[0]).expect("serialize");
        assert_eq!(json["department"], "water");
        assert_eq!(json["badge"], "gold");
        assert_eq!(json["trend_label"], "0");
    }
}
