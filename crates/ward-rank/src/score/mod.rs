//! Department scoring: pure computation plus corpus collection.

pub mod collect;
pub mod department;

pub use collect::{collect_inputs, scoreboard};
pub use department::{
    DepartmentScore, RankBadge, ScoreInputs, base_score, final_score, rank_departments,
    rating_adjustment, trend_label,
};
