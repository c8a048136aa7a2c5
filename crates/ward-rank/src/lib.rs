#![forbid(unsafe_code)]
//! ward-rank: the department scoring and ranking engine.
//!
//! Scores are recomputed from scratch over the issue/post corpus every
//! evaluation cycle: `resolved*100 + likes*10 - escalated*50`, adjusted
//! by citizen rating brackets and floored at zero, then ranked with
//! gold/silver/bronze badges for the podium. Collection degrades to
//! partial aggregates when a sub-collection read fails; a broken feed
//! must never take the scoreboard down with it.
//!
//! # Conventions
//!
//! - **Errors**: scoring never raises; collection failures degrade and log.
//! - **Logging**: `tracing` macros (`warn!` on degraded reads).

pub mod score;

pub use score::{DepartmentScore, RankBadge, ScoreInputs, scoreboard};
