#![forbid(unsafe_code)]
//! ward-core: the civic-issue lifecycle engine.
//!
//! Issues move `pending -> assign -> pending-review -> resolved`, with an
//! orthogonal escalation sub-machine (`none -> pending -> approved |
//! rejected`) attachable at any point. Transitions are validated against a
//! fresh snapshot and written through compare-and-set store updates; side
//! effects (post mirrors, disclosure posts, citizen notifications, worker
//! credit) run after the committed write, best-effort.
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::WardError`] for engine/store operations;
//!   `anyhow::Result` at I/O boundaries.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;
pub mod watch;
