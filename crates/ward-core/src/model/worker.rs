use serde::{Deserialize, Serialize};

use super::department::Department;

/// Civic score credited for each approved resolution.
pub const CREDIT_PER_APPROVAL: i64 = 100;

/// Badge thresholds on cumulative completed tasks.
pub const TASK_BADGE_THRESHOLDS: [u32; 3] = [10, 20, 50];

/// Badge thresholds on cumulative civic score.
pub const SCORE_BADGE_THRESHOLDS: [i64; 2] = [1000, 5000];

/// A field worker: assignable personnel plus their persisted credit
/// counters. Counters are event-sourced: they move only when a proof
/// approval credits the worker, never by corpus recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub department: Department,
    #[serde(default)]
    pub contact: String,
    pub active: bool,
    #[serde(default)]
    pub civic_score: i64,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default)]
    pub earned_badges: u8,
}

impl Worker {
    /// A newly registered, active worker with zeroed counters.
    #[must_use]
    pub const fn new(id: String, name: String, department: Department, contact: String) -> Self {
        Self {
            id,
            name,
            department,
            contact,
            active: true,
            civic_score: 0,
            tasks_completed: 0,
            earned_badges: 0,
        }
    }

    /// Counters after one more approved resolution.
    #[must_use]
    pub const fn credited(&self) -> (i64, u32, u8) {
        let score = self.civic_score + CREDIT_PER_APPROVAL;
        let tasks = self.tasks_completed + 1;
        (score, tasks, badge_count(tasks, score))
    }
}

/// Number of badges earned at the given cumulative counters: one per
/// threshold cleared. Monotone in both arguments, so badge counts never
/// decrease across a worker's history.
#[must_use]
pub const fn badge_count(tasks_completed: u32, civic_score: i64) -> u8 {
    let mut count = 0u8;
    let mut i = 0;
    while i < TASK_BADGE_THRESHOLDS.len() {
        if tasks_completed >= TASK_BADGE_THRESHOLDS[i] {
            count += 1;
        }
        i += 1;
    }
    let mut j = 0;
    while j < SCORE_BADGE_THRESHOLDS.len() {
        if civic_score >= SCORE_BADGE_THRESHOLDS[j] {
            count += 1;
        }
        j += 1;
    }
    count
}
