//! Document shapes shared by the engine, the store, and the scoring crate.

pub mod department;
pub mod issue;
pub mod post;
pub mod worker;
