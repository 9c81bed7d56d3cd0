//! Critical Statistics Invariants:
//!
//! 1. Statistics are ALWAYS derived, NEVER primary
//! 2. Statistics can be recalculated at any time
//! 3. Statistics are never persisted
//! 4. An empty catalog reports "-" as its popular category

pub mod entity;
pub use entity::{CatalogStats, NO_POPULAR_CATEGORY};
