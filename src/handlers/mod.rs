//! Axum adapters over `resources`.
//!
//! Each module exposes one function per verb; routing lives in `server`.

pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;
