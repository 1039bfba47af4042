//! Repository modules - Data access wrappers around port traits.
//!
//! Each repository wraps a port trait and provides the interface
//! use cases rely on.

pub mod badge_catalog;
pub mod badge_progress;

pub use badge_catalog::{BadgeCatalog, CatalogError};
pub use badge_progress::{AppliedDelta, BadgeProgress, ProgressError};
