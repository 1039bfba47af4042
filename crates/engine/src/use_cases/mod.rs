//! Use cases - User story orchestration.
//!
//! Use cases orchestrate across repositories to fulfill user stories.

pub mod badges;

pub use badges::{BadgeError, BadgeUseCases};
