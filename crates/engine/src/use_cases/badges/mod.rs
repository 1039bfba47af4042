//! Badge use cases.
//!
//! Orchestrates the Badge Catalog, Progress Store and Notification Emitter
//! to process trigger events, answer listing and stats queries, and manage
//! the catalog.

mod admin;
mod catalog;
mod notify;
mod process_event;
mod stats;
mod sync;

use std::sync::Arc;

use waymark_domain::DomainError;

use crate::infrastructure::ports::RepoError;
use crate::repositories::{CatalogError, ProgressError};

pub use admin::ManageBadges;
pub use catalog::{BadgeDetail, GetBadge, ListBadges, ListUserBadges};
pub use notify::UnlockNotifier;
pub use process_event::ProcessEvent;
pub use stats::GetBadgeStats;
pub use sync::EvaluateBadges;

/// Container for badge use cases.
pub struct BadgeUseCases {
    pub list: Arc<ListBadges>,
    pub get: Arc<GetBadge>,
    pub list_for_user: Arc<ListUserBadges>,
    pub stats: Arc<GetBadgeStats>,
    pub process_event: Arc<ProcessEvent>,
    pub evaluate: Arc<EvaluateBadges>,
    pub manage: Arc<ManageBadges>,
}

/// Errors surfaced by badge use cases.
#[derive(Debug, thiserror::Error)]
pub enum BadgeError {
    #[error("Badge not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Badge already exists: {0}")]
    AlreadyExists(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<DomainError> for BadgeError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type} {id}"))
            }
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<RepoError> for BadgeError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { id, .. } => Self::NotFound(id),
            RepoError::ConstraintViolation(msg) => Self::AlreadyExists(msg),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<ProgressError> for BadgeError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::Repo(repo) => repo.into(),
            conflict @ ProgressError::ConcurrencyConflict { .. } => {
                Self::StorageUnavailable(conflict.to_string())
            }
        }
    }
}

impl From<CatalogError> for BadgeError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Invalid(domain) => domain.into(),
            CatalogError::Repo(repo) => repo.into(),
        }
    }
}
