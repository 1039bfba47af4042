//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{
    BadgeCatalogRepo, BadgeProgressRepo, ClockPort, NotificationPort,
};
use crate::repositories::{BadgeCatalog, BadgeProgress};
use crate::use_cases::badges::{
    BadgeUseCases, EvaluateBadges, GetBadge, GetBadgeStats, ListBadges, ListUserBadges,
    ManageBadges, ProcessEvent, UnlockNotifier,
};

/// Main application state.
///
/// Built once at startup and passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for repository modules.
pub struct Repositories {
    pub catalog: Arc<BadgeCatalog>,
    pub progress: Arc<BadgeProgress>,
}

/// Container for all use cases.
pub struct UseCases {
    pub badges: BadgeUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        catalog_repo: Arc<dyn BadgeCatalogRepo>,
        progress_repo: Arc<dyn BadgeProgressRepo>,
        notifications: Arc<dyn NotificationPort>,
        clock: Arc<dyn ClockPort>,
        progress_max_attempts: u32,
    ) -> Self {
        let catalog = Arc::new(BadgeCatalog::new(catalog_repo));
        let progress = Arc::new(
            BadgeProgress::new(progress_repo, clock.clone())
                .with_max_attempts(progress_max_attempts),
        );
        let notifier = Arc::new(UnlockNotifier::new(notifications));

        let badges = BadgeUseCases {
            list: Arc::new(ListBadges::new(catalog.clone(), progress.clone())),
            get: Arc::new(GetBadge::new(catalog.clone(), progress.clone())),
            list_for_user: Arc::new(ListUserBadges::new(catalog.clone(), progress.clone())),
            stats: Arc::new(GetBadgeStats::new(catalog.clone(), progress.clone())),
            process_event: Arc::new(ProcessEvent::new(
                catalog.clone(),
                progress.clone(),
                notifier,
                clock.clone(),
            )),
            evaluate: Arc::new(EvaluateBadges::new(catalog.clone(), progress.clone())),
            manage: Arc::new(ManageBadges::new(catalog.clone(), clock)),
        };

        Self {
            repositories: Repositories { catalog, progress },
            use_cases: UseCases { badges },
        }
    }
}
