//! Business logic services

pub mod catalog;
pub mod loans;
pub mod members;
pub mod notifications;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

use notifications::{NotificationDispatcher, NotificationQueue};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository and notification queue
    pub fn new(repository: Repository, config: &AppConfig, queue: Arc<dyn NotificationQueue>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            loans: loans::LoansService::new(
                repository.clone(),
                NotificationDispatcher::new(queue),
                config.loans.default_duration_days,
            ),
            repository,
        }
    }
}
