//! Business logic services

pub mod catalogue;
pub mod loans;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalogue: catalogue::CatalogueService,
    pub loans: loans::LoanLifecycleManager,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalogue: catalogue::CatalogueService::new(repository.clone()),
            loans: loans::LoanLifecycleManager::new(repository.clone()),
            repository,
        }
    }
}
