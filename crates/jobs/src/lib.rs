//! The concrete jobs shipped with `sysbatch`.
//!
//! | job | what it does |
//! |-----|--------------|
//! | `delete-old-files` | retention sweep of one directory |
//! | `delete-old-records` | record cleanup placeholder (log only) |
//! | `system-destruction` | parameter validation showcase |
//! | `terminator`, `terminator-schedule`, `terminator-quest` | step-scoped parameter binding demos |
//! | `daily-inventory-report` | low-stock notification |
//!
//! Collaborators the jobs need from the outside world (inventory source,
//! notification channel) are passed in through [`Collaborators`].

pub mod cleanup;
pub mod config;
pub mod inventory_report;
pub mod system_destruction;
pub mod terminator;

use std::sync::Arc;

use sysbatch_core::BatchResult;
use sysbatch_engine::JobRegistry;

pub use cleanup::{DeleteOldFilesTasklet, delete_old_files_job, delete_old_records_job};
pub use config::JobsConfig;
pub use inventory_report::{
    InMemoryInventoryRepository, InMemoryNotificationSender, InventoryRepository, ItemStock,
    JsonFileInventoryRepository, LogNotificationSender, NotificationSender,
    daily_inventory_report_job, format_low_stock_report,
};
pub use system_destruction::{
    DestructionLevelRejection, SystemDestructionValidator, check_destruction_level,
    system_destruction_job,
};
pub use terminator::{terminator_job, terminator_quest_job, terminator_schedule_job};

/// External services the jobs talk to.
#[derive(Clone)]
pub struct Collaborators {
    pub inventory: Arc<dyn InventoryRepository>,
    pub notifier: Arc<dyn NotificationSender>,
}

impl Default for Collaborators {
    /// Empty inventory, notifications go to the log.
    fn default() -> Self {
        Self {
            inventory: Arc::new(InMemoryInventoryRepository::default()),
            notifier: Arc::new(LogNotificationSender),
        }
    }
}

/// Register every job of this crate.
pub fn register_jobs(
    registry: &mut JobRegistry,
    config: &JobsConfig,
    collaborators: Collaborators,
) -> BatchResult<()> {
    registry.register(delete_old_files_job(config)?)?;
    registry.register(delete_old_records_job()?)?;
    registry.register(system_destruction_job()?)?;
    registry.register(terminator_job()?)?;
    registry.register(terminator_schedule_job()?)?;
    registry.register(terminator_quest_job()?)?;
    registry.register(daily_inventory_report_job(
        collaborators.inventory,
        collaborators.notifier,
        config.low_stock_threshold,
    )?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysbatch_core::BatchError;

    #[test]
    fn registers_every_job() {
        let mut registry = JobRegistry::new();
        register_jobs(&mut registry, &JobsConfig::default(), Collaborators::default()).unwrap();

        assert_eq!(
            registry.names(),
            vec![
                "daily-inventory-report",
                "delete-old-files",
                "delete-old-records",
                "system-destruction",
                "terminator",
                "terminator-quest",
                "terminator-schedule",
            ]
        );
    }

    #[test]
    fn registering_twice_conflicts() {
        let mut registry = JobRegistry::new();
        register_jobs(&mut registry, &JobsConfig::default(), Collaborators::default()).unwrap();

        let err = register_jobs(&mut registry, &JobsConfig::default(), Collaborators::default()).unwrap_err();
        assert!(matches!(err, BatchError::Conflict(_)));
    }
}
