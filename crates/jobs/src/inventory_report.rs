//! `daily-inventory-report`: notify about items running low on stock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use sysbatch_core::{BatchError, BatchResult};
use sysbatch_engine::{Job, JobBuilder, RepeatStatus, StepBuilder, StepContext, Tasklet};

pub const DAILY_INVENTORY_REPORT_JOB: &str = "daily-inventory-report";
pub const DAILY_INVENTORY_REPORT_STEP: &str = "daily-inventory-report-step";

pub const LOW_STOCK_REPORT_HEADER: &str = "[Low stock alert] The following items are running low:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStock {
    pub item_name: String,
    pub stock: i64,
}

impl ItemStock {
    pub fn new(item_name: impl Into<String>, stock: i64) -> Self {
        Self {
            item_name: item_name.into(),
            stock,
        }
    }
}

/// Source of stock levels.
pub trait InventoryRepository: Send + Sync {
    /// Items whose stock is at or below `threshold`.
    fn find_low_stock_items(&self, threshold: i64) -> BatchResult<Vec<ItemStock>>;
}

/// Channel a finished report is delivered through.
pub trait NotificationSender: Send + Sync {
    fn send(&self, message: &str) -> BatchResult<()>;
}

fn at_or_below(items: &[ItemStock], threshold: i64) -> Vec<ItemStock> {
    items
        .iter()
        .filter(|item| item.stock <= threshold)
        .cloned()
        .collect()
}

/// Fixed item list, for tests and dev.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryRepository {
    items: Vec<ItemStock>,
}

impl InMemoryInventoryRepository {
    pub fn new(items: Vec<ItemStock>) -> Self {
        Self { items }
    }
}

impl InventoryRepository for InMemoryInventoryRepository {
    fn find_low_stock_items(&self, threshold: i64) -> BatchResult<Vec<ItemStock>> {
        Ok(at_or_below(&self.items, threshold))
    }
}

/// Reads a JSON array of `{ "item_name", "stock" }` on every query.
#[derive(Debug, Clone)]
pub struct JsonFileInventoryRepository {
    path: PathBuf,
}

impl JsonFileInventoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BatchResult<Vec<ItemStock>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            BatchError::collaborator(format!("cannot read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            BatchError::collaborator(format!("cannot parse {}: {e}", self.path.display()))
        })
    }
}

impl InventoryRepository for JsonFileInventoryRepository {
    fn find_low_stock_items(&self, threshold: i64) -> BatchResult<Vec<ItemStock>> {
        Ok(at_or_below(&self.load()?, threshold))
    }
}

/// Keeps every message, for tests and dev.
#[derive(Debug, Default)]
pub struct InMemoryNotificationSender {
    inner: Mutex<Vec<String>>,
}

impl InMemoryNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSender for InMemoryNotificationSender {
    fn send(&self, message: &str) -> BatchResult<()> {
        self.inner
            .lock()
            .map_err(|_| BatchError::collaborator("notification buffer poisoned"))?
            .push(message.to_string());
        Ok(())
    }
}

/// Delivers notifications as log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSender;

impl NotificationSender for LogNotificationSender {
    fn send(&self, message: &str) -> BatchResult<()> {
        info!(target: "sysbatch::notification", %message, "notification sent");
        Ok(())
    }
}

/// Render the low-stock report, or `None` when there is nothing to report.
pub fn format_low_stock_report(items: &[ItemStock]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let mut report = String::from(LOW_STOCK_REPORT_HEADER);
    report.push('\n');
    for item in items {
        report.push_str(&format!("- {}: {} in stock\n", item.item_name, item.stock));
    }
    Some(report)
}

pub struct InventoryReportTasklet {
    inventory: Arc<dyn InventoryRepository>,
    notifier: Arc<dyn NotificationSender>,
    threshold: i64,
}

impl InventoryReportTasklet {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        notifier: Arc<dyn NotificationSender>,
        threshold: i64,
    ) -> Self {
        Self {
            inventory,
            notifier,
            threshold,
        }
    }
}

impl Tasklet for InventoryReportTasklet {
    fn execute(&self, ctx: &mut StepContext<'_>) -> BatchResult<RepeatStatus> {
        let items = self.inventory.find_low_stock_items(self.threshold)?;
        ctx.contribution.increment_read_count(items.len() as u64);
        ctx.put("threshold", json!(self.threshold));
        ctx.put("low_stock_items", json!(items));

        match format_low_stock_report(&items) {
            None => {
                info!(threshold = self.threshold, "all items stable");
                ctx.put("notified", json!(false));
            }
            Some(report) => {
                warn!(
                    threshold = self.threshold,
                    low_stock_items = items.len(),
                    "low stock detected"
                );
                self.notifier.send(&report)?;
                ctx.contribution.increment_write_count(1);
                ctx.put("notified", json!(true));
            }
        }
        Ok(RepeatStatus::Finished)
    }
}

pub fn daily_inventory_report_job(
    inventory: Arc<dyn InventoryRepository>,
    notifier: Arc<dyn NotificationSender>,
    threshold: i64,
) -> BatchResult<Job> {
    let step = StepBuilder::new(DAILY_INVENTORY_REPORT_STEP)
        .tasklet(InventoryReportTasklet::new(inventory, notifier, threshold))
        .build()?;

    JobBuilder::new(DAILY_INVENTORY_REPORT_JOB).start(step).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use sysbatch_engine::{BatchStatus, JobParameters, run_job};
    use tempfile::NamedTempFile;

    struct BrokenInventory;

    impl InventoryRepository for BrokenInventory {
        fn find_low_stock_items(&self, _threshold: i64) -> BatchResult<Vec<ItemStock>> {
            Err(BatchError::collaborator("database unreachable"))
        }
    }

    fn stock() -> Vec<ItemStock> {
        vec![
            ItemStock::new("bolts", 3),
            ItemStock::new("nuts", 10),
            ItemStock::new("washers", 11),
        ]
    }

    #[test]
    fn report_lists_each_item_on_its_own_line() {
        let report = format_low_stock_report(&[ItemStock::new("bolts", 3), ItemStock::new("nuts", 10)]).unwrap();
        assert_eq!(
            report,
            format!("{LOW_STOCK_REPORT_HEADER}\n- bolts: 3 in stock\n- nuts: 10 in stock\n")
        );
        assert_eq!(format_low_stock_report(&[]), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let repo = InMemoryInventoryRepository::new(stock());
        let names: Vec<String> = repo
            .find_low_stock_items(10)
            .unwrap()
            .into_iter()
            .map(|i| i.item_name)
            .collect();
        assert_eq!(names, vec!["bolts", "nuts"]);
    }

    #[test]
    fn job_sends_one_report() {
        let notifier = Arc::new(InMemoryNotificationSender::new());
        let job = daily_inventory_report_job(
            Arc::new(InMemoryInventoryRepository::new(stock())),
            notifier.clone(),
            10,
        )
        .unwrap();

        let execution = run_job(&job, JobParameters::new()).unwrap();

        assert_eq!(execution.status, BatchStatus::Completed);
        let sent = notifier.all();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("- bolts: 3 in stock"));
        assert!(!sent[0].contains("washers"));
    }

    #[test]
    fn nothing_low_sends_nothing() {
        let notifier = Arc::new(InMemoryNotificationSender::new());
        let job = daily_inventory_report_job(
            Arc::new(InMemoryInventoryRepository::new(stock())),
            notifier.clone(),
            0,
        )
        .unwrap();

        let execution = run_job(&job, JobParameters::new()).unwrap();

        assert_eq!(execution.status, BatchStatus::Completed);
        assert!(notifier.all().is_empty());
        let step = execution.step(DAILY_INVENTORY_REPORT_STEP).unwrap();
        assert_eq!(step.execution_context["notified"], json!(false));
    }

    #[test]
    fn repository_failure_fails_the_job() {
        let job = daily_inventory_report_job(
            Arc::new(BrokenInventory),
            Arc::new(LogNotificationSender),
            10,
        )
        .unwrap();

        let execution = run_job(&job, JobParameters::new()).unwrap();

        assert_eq!(execution.status, BatchStatus::Failed);
        assert!(execution.failure.unwrap().contains("database unreachable"));
    }

    #[test]
    fn json_file_repository_reads_items() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"item_name":"gears","stock":2}},{{"item_name":"belts","stock":40}}]"#).unwrap();

        let repo = JsonFileInventoryRepository::new(file.path());
        assert_eq!(repo.find_low_stock_items(10).unwrap(), vec![ItemStock::new("gears", 2)]);
    }

    #[test]
    fn malformed_inventory_file_is_a_collaborator_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = JsonFileInventoryRepository::new(file.path())
            .find_low_stock_items(10)
            .unwrap_err();
        assert!(matches!(err, BatchError::Collaborator(_)));
    }
}
