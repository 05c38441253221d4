use std::sync::Arc;

use log::{info, warn};

use super::{AggregatePolicy, AggregateResult, StepOutcome, StorageLayout};
use crate::adapters::object_store::{DeleteDisposition, ObjectLocation, ObjectStore};
use crate::adapters::photo_table::PhotoTable;
use crate::models::PhotoKey;

pub const STEP_DB: &str = "db";
pub const STEP_STORAGE_ORIGINAL: &str = "storage-original";
pub const STEP_STORAGE_DERIVED: &str = "storage-derived";

/// Best-effort removal of a photo: the database row and both storage
/// copies, in a fixed order but with no data dependency between steps.
/// Every step runs regardless of earlier failures; the caller surfaces
/// the per-step flags instead of failing the request. A half-finished
/// delete is preferable to a stuck record.
pub struct DeleteOrchestrator {
    store: Arc<dyn ObjectStore>,
    table: Arc<dyn PhotoTable>,
    layout: StorageLayout,
}

impl DeleteOrchestrator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        table: Arc<dyn PhotoTable>,
        layout: StorageLayout,
    ) -> Self {
        Self {
            store,
            table,
            layout,
        }
    }

    pub fn delete(&self, key: &PhotoKey) -> AggregateResult {
        info!("Delete orchestrator started for key '{key}'");

        let mut result = AggregateResult::new(AggregatePolicy::Advisory);
        result.record(STEP_DB, self.delete_row(key));
        result.record(
            STEP_STORAGE_ORIGINAL,
            self.delete_object(self.layout.original_location(key)),
        );
        result.record(
            STEP_STORAGE_DERIVED,
            self.delete_object(self.layout.derived_location(key)),
        );
        result
    }

    fn delete_row(&self, key: &PhotoKey) -> StepOutcome {
        match self.table.delete_by_key(key.as_str()) {
            Ok(rows) => {
                info!("Deleted {rows} row(s) for key '{key}'");
                StepOutcome::succeeded_with_count(rows)
            }
            Err(err) => {
                warn!("Database delete failed for key '{key}': {err}");
                StepOutcome::failed(err.to_string())
            }
        }
    }

    fn delete_object(&self, location: ObjectLocation) -> StepOutcome {
        match self.store.delete(&location) {
            Ok(DeleteDisposition::Deleted) => StepOutcome::succeeded(format!("Deleted {location}")),
            // Deleting something already absent satisfies the caller's intent.
            Ok(DeleteDisposition::AlreadyAbsent) => {
                StepOutcome::succeeded(format!("{location} did not exist (already deleted)"))
            }
            Err(err) => {
                warn!("Storage delete failed for {location}: {err}");
                StepOutcome::failed(err.to_string())
            }
        }
    }
}
