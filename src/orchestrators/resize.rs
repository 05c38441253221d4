use std::sync::Arc;

use log::{info, warn};
use serde_json::json;

use super::{AggregatePolicy, AggregateResult, CompensatingAction, StepOutcome, StorageLayout};
use crate::adapters::invoker::OperationInvoker;
use crate::adapters::object_store::ObjectStore;
use crate::adapters::photo_table::PhotoTable;
use crate::common::content_type_for_extension;
use crate::models::{InputError, PhotoKey, PhotoMetadata};

pub const STAGE_STORE_ORIGINAL: &str = "store-original";
pub const STAGE_DERIVE_THUMBNAIL: &str = "derive-thumbnail";

/// Name of the child operation that fetches, resamples, and stores the
/// thumbnail. Its internal sub-steps are invisible to this pipeline.
pub const RESIZE_OPERATION: &str = "resize-image";

/// Strictly ordered two-stage pipeline: persist the uploaded original
/// (object plus metadata row), then derive and persist its thumbnail.
/// The first failed stage halts the pipeline; the later stage is
/// recorded as skipped. No compensation runs on abort.
pub struct ResizePipeline {
    store: Arc<dyn ObjectStore>,
    table: Arc<dyn PhotoTable>,
    invoker: Arc<dyn OperationInvoker>,
    layout: StorageLayout,
}

impl ResizePipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        table: Arc<dyn PhotoTable>,
        invoker: Arc<dyn OperationInvoker>,
        layout: StorageLayout,
    ) -> Self {
        Self {
            store,
            table,
            invoker,
            layout,
        }
    }

    pub fn process(
        &self,
        key: &PhotoKey,
        bytes: &[u8],
        metadata: &PhotoMetadata,
    ) -> Result<AggregateResult, InputError> {
        if !key.is_image() {
            return Err(InputError::NotAnImage(key.as_str().to_owned()));
        }

        info!(
            "Resize pipeline started for key '{key}' ({} bytes)",
            bytes.len()
        );

        let mut result = AggregateResult::new(AggregatePolicy::FailFast);

        let store_outcome = self.store_original(key, bytes, metadata);
        let stored = store_outcome.is_success();
        result.record(STAGE_STORE_ORIGINAL, store_outcome);
        if !stored {
            result.record(STAGE_DERIVE_THUMBNAIL, StepOutcome::skipped());
            return Ok(result);
        }

        result.record(STAGE_DERIVE_THUMBNAIL, self.derive_thumbnail(key));
        Ok(result)
    }

    fn store_original(&self, key: &PhotoKey, bytes: &[u8], metadata: &PhotoMetadata) -> StepOutcome {
        let location = self.layout.original_location(key);
        let content_type = content_type_for_extension(&key.extension());

        if let Err(err) = self.store.put(&location, bytes, content_type) {
            warn!("Failed to store original {location}: {err}");
            return StepOutcome::failed(format!("failed to store original: {err}"));
        }
        if let Err(err) = self.table.insert_record(key.as_str(), metadata) {
            warn!("Failed to record metadata for '{key}': {err}");
            return StepOutcome::failed(format!("failed to record photo metadata: {err}"));
        }

        StepOutcome::succeeded(format!("Stored original at {location}")).with_compensation(
            CompensatingAction::RemoveUpload {
                location,
                key: key.as_str().to_owned(),
            },
        )
    }

    fn derive_thumbnail(&self, key: &PhotoKey) -> StepOutcome {
        let source = self.layout.original_location(key);
        let destination = self.layout.derived_location(key);
        let payload = json!({
            "srcBucket": source.bucket,
            "srcKey": source.key,
            "dstBucket": destination.bucket,
            "dstKey": destination.key,
        });

        match self.invoker.invoke(RESIZE_OPERATION, payload) {
            Ok(_) => StepOutcome::succeeded(format!("Stored thumbnail at {destination}"))
                .with_compensation(CompensatingAction::RemoveObject(destination)),
            Err(err) => {
                warn!("Thumbnail derivation failed for '{key}': {err}");
                StepOutcome::failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Value;

    use super::*;
    use crate::adapters::AdapterError;
    use crate::adapters::object_store::{DeleteDisposition, ObjectLocation, StoredObject};
    use crate::orchestrators::StepStatus;

    #[derive(Default)]
    struct RecordingStore {
        puts: AtomicUsize,
        fail_puts: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                puts: AtomicUsize::new(0),
                fail_puts: true,
            }
        }
    }

    impl ObjectStore for RecordingStore {
        fn put(&self, _: &ObjectLocation, _: &[u8], _: &str) -> Result<(), AdapterError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if self.fail_puts {
                Err(AdapterError::Remote("object store unavailable".into()))
            } else {
                Ok(())
            }
        }

        fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, AdapterError> {
            Err(AdapterError::NotFound(location.to_string()))
        }

        fn delete(&self, _: &ObjectLocation) -> Result<DeleteDisposition, AdapterError> {
            Ok(DeleteDisposition::AlreadyAbsent)
        }

        fn list(&self, _: &str) -> Result<Vec<StoredObject>, AdapterError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingTable {
        inserts: AtomicUsize,
        fail_inserts: bool,
    }

    impl RecordingTable {
        fn failing() -> Self {
            Self {
                inserts: AtomicUsize::new(0),
                fail_inserts: true,
            }
        }
    }

    impl PhotoTable for RecordingTable {
        fn delete_by_key(&self, _: &str) -> Result<u64, AdapterError> {
            Ok(0)
        }

        fn insert_record(&self, _: &str, _: &PhotoMetadata) -> Result<(), AdapterError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.fail_inserts {
                Err(AdapterError::Remote("row store unavailable".into()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingInvoker {
        calls: AtomicUsize,
    }

    impl OperationInvoker for RecordingInvoker {
        fn invoke(&self, _: &str, _: Value) -> Result<Value, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({ "message": "Resize completed" }))
        }
    }

    fn pipeline(
        store: Arc<RecordingStore>,
        table: Arc<RecordingTable>,
        invoker: Arc<RecordingInvoker>,
    ) -> ResizePipeline {
        ResizePipeline::new(
            store,
            table,
            invoker,
            StorageLayout::new("originals", "thumbnails"),
        )
    }

    #[test]
    fn rejected_extension_makes_no_remote_calls() {
        let store = Arc::new(RecordingStore::default());
        let table = Arc::new(RecordingTable::default());
        let invoker = Arc::new(RecordingInvoker::default());
        let pipeline = pipeline(store.clone(), table.clone(), invoker.clone());

        let key = PhotoKey::parse("document.pdf").unwrap();
        let result = pipeline.process(&key, b"not an image", &PhotoMetadata::default());

        assert!(matches!(result, Err(InputError::NotAnImage(_))));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
        assert_eq!(table.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn store_failure_skips_derive_stage() {
        let store = Arc::new(RecordingStore::failing());
        let table = Arc::new(RecordingTable::default());
        let invoker = Arc::new(RecordingInvoker::default());
        let pipeline = pipeline(store, table, invoker.clone());

        let key = PhotoKey::parse("photo.jpg").unwrap();
        let result = pipeline
            .process(&key, b"bytes", &PhotoMetadata::default())
            .unwrap();

        assert!(!result.succeeded());
        let (stage, outcome) = result.first_failure().unwrap();
        assert_eq!(stage, STAGE_STORE_ORIGINAL);
        assert!(outcome.error.as_deref().unwrap().contains("store original"));
        assert_eq!(
            result.step(STAGE_DERIVE_THUMBNAIL).unwrap().status,
            StepStatus::Skipped
        );
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn metadata_failure_fails_the_store_stage() {
        let store = Arc::new(RecordingStore::default());
        let table = Arc::new(RecordingTable::failing());
        let invoker = Arc::new(RecordingInvoker::default());
        let pipeline = pipeline(store, table, invoker.clone());

        let key = PhotoKey::parse("photo.jpg").unwrap();
        let result = pipeline
            .process(&key, b"bytes", &PhotoMetadata::default())
            .unwrap();

        let (stage, _) = result.first_failure().unwrap();
        assert_eq!(stage, STAGE_STORE_ORIGINAL);
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn successful_stages_record_compensations() {
        let store = Arc::new(RecordingStore::default());
        let table = Arc::new(RecordingTable::default());
        let invoker = Arc::new(RecordingInvoker::default());
        let pipeline = pipeline(store, table, invoker.clone());

        let key = PhotoKey::parse("photo.jpg").unwrap();
        let result = pipeline
            .process(&key, b"bytes", &PhotoMetadata::default())
            .unwrap();

        assert!(result.succeeded());
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);

        let stored = result.step(STAGE_STORE_ORIGINAL).unwrap();
        assert!(matches!(
            stored.compensation,
            Some(CompensatingAction::RemoveUpload { .. })
        ));
        let derived = result.step(STAGE_DERIVE_THUMBNAIL).unwrap();
        match &derived.compensation {
            Some(CompensatingAction::RemoveObject(location)) => {
                assert_eq!(location.key, "resized-photo.jpg");
            }
            other => panic!("unexpected compensation: {other:?}"),
        }
    }
}
