//! In-memory adapter doubles for driving the full Rocket application.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use garrulax::adapters::AdapterError;
use garrulax::adapters::invoker::OperationInvoker;
use garrulax::adapters::object_store::{
    DeleteDisposition, ObjectLocation, ObjectStore, StoredObject,
};
use garrulax::adapters::photo_table::PhotoTable;
use garrulax::models::PhotoMetadata;
use garrulax::processing;

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    pub puts: AtomicUsize,
    pub gets: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_puts: AtomicBool,
}

impl MemoryObjectStore {
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(
        &self,
        location: &ObjectLocation,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), AdapterError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AdapterError::Remote("object store unavailable".into()));
        }
        self.objects.lock().unwrap().insert(
            (location.bucket.clone(), location.key.clone()),
            bytes.to_vec(),
        );
        Ok(())
    }

    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, AdapterError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .get(&(location.bucket.clone(), location.key.clone()))
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(location.to_string()))
    }

    fn delete(&self, location: &ObjectLocation) -> Result<DeleteDisposition, AdapterError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let removed = self
            .objects
            .lock()
            .unwrap()
            .remove(&(location.bucket.clone(), location.key.clone()));
        Ok(match removed {
            Some(_) => DeleteDisposition::Deleted,
            None => DeleteDisposition::AlreadyAbsent,
        })
    }

    fn list(&self, bucket: &str) -> Result<Vec<StoredObject>, AdapterError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((object_bucket, _), _)| object_bucket == bucket)
            .map(|((_, key), bytes)| StoredObject {
                key: key.clone(),
                size: bytes.len() as u64,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryPhotoTable {
    rows: Mutex<HashMap<String, PhotoMetadata>>,
    pub delete_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
}

impl MemoryPhotoTable {
    pub fn insert_count(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

impl PhotoTable for MemoryPhotoTable {
    fn delete_by_key(&self, key: &str) -> Result<u64, AdapterError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().remove(key).map(|_| 1).unwrap_or(0))
    }

    fn insert_record(&self, key: &str, metadata: &PhotoMetadata) -> Result<(), AdapterError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .insert(key.to_owned(), metadata.clone());
        Ok(())
    }
}

/// Runs the resize operation in-process against the shared object store,
/// the way the deployed operations endpoint would.
pub struct LocalResizeInvoker {
    store: Arc<MemoryObjectStore>,
    pub calls: AtomicUsize,
}

impl LocalResizeInvoker {
    pub fn new(store: Arc<MemoryObjectStore>) -> Self {
        Self {
            store,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn location(payload: &Value, bucket_field: &str, key_field: &str) -> ObjectLocation {
        ObjectLocation::new(
            payload[bucket_field].as_str().unwrap_or_default(),
            payload[key_field].as_str().unwrap_or_default(),
        )
    }
}

impl OperationInvoker for LocalResizeInvoker {
    fn invoke(&self, operation: &str, payload: Value) -> Result<Value, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if operation != "resize-image" {
            return Err(AdapterError::Remote(format!(
                "unknown operation '{operation}'"
            )));
        }

        let source = Self::location(&payload, "srcBucket", "srcKey");
        let destination = Self::location(&payload, "dstBucket", "dstKey");

        let bytes = self.store.get(&source)?;
        let thumbnail = processing::render_thumbnail(&bytes)
            .map_err(|err| AdapterError::Remote(err.to_string()))?;
        self.store.put(&destination, &thumbnail.bytes, "image/jpeg")?;

        Ok(serde_json::json!({ "message": "Resize completed" }))
    }
}
