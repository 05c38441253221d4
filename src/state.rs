use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::adapters::invoker::{HttpOperationInvoker, OperationInvoker};
use crate::adapters::object_store::{HttpObjectStore, ObjectStore};
use crate::adapters::photo_table::{HttpPhotoTable, PhotoTable};
use crate::common::{CONNECT_TIMEOUT, REQUEST_TIMEOUT};
use crate::config::ServerConfig;
use crate::orchestrators::StorageLayout;

/// Immutable adapter wiring shared by every request. Constructed once at
/// startup and never mutated; tests substitute in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub table: Arc<dyn PhotoTable>,
    pub invoker: Arc<dyn OperationInvoker>,
    pub layout: StorageLayout,
}

impl AppState {
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

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let store = HttpObjectStore::new(
            client.clone(),
            &config.object_store_endpoint,
            config.object_store_token.clone(),
        );
        let table = HttpPhotoTable::new(
            client.clone(),
            &config.row_store_endpoint,
            &config.photo_table,
            &config.db_user,
            config.db_token_secret.as_bytes(),
        );
        let invoker = HttpOperationInvoker::new(client, &config.operations_endpoint);
        let layout = StorageLayout::new(&config.original_bucket, &config.derived_bucket);

        Ok(Self::new(
            Arc::new(store),
            Arc::new(table),
            Arc::new(invoker),
            layout,
        ))
    }
}
