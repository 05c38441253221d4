use serde::Deserialize;
use std::sync::LazyLock;

/// Process configuration, read once from `GARRULAX_`-prefixed environment
/// variables. Every field has a default so the server boots bare.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_object_store_endpoint")]
    pub object_store_endpoint: String,
    #[serde(default)]
    pub object_store_token: Option<String>,
    #[serde(default = "default_original_bucket")]
    pub original_bucket: String,
    #[serde(default = "default_derived_bucket")]
    pub derived_bucket: String,
    #[serde(default = "default_row_store_endpoint")]
    pub row_store_endpoint: String,
    #[serde(default = "default_photo_table")]
    pub photo_table: String,
    #[serde(default = "default_db_user")]
    pub db_user: String,
    #[serde(default = "default_db_token_secret")]
    pub db_token_secret: String,
    #[serde(default = "default_operations_endpoint")]
    pub operations_endpoint: String,
}

fn default_object_store_endpoint() -> String {
    "http://127.0.0.1:9000".to_owned()
}

fn default_original_bucket() -> String {
    "photos-original".to_owned()
}

fn default_derived_bucket() -> String {
    "photos-resized".to_owned()
}

fn default_row_store_endpoint() -> String {
    "http://127.0.0.1:8112".to_owned()
}

fn default_photo_table() -> String {
    "Photos".to_owned()
}

fn default_db_user() -> String {
    "photos".to_owned()
}

fn default_db_token_secret() -> String {
    "insecure-dev-secret".to_owned()
}

fn default_operations_endpoint() -> String {
    "http://127.0.0.1:8000".to_owned()
}

pub static SERVER_CONFIG: LazyLock<ServerConfig> = LazyLock::new(|| {
    envy::prefixed("GARRULAX_")
        .from_env()
        .expect("Failed to read server configuration from environment")
});
