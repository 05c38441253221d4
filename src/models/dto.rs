//! Wire shapes for every endpoint. Building responses from these types
//! guarantees valid, escaped JSON on every exit path.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePhotoRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePhotoResponse {
    pub success: bool,
    pub key: String,
    pub db_success: bool,
    pub db_deleted_rows: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_error: Option<String>,
    pub s3_original_success: bool,
    pub s3_original_message: String,
    pub s3_resized_success: bool,
    pub s3_resized_message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPhotoRequest {
    pub key: String,
    /// Base64-encoded image payload.
    pub content: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPhotoResponse {
    pub message: String,
    pub original_key: String,
    pub thumbnail_key: String,
    pub original_bucket: String,
    pub thumbnail_bucket: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadObjectRequest {
    pub content: String,
    pub key: String,
    pub bucket: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadObjectResponse {
    pub message: String,
    pub key: String,
    pub bucket: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectRequest {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeImageRequest {
    pub src_bucket: String,
    pub src_key: String,
    pub dst_bucket: String,
    pub dst_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeImageResponse {
    pub message: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordResponse {
    pub rows_affected: u64,
}

/// One listed object, size reported in KiB.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}
