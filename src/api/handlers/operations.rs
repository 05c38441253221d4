//! Leaf operation handlers: each performs exactly one remote operation
//! (plus its metadata row, for uploads). The resize pipeline's child
//! invocations land here when the operations endpoint points at this
//! server.

use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use log::info;
use rocket::State;
use rocket::serde::json::{self, Json};
use tokio::task::spawn_blocking;

use crate::adapters::AdapterError;
use crate::adapters::object_store::{DeleteDisposition, ObjectLocation};
use crate::api::{AppError, AppResult};
use crate::common::content_type_for_extension;
use crate::models::dto::{
    DeleteObjectRequest, DeleteObjectResponse, DeleteRecordRequest, DeleteRecordResponse,
    ResizeImageRequest, ResizeImageResponse, UploadObjectRequest, UploadObjectResponse,
};
use crate::models::{InputError, PhotoKey, PhotoMetadata};
use crate::processing;
use crate::state::AppState;

fn parse_body<T>(request: Result<Json<T>, json::Error<'_>>) -> Result<T, AppError> {
    request
        .map(Json::into_inner)
        .map_err(|err| AppError::bad_request(anyhow!("invalid request body: {err}")))
}

#[post("/ops/upload-object", format = "json", data = "<request>")]
pub async fn upload_object(
    state: &State<AppState>,
    request: Result<Json<UploadObjectRequest>, json::Error<'_>>,
) -> AppResult<Json<UploadObjectResponse>> {
    let request = parse_body(request)?;
    let key = PhotoKey::parse(&request.key).map_err(AppError::bad_request)?;
    let bytes = BASE64_STANDARD
        .decode(request.content.as_bytes())
        .map_err(|err| AppError::bad_request(InputError::InvalidContent(err.to_string())))?;

    let location = ObjectLocation::new(&request.bucket, key.as_str());
    let content_type = content_type_for_extension(&key.extension());
    let metadata = PhotoMetadata {
        email: request.email,
        description: request.description,
    };

    info!("Uploading object {location}");
    let store = state.store.clone();
    let table = state.table.clone();
    spawn_blocking({
        let location = location.clone();
        let key = key.clone();
        move || -> Result<(), AdapterError> {
            store.put(&location, &bytes, content_type)?;
            table.insert_record(key.as_str(), &metadata)?;
            Ok(())
        }
    })
    .await??;

    Ok(Json(UploadObjectResponse {
        message: format!("Stored '{}' in '{}'", key, request.bucket),
        key: key.as_str().to_owned(),
        bucket: request.bucket,
    }))
}

#[post("/ops/delete-object", format = "json", data = "<request>")]
pub async fn delete_object(
    state: &State<AppState>,
    request: Result<Json<DeleteObjectRequest>, json::Error<'_>>,
) -> AppResult<Json<DeleteObjectResponse>> {
    let request = parse_body(request)?;
    let key = PhotoKey::parse(&request.key).map_err(AppError::bad_request)?;
    let location = ObjectLocation::new(&request.bucket, key.as_str());

    info!("Deleting object {location}");
    let store = state.store.clone();
    let message = spawn_blocking(move || -> Result<String, AdapterError> {
        Ok(match store.delete(&location)? {
            DeleteDisposition::Deleted => format!("Deleted {location}"),
            DeleteDisposition::AlreadyAbsent => {
                format!("{location} did not exist (already deleted)")
            }
        })
    })
    .await??;

    Ok(Json(DeleteObjectResponse {
        success: true,
        message,
    }))
}

#[post("/ops/resize-image", format = "json", data = "<request>")]
pub async fn resize_image(
    state: &State<AppState>,
    request: Result<Json<ResizeImageRequest>, json::Error<'_>>,
) -> AppResult<Json<ResizeImageResponse>> {
    let request = parse_body(request)?;
    let source = ObjectLocation::new(&request.src_bucket, &request.src_key);
    let destination = ObjectLocation::new(&request.dst_bucket, &request.dst_key);

    info!("Resizing {source} into {destination}");
    let store = state.store.clone();
    let thumbnail = spawn_blocking(move || -> anyhow::Result<processing::RenderedThumbnail> {
        let bytes = store.get(&source)?;
        let thumbnail = processing::render_thumbnail(&bytes)?;
        store.put(&destination, &thumbnail.bytes, "image/jpeg")?;
        Ok(thumbnail)
    })
    .await??;

    Ok(Json(ResizeImageResponse {
        message: "Resize completed".to_owned(),
        width: thumbnail.width,
        height: thumbnail.height,
    }))
}

#[post("/ops/delete-record", format = "json", data = "<request>")]
pub async fn delete_record(
    state: &State<AppState>,
    request: Result<Json<DeleteRecordRequest>, json::Error<'_>>,
) -> AppResult<Json<DeleteRecordResponse>> {
    let request = parse_body(request)?;
    let key = PhotoKey::parse(&request.key).map_err(AppError::bad_request)?;

    info!("Deleting record for key '{key}'");
    let table = state.table.clone();
    let rows_affected =
        spawn_blocking(move || table.delete_by_key(key.as_str())).await??;

    Ok(Json(DeleteRecordResponse { rows_affected }))
}

#[options("/ops/<_..>")]
pub fn operations_preflight() {}
