use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use rocket::State;
use rocket::serde::json::{self, Json};
use tokio::task::spawn_blocking;

use crate::api::{AppError, AppResult};
use crate::models::dto::{ProcessPhotoRequest, ProcessPhotoResponse};
use crate::models::{InputError, PhotoKey, PhotoMetadata};
use crate::orchestrators::resize::ResizePipeline;
use crate::state::AppState;

#[post("/process-photo", format = "json", data = "<request>")]
pub async fn process_photo(
    state: &State<AppState>,
    request: Result<Json<ProcessPhotoRequest>, json::Error<'_>>,
) -> AppResult<Json<ProcessPhotoResponse>> {
    let request = request
        .map_err(|err| AppError::bad_request(anyhow!("invalid request body: {err}")))?
        .into_inner();

    let key = PhotoKey::parse(&request.key).map_err(AppError::bad_request)?;
    let bytes = BASE64_STANDARD
        .decode(request.content.as_bytes())
        .map_err(|err| AppError::bad_request(InputError::InvalidContent(err.to_string())))?;
    let metadata = PhotoMetadata {
        email: request.email,
        description: request.description,
    };

    let pipeline = ResizePipeline::new(
        state.store.clone(),
        state.table.clone(),
        state.invoker.clone(),
        state.layout.clone(),
    );
    let result = spawn_blocking({
        let key = key.clone();
        move || pipeline.process(&key, &bytes, &metadata)
    })
    .await?
    .map_err(AppError::bad_request)?;

    if let Some((stage, outcome)) = result.first_failure() {
        return Err(AppError::internal(anyhow!(
            "stage '{stage}' failed: {}",
            outcome.message()
        )));
    }

    Ok(Json(ProcessPhotoResponse {
        message: "Photo processed successfully".to_owned(),
        original_key: key.as_str().to_owned(),
        thumbnail_key: key.derived(),
        original_bucket: state.layout.original_bucket.clone(),
        thumbnail_bucket: state.layout.derived_bucket.clone(),
    }))
}

#[options("/process-photo")]
pub fn process_photo_preflight() {}
