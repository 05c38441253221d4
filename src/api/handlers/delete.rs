use anyhow::anyhow;
use rocket::State;
use rocket::serde::json::{self, Json};
use tokio::task::spawn_blocking;

use crate::api::{AppError, AppResult};
use crate::models::PhotoKey;
use crate::models::dto::{DeletePhotoRequest, DeletePhotoResponse};
use crate::orchestrators::StepOutcome;
use crate::orchestrators::delete::{
    DeleteOrchestrator, STEP_DB, STEP_STORAGE_DERIVED, STEP_STORAGE_ORIGINAL,
};
use crate::state::AppState;

#[post("/delete-photo", format = "json", data = "<request>")]
pub async fn delete_photo(
    state: &State<AppState>,
    request: Result<Json<DeletePhotoRequest>, json::Error<'_>>,
) -> AppResult<Json<DeletePhotoResponse>> {
    let request =
        request.map_err(|err| AppError::bad_request(anyhow!("invalid request body: {err}")))?;
    let key = PhotoKey::parse(&request.key).map_err(AppError::bad_request)?;

    let orchestrator = DeleteOrchestrator::new(
        state.store.clone(),
        state.table.clone(),
        state.layout.clone(),
    );
    let result = spawn_blocking({
        let key = key.clone();
        move || orchestrator.delete(&key)
    })
    .await?;

    let step = |name: &str| {
        result
            .step(name)
            .cloned()
            .unwrap_or_else(StepOutcome::skipped)
    };
    let db = step(STEP_DB);
    let original = step(STEP_STORAGE_ORIGINAL);
    let derived = step(STEP_STORAGE_DERIVED);

    Ok(Json(DeletePhotoResponse {
        success: result.succeeded(),
        key: key.as_str().to_owned(),
        db_success: db.is_success(),
        db_deleted_rows: db.count.unwrap_or(0),
        db_error: db.error.clone(),
        s3_original_success: original.is_success(),
        s3_original_message: original.message(),
        s3_resized_success: derived.is_success(),
        s3_resized_message: derived.message(),
    }))
}

#[options("/delete-photo")]
pub fn delete_photo_preflight() {}
