use rocket::State;
use rocket::serde::json::Json;
use tokio::task::spawn_blocking;

use crate::api::AppResult;
use crate::models::dto::ObjectEntry;
use crate::state::AppState;

#[get("/photos")]
pub async fn list_photos(state: &State<AppState>) -> AppResult<Json<Vec<ObjectEntry>>> {
    let store = state.store.clone();
    let bucket = state.layout.original_bucket.clone();
    let objects = spawn_blocking(move || store.list(&bucket)).await??;

    let entries = objects
        .into_iter()
        .map(|object| ObjectEntry {
            key: object.key,
            size: object.size / 1024,
        })
        .collect();
    Ok(Json(entries))
}

#[options("/photos")]
pub fn list_photos_preflight() {}
