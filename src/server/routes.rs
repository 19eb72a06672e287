use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;

use crate::Error;
use crate::person::{Person, PersonDraft};
use crate::server::AppState;

/// Error body shape: human-readable message plus the underlying cause
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub message: String,
    #[serde(rename = "importedCount")]
    pub imported_count: usize,
}

fn error_response(message: &str, err: &Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        Error::Duplicate(_) => StatusCode::CONFLICT,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
            error: err.to_string(),
        }),
    )
}

pub async fn list_people(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Person>>, (StatusCode, Json<ErrorResponse>)> {
    let store = state.store.lock().await;
    let people = store
        .list()
        .map_err(|e| error_response("failed to list people", &e))?;
    Ok(Json(people))
}

pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<PersonDraft>,
) -> Result<(StatusCode, Json<Person>), (StatusCode, Json<ErrorResponse>)> {
    let store = state.store.lock().await;
    let person = store
        .create(&draft)
        .map_err(|e| error_response("failed to create person", &e))?;
    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(draft): Json<PersonDraft>,
) -> Result<Json<Person>, (StatusCode, Json<ErrorResponse>)> {
    let store = state.store.lock().await;
    let person = store
        .update(id, &draft)
        .map_err(|e| error_response("failed to update person", &e))?;
    Ok(Json(person))
}

pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let store = state.store.lock().await;
    store
        .delete(id)
        .map_err(|e| error_response("failed to delete person", &e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn import_people(
    State(state): State<Arc<AppState>>,
    Json(candidates): Json<Vec<PersonDraft>>,
) -> Result<(StatusCode, Json<ImportResponse>), (StatusCode, Json<ErrorResponse>)> {
    let mut store = state.store.lock().await;
    let imported = store
        .import_batch(&candidates)
        .map_err(|e| error_response("batch import was rolled back", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            message: format!(
                "imported {} of {} candidates",
                imported,
                candidates.len()
            ),
            imported_count: imported,
        }),
    ))
}
