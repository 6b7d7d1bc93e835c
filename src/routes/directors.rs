use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::AppResult,
    models::{Director, DirectorDraft, DirectorId},
};

#[derive(Debug, Deserialize)]
pub struct UpdateDirectorRequest {
    pub id: DirectorId,
    pub name: String,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Director>>> {
    Ok(Json(state.catalog.list_directors().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<DirectorDraft>,
) -> AppResult<(StatusCode, Json<Director>)> {
    let director = state.catalog.create_director(draft).await?;
    Ok((StatusCode::CREATED, Json(director)))
}

pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateDirectorRequest>,
) -> AppResult<Json<Director>> {
    let draft = DirectorDraft { name: request.name };
    Ok(Json(state.catalog.update_director(request.id, draft).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DirectorId>,
) -> AppResult<Json<Director>> {
    Ok(Json(state.catalog.get_director(id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DirectorId>,
) -> AppResult<StatusCode> {
    state.catalog.delete_director(id).await?;
    Ok(StatusCode::OK)
}
