use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::{
    error::AppResult,
    models::{Genre, GenreId, RatingClassification, RatingId},
};

pub async fn genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.reference.list_genres().await?))
}

pub async fn genre(State(state): State<AppState>, Path(id): Path<GenreId>) -> AppResult<Json<Genre>> {
    Ok(Json(state.reference.get_genre(id).await?))
}

pub async fn ratings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RatingClassification>>> {
    Ok(Json(state.reference.list_ratings().await?))
}

pub async fn rating(
    State(state): State<AppState>,
    Path(id): Path<RatingId>,
) -> AppResult<Json<RatingClassification>> {
    Ok(Json(state.reference.get_rating(id).await?))
}
