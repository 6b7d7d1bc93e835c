use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::AppResult,
    models::{FilmId, Review, ReviewDraft, ReviewEdit, ReviewId, UserId},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    film_id: Option<FilmId>,
    count: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(
        state.reviews.list_reviews(params.film_id, params.count).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<ReviewDraft>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.reviews.add_review(draft).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update(
    State(state): State<AppState>,
    Json(edit): Json<ReviewEdit>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.update_review(edit).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.get_review(id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<ReviewId>) -> AppResult<StatusCode> {
    state.reviews.delete_review(id).await?;
    Ok(StatusCode::OK)
}

pub async fn like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.vote(id, user_id, true).await?))
}

pub async fn dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.vote(id, user_id, false).await?))
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.remove_vote(id, user_id, true).await?))
}

pub async fn remove_dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.remove_vote(id, user_id, false).await?))
}
