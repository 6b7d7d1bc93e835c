use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::AppResult,
    models::{FeedEvent, Film, User, UserDraft, UserId},
};

/// Full replacement of an existing user
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: UserId,
    #[serde(flatten)]
    pub user: UserDraft,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.catalog.list_users().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<UserDraft>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.catalog.create_user(draft).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(
        state.catalog.update_user(request.id, request.user).await?,
    ))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<UserId>) -> AppResult<Json<User>> {
    Ok(Json(state.catalog.get_user(id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<UserId>) -> AppResult<StatusCode> {
    state.catalog.delete_user(id).await?;
    Ok(StatusCode::OK)
}

pub async fn friends(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.friendship.friends_of(id).await?))
}

pub async fn add_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    state.friendship.add_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    state.friendship.remove_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn common_friends(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.friendship.common_friends(id, other_id).await?))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.recommendations.recommendations(id).await?))
}

pub async fn feed(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<FeedEvent>>> {
    Ok(Json(state.feed.feed_of(id).await?))
}
