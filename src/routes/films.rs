use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::AppResult,
    models::{DirectorId, Film, FilmDraft, FilmId, GenreId, UserId},
};

const DEFAULT_POPULAR_COUNT: i64 = 10;

/// Full replacement of an existing film
#[derive(Debug, Deserialize)]
pub struct UpdateFilmRequest {
    pub id: FilmId,
    #[serde(flatten)]
    pub film: FilmDraft,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularQuery {
    count: Option<i64>,
    genre_id: Option<GenreId>,
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: String,
    by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonQuery {
    user_id: UserId,
    friend_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorQuery {
    sort_by: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.catalog.list_films().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<FilmDraft>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let film = state.catalog.create_film(draft).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateFilmRequest>,
) -> AppResult<Json<Film>> {
    Ok(Json(
        state.catalog.update_film(request.id, request.film).await?,
    ))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<FilmId>) -> AppResult<Json<Film>> {
    Ok(Json(state.catalog.get_film(id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<FilmId>) -> AppResult<StatusCode> {
    state.catalog.delete_film(id).await?;
    Ok(StatusCode::OK)
}

pub async fn add_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    state.likes.add_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    state.likes.remove_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Most liked films, optionally narrowed by genre and release year
pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let films = state
        .popularity
        .top_films(
            params.count.unwrap_or(DEFAULT_POPULAR_COUNT),
            params.genre_id,
            params.year,
        )
        .await?;
    Ok(Json(films))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.search.search(&params.query, &params.by).await?))
}

pub async fn common(
    State(state): State<AppState>,
    Query(params): Query<CommonQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let films = state
        .popularity
        .common_films(params.user_id, params.friend_id)
        .await?;
    Ok(Json(films))
}

pub async fn by_director(
    State(state): State<AppState>,
    Path(director_id): Path<DirectorId>,
    Query(params): Query<DirectorQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let sort_by = params.sort_by.as_deref().unwrap_or("year");
    Ok(Json(
        state.popularity.director_films(director_id, sort_by).await?,
    ))
}
