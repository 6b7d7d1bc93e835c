use axum::{
    http::StatusCode,
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{Cache, CatalogStore},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{
        CatalogService, FeedLog, FriendshipService, LikeService, PopularityRanker,
        RecommendationEngine, ReferenceService, ReviewScoring, SearchRanker,
    },
};

pub mod directors;
pub mod films;
pub mod reference;
pub mod reviews;
pub mod users;

/// Engine services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub likes: Arc<LikeService>,
    pub friendship: Arc<FriendshipService>,
    pub reviews: Arc<ReviewScoring>,
    pub feed: Arc<FeedLog>,
    pub popularity: Arc<PopularityRanker>,
    pub search: Arc<SearchRanker>,
    pub recommendations: Arc<RecommendationEngine>,
    pub reference: Arc<ReferenceService>,
}

impl AppState {
    /// Wires every service to one store; `cache` backs reference data only
    pub fn new(store: Arc<dyn CatalogStore>, cache: Option<Cache>, cache_ttl: u64) -> Self {
        let feed = Arc::new(FeedLog::new(store.clone()));
        Self {
            catalog: Arc::new(CatalogService::new(store.clone())),
            likes: Arc::new(LikeService::new(store.clone(), feed.clone())),
            friendship: Arc::new(FriendshipService::new(store.clone(), feed.clone())),
            reviews: Arc::new(ReviewScoring::new(store.clone(), feed.clone())),
            popularity: Arc::new(PopularityRanker::new(store.clone())),
            search: Arc::new(SearchRanker::new(store.clone())),
            recommendations: Arc::new(RecommendationEngine::new(store.clone())),
            reference: Arc::new(ReferenceService::new(store, cache, cache_ttl)),
            feed,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/users",
            get(users::list).post(users::create).put(users::update),
        )
        .route("/users/:id", get(users::get).delete(users::delete))
        .route("/users/:id/friends", get(users::friends))
        .route(
            "/users/:id/friends/:friend_id",
            put(users::add_friend).delete(users::remove_friend),
        )
        .route(
            "/users/:id/friends/common/:other_id",
            get(users::common_friends),
        )
        .route("/users/:id/recommendations", get(users::recommendations))
        .route("/users/:id/feed", get(users::feed))
        .route(
            "/films",
            get(films::list).post(films::create).put(films::update),
        )
        .route("/films/popular", get(films::popular))
        .route("/films/search", get(films::search))
        .route("/films/common", get(films::common))
        .route("/films/director/:director_id", get(films::by_director))
        .route("/films/:id", get(films::get).delete(films::delete))
        .route(
            "/films/:id/like/:user_id",
            put(films::add_like).delete(films::remove_like),
        )
        .route(
            "/directors",
            get(directors::list)
                .post(directors::create)
                .put(directors::update),
        )
        .route(
            "/directors/:id",
            get(directors::get).delete(directors::delete),
        )
        .route("/genres", get(reference::genres))
        .route("/genres/:id", get(reference::genre))
        .route("/mpa", get(reference::ratings))
        .route("/mpa/:id", get(reference::rating))
        .route(
            "/reviews",
            get(reviews::list).post(reviews::create).put(reviews::update),
        )
        .route("/reviews/:id", get(reviews::get).delete(reviews::delete))
        .route(
            "/reviews/:id/like/:user_id",
            put(reviews::like).delete(reviews::remove_like),
        )
        .route(
            "/reviews/:id/dislike/:user_id",
            put(reviews::dislike).delete(reviews::remove_dislike),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
