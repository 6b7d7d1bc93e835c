//! Interaction & ranking engine over a [`CatalogStore`].
//!
//! Every service holds a shared handle to the store and performs its own
//! existence checks; mutating services append to the [`FeedLog`] after the
//! store call succeeds.

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{Film, FilmId, User, UserId},
};

pub mod catalog;
pub mod feed;
pub mod friendship;
pub mod likes;
pub mod popularity;
pub mod recommendations;
pub mod reference;
pub mod reviews;
pub mod search;

pub use catalog::CatalogService;
pub use feed::FeedLog;
pub use friendship::FriendshipService;
pub use likes::LikeService;
pub use popularity::PopularityRanker;
pub use recommendations::RecommendationEngine;
pub use reference::ReferenceService;
pub use reviews::ReviewScoring;
pub use search::SearchRanker;

pub(crate) async fn require_user(store: &dyn CatalogStore, id: UserId) -> AppResult<User> {
    store
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))
}

pub(crate) async fn require_film(store: &dyn CatalogStore, id: FilmId) -> AppResult<Film> {
    store
        .get_film(id)
        .await?
        .ok_or_else(|| AppError::film_not_found(id))
}
