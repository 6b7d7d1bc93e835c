use std::collections::HashSet;
use std::sync::Arc;

use super::{require_film, require_user, FeedLog};
use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{EventType, FilmId, Operation, UserId},
};

/// Mutations and queries over the user–film like edges
pub struct LikeService {
    store: Arc<dyn CatalogStore>,
    feed: Arc<FeedLog>,
}

impl LikeService {
    pub fn new(store: Arc<dyn CatalogStore>, feed: Arc<FeedLog>) -> Self {
        Self { store, feed }
    }

    /// Likes the film; liking it again changes nothing but is still logged
    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        require_film(self.store.as_ref(), film_id).await?;
        require_user(self.store.as_ref(), user_id).await?;

        let inserted = self.store.add_like(user_id, film_id).await?;
        tracing::info!(user_id, film_id, inserted, "Like added");

        self.feed
            .append(user_id, EventType::Like, Operation::Add, film_id)
            .await?;
        Ok(())
    }

    /// Removes the like; a missing edge is tolerated
    pub async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        require_film(self.store.as_ref(), film_id).await?;
        require_user(self.store.as_ref(), user_id).await?;

        let removed = self.store.remove_like(user_id, film_id).await?;
        tracing::info!(user_id, film_id, removed, "Like removed");

        self.feed
            .append(user_id, EventType::Like, Operation::Remove, film_id)
            .await?;
        Ok(())
    }

    pub async fn liked_film_ids(&self, user_id: UserId) -> AppResult<HashSet<FilmId>> {
        self.store.liked_film_ids(user_id).await
    }
}
