use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey, CatalogStore},
    error::{AppError, AppResult},
    models::{Genre, GenreId, RatingClassification, RatingId},
};

/// Read-only genres and rating classifications
///
/// When a Redis cache is configured, lookups are served from it and misses
/// are written back in the background with the configured TTL.
pub struct ReferenceService {
    store: Arc<dyn CatalogStore>,
    cache: Option<Cache>,
    ttl: u64,
}

impl ReferenceService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: Option<Cache>, ttl: u64) -> Self {
        Self { store, cache, ttl }
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        match &self.cache {
            Some(cache) => cached!(cache, CacheKey::Genres, self.ttl, self.store.list_genres()),
            None => self.store.list_genres().await,
        }
    }

    pub async fn get_genre(&self, id: GenreId) -> AppResult<Genre> {
        match &self.cache {
            Some(cache) => cached!(cache, CacheKey::Genre(id), self.ttl, self.load_genre(id)),
            None => self.load_genre(id).await,
        }
    }

    pub async fn list_ratings(&self) -> AppResult<Vec<RatingClassification>> {
        match &self.cache {
            Some(cache) => cached!(cache, CacheKey::Ratings, self.ttl, self.store.list_ratings()),
            None => self.store.list_ratings().await,
        }
    }

    pub async fn get_rating(&self, id: RatingId) -> AppResult<RatingClassification> {
        match &self.cache {
            Some(cache) => cached!(cache, CacheKey::Rating(id), self.ttl, self.load_rating(id)),
            None => self.load_rating(id).await,
        }
    }

    async fn load_genre(&self, id: GenreId) -> AppResult<Genre> {
        self.store
            .get_genre(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    async fn load_rating(&self, id: RatingId) -> AppResult<RatingClassification> {
        self.store.get_rating(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Rating classification with id {} not found", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    fn uncached() -> ReferenceService {
        ReferenceService::new(Arc::new(InMemoryStore::new()), None, 60)
    }

    async fn behind_unreachable_redis() -> ReferenceService {
        let client = crate::db::create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client).await;
        ReferenceService::new(Arc::new(InMemoryStore::new()), Some(cache), 60)
    }

    #[tokio::test]
    async fn test_redis_outage_falls_back_to_store() {
        let reference = behind_unreachable_redis().await;

        assert_eq!(reference.list_genres().await.unwrap().len(), 6);
        assert_eq!(reference.get_genre(2).await.unwrap().name, "Drama");
        assert_eq!(reference.list_ratings().await.unwrap().len(), 5);
        assert!(matches!(
            reference.get_rating(9).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_seeded_genres_in_id_order() {
        let genres = uncached().list_genres().await.unwrap();
        assert_eq!(genres.len(), 6);
        assert_eq!(genres[0].name, "Comedy");
        assert_eq!(genres[5].name, "Action");
    }

    #[tokio::test]
    async fn test_rating_lookup() {
        let reference = uncached();
        assert_eq!(reference.get_rating(3).await.unwrap().name, "PG-13");
        assert!(matches!(
            reference.get_rating(6).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_genre_is_not_found() {
        assert!(matches!(
            uncached().get_genre(0).await,
            Err(AppError::NotFound(_))
        ));
    }
}
