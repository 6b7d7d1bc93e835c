use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use super::require_user;
use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{DirectorId, Film, FilmId, GenreId, UserId},
};

/// Popularity order: like count descending, then film id descending
pub fn popularity_order(counts: &HashMap<FilmId, u64>, a: &Film, b: &Film) -> Ordering {
    let count = |film: &Film| counts.get(&film.id).copied().unwrap_or(0);
    count(b).cmp(&count(a)).then_with(|| b.id.cmp(&a.id))
}

/// Sorts films in place by popularity
pub fn rank_by_popularity(films: &mut [Film], counts: &HashMap<FilmId, u64>) {
    films.sort_by(|a, b| popularity_order(counts, a, b));
}

/// Sort keys accepted by the director filmography
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorSort {
    /// Release date ascending, then id ascending
    Year,
    /// Popularity order
    Likes,
}

impl FromStr for DirectorSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(DirectorSort::Year),
            "likes" => Ok(DirectorSort::Likes),
            other => Err(AppError::InvalidInput(format!(
                "Unknown sort key: {}",
                other
            ))),
        }
    }
}

/// Ranks films by like count
pub struct PopularityRanker {
    store: Arc<dyn CatalogStore>,
}

impl PopularityRanker {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// At most `limit` films matching every given filter, most liked first
    pub async fn top_films(
        &self,
        limit: i64,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> AppResult<Vec<Film>> {
        if limit <= 0 {
            tracing::warn!(limit, "Rejected non-positive popular films limit");
            return Err(AppError::InvalidInput(format!(
                "Count must be positive, got {}",
                limit
            )));
        }

        let mut films: Vec<Film> = self
            .store
            .list_films()
            .await?
            .into_iter()
            .filter(|film| genre_id.map_or(true, |id| film.has_genre(id)))
            .filter(|film| year.map_or(true, |y| film.release_year() == y))
            .collect();

        let counts = self.store.like_counts().await?;
        rank_by_popularity(&mut films, &counts);
        films.truncate(limit as usize);

        tracing::info!(
            limit,
            genre_id,
            year,
            returned = films.len(),
            "Popular films ranked"
        );

        Ok(films)
    }

    /// Films liked by both users, most liked first
    pub async fn common_films(&self, user_id: UserId, friend_id: UserId) -> AppResult<Vec<Film>> {
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), friend_id).await?;

        let mine = self.store.liked_film_ids(user_id).await?;
        let theirs = self.store.liked_film_ids(friend_id).await?;
        let shared: Vec<FilmId> = mine.intersection(&theirs).copied().collect();

        let mut films = self.store.films_by_ids(&shared).await?;
        let counts = self.store.like_counts().await?;
        rank_by_popularity(&mut films, &counts);

        tracing::debug!(user_id, friend_id, count = films.len(), "Common films ranked");
        Ok(films)
    }

    /// Films credited to the director in the requested order
    pub async fn director_films(
        &self,
        director_id: DirectorId,
        sort_by: &str,
    ) -> AppResult<Vec<Film>> {
        let sort: DirectorSort = sort_by.parse()?;
        if self.store.get_director(director_id).await?.is_none() {
            return Err(AppError::director_not_found(director_id));
        }

        let mut films: Vec<Film> = self
            .store
            .list_films()
            .await?
            .into_iter()
            .filter(|film| film.has_director(director_id))
            .collect();

        match sort {
            DirectorSort::Year => films.sort_by(|a, b| {
                a.release_date
                    .cmp(&b.release_date)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            DirectorSort::Likes => {
                let counts = self.store.like_counts().await?;
                rank_by_popularity(&mut films, &counts);
            }
        }

        Ok(films)
    }
}
