use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::store::{CatalogStore, SEED_GENRES, SEED_RATINGS};
use crate::{
    error::{AppError, AppResult},
    graph::{FriendGraph, LikeGraph},
    models::{
        review, Director, DirectorDraft, DirectorId, EventId, FeedEvent, Film, FilmDraft, FilmId,
        Genre, GenreId, NewFeedEvent, RatingClassification, RatingId, Review, ReviewDraft,
        ReviewEdit, ReviewId, User, UserDraft, UserId,
    },
};

/// Film row with associations held as ids
#[derive(Debug, Clone)]
struct FilmRecord {
    draft: FilmDraft,
    rating_id: Option<RatingId>,
    genre_ids: BTreeSet<GenreId>,
    director_ids: BTreeSet<DirectorId>,
}

/// Process-local Catalog Store
///
/// Every mutation runs under one write lock, which makes each operation
/// atomic with respect to concurrent requests.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

struct StoreInner {
    users: BTreeMap<UserId, User>,
    films: BTreeMap<FilmId, FilmRecord>,
    genres: BTreeMap<GenreId, Genre>,
    ratings: BTreeMap<RatingId, RatingClassification>,
    directors: BTreeMap<DirectorId, Director>,
    likes: LikeGraph,
    friends: FriendGraph,
    reviews: BTreeMap<ReviewId, Review>,
    votes: HashMap<(ReviewId, UserId), bool>,
    feed: Vec<FeedEvent>,
    next_user_id: UserId,
    next_film_id: FilmId,
    next_director_id: DirectorId,
    next_review_id: ReviewId,
    next_event_id: EventId,
}

impl Default for StoreInner {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            films: BTreeMap::new(),
            genres: SEED_GENRES
                .iter()
                .map(|(id, name)| {
                    (
                        *id,
                        Genre {
                            id: *id,
                            name: name.to_string(),
                        },
                    )
                })
                .collect(),
            ratings: SEED_RATINGS
                .iter()
                .map(|(id, name)| {
                    (
                        *id,
                        RatingClassification {
                            id: *id,
                            name: name.to_string(),
                        },
                    )
                })
                .collect(),
            directors: BTreeMap::new(),
            likes: LikeGraph::new(),
            friends: FriendGraph::new(),
            reviews: BTreeMap::new(),
            votes: HashMap::new(),
            feed: Vec::new(),
            next_user_id: 1,
            next_film_id: 1,
            next_director_id: 1,
            next_review_id: 1,
            next_event_id: 1,
        }
    }
}

impl InMemoryStore {
    /// Creates an empty store seeded with genres and rating classifications
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreInner {
    fn hydrate(&self, id: FilmId, record: &FilmRecord) -> Film {
        Film {
            id,
            title: record.draft.title.clone(),
            description: record.draft.description.clone(),
            release_date: record.draft.release_date,
            duration: record.draft.duration,
            mpa: record
                .rating_id
                .and_then(|rating_id| self.ratings.get(&rating_id).cloned()),
            genres: record
                .genre_ids
                .iter()
                .filter_map(|genre_id| self.genres.get(genre_id).cloned())
                .collect(),
            directors: record
                .director_ids
                .iter()
                .filter_map(|director_id| self.directors.get(director_id).cloned())
                .collect(),
        }
    }

    /// Resolves a draft's references, failing on the first unknown id
    fn resolve(&self, draft: FilmDraft) -> AppResult<FilmRecord> {
        let rating_id = draft.rating_id();
        if let Some(rating_id) = rating_id {
            if !self.ratings.contains_key(&rating_id) {
                return Err(AppError::NotFound(format!(
                    "Rating classification with id {} not found",
                    rating_id
                )));
            }
        }
        let genre_ids = draft.genre_ids();
        if let Some(missing) = genre_ids.iter().find(|id| !self.genres.contains_key(id)) {
            return Err(AppError::NotFound(format!(
                "Genre with id {} not found",
                missing
            )));
        }
        let director_ids = draft.director_ids();
        if let Some(missing) = director_ids
            .iter()
            .find(|id| !self.directors.contains_key(id))
        {
            return Err(AppError::director_not_found(*missing));
        }
        Ok(FilmRecord {
            draft,
            rating_id,
            genre_ids,
            director_ids,
        })
    }

    fn recompute_useful(&mut self, review_id: ReviewId) -> AppResult<Review> {
        let useful = review::usefulness(
            self.votes
                .iter()
                .filter(|((voted_review, _), _)| *voted_review == review_id)
                .map(|(_, is_like)| *is_like),
        );
        let review = self
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| AppError::review_not_found(review_id))?;
        review.useful = useful;
        Ok(review.clone())
    }

    fn require_user(&self, id: UserId) -> AppResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::user_not_found(id))
        }
    }

    fn require_film(&self, id: FilmId) -> AppResult<()> {
        if self.films.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::film_not_found(id))
        }
    }

    fn remove_review(&mut self, review_id: ReviewId) -> Option<Review> {
        let removed = self.reviews.remove(&review_id)?;
        self.votes.retain(|(voted_review, _), _| *voted_review != review_id);
        Some(removed)
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryStore {
    async fn create_user(&self, draft: UserDraft) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        let id = inner.next_user_id;
        inner.next_user_id += 1;
        let user = draft.into_user(id);
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: UserId, draft: UserDraft) -> AppResult<Option<User>> {
        let mut inner = self.inner.write().await;
        let Some(slot) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        *slot = draft.into_user(id);
        Ok(Some(slot.clone()))
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        let wanted: BTreeSet<UserId> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.likes.remove_user(id);
        inner.friends.remove_user(id);
        let authored: Vec<ReviewId> = inner
            .reviews
            .values()
            .filter(|review| review.user_id == id)
            .map(|review| review.review_id)
            .collect();
        for review_id in authored {
            inner.remove_review(review_id);
        }
        let voted: Vec<ReviewId> = inner
            .votes
            .keys()
            .filter(|(_, voter)| *voter == id)
            .map(|(review_id, _)| *review_id)
            .collect();
        for review_id in voted {
            inner.votes.remove(&(review_id, id));
            inner.recompute_useful(review_id)?;
        }
        Ok(true)
    }

    async fn create_film(&self, draft: FilmDraft) -> AppResult<Film> {
        let mut inner = self.inner.write().await;
        let record = inner.resolve(draft)?;
        let id = inner.next_film_id;
        inner.next_film_id += 1;
        let film = inner.hydrate(id, &record);
        inner.films.insert(id, record);
        Ok(film)
    }

    async fn update_film(&self, id: FilmId, draft: FilmDraft) -> AppResult<Option<Film>> {
        let mut inner = self.inner.write().await;
        if !inner.films.contains_key(&id) {
            return Ok(None);
        }
        let record = inner.resolve(draft)?;
        let film = inner.hydrate(id, &record);
        inner.films.insert(id, record);
        Ok(Some(film))
    }

    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        let inner = self.inner.read().await;
        Ok(inner.films.get(&id).map(|record| inner.hydrate(id, record)))
    }

    async fn list_films(&self) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        Ok(inner
            .films
            .iter()
            .map(|(id, record)| inner.hydrate(*id, record))
            .collect())
    }

    async fn films_by_ids(&self, ids: &[FilmId]) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        let wanted: BTreeSet<FilmId> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| inner.films.get(id).map(|record| inner.hydrate(*id, record)))
            .collect())
    }

    async fn delete_film(&self, id: FilmId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.films.remove(&id).is_none() {
            return Ok(false);
        }
        inner.likes.remove_film(id);
        let reviews: Vec<ReviewId> = inner
            .reviews
            .values()
            .filter(|review| review.film_id == id)
            .map(|review| review.review_id)
            .collect();
        for review_id in reviews {
            inner.remove_review(review_id);
        }
        Ok(true)
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        Ok(self.inner.read().await.genres.values().cloned().collect())
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>> {
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }

    async fn list_ratings(&self) -> AppResult<Vec<RatingClassification>> {
        Ok(self.inner.read().await.ratings.values().cloned().collect())
    }

    async fn get_rating(&self, id: RatingId) -> AppResult<Option<RatingClassification>> {
        Ok(self.inner.read().await.ratings.get(&id).cloned())
    }

    async fn create_director(&self, draft: DirectorDraft) -> AppResult<Director> {
        let mut inner = self.inner.write().await;
        let id = inner.next_director_id;
        inner.next_director_id += 1;
        let director = Director {
            id,
            name: draft.name,
        };
        inner.directors.insert(id, director.clone());
        Ok(director)
    }

    async fn update_director(
        &self,
        id: DirectorId,
        draft: DirectorDraft,
    ) -> AppResult<Option<Director>> {
        let mut inner = self.inner.write().await;
        Ok(inner.directors.get_mut(&id).map(|director| {
            director.name = draft.name;
            director.clone()
        }))
    }

    async fn get_director(&self, id: DirectorId) -> AppResult<Option<Director>> {
        Ok(self.inner.read().await.directors.get(&id).cloned())
    }

    async fn list_directors(&self) -> AppResult<Vec<Director>> {
        Ok(self.inner.read().await.directors.values().cloned().collect())
    }

    async fn delete_director(&self, id: DirectorId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.directors.remove(&id).is_none() {
            return Ok(false);
        }
        for record in inner.films.values_mut() {
            record.director_ids.remove(&id);
        }
        Ok(true)
    }

    async fn add_like(&self, user_id: UserId, film_id: FilmId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        inner.require_film(film_id)?;
        inner.require_user(user_id)?;
        Ok(inner.likes.insert(user_id, film_id))
    }

    async fn remove_like(&self, user_id: UserId, film_id: FilmId) -> AppResult<bool> {
        Ok(self.inner.write().await.likes.remove(user_id, film_id))
    }

    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<HashSet<FilmId>> {
        Ok(self.inner.read().await.likes.liked_film_ids(user_id))
    }

    async fn like_graph(&self) -> AppResult<LikeGraph> {
        Ok(self.inner.read().await.likes.clone())
    }

    async fn like_counts(&self) -> AppResult<HashMap<FilmId, u64>> {
        Ok(self.inner.read().await.likes.like_counts())
    }

    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        inner.require_user(user_id)?;
        inner.require_user(friend_id)?;
        Ok(inner.friends.insert(user_id, friend_id))
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        Ok(self.inner.write().await.friends.remove(user_id, friend_id))
    }

    async fn friend_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        Ok(self.inner.read().await.friends.friends_of(user_id))
    }

    async fn create_review(&self, draft: ReviewDraft) -> AppResult<Review> {
        let mut inner = self.inner.write().await;
        inner.require_user(draft.user_id)?;
        inner.require_film(draft.film_id)?;
        let review_id = inner.next_review_id;
        inner.next_review_id += 1;
        let review = Review {
            review_id,
            content: draft.content,
            is_positive: draft.is_positive,
            user_id: draft.user_id,
            film_id: draft.film_id,
            useful: 0,
        };
        inner.reviews.insert(review_id, review.clone());
        Ok(review)
    }

    async fn update_review(&self, edit: ReviewEdit) -> AppResult<Option<Review>> {
        let mut inner = self.inner.write().await;
        Ok(inner.reviews.get_mut(&edit.review_id).map(|review| {
            review.content = edit.content;
            review.is_positive = edit.is_positive;
            review.clone()
        }))
    }

    async fn get_review(&self, id: ReviewId) -> AppResult<Option<Review>> {
        Ok(self.inner.read().await.reviews.get(&id).cloned())
    }

    async fn delete_review(&self, id: ReviewId) -> AppResult<Option<Review>> {
        Ok(self.inner.write().await.remove_review(id))
    }

    async fn list_reviews(&self, film_id: Option<FilmId>, limit: usize) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        let mut reviews: Vec<Review> = inner
            .reviews
            .values()
            .filter(|review| film_id.map_or(true, |id| review.film_id == id))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.useful
                .cmp(&a.useful)
                .then_with(|| a.review_id.cmp(&b.review_id))
        });
        reviews.truncate(limit);
        Ok(reviews)
    }

    async fn upsert_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        is_like: bool,
    ) -> AppResult<Review> {
        let mut inner = self.inner.write().await;
        if !inner.reviews.contains_key(&review_id) {
            return Err(AppError::review_not_found(review_id));
        }
        inner.require_user(user_id)?;
        inner.votes.insert((review_id, user_id), is_like);
        inner.recompute_useful(review_id)
    }

    async fn delete_vote(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        let mut inner = self.inner.write().await;
        if !inner.reviews.contains_key(&review_id) {
            return Err(AppError::review_not_found(review_id));
        }
        inner.votes.remove(&(review_id, user_id));
        inner.recompute_useful(review_id)
    }

    async fn append_event(&self, event: NewFeedEvent) -> AppResult<FeedEvent> {
        let mut inner = self.inner.write().await;
        let event_id = inner.next_event_id;
        inner.next_event_id += 1;
        let stored = event.with_id(event_id);
        inner.feed.push(stored.clone());
        Ok(stored)
    }

    async fn feed_of(&self, user_id: UserId) -> AppResult<Vec<FeedEvent>> {
        let inner = self.inner.read().await;
        let mut events: Vec<FeedEvent> = inner
            .feed
            .iter()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.timestamp, event.event_id));
        Ok(events)
    }
}
