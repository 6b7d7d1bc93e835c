use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    graph::LikeGraph,
    models::{
        Director, DirectorDraft, DirectorId, FeedEvent, Film, FilmDraft, FilmId, Genre, GenreId,
        NewFeedEvent, RatingClassification, RatingId, Review, ReviewDraft, ReviewEdit, ReviewId,
        User, UserDraft, UserId,
    },
};

/// Genres every store starts with
pub const SEED_GENRES: [(GenreId, &str); 6] = [
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Animation"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

/// Rating classifications every store starts with
pub const SEED_RATINGS: [(RatingId, &str); 5] = [
    (1, "G"),
    (2, "PG"),
    (3, "PG-13"),
    (4, "R"),
    (5, "NC-17"),
];

/// Durable home of users, films, edges, reviews and feed events
///
/// Implementations own uniqueness of like edges, friendship edges and review
/// votes: inserts report whether a row was created instead of failing, so the
/// engine never needs a check-then-act sequence. Deletes cascade dependent
/// edges. Lookups of a missing entity return `None`/`false`; referencing a
/// missing genre, rating or director while writing a film is `NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_user(&self, draft: UserDraft) -> AppResult<User>;
    async fn update_user(&self, id: UserId, draft: UserDraft) -> AppResult<Option<User>>;
    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    /// Users with the given ids, ascending by id; unknown ids are skipped
    async fn users_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>>;
    /// Removes the user with their likes, friendships, reviews and votes
    async fn delete_user(&self, id: UserId) -> AppResult<bool>;

    async fn create_film(&self, draft: FilmDraft) -> AppResult<Film>;
    async fn update_film(&self, id: FilmId, draft: FilmDraft) -> AppResult<Option<Film>>;
    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>>;
    /// All films, ascending by id
    async fn list_films(&self) -> AppResult<Vec<Film>>;
    /// Films with the given ids, ascending by id; unknown ids are skipped
    async fn films_by_ids(&self, ids: &[FilmId]) -> AppResult<Vec<Film>>;
    /// Removes the film with its likes, associations, reviews and votes
    async fn delete_film(&self, id: FilmId) -> AppResult<bool>;

    async fn list_genres(&self) -> AppResult<Vec<Genre>>;
    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>>;
    async fn list_ratings(&self) -> AppResult<Vec<RatingClassification>>;
    async fn get_rating(&self, id: RatingId) -> AppResult<Option<RatingClassification>>;

    async fn create_director(&self, draft: DirectorDraft) -> AppResult<Director>;
    async fn update_director(
        &self,
        id: DirectorId,
        draft: DirectorDraft,
    ) -> AppResult<Option<Director>>;
    async fn get_director(&self, id: DirectorId) -> AppResult<Option<Director>>;
    async fn list_directors(&self) -> AppResult<Vec<Director>>;
    /// Removes the director and its film associations
    async fn delete_director(&self, id: DirectorId) -> AppResult<bool>;

    /// Inserts the like edge; false when it already existed
    async fn add_like(&self, user_id: UserId, film_id: FilmId) -> AppResult<bool>;
    /// Deletes the like edge; false when there was none
    async fn remove_like(&self, user_id: UserId, film_id: FilmId) -> AppResult<bool>;
    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<HashSet<FilmId>>;
    /// Snapshot of every like edge
    async fn like_graph(&self) -> AppResult<LikeGraph>;
    /// Like count per liked film
    async fn like_counts(&self) -> AppResult<HashMap<FilmId, u64>>;

    /// Inserts the directed edge; false when it already existed
    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;
    /// Deletes the directed edge; false when there was none
    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;
    /// Targets of the user's outgoing edges, ascending
    async fn friend_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>>;

    /// Stores a review with zero usefulness
    async fn create_review(&self, draft: ReviewDraft) -> AppResult<Review>;
    async fn update_review(&self, edit: ReviewEdit) -> AppResult<Option<Review>>;
    async fn get_review(&self, id: ReviewId) -> AppResult<Option<Review>>;
    /// Removes the review with its votes, returning what was removed
    async fn delete_review(&self, id: ReviewId) -> AppResult<Option<Review>>;
    /// Reviews by usefulness descending, then id ascending
    async fn list_reviews(&self, film_id: Option<FilmId>, limit: usize) -> AppResult<Vec<Review>>;
    /// Inserts or overwrites the user's vote and recomputes usefulness
    async fn upsert_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        is_like: bool,
    ) -> AppResult<Review>;
    /// Deletes the user's vote if any and recomputes usefulness
    async fn delete_vote(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review>;

    async fn append_event(&self, event: NewFeedEvent) -> AppResult<FeedEvent>;
    /// Events owned by the user, ascending by timestamp
    async fn feed_of(&self, user_id: UserId) -> AppResult<Vec<FeedEvent>>;
}
