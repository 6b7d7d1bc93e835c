use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use std::collections::{HashMap, HashSet};

use super::store::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    graph::LikeGraph,
    models::{
        Director, DirectorDraft, DirectorId, FeedEvent, Film, FilmDraft, FilmId, Genre, GenreId,
        NewFeedEvent, RatingClassification, RatingId, Review, ReviewDraft, ReviewEdit, ReviewId,
        User, UserDraft, UserId,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const FILM_SELECT: &str = r#"
    SELECT f.id, f.title, f.description, f.release_date, f.duration,
           f.rating_id, r.name AS rating_name
    FROM films f
    LEFT JOIN rating_classifications r ON r.id = f.rating_id
"#;

const REVIEW_COLUMNS: &str = "review_id, content, is_positive, user_id, film_id, useful";

#[derive(sqlx::FromRow)]
struct FilmRow {
    id: FilmId,
    title: String,
    description: String,
    release_date: NaiveDate,
    duration: i32,
    rating_id: Option<RatingId>,
    rating_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct AssociationRow {
    film_id: FilmId,
    id: i64,
    name: String,
}

#[derive(sqlx::FromRow)]
struct FeedRow {
    event_id: i64,
    user_id: UserId,
    event_type: String,
    operation: String,
    entity_id: i64,
    timestamp: i64,
}

impl TryFrom<FeedRow> for FeedEvent {
    type Error = AppError;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        Ok(FeedEvent {
            event_id: row.event_id,
            user_id: row.user_id,
            event_type: row.event_type.parse()?,
            operation: row.operation.parse()?,
            entity_id: row.entity_id,
            timestamp: row.timestamp,
        })
    }
}

/// Catalog Store backed by PostgreSQL
///
/// Edge and vote uniqueness rest on primary keys with `ON CONFLICT`, so
/// concurrent inserts of the same pair never produce duplicate rows.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attaches genres and directors to film rows in two round-trips
    async fn hydrate(&self, rows: Vec<FilmRow>) -> AppResult<Vec<Film>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<FilmId> = rows.iter().map(|row| row.id).collect();

        let genre_rows = sqlx::query_as::<_, AssociationRow>(
            r#"
            SELECT fg.film_id, g.id, g.name
            FROM film_genres fg
            JOIN genres g ON g.id = fg.genre_id
            WHERE fg.film_id = ANY($1)
            ORDER BY g.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let director_rows = sqlx::query_as::<_, AssociationRow>(
            r#"
            SELECT fd.film_id, d.id, d.name
            FROM film_directors fd
            JOIN directors d ON d.id = fd.director_id
            WHERE fd.film_id = ANY($1)
            ORDER BY d.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<FilmId, Vec<Genre>> = HashMap::new();
        for row in genre_rows {
            genres.entry(row.film_id).or_default().push(Genre {
                id: row.id,
                name: row.name,
            });
        }
        let mut directors: HashMap<FilmId, Vec<Director>> = HashMap::new();
        for row in director_rows {
            directors.entry(row.film_id).or_default().push(Director {
                id: row.id,
                name: row.name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Film {
                id: row.id,
                title: row.title,
                description: row.description,
                release_date: row.release_date,
                duration: row.duration,
                mpa: match (row.rating_id, row.rating_name) {
                    (Some(id), Some(name)) => Some(RatingClassification { id, name }),
                    _ => None,
                },
                genres: genres.remove(&row.id).unwrap_or_default(),
                directors: directors.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        let row = sqlx::query_as::<_, FilmRow>(&format!("{} WHERE f.id = $1", FILM_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Fails with `NotFound` on the first reference the catalog does not hold
    async fn check_references(
        tx: &mut Transaction<'_, Postgres>,
        draft: &FilmDraft,
    ) -> AppResult<()> {
        if let Some(rating_id) = draft.rating_id() {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM rating_classifications WHERE id = $1)",
            )
            .bind(rating_id)
            .fetch_one(&mut **tx)
            .await?;
            if !exists {
                return Err(AppError::NotFound(format!(
                    "Rating classification with id {} not found",
                    rating_id
                )));
            }
        }

        let genre_ids: Vec<GenreId> = draft.genre_ids().into_iter().collect();
        let known: HashSet<GenreId> =
            sqlx::query_scalar::<_, GenreId>("SELECT id FROM genres WHERE id = ANY($1)")
                .bind(&genre_ids)
                .fetch_all(&mut **tx)
                .await?
                .into_iter()
                .collect();
        if let Some(missing) = genre_ids.iter().find(|id| !known.contains(id)) {
            return Err(AppError::NotFound(format!(
                "Genre with id {} not found",
                missing
            )));
        }

        let director_ids: Vec<DirectorId> = draft.director_ids().into_iter().collect();
        let known: HashSet<DirectorId> =
            sqlx::query_scalar::<_, DirectorId>("SELECT id FROM directors WHERE id = ANY($1)")
                .bind(&director_ids)
                .fetch_all(&mut **tx)
                .await?
                .into_iter()
                .collect();
        if let Some(missing) = director_ids.iter().find(|id| !known.contains(id)) {
            return Err(AppError::director_not_found(*missing));
        }

        Ok(())
    }

    async fn write_associations(
        tx: &mut Transaction<'_, Postgres>,
        film_id: FilmId,
        draft: &FilmDraft,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(film_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM film_directors WHERE film_id = $1")
            .bind(film_id)
            .execute(&mut **tx)
            .await?;

        let genre_ids: Vec<GenreId> = draft.genre_ids().into_iter().collect();
        sqlx::query(
            "INSERT INTO film_genres (film_id, genre_id) SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(film_id)
        .bind(&genre_ids)
        .execute(&mut **tx)
        .await?;

        let director_ids: Vec<DirectorId> = draft.director_ids().into_iter().collect();
        sqlx::query(
            "INSERT INTO film_directors (film_id, director_id) SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(film_id)
        .bind(&director_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn recompute_useful(
        tx: &mut Transaction<'_, Postgres>,
        review_id: ReviewId,
    ) -> AppResult<Review> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET useful = (
                SELECT COALESCE(SUM(CASE WHEN is_like THEN 1 ELSE -1 END), 0)
                FROM review_votes
                WHERE review_id = $1
            )
            WHERE review_id = $1
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_optional(&mut **tx)
        .await?;

        review.ok_or_else(|| AppError::review_not_found(review_id))
    }

    /// Holds a share lock on the user row so a concurrent delete waits for the edge write
    async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: UserId) -> AppResult<()> {
        let locked: Option<UserId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR SHARE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;
        locked
            .map(|_| ())
            .ok_or_else(|| AppError::user_not_found(user_id))
    }

    async fn lock_film(tx: &mut Transaction<'_, Postgres>, film_id: FilmId) -> AppResult<()> {
        let locked: Option<FilmId> =
            sqlx::query_scalar("SELECT id FROM films WHERE id = $1 FOR SHARE")
                .bind(film_id)
                .fetch_optional(&mut **tx)
                .await?;
        locked
            .map(|_| ())
            .ok_or_else(|| AppError::film_not_found(film_id))
    }

    async fn lock_review(tx: &mut Transaction<'_, Postgres>, review_id: ReviewId) -> AppResult<()> {
        let locked: Option<ReviewId> =
            sqlx::query_scalar("SELECT review_id FROM reviews WHERE review_id = $1 FOR UPDATE")
                .bind(review_id)
                .fetch_optional(&mut **tx)
                .await?;
        locked
            .map(|_| ())
            .ok_or_else(|| AppError::review_not_found(review_id))
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn create_user(&self, draft: UserDraft) -> AppResult<User> {
        let name = draft.display_name();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, login, name, birthday)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, login, name, birthday
            "#,
        )
        .bind(&draft.email)
        .bind(&draft.login)
        .bind(name)
        .bind(draft.birthday)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: UserId, draft: UserDraft) -> AppResult<Option<User>> {
        let name = draft.display_name();
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET email = $2, login = $3, name = $4, birthday = $5
            WHERE id = $1
            RETURNING id, email, login, name, birthday
            "#,
        )
        .bind(id)
        .bind(&draft.email)
        .bind(&draft.login)
        .bind(name)
        .bind(draft.birthday)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, login, name, birthday FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, login, name, birthday FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, login, name, birthday FROM users WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let voted: Vec<ReviewId> =
            sqlx::query_scalar("SELECT review_id FROM review_votes WHERE user_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        // Likes, friendships, reviews and votes cascade through foreign keys
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if deleted {
            for review_id in voted {
                // Reviews authored by the user are already gone
                match Self::recompute_useful(&mut tx, review_id).await {
                    Ok(_) | Err(AppError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        tx.commit().await?;
        Ok(deleted)
    }

    async fn create_film(&self, draft: FilmDraft) -> AppResult<Film> {
        let mut tx = self.pool.begin().await?;
        Self::check_references(&mut tx, &draft).await?;

        let film_id: FilmId = sqlx::query_scalar(
            r#"
            INSERT INTO films (title, description, release_date, duration, rating_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.release_date)
        .bind(draft.duration)
        .bind(draft.rating_id())
        .fetch_one(&mut *tx)
        .await?;

        Self::write_associations(&mut tx, film_id, &draft).await?;
        tx.commit().await?;

        self.fetch_film(film_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Film {} vanished after insert", film_id)))
    }

    async fn update_film(&self, id: FilmId, draft: FilmDraft) -> AppResult<Option<Film>> {
        let mut tx = self.pool.begin().await?;
        Self::check_references(&mut tx, &draft).await?;

        let updated = sqlx::query(
            r#"
            UPDATE films
            SET title = $2, description = $3, release_date = $4, duration = $5, rating_id = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.release_date)
        .bind(draft.duration)
        .bind(draft.rating_id())
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !updated {
            return Ok(None);
        }

        Self::write_associations(&mut tx, id, &draft).await?;
        tx.commit().await?;

        self.fetch_film(id).await
    }

    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        self.fetch_film(id).await
    }

    async fn list_films(&self) -> AppResult<Vec<Film>> {
        let rows = sqlx::query_as::<_, FilmRow>(&format!("{} ORDER BY f.id", FILM_SELECT))
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn films_by_ids(&self, ids: &[FilmId]) -> AppResult<Vec<Film>> {
        let rows = sqlx::query_as::<_, FilmRow>(&format!(
            "{} WHERE f.id = ANY($1) ORDER BY f.id",
            FILM_SELECT
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn delete_film(&self, id: FilmId) -> AppResult<bool> {
        // Likes, associations, reviews and their votes cascade
        let result = sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn list_ratings(&self) -> AppResult<Vec<RatingClassification>> {
        let ratings = sqlx::query_as::<_, RatingClassification>(
            "SELECT id, name FROM rating_classifications ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn get_rating(&self, id: RatingId) -> AppResult<Option<RatingClassification>> {
        let rating = sqlx::query_as::<_, RatingClassification>(
            "SELECT id, name FROM rating_classifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn create_director(&self, draft: DirectorDraft) -> AppResult<Director> {
        let director = sqlx::query_as::<_, Director>(
            "INSERT INTO directors (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&draft.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(director)
    }

    async fn update_director(
        &self,
        id: DirectorId,
        draft: DirectorDraft,
    ) -> AppResult<Option<Director>> {
        let director = sqlx::query_as::<_, Director>(
            "UPDATE directors SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(&draft.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(director)
    }

    async fn get_director(&self, id: DirectorId) -> AppResult<Option<Director>> {
        let director =
            sqlx::query_as::<_, Director>("SELECT id, name FROM directors WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(director)
    }

    async fn list_directors(&self) -> AppResult<Vec<Director>> {
        let directors = sqlx::query_as::<_, Director>("SELECT id, name FROM directors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(directors)
    }

    async fn delete_director(&self, id: DirectorId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM directors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_like(&self, user_id: UserId, film_id: FilmId) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        Self::lock_film(&mut tx, film_id).await?;
        Self::lock_user(&mut tx, user_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO film_likes (user_id, film_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, film_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(film_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, user_id: UserId, film_id: FilmId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM film_likes WHERE user_id = $1 AND film_id = $2")
            .bind(user_id)
            .bind(film_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<HashSet<FilmId>> {
        let ids: Vec<FilmId> =
            sqlx::query_scalar("SELECT film_id FROM film_likes WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn like_graph(&self) -> AppResult<LikeGraph> {
        let edges: Vec<(UserId, FilmId)> =
            sqlx::query_as("SELECT user_id, film_id FROM film_likes")
                .fetch_all(&self.pool)
                .await?;
        Ok(LikeGraph::from_edges(edges))
    }

    async fn like_counts(&self) -> AppResult<HashMap<FilmId, u64>> {
        let rows: Vec<(FilmId, i64)> =
            sqlx::query_as("SELECT film_id, COUNT(*) FROM film_likes GROUP BY film_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(film_id, count)| (film_id, count as u64))
            .collect())
    }

    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        Self::lock_user(&mut tx, user_id).await?;
        Self::lock_user(&mut tx, friend_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, friend_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM friendships WHERE user_id = $1 AND friend_id = $2")
                .bind(user_id)
                .bind(friend_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn friend_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        let ids: Vec<UserId> = sqlx::query_scalar(
            "SELECT friend_id FROM friendships WHERE user_id = $1 ORDER BY friend_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn create_review(&self, draft: ReviewDraft) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;
        Self::lock_user(&mut tx, draft.user_id).await?;
        Self::lock_film(&mut tx, draft.film_id).await?;

        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (content, is_positive, user_id, film_id, useful)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(&draft.content)
        .bind(draft.is_positive)
        .bind(draft.user_id)
        .bind(draft.film_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(review)
    }

    async fn update_review(&self, edit: ReviewEdit) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET content = $2, is_positive = $3 WHERE review_id = $1 RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(edit.review_id)
        .bind(&edit.content)
        .bind(edit.is_positive)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn get_review(&self, id: ReviewId) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE review_id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn delete_review(&self, id: ReviewId) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "DELETE FROM reviews WHERE review_id = $1 RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn list_reviews(&self, film_id: Option<FilmId>, limit: usize) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE $1::BIGINT IS NULL OR film_id = $1
            ORDER BY useful DESC, review_id ASC
            LIMIT $2
            "#,
            REVIEW_COLUMNS
        ))
        .bind(film_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn upsert_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        is_like: bool,
    ) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;
        Self::lock_review(&mut tx, review_id).await?;
        Self::lock_user(&mut tx, user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO review_votes (review_id, user_id, is_like)
            VALUES ($1, $2, $3)
            ON CONFLICT (review_id, user_id) DO UPDATE SET is_like = EXCLUDED.is_like
            "#,
        )
        .bind(review_id)
        .bind(user_id)
        .bind(is_like)
        .execute(&mut *tx)
        .await?;

        let review = Self::recompute_useful(&mut tx, review_id).await?;
        tx.commit().await?;
        Ok(review)
    }

    async fn delete_vote(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;
        Self::lock_review(&mut tx, review_id).await?;

        sqlx::query("DELETE FROM review_votes WHERE review_id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let review = Self::recompute_useful(&mut tx, review_id).await?;
        tx.commit().await?;
        Ok(review)
    }

    async fn append_event(&self, event: NewFeedEvent) -> AppResult<FeedEvent> {
        let event_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_feed (user_id, event_type, operation, entity_id, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING event_id
            "#,
        )
        .bind(event.user_id)
        .bind(event.event_type.to_string())
        .bind(event.operation.to_string())
        .bind(event.entity_id)
        .bind(event.timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(event.with_id(event_id))
    }

    async fn feed_of(&self, user_id: UserId) -> AppResult<Vec<FeedEvent>> {
        let rows = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT event_id, user_id, event_type, operation, entity_id, timestamp
            FROM user_feed
            WHERE user_id = $1
            ORDER BY timestamp ASC, event_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(FeedEvent::try_from).collect()
    }
}
