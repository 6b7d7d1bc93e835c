use std::sync::Arc;

use super::{require_film, require_user, FeedLog};
use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{
        review::effective_limit, EventType, FilmId, Operation, Review, ReviewDraft, ReviewEdit,
        ReviewId, UserId,
    },
};

/// Review lifecycle and usefulness voting
///
/// A review's usefulness is recomputed by the store from the live votes on
/// every vote change; this service never adjusts it incrementally.
pub struct ReviewScoring {
    store: Arc<dyn CatalogStore>,
    feed: Arc<FeedLog>,
}

impl ReviewScoring {
    pub fn new(store: Arc<dyn CatalogStore>, feed: Arc<FeedLog>) -> Self {
        Self { store, feed }
    }

    pub async fn add_review(&self, draft: ReviewDraft) -> AppResult<Review> {
        let draft = draft.validate()?;
        require_user(self.store.as_ref(), draft.user_id).await?;
        require_film(self.store.as_ref(), draft.film_id).await?;

        let review = self.store.create_review(draft).await?;
        tracing::info!(
            review_id = review.review_id,
            user_id = review.user_id,
            film_id = review.film_id,
            "Review added"
        );

        self.feed
            .append(review.user_id, EventType::Review, Operation::Add, review.review_id)
            .await?;
        Ok(review)
    }

    /// Replaces content and polarity; author, film and usefulness are kept
    pub async fn update_review(&self, edit: ReviewEdit) -> AppResult<Review> {
        let edit = edit.validate()?;
        let review_id = edit.review_id;

        let review = self
            .store
            .update_review(edit)
            .await?
            .ok_or_else(|| AppError::review_not_found(review_id))?;
        tracing::info!(review_id, "Review updated");

        self.feed
            .append(review.user_id, EventType::Review, Operation::Update, review_id)
            .await?;
        Ok(review)
    }

    pub async fn delete_review(&self, review_id: ReviewId) -> AppResult<()> {
        let removed = self
            .store
            .delete_review(review_id)
            .await?
            .ok_or_else(|| AppError::review_not_found(review_id))?;
        tracing::info!(review_id, user_id = removed.user_id, "Review deleted");

        self.feed
            .append(removed.user_id, EventType::Review, Operation::Remove, review_id)
            .await?;
        Ok(())
    }

    pub async fn get_review(&self, review_id: ReviewId) -> AppResult<Review> {
        self.store
            .get_review(review_id)
            .await?
            .ok_or_else(|| AppError::review_not_found(review_id))
    }

    /// Most useful first; `count` falls back to the default when absent or non-positive
    pub async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        count: Option<i64>,
    ) -> AppResult<Vec<Review>> {
        self.store.list_reviews(film_id, effective_limit(count)).await
    }

    /// Records or overwrites the user's vote on a review
    pub async fn vote(&self, review_id: ReviewId, user_id: UserId, is_like: bool) -> AppResult<Review> {
        require_user(self.store.as_ref(), user_id).await?;

        let review = self.store.upsert_vote(review_id, user_id, is_like).await?;
        tracing::info!(review_id, user_id, is_like, useful = review.useful, "Review vote recorded");

        self.feed
            .append(user_id, EventType::Review, Operation::Add, review_id)
            .await?;
        Ok(review)
    }

    /// Drops the user's vote whatever its polarity
    ///
    /// `is_like` only records which endpoint was called; a like can be removed
    /// through the dislike route and the other way round.
    pub async fn remove_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        is_like: bool,
    ) -> AppResult<Review> {
        require_user(self.store.as_ref(), user_id).await?;

        let review = self.store.delete_vote(review_id, user_id).await?;
        tracing::info!(review_id, user_id, is_like, useful = review.useful, "Review vote removed");

        self.feed
            .append(user_id, EventType::Review, Operation::Remove, review_id)
            .await?;
        Ok(review)
    }
}
