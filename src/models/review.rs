use serde::{Deserialize, Serialize};

use super::{FilmId, UserId};
use crate::error::{AppError, AppResult};

pub type ReviewId = i64;

/// Reviews returned when the caller gives no usable limit
pub const DEFAULT_REVIEW_LIMIT: usize = 10;

/// A user's review of a film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: ReviewId,
    pub content: String,
    pub is_positive: bool,
    pub user_id: UserId,
    pub film_id: FilmId,
    /// Likes minus dislikes over the review's current votes
    pub useful: i64,
}

/// Fields accepted when writing a review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub content: String,
    pub is_positive: bool,
    pub user_id: UserId,
    pub film_id: FilmId,
}

impl ReviewDraft {
    pub fn validate(self) -> AppResult<Self> {
        if self.content.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Review content cannot be blank".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Editable part of an existing review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEdit {
    pub review_id: ReviewId,
    pub content: String,
    pub is_positive: bool,
}

impl ReviewEdit {
    pub fn validate(self) -> AppResult<Self> {
        if self.content.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Review content cannot be blank".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Usefulness score for a set of votes: likes minus dislikes
pub fn usefulness<I>(votes: I) -> i64
where
    I: IntoIterator<Item = bool>,
{
    votes
        .into_iter()
        .map(|is_like| if is_like { 1 } else { -1 })
        .sum()
}

/// Resolves the caller-supplied review limit
pub fn effective_limit(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n > 0 => n as usize,
        _ => DEFAULT_REVIEW_LIMIT,
    }
}
