use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};

pub type FilmId = i64;
pub type GenreId = i64;
pub type DirectorId = i64;
pub type RatingId = i64;

/// Longest accepted film description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Release dates before the first public film screening are rejected
pub const EARLIEST_RELEASE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1895, 12, 28) {
    Some(date) => date,
    None => panic!("invalid earliest release date"),
};

/// Film genre reference entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Film director reference entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct Director {
    pub id: DirectorId,
    pub name: String,
}

/// Age rating classification (G, PG, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct RatingClassification {
    pub id: RatingId,
    pub name: String,
}

/// Reference to a shared entity by id, as sent by clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub id: i64,
}

/// A film with its associations resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Duration in minutes
    pub duration: i32,
    pub mpa: Option<RatingClassification>,
    /// Sorted by id, unique
    pub genres: Vec<Genre>,
    /// Sorted by id, unique
    pub directors: Vec<Director>,
}

impl Film {
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }

    pub fn has_genre(&self, genre_id: GenreId) -> bool {
        self.genres.iter().any(|g| g.id == genre_id)
    }

    pub fn has_director(&self, director_id: DirectorId) -> bool {
        self.directors.iter().any(|d| d.id == director_id)
    }
}

/// Fields accepted when creating or replacing a film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilmDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    #[serde(default)]
    pub mpa: Option<EntityRef>,
    #[serde(default)]
    pub genres: Vec<EntityRef>,
    #[serde(default)]
    pub directors: Vec<EntityRef>,
}

impl FilmDraft {
    pub fn validate(self) -> AppResult<Self> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidInput("Film title must be set".to_string()));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::InvalidInput(format!(
                "Film description must not exceed {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
        if self.release_date < EARLIEST_RELEASE_DATE {
            return Err(AppError::InvalidInput(format!(
                "Release date must not be earlier than {}",
                EARLIEST_RELEASE_DATE
            )));
        }
        if self.duration <= 0 {
            return Err(AppError::InvalidInput(
                "Film duration must be positive".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn rating_id(&self) -> Option<RatingId> {
        self.mpa.map(|r| r.id)
    }

    /// Genre ids, deduplicated and sorted
    pub fn genre_ids(&self) -> BTreeSet<GenreId> {
        self.genres.iter().map(|g| g.id).collect()
    }

    /// Director ids, deduplicated and sorted
    pub fn director_ids(&self) -> BTreeSet<DirectorId> {
        self.directors.iter().map(|d| d.id).collect()
    }
}

/// Fields accepted when creating or renaming a director
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectorDraft {
    pub name: String,
}

impl DirectorDraft {
    pub fn validate(self) -> AppResult<Self> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Director name must not be blank".to_string(),
            ));
        }
        Ok(self)
    }
}
