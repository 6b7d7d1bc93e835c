use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use super::popularity::rank_by_popularity;
use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::Film,
};

/// Film attribute a search query is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchField {
    Title,
    Director,
}

impl FromStr for SearchField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "director" => Ok(SearchField::Director),
            other => Err(AppError::InvalidInput(format!(
                "Unknown search field: {}",
                other
            ))),
        }
    }
}

/// Parses a comma-separated field list such as `title,director`
pub fn parse_fields(by: &str) -> AppResult<BTreeSet<SearchField>> {
    let fields = by
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(SearchField::from_str)
        .collect::<AppResult<BTreeSet<_>>>()?;

    if fields.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one search field is required".to_string(),
        ));
    }
    Ok(fields)
}

/// True when any selected field contains the lowercased needle
fn matches(film: &Film, needle: &str, fields: &BTreeSet<SearchField>) -> bool {
    fields.iter().any(|field| match field {
        SearchField::Title => film.title.to_lowercase().contains(needle),
        SearchField::Director => film
            .directors
            .iter()
            .any(|d| d.name.to_lowercase().contains(needle)),
    })
}

/// Case-insensitive substring search ordered by popularity
pub struct SearchRanker {
    store: Arc<dyn CatalogStore>,
}

impl SearchRanker {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, query: &str, by: &str) -> AppResult<Vec<Film>> {
        let fields = parse_fields(by)?;
        let needle = query.to_lowercase();

        let mut films: Vec<Film> = self
            .store
            .list_films()
            .await?
            .into_iter()
            .filter(|film| matches(film, &needle, &fields))
            .collect();

        let counts = self.store.like_counts().await?;
        rank_by_popularity(&mut films, &counts);

        tracing::info!(query, by, returned = films.len(), "Film search completed");
        Ok(films)
    }
}
