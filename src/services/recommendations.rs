use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    db::CatalogStore,
    error::AppResult,
    graph::LikeGraph,
    models::{Film, FilmId, UserId},
};

/// Neighbor-based collaborative filtering over a like-graph snapshot
///
/// Every other user who shares at least one liked film with `user_id`
/// contributes all of their liked films that `user_id` has not liked. The
/// result is the deduplicated union, ascending by film id.
///
/// This is the naive baseline: it visits every user and intersects their
/// liked set with the target's, so a call costs O(U · F) set operations and
/// serving every user is O(U² · F).
pub fn recommend(graph: &LikeGraph, user_id: UserId) -> BTreeSet<FilmId> {
    let mine = graph.liked_film_ids(user_id);
    if mine.is_empty() {
        return BTreeSet::new();
    }

    let mut candidates = BTreeSet::new();
    for (other_id, theirs) in graph.users() {
        if other_id == user_id || theirs.is_disjoint(&mine) {
            continue;
        }
        candidates.extend(theirs.difference(&mine).copied());
    }
    candidates
}

/// Personalized film suggestions
pub struct RecommendationEngine {
    store: Arc<dyn CatalogStore>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Recommended films; empty for unknown users or users without likes
    pub async fn recommendations(&self, user_id: UserId) -> AppResult<Vec<Film>> {
        let graph = self.store.like_graph().await?;
        let candidates: Vec<FilmId> = recommend(&graph, user_id).into_iter().collect();

        tracing::info!(
            user_id,
            users = graph.users().count(),
            candidates = candidates.len(),
            "Recommendations computed"
        );

        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        self.store.films_by_ids(&candidates).await
    }
}
