use std::collections::{HashMap, HashSet};

use crate::models::{FilmId, UserId};

/// Bipartite user → film like incidence
///
/// An edge is a boolean fact; a film's like count is the number of users
/// whose liked-set contains it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeGraph {
    by_user: HashMap<UserId, HashSet<FilmId>>,
}

impl LikeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from (user, film) edges; repeated edges collapse
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (UserId, FilmId)>,
    {
        let mut graph = Self::new();
        for (user_id, film_id) in edges {
            graph.insert(user_id, film_id);
        }
        graph
    }

    /// Adds an edge, returning false if it was already present
    pub fn insert(&mut self, user_id: UserId, film_id: FilmId) -> bool {
        self.by_user.entry(user_id).or_default().insert(film_id)
    }

    /// Removes an edge, returning false if it was absent
    pub fn remove(&mut self, user_id: UserId, film_id: FilmId) -> bool {
        let Some(films) = self.by_user.get_mut(&user_id) else {
            return false;
        };
        let removed = films.remove(&film_id);
        if films.is_empty() {
            self.by_user.remove(&user_id);
        }
        removed
    }

    pub fn contains(&self, user_id: UserId, film_id: FilmId) -> bool {
        self.by_user
            .get(&user_id)
            .is_some_and(|films| films.contains(&film_id))
    }

    /// Films liked by a user; empty for unknown users
    pub fn liked_film_ids(&self, user_id: UserId) -> HashSet<FilmId> {
        self.by_user.get(&user_id).cloned().unwrap_or_default()
    }

    /// Iterates every user with at least one like, with their liked set
    pub fn users(&self) -> impl Iterator<Item = (UserId, &HashSet<FilmId>)> {
        self.by_user.iter().map(|(user_id, films)| (*user_id, films))
    }

    /// Like count per film, only for films with at least one like
    pub fn like_counts(&self) -> HashMap<FilmId, u64> {
        let mut counts = HashMap::new();
        for films in self.by_user.values() {
            for film_id in films {
                *counts.entry(*film_id).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Drops every edge pointing at a film
    pub fn remove_film(&mut self, film_id: FilmId) {
        self.by_user.retain(|_, films| {
            films.remove(&film_id);
            !films.is_empty()
        });
    }

    /// Drops every edge leaving a user
    pub fn remove_user(&mut self, user_id: UserId) {
        self.by_user.remove(&user_id);
    }

    pub fn edge_count(&self) -> usize {
        self.by_user.values().map(HashSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut graph = LikeGraph::new();
        assert!(graph.insert(1, 10));
        assert!(!graph.insert(1, 10));
        assert_eq!(graph.liked_film_ids(1), HashSet::from([10]));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_missing_edge_returns_false() {
        let mut graph = LikeGraph::from_edges([(1, 10)]);
        assert!(!graph.remove(1, 11));
        assert!(!graph.remove(2, 10));
        assert!(graph.remove(1, 10));
        assert!(graph.liked_film_ids(1).is_empty());
    }

    #[test]
    fn test_like_counts() {
        let graph = LikeGraph::from_edges([(1, 10), (2, 10), (2, 11), (1, 10)]);
        let counts = graph.like_counts();
        assert_eq!(counts.get(&10), Some(&2));
        assert_eq!(counts.get(&11), Some(&1));
        assert_eq!(counts.get(&12), None);
    }

    #[test]
    fn test_remove_film_cascades_across_users() {
        let mut graph = LikeGraph::from_edges([(1, 10), (2, 10), (2, 11)]);
        graph.remove_film(10);
        assert!(!graph.contains(1, 10));
        assert!(!graph.contains(2, 10));
        assert!(graph.contains(2, 11));
        assert_eq!(graph.users().count(), 1);
    }

    #[test]
    fn test_remove_user() {
        let mut graph = LikeGraph::from_edges([(1, 10), (2, 10)]);
        graph.remove_user(1);
        assert_eq!(graph.like_counts().get(&10), Some(&1));
    }
}
