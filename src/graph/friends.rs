use std::collections::{BTreeSet, HashMap};

use crate::models::UserId;

/// Directed friendship edges, keyed by the user who added the friend
///
/// A → B does not imply B → A; each direction is added and removed on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendGraph {
    outgoing: HashMap<UserId, BTreeSet<UserId>>,
}

impl FriendGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (UserId, UserId)>,
    {
        let mut graph = Self::new();
        for (user_id, friend_id) in edges {
            graph.insert(user_id, friend_id);
        }
        graph
    }

    /// Adds the edge user → friend, returning false if it was already present
    pub fn insert(&mut self, user_id: UserId, friend_id: UserId) -> bool {
        self.outgoing.entry(user_id).or_default().insert(friend_id)
    }

    /// Removes the edge user → friend, returning false if it was absent
    pub fn remove(&mut self, user_id: UserId, friend_id: UserId) -> bool {
        let Some(friends) = self.outgoing.get_mut(&user_id) else {
            return false;
        };
        let removed = friends.remove(&friend_id);
        if friends.is_empty() {
            self.outgoing.remove(&user_id);
        }
        removed
    }

    pub fn contains(&self, user_id: UserId, friend_id: UserId) -> bool {
        self.outgoing
            .get(&user_id)
            .is_some_and(|friends| friends.contains(&friend_id))
    }

    /// Targets of the user's outgoing edges, ascending
    pub fn friends_of(&self, user_id: UserId) -> Vec<UserId> {
        self.outgoing
            .get(&user_id)
            .map(|friends| friends.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Intersection of both users' outgoing edges, ascending
    pub fn common_friends(&self, user_id: UserId, other_id: UserId) -> Vec<UserId> {
        if user_id == other_id {
            return Vec::new();
        }
        match (self.outgoing.get(&user_id), self.outgoing.get(&other_id)) {
            (Some(left), Some(right)) => left.intersection(right).copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Drops every edge into or out of a user
    pub fn remove_user(&mut self, user_id: UserId) {
        self.outgoing.remove(&user_id);
        self.outgoing.retain(|_, friends| {
            friends.remove(&user_id);
            !friends.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_directed() {
        let mut graph = FriendGraph::new();
        assert!(graph.insert(1, 2));
        assert!(graph.contains(1, 2));
        assert!(!graph.contains(2, 1));
        assert!(graph.friends_of(2).is_empty());
    }

    #[test]
    fn test_duplicate_insert_returns_false() {
        let mut graph = FriendGraph::from_edges([(1, 2)]);
        assert!(!graph.insert(1, 2));
        assert_eq!(graph.friends_of(1), vec![2]);
    }

    #[test]
    fn test_common_friends_intersection() {
        let graph = FriendGraph::from_edges([(1, 3), (1, 4), (2, 3), (2, 5)]);
        assert_eq!(graph.common_friends(1, 2), vec![3]);
    }

    #[test]
    fn test_common_friends_with_self_is_empty() {
        let graph = FriendGraph::from_edges([(1, 3), (1, 4)]);
        assert!(graph.common_friends(1, 1).is_empty());
    }

    #[test]
    fn test_directed_edges_make_friend_lists_asymmetric() {
        // 2 follows 1 and 3; 1 follows only 3
        let graph = FriendGraph::from_edges([(1, 3), (2, 3), (2, 1)]);
        assert!(graph.friends_of(2).contains(&1));
        assert!(!graph.friends_of(1).contains(&2));
        // 1 shows up for 2 but never as a common friend of 1 with anyone
        assert_eq!(graph.common_friends(2, 3), Vec::<UserId>::new());
        assert_eq!(graph.common_friends(1, 2), vec![3]);
    }

    #[test]
    fn test_common_friends_is_commutative_over_outgoing_sets() {
        let graph = FriendGraph::from_edges([(1, 3), (1, 4), (2, 4), (2, 1), (4, 1)]);
        assert_eq!(graph.common_friends(1, 2), graph.common_friends(2, 1));
        assert_eq!(graph.common_friends(1, 2), vec![4]);
    }

    #[test]
    fn test_remove_user_drops_both_directions() {
        let mut graph = FriendGraph::from_edges([(1, 2), (2, 1), (3, 1)]);
        graph.remove_user(1);
        assert!(graph.friends_of(1).is_empty());
        assert!(graph.friends_of(2).is_empty());
        assert!(graph.friends_of(3).is_empty());
    }

    #[test]
    fn test_remove_missing_edge_returns_false() {
        let mut graph = FriendGraph::from_edges([(1, 2)]);
        assert!(!graph.remove(2, 1));
        assert!(graph.remove(1, 2));
    }
}
