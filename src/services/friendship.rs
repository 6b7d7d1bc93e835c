use std::sync::Arc;

use super::{require_user, FeedLog};
use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    graph::FriendGraph,
    models::{EventType, Operation, User, UserId},
};

/// Directed friendships and the mutual-friend query
///
/// Adding B as a friend of A creates only the edge (A, B); B's friend list is
/// unchanged until B adds A.
pub struct FriendshipService {
    store: Arc<dyn CatalogStore>,
    feed: Arc<FeedLog>,
}

impl FriendshipService {
    pub fn new(store: Arc<dyn CatalogStore>, feed: Arc<FeedLog>) -> Self {
        Self { store, feed }
    }

    pub async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), friend_id).await?;

        if user_id == friend_id {
            tracing::warn!(user_id, "Rejected self-friendship");
            return Err(AppError::Duplicate(format!(
                "User {} cannot befriend themselves",
                user_id
            )));
        }

        if !self.store.add_friend(user_id, friend_id).await? {
            return Err(AppError::Duplicate(format!(
                "User {} already has user {} as a friend",
                user_id, friend_id
            )));
        }
        tracing::info!(user_id, friend_id, "Friend added");

        self.feed
            .append(user_id, EventType::Friend, Operation::Add, friend_id)
            .await?;
        Ok(())
    }

    /// Removes the directed edge; a missing edge is a no-op
    pub async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), friend_id).await?;

        let removed = self.store.remove_friend(user_id, friend_id).await?;
        tracing::info!(user_id, friend_id, removed, "Friend removed");

        self.feed
            .append(user_id, EventType::Friend, Operation::Remove, friend_id)
            .await?;
        Ok(())
    }

    /// Targets of the user's outgoing edges, ascending by id
    pub async fn friends_of(&self, user_id: UserId) -> AppResult<Vec<User>> {
        require_user(self.store.as_ref(), user_id).await?;
        let ids = self.store.friend_ids(user_id).await?;
        self.store.users_by_ids(&ids).await
    }

    pub async fn common_friends(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<User>> {
        require_user(self.store.as_ref(), user_id).await?;
        require_user(self.store.as_ref(), other_id).await?;

        if user_id == other_id {
            return Ok(Vec::new());
        }

        let mut edges = Vec::new();
        for owner in [user_id, other_id] {
            let friends = self.store.friend_ids(owner).await?;
            edges.extend(friends.into_iter().map(|friend| (owner, friend)));
        }
        let graph = FriendGraph::from_edges(edges);

        let common = graph.common_friends(user_id, other_id);
        tracing::debug!(user_id, other_id, count = common.len(), "Common friends computed");

        self.store.users_by_ids(&common).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::InMemoryStore, services::fixtures::user_draft};

    async fn setup(count: usize) -> (Arc<InMemoryStore>, FriendshipService, Vec<UserId>) {
        let store = Arc::new(InMemoryStore::new());
        let mut ids = Vec::new();
        for i in 0..count {
            let user = store
                .create_user(user_draft(&format!("member{}", i)))
                .await
                .unwrap();
            ids.push(user.id);
        }
        let feed = Arc::new(FeedLog::new(store.clone()));
        (store.clone(), FriendshipService::new(store, feed), ids)
    }

    fn ids(users: &[User]) -> Vec<UserId> {
        users.iter().map(|u| u.id).collect()
    }

    #[tokio::test]
    async fn test_friendship_is_one_directional() {
        let (_, friends, users) = setup(2).await;

        friends.add_friend(users[0], users[1]).await.unwrap();

        assert_eq!(ids(&friends.friends_of(users[0]).await.unwrap()), vec![users[1]]);
        assert!(friends.friends_of(users[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_friendship_is_duplicate() {
        let (_, friends, users) = setup(1).await;
        assert!(matches!(
            friends.add_friend(users[0], users[0]).await,
            Err(AppError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_existing_edge_is_duplicate_and_not_logged_twice() {
        let (store, friends, users) = setup(2).await;

        friends.add_friend(users[0], users[1]).await.unwrap();
        let second = friends.add_friend(users[0], users[1]).await;

        assert!(matches!(second, Err(AppError::Duplicate(_))));
        assert_eq!(store.feed_of(users[0]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_edge_is_noop_but_logged() {
        let (store, friends, users) = setup(2).await;

        friends.remove_friend(users[0], users[1]).await.unwrap();

        let feed = store.feed_of(users[0]).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].event_type, EventType::Friend);
        assert_eq!(feed[0].operation, Operation::Remove);
        assert_eq!(feed[0].entity_id, users[1]);
    }

    #[tokio::test]
    async fn test_common_friends_with_self_is_empty() {
        let (_, friends, users) = setup(2).await;
        friends.add_friend(users[0], users[1]).await.unwrap();

        assert!(friends
            .common_friends(users[0], users[0])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_common_friends_intersects_outgoing_sets() {
        let (_, friends, users) = setup(4).await;
        let (a, b, c, d) = (users[0], users[1], users[2], users[3]);
        friends.add_friend(a, c).await.unwrap();
        friends.add_friend(a, d).await.unwrap();
        friends.add_friend(b, c).await.unwrap();
        // d -> a does not make a a friend of b
        friends.add_friend(d, a).await.unwrap();

        assert_eq!(ids(&friends.common_friends(a, b).await.unwrap()), vec![c]);
        assert_eq!(ids(&friends.common_friends(b, a).await.unwrap()), vec![c]);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (_, friends, users) = setup(1).await;
        assert!(matches!(
            friends.add_friend(users[0], 404).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            friends.friends_of(404).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            friends.common_friends(404, users[0]).await,
            Err(AppError::NotFound(_))
        ));
    }
}
