use std::sync::Arc;

use super::{require_film, require_user};
use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{Director, DirectorDraft, DirectorId, Film, FilmDraft, FilmId, User, UserDraft, UserId},
};

/// CRUD for users, films and directors
///
/// Deletes cascade through the store: a removed user loses likes,
/// friendships, reviews and votes; a removed film loses likes, reviews and
/// associations; a removed director is detached from its films. Feed events
/// are kept.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, draft: UserDraft) -> AppResult<User> {
        let user = self.store.create_user(draft.validate()?).await?;
        tracing::info!(user_id = user.id, login = %user.login, "User created");
        Ok(user)
    }

    pub async fn update_user(&self, id: UserId, draft: UserDraft) -> AppResult<User> {
        let user = self
            .store
            .update_user(id, draft.validate()?)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))?;
        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> AppResult<User> {
        require_user(self.store.as_ref(), id).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.list_users().await
    }

    pub async fn delete_user(&self, id: UserId) -> AppResult<()> {
        if !self.store.delete_user(id).await? {
            return Err(AppError::user_not_found(id));
        }
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn create_film(&self, draft: FilmDraft) -> AppResult<Film> {
        let film = self.store.create_film(draft.validate()?).await?;
        tracing::info!(film_id = film.id, title = %film.title, "Film created");
        Ok(film)
    }

    pub async fn update_film(&self, id: FilmId, draft: FilmDraft) -> AppResult<Film> {
        let film = self
            .store
            .update_film(id, draft.validate()?)
            .await?
            .ok_or_else(|| AppError::film_not_found(id))?;
        tracing::info!(film_id = id, "Film updated");
        Ok(film)
    }

    pub async fn get_film(&self, id: FilmId) -> AppResult<Film> {
        require_film(self.store.as_ref(), id).await
    }

    pub async fn list_films(&self) -> AppResult<Vec<Film>> {
        self.store.list_films().await
    }

    pub async fn delete_film(&self, id: FilmId) -> AppResult<()> {
        if !self.store.delete_film(id).await? {
            return Err(AppError::film_not_found(id));
        }
        tracing::info!(film_id = id, "Film deleted");
        Ok(())
    }

    pub async fn create_director(&self, draft: DirectorDraft) -> AppResult<Director> {
        let director = self.store.create_director(draft.validate()?).await?;
        tracing::info!(director_id = director.id, "Director created");
        Ok(director)
    }

    pub async fn update_director(&self, id: DirectorId, draft: DirectorDraft) -> AppResult<Director> {
        self.store
            .update_director(id, draft.validate()?)
            .await?
            .ok_or_else(|| AppError::director_not_found(id))
    }

    pub async fn get_director(&self, id: DirectorId) -> AppResult<Director> {
        self.store
            .get_director(id)
            .await?
            .ok_or_else(|| AppError::director_not_found(id))
    }

    pub async fn list_directors(&self) -> AppResult<Vec<Director>> {
        self.store.list_directors().await
    }

    pub async fn delete_director(&self, id: DirectorId) -> AppResult<()> {
        if !self.store.delete_director(id).await? {
            return Err(AppError::director_not_found(id));
        }
        tracing::info!(director_id = id, "Director deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::InMemoryStore,
        models::EntityRef,
        services::fixtures::{film_draft, user_draft},
    };

    fn service() -> (Arc<InMemoryStore>, CatalogService) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), CatalogService::new(store))
    }

    #[tokio::test]
    async fn test_blank_name_defaults_to_login() {
        let (_, catalog) = service();
        let mut draft = user_draft("neo");
        draft.name = Some("  ".to_string());

        let user = catalog.create_user(draft).await.unwrap();

        assert_eq!(user.name, "neo");
    }

    #[tokio::test]
    async fn test_login_with_space_rejected() {
        let (_, catalog) = service();
        let draft = user_draft("mr anderson");
        assert!(matches!(
            catalog.create_user(draft).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let (_, catalog) = service();
        assert!(matches!(
            catalog.update_user(5, user_draft("ghost")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_film_with_unknown_genre_is_not_found() {
        let (_, catalog) = service();
        let mut draft = film_draft("Alien");
        draft.genres = vec![EntityRef { id: 99 }];
        assert!(matches!(
            catalog.create_film(draft).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deleting_film_drops_its_likes() {
        let (store, catalog) = service();
        let user = catalog.create_user(user_draft("ripley")).await.unwrap();
        let film = catalog.create_film(film_draft("Aliens")).await.unwrap();
        store.add_like(user.id, film.id).await.unwrap();

        catalog.delete_film(film.id).await.unwrap();

        assert!(store.liked_film_ids(user.id).await.unwrap().is_empty());
        assert!(matches!(
            catalog.get_film(film.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deleting_director_detaches_films() {
        let (_, catalog) = service();
        let director = catalog
            .create_director(DirectorDraft {
                name: "Ridley Scott".to_string(),
            })
            .await
            .unwrap();
        let mut draft = film_draft("Alien");
        draft.directors = vec![EntityRef { id: director.id }];
        let film = catalog.create_film(draft).await.unwrap();

        catalog.delete_director(director.id).await.unwrap();

        assert!(catalog.get_film(film.id).await.unwrap().directors.is_empty());
        assert!(matches!(
            catalog.delete_director(director.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
