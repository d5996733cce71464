use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{
        Favorite, ListCounts, ListEntry, ListKind, MediaType, NewFavorite, NewUser, RecentEntry,
        TmdbId, User,
    },
};

/// In-process user store used when no database is configured, and by tests.
///
/// Data is lost on restart. Rows are kept in insertion order so "newest
/// first" is a reverse scan.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<MemoryUserStoreInner>,
}

#[derive(Default)]
struct MemoryUserStoreInner {
    users: HashMap<String, User>,
    favorites: Vec<Favorite>,
    movies: Vec<ListEntry>,
    series: Vec<ListEntry>,
    recents: Vec<RecentEntry>,
}

impl MemoryUserStoreInner {
    fn list(&self, kind: ListKind) -> &Vec<ListEntry> {
        match kind {
            ListKind::Movies => &self.movies,
            ListKind::Series => &self.series,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<ListEntry> {
        match kind {
            ListKind::Movies => &mut self.movies,
            ListKind::Series => &mut self.series,
        }
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.insert(created.username.clone(), created.clone());
        Ok(created)
    }

    async fn favorites(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        let inner = self.inner.read().await;
        let mut favorites: Vec<Favorite> = inner
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by_key(|f| f.position);
        Ok(favorites)
    }

    async fn put_favorite(&self, user_id: Uuid, favorite: NewFavorite) -> AppResult<Favorite> {
        let mut inner = self.inner.write().await;
        inner
            .favorites
            .retain(|f| !(f.user_id == user_id && f.position == favorite.position));

        let created = Favorite {
            id: Uuid::new_v4(),
            user_id,
            tmdb_id: favorite.tmdb_id,
            media_type: favorite.media_type,
            label: favorite.label,
            position: favorite.position,
            created_at: Utc::now(),
        };
        inner.favorites.push(created.clone());
        Ok(created)
    }

    async fn list_entries(&self, user_id: Uuid, kind: ListKind) -> AppResult<Vec<ListEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .list(kind)
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn has_list_entry(
        &self,
        user_id: Uuid,
        kind: ListKind,
        tmdb_id: TmdbId,
    ) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .list(kind)
            .iter()
            .any(|e| e.user_id == user_id && e.tmdb_id == tmdb_id))
    }

    async fn add_list_entry(
        &self,
        user_id: Uuid,
        kind: ListKind,
        tmdb_id: TmdbId,
        label: Option<String>,
    ) -> AppResult<ListEntry> {
        let mut inner = self.inner.write().await;
        if inner
            .list(kind)
            .iter()
            .any(|e| e.user_id == user_id && e.tmdb_id == tmdb_id)
        {
            return Err(AppError::InvalidInput(kind.duplicate_message().to_string()));
        }

        let entry = ListEntry {
            id: Uuid::new_v4(),
            user_id,
            tmdb_id,
            label,
            created_at: Utc::now(),
        };
        inner.list_mut(kind).push(entry.clone());
        Ok(entry)
    }

    async fn recents(
        &self,
        user_id: Uuid,
        media_type: Option<MediaType>,
        limit: Option<i64>,
    ) -> AppResult<Vec<RecentEntry>> {
        let inner = self.inner.read().await;
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
        Ok(inner
            .recents
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .filter(|r| media_type.map_or(true, |m| r.media_type == m))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn add_recent(
        &self,
        user_id: Uuid,
        tmdb_id: TmdbId,
        media_type: MediaType,
    ) -> AppResult<RecentEntry> {
        let mut inner = self.inner.write().await;
        let entry = RecentEntry {
            id: Uuid::new_v4(),
            user_id,
            tmdb_id,
            media_type,
            created_at: Utc::now(),
        };
        inner.recents.push(entry.clone());
        Ok(entry)
    }

    async fn counts(&self, user_id: Uuid) -> AppResult<ListCounts> {
        let inner = self.inner.read().await;
        let count = |entries: &[ListEntry]| {
            entries.iter().filter(|e| e.user_id == user_id).count() as i64
        };

        Ok(ListCounts {
            movie_count: count(&inner.movies),
            series_count: count(&inner.series),
            favorite_count: inner
                .favorites
                .iter()
                .filter(|f| f.user_id == user_id)
                .count() as i64,
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_user() -> (MemoryUserStore, Uuid) {
        let store = MemoryUserStore::new();
        let user = store
            .create_user(NewUser {
                username: "neo".to_string(),
                email: "neo@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        (store, user.id)
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (store, _) = store_with_user().await;
        let result = store
            .create_user(NewUser {
                username: "neo".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_put_favorite_replaces_slot() {
        let (store, user_id) = store_with_user().await;

        let favorite = |tmdb_id, position| NewFavorite {
            tmdb_id,
            media_type: MediaType::Movie,
            label: None,
            position,
        };

        store.put_favorite(user_id, favorite(10, 2)).await.unwrap();
        store.put_favorite(user_id, favorite(11, 0)).await.unwrap();
        store.put_favorite(user_id, favorite(12, 2)).await.unwrap();

        let favorites = store.favorites(user_id).await.unwrap();
        let ids: Vec<(i32, TmdbId)> = favorites.iter().map(|f| (f.position, f.tmdb_id)).collect();
        assert_eq!(ids, vec![(0, 11), (2, 12)]);
    }

    #[tokio::test]
    async fn test_add_list_entry_rejects_duplicate() {
        let (store, user_id) = store_with_user().await;

        store
            .add_list_entry(user_id, ListKind::Series, 1396, None)
            .await
            .unwrap();
        let duplicate = store
            .add_list_entry(user_id, ListKind::Series, 1396, None)
            .await;
        assert!(
            matches!(duplicate, Err(AppError::InvalidInput(msg)) if msg == "Already in series list")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_list_adds_store_one_entry() {
        let (store, user_id) = store_with_user().await;
        let store = std::sync::Arc::new(store);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .add_list_entry(user_id, ListKind::Movies, 603, None)
                        .await
                })
            })
            .collect();

        let mut stored = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => stored += 1,
                Err(e) => assert!(matches!(e, AppError::InvalidInput(_))),
            }
        }

        assert_eq!(stored, 1);
        assert_eq!(
            store.list_entries(user_id, ListKind::Movies).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_list_entries_newest_first_and_isolated_by_kind() {
        let (store, user_id) = store_with_user().await;

        store
            .add_list_entry(user_id, ListKind::Movies, 1, None)
            .await
            .unwrap();
        store
            .add_list_entry(user_id, ListKind::Movies, 2, None)
            .await
            .unwrap();
        store
            .add_list_entry(user_id, ListKind::Series, 3, None)
            .await
            .unwrap();

        let movies = store.list_entries(user_id, ListKind::Movies).await.unwrap();
        assert_eq!(movies.iter().map(|e| e.tmdb_id).collect::<Vec<_>>(), vec![2, 1]);

        assert!(store.has_list_entry(user_id, ListKind::Series, 3).await.unwrap());
        assert!(!store.has_list_entry(user_id, ListKind::Movies, 3).await.unwrap());

        let counts = store.counts(user_id).await.unwrap();
        assert_eq!(counts.movie_count, 2);
        assert_eq!(counts.series_count, 1);
        assert_eq!(counts.favorite_count, 0);
    }

    #[tokio::test]
    async fn test_recents_filter_and_limit() {
        let (store, user_id) = store_with_user().await;

        for (id, media_type) in [
            (1, MediaType::Movie),
            (2, MediaType::Tv),
            (3, MediaType::Movie),
            (4, MediaType::Movie),
        ] {
            store.add_recent(user_id, id, media_type).await.unwrap();
        }

        let latest = store.recents(user_id, None, Some(2)).await.unwrap();
        assert_eq!(latest.iter().map(|r| r.tmdb_id).collect::<Vec<_>>(), vec![4, 3]);

        let movies = store
            .recents(user_id, Some(MediaType::Movie), None)
            .await
            .unwrap();
        assert_eq!(movies.iter().map(|r| r.tmdb_id).collect::<Vec<_>>(), vec![4, 3, 1]);

        let other = store.recents(Uuid::new_v4(), None, None).await.unwrap();
        assert!(other.is_empty());
    }
}
