use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Favorite, ListCounts, ListEntry, ListKind, MediaType, NewFavorite, NewUser, RecentEntry,
        TmdbId, User,
    },
};

/// Persistence for accounts and per-user list memberships
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, username: &str) -> AppResult<Option<User>>;

    /// Inserts a new account. Fails with `Conflict` if the username is taken.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Favorites ordered by slot position, lowest first
    async fn favorites(&self, user_id: Uuid) -> AppResult<Vec<Favorite>>;

    /// Stores a favorite, replacing whatever occupied the same slot
    async fn put_favorite(&self, user_id: Uuid, favorite: NewFavorite) -> AppResult<Favorite>;

    /// Movie or series list entries, newest first
    async fn list_entries(&self, user_id: Uuid, kind: ListKind) -> AppResult<Vec<ListEntry>>;

    async fn has_list_entry(&self, user_id: Uuid, kind: ListKind, tmdb_id: TmdbId)
        -> AppResult<bool>;

    async fn add_list_entry(
        &self,
        user_id: Uuid,
        kind: ListKind,
        tmdb_id: TmdbId,
        label: Option<String>,
    ) -> AppResult<ListEntry>;

    /// Recently viewed titles, newest first, optionally narrowed and capped
    async fn recents(
        &self,
        user_id: Uuid,
        media_type: Option<MediaType>,
        limit: Option<i64>,
    ) -> AppResult<Vec<RecentEntry>>;

    async fn add_recent(
        &self,
        user_id: Uuid,
        tmdb_id: TmdbId,
        media_type: MediaType,
    ) -> AppResult<RecentEntry>;

    async fn counts(&self, user_id: Uuid) -> AppResult<ListCounts>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
