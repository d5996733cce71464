//! Per-user lists: favorites, watched movies, watched series and recents.
//!
//! Users are addressed by username. Stored entries only hold TMDB ids, so
//! anything shown with artwork is resolved against the catalog on the way out.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{
        Favorite, ListCounts, ListEntry, ListKind, MediaType, NewFavorite, RecentEntry,
        ResolvedMedia, TmdbId, User,
    },
    services::providers::{resolve_media_batch, CatalogProvider},
};

/// Number of recents returned by the profile summary
pub const RECENTS_LIMIT: i64 = 4;

/// Result of pinning a favorite
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteAdded {
    pub favorite: Favorite,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_item: Option<ResolvedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn require_user(store: &dyn UserStore, username: &str) -> AppResult<User> {
    store
        .find_user(username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Favorites in slot order, each resolved to its catalog record
pub async fn favorites(
    store: &dyn UserStore,
    provider: Arc<dyn CatalogProvider>,
    username: &str,
) -> AppResult<Vec<ResolvedMedia>> {
    let user = require_user(store, username).await?;
    let entries = store
        .favorites(user.id)
        .await?
        .into_iter()
        .map(|f| (f.tmdb_id, f.media_type, f.label))
        .collect();

    Ok(resolve_media_batch(provider, entries).await)
}

/// Pins a title into `slot`, evicting whatever was there
pub async fn set_favorite(
    store: &dyn UserStore,
    provider: &dyn CatalogProvider,
    username: &str,
    tmdb_id: TmdbId,
    media_type: MediaType,
    label: Option<String>,
    slot: i32,
) -> AppResult<FavoriteAdded> {
    let user = require_user(store, username).await?;

    let favorite = store
        .put_favorite(
            user.id,
            NewFavorite {
                tmdb_id,
                media_type,
                label,
                position: slot,
            },
        )
        .await?;

    tracing::info!(
        username = %username,
        tmdb_id = tmdb_id,
        media_type = %media_type,
        slot = slot,
        "Favorite stored"
    );

    let lookup = match media_type {
        MediaType::Movie => provider.movie_details(tmdb_id).await.map(ResolvedMedia::Movie),
        MediaType::Tv => provider.tv_details(tmdb_id).await.map(ResolvedMedia::Tv),
    };

    Ok(match lookup {
        Ok(item) => FavoriteAdded {
            favorite,
            full_item: Some(item),
            error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, tmdb_id = tmdb_id, "TMDB fetch failed for new favorite");
            FavoriteAdded {
                favorite,
                full_item: None,
                error: Some("Favorite added, but TMDB fetch failed".to_string()),
            }
        }
    })
}

/// Raw movie or series list entries, newest first
pub async fn list(store: &dyn UserStore, username: &str, kind: ListKind) -> AppResult<Vec<ListEntry>> {
    let user = require_user(store, username).await?;
    store.list_entries(user.id, kind).await
}

/// Adds a title to the movie or series list. Each title may appear once.
pub async fn add_to_list(
    store: &dyn UserStore,
    username: &str,
    kind: ListKind,
    tmdb_id: TmdbId,
    label: Option<String>,
) -> AppResult<ListEntry> {
    let user = require_user(store, username).await?;

    if store.has_list_entry(user.id, kind, tmdb_id).await? {
        return Err(AppError::InvalidInput(kind.duplicate_message().to_string()));
    }

    let entry = store.add_list_entry(user.id, kind, tmdb_id, label).await?;

    tracing::info!(username = %username, tmdb_id = tmdb_id, list = ?kind, "List entry added");

    Ok(entry)
}

/// The latest few recently viewed titles
pub async fn recents(store: &dyn UserStore, username: &str) -> AppResult<Vec<RecentEntry>> {
    let user = require_user(store, username).await?;
    store.recents(user.id, None, Some(RECENTS_LIMIT)).await
}

pub async fn add_recent(
    store: &dyn UserStore,
    username: &str,
    tmdb_id: TmdbId,
    media_type: MediaType,
) -> AppResult<RecentEntry> {
    let user = require_user(store, username).await?;
    store.add_recent(user.id, tmdb_id, media_type).await
}

/// Every recently viewed title of one media type, resolved, newest first
pub async fn recent_titles(
    store: &dyn UserStore,
    provider: Arc<dyn CatalogProvider>,
    username: &str,
    media_type: MediaType,
) -> AppResult<Vec<ResolvedMedia>> {
    let user = require_user(store, username).await?;
    let entries = store
        .recents(user.id, Some(media_type), None)
        .await?
        .into_iter()
        .map(|r| (r.tmdb_id, r.media_type, None))
        .collect();

    Ok(resolve_media_batch(provider, entries).await)
}

pub async fn counts(store: &dyn UserStore, username: &str) -> AppResult<ListCounts> {
    let user = require_user(store, username).await?;
    store.counts(user.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryUserStore,
        models::{MediaPlaceholder, MovieDetails, NewUser, TvDetails},
        services::providers::MockCatalogProvider,
    };
    use serde_json::json;

    async fn store_with_user(username: &str) -> MemoryUserStore {
        let store = MemoryUserStore::new();
        store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        store
    }

    fn movie(id: TmdbId) -> MovieDetails {
        serde_json::from_value(json!({ "id": id, "title": format!("Movie {}", id) })).unwrap()
    }

    fn show(id: TmdbId) -> TvDetails {
        serde_json::from_value(json!({ "id": id, "name": format!("Show {}", id) })).unwrap()
    }

    fn catalog() -> MockCatalogProvider {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_movie_details()
            .returning(|id| match id {
                404 => Err(AppError::NotFound("missing".to_string())),
                _ => Ok(movie(id)),
            });
        provider.expect_tv_details().returning(|id| Ok(show(id)));
        provider
    }

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let store = MemoryUserStore::new();
        let result = counts(&store, "ghost").await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "User not found"));

        let result = add_to_list(&store, "ghost", ListKind::Movies, 1, None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_favorites_resolved_in_slot_order_with_placeholder() {
        let store = store_with_user("neo").await;
        let provider = catalog();

        set_favorite(&store, &provider, "neo", 1396, MediaType::Tv, None, 2)
            .await
            .unwrap();
        let added = set_favorite(
            &store,
            &provider,
            "neo",
            404,
            MediaType::Movie,
            Some("Lost Film".to_string()),
            0,
        )
        .await
        .unwrap();
        assert_eq!(added.full_item, None);
        assert_eq!(
            added.error.as_deref(),
            Some("Favorite added, but TMDB fetch failed")
        );

        let resolved = favorites(&store, Arc::new(provider), "neo").await.unwrap();
        assert_eq!(
            resolved,
            vec![
                ResolvedMedia::Placeholder(MediaPlaceholder::new(404, Some("Lost Film"))),
                ResolvedMedia::Tv(show(1396)),
            ]
        );
    }

    #[tokio::test]
    async fn test_set_favorite_replaces_slot() {
        let store = store_with_user("neo").await;
        let provider = catalog();

        set_favorite(&store, &provider, "neo", 1, MediaType::Movie, None, 1)
            .await
            .unwrap();
        let added = set_favorite(&store, &provider, "neo", 2, MediaType::Movie, None, 1)
            .await
            .unwrap();
        assert_eq!(added.full_item, Some(ResolvedMedia::Movie(movie(2))));
        assert_eq!(added.error, None);

        let counts = counts(&store, "neo").await.unwrap();
        assert_eq!(counts.favorite_count, 1);
    }

    #[tokio::test]
    async fn test_add_to_list_rejects_duplicates() {
        let store = store_with_user("neo").await;

        add_to_list(&store, "neo", ListKind::Movies, 603, Some("The Matrix".to_string()))
            .await
            .unwrap();

        let duplicate = add_to_list(&store, "neo", ListKind::Movies, 603, None).await;
        assert!(
            matches!(duplicate, Err(AppError::InvalidInput(msg)) if msg == "Movie already in your list")
        );

        add_to_list(&store, "neo", ListKind::Series, 603, None)
            .await
            .unwrap();
        let series_duplicate = add_to_list(&store, "neo", ListKind::Series, 603, None).await;
        assert!(
            matches!(series_duplicate, Err(AppError::InvalidInput(msg)) if msg == "Already in series list")
        );

        let movies = list(&store, "neo", ListKind::Movies).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].label.as_deref(), Some("The Matrix"));
    }

    #[tokio::test]
    async fn test_recents_capped_at_four() {
        let store = store_with_user("neo").await;
        for id in 1..=6 {
            add_recent(&store, "neo", id, MediaType::Movie).await.unwrap();
        }

        let latest = recents(&store, "neo").await.unwrap();
        let ids: Vec<TmdbId> = latest.iter().map(|r| r.tmdb_id).collect();
        assert_eq!(ids, vec![6, 5, 4, 3]);
    }

    #[tokio::test]
    async fn test_recent_titles_resolves_one_media_type() {
        let store = store_with_user("neo").await;
        add_recent(&store, "neo", 10, MediaType::Movie).await.unwrap();
        add_recent(&store, "neo", 20, MediaType::Tv).await.unwrap();
        add_recent(&store, "neo", 11, MediaType::Movie).await.unwrap();

        let movies = recent_titles(&store, Arc::new(catalog()), "neo", MediaType::Movie)
            .await
            .unwrap();
        assert_eq!(
            movies,
            vec![ResolvedMedia::Movie(movie(11)), ResolvedMedia::Movie(movie(10))]
        );
    }
}
