//! Media catalog provider abstraction
//!
//! Every piece of title, cast and people data the service hands out comes from
//! a remote read-only catalog. Handlers and services talk to it through the
//! `CatalogProvider` trait so tests can swap in a mock.
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        CatalogItem, CatalogPage, MediaPlaceholder, MediaType, MovieCredits, MovieDetails,
        PersonDetails, ResolvedMedia, SearchResult, TmdbId, TvAggregateCredits, TvDetails,
    },
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Currently popular movies
    async fn popular_movies(&self) -> AppResult<CatalogPage<CatalogItem>>;

    /// Currently popular TV series
    async fn popular_tv(&self) -> AppResult<CatalogPage<CatalogItem>>;

    /// Movies now showing in theatres
    async fn now_playing_movies(&self) -> AppResult<CatalogPage<CatalogItem>>;

    async fn movie_details(&self, id: TmdbId) -> AppResult<MovieDetails>;

    async fn movie_credits(&self, id: TmdbId) -> AppResult<MovieCredits>;

    async fn similar_movies(&self, id: TmdbId) -> AppResult<CatalogPage<CatalogItem>>;

    async fn tv_details(&self, id: TmdbId) -> AppResult<TvDetails>;

    /// Cast and crew across all seasons of a series
    async fn tv_aggregate_credits(&self, id: TmdbId) -> AppResult<TvAggregateCredits>;

    async fn similar_tv(&self, id: TmdbId) -> AppResult<CatalogPage<CatalogItem>>;

    async fn person_details(&self, id: TmdbId) -> AppResult<PersonDetails>;

    /// Search movies, series and people in one query
    async fn search_multi(&self, query: &str) -> AppResult<CatalogPage<SearchResult>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolves a user-list entry to its full catalog record.
///
/// Lookup failures are logged and replaced by a placeholder built from the
/// entry's stored label, so one missing title never fails a whole list.
pub async fn resolve_media(
    provider: &dyn CatalogProvider,
    tmdb_id: TmdbId,
    media_type: MediaType,
    label: Option<&str>,
) -> ResolvedMedia {
    let resolved = match media_type {
        MediaType::Movie => provider.movie_details(tmdb_id).await.map(ResolvedMedia::Movie),
        MediaType::Tv => provider.tv_details(tmdb_id).await.map(ResolvedMedia::Tv),
    };

    resolved.unwrap_or_else(|e| {
        tracing::error!(
            error = %e,
            tmdb_id = tmdb_id,
            media_type = %media_type,
            provider = provider.name(),
            "Failed to fetch catalog details, using placeholder"
        );
        ResolvedMedia::Placeholder(MediaPlaceholder::new(tmdb_id, label))
    })
}

/// Resolves many entries in parallel, preserving input order
pub async fn resolve_media_batch(
    provider: Arc<dyn CatalogProvider>,
    entries: Vec<(TmdbId, MediaType, Option<String>)>,
) -> Vec<ResolvedMedia> {
    let mut tasks = Vec::with_capacity(entries.len());

    for (tmdb_id, media_type, label) in entries {
        let provider = provider.clone();
        let fallback = MediaPlaceholder::new(tmdb_id, label.as_deref());
        let task = tokio::spawn(async move {
            resolve_media(provider.as_ref(), tmdb_id, media_type, label.as_deref()).await
        });
        tasks.push((task, fallback));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (task, fallback) in tasks {
        match task.await {
            Ok(resolved) => results.push(resolved),
            Err(e) => {
                tracing::error!(error = %e, "Task join error");
                results.push(ResolvedMedia::Placeholder(fallback));
            }
        }
    }

    results
}
