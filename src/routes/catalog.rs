use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    extract::{AppPath, AppQuery},
    AppState, SiteCopy,
};
use crate::{
    error::AppResult,
    models::{
        CatalogItem, CatalogPage, MovieCredits, MovieDetails, PersonSummary, SearchResult,
        TmdbId, TvAggregateCredits, TvDetails,
    },
    services::{
        ranking::ScoredItem,
        search,
        trending::{self, HomeWidgets},
    },
};

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
}

pub async fn site(State(state): State<Arc<AppState>>) -> Json<SiteCopy> {
    Json(state.site.clone())
}

/// Trending rows shown on the home page
pub async fn home(State(state): State<Arc<AppState>>) -> AppResult<Json<HomeWidgets>> {
    let widgets = trending::home_widgets(state.catalog.as_ref(), &state.ranking).await?;
    Ok(Json(widgets))
}

/// Popular movies ranked by weighted rating
pub async fn trending_movies(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<LimitQuery>,
) -> AppResult<Json<Vec<ScoredItem<CatalogItem>>>> {
    let ranked =
        trending::trending_movies(state.catalog.as_ref(), &state.ranking, params.limit).await?;
    Ok(Json(ranked))
}

/// Popular series ranked by weighted rating
pub async fn trending_tv(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<LimitQuery>,
) -> AppResult<Json<Vec<ScoredItem<CatalogItem>>>> {
    let ranked = trending::trending_tv(state.catalog.as_ref(), &state.ranking, params.limit).await?;
    Ok(Json(ranked))
}

pub async fn now_playing(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CatalogPage<CatalogItem>>> {
    Ok(Json(state.catalog.now_playing_movies().await?))
}

pub async fn movie_details(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<TmdbId>,
) -> AppResult<Json<MovieDetails>> {
    Ok(Json(state.catalog.movie_details(id).await?))
}

pub async fn movie_credits(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<TmdbId>,
) -> AppResult<Json<MovieCredits>> {
    Ok(Json(state.catalog.movie_credits(id).await?))
}

pub async fn similar_movies(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<TmdbId>,
) -> AppResult<Json<CatalogPage<CatalogItem>>> {
    Ok(Json(state.catalog.similar_movies(id).await?))
}

pub async fn tv_details(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<TmdbId>,
) -> AppResult<Json<TvDetails>> {
    Ok(Json(state.catalog.tv_details(id).await?))
}

/// Cast and crew aggregated over every season
pub async fn tv_credits(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<TmdbId>,
) -> AppResult<Json<TvAggregateCredits>> {
    Ok(Json(state.catalog.tv_aggregate_credits(id).await?))
}

pub async fn similar_tv(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<TmdbId>,
) -> AppResult<Json<CatalogPage<CatalogItem>>> {
    Ok(Json(state.catalog.similar_tv(id).await?))
}

pub async fn person(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<TmdbId>,
) -> AppResult<Json<PersonSummary>> {
    Ok(Json(search::person_summary(state.catalog.as_ref(), id).await?))
}

/// Handler for multi search. A missing or blank `query` is rejected.
pub async fn search_multi(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SearchQuery>,
) -> AppResult<Json<CatalogPage<SearchResult>>> {
    let page = search::search_multi(state.catalog.clone(), &params.query).await?;
    Ok(Json(page))
}
