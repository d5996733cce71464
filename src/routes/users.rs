use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::{
    extract::{AppJson, AppPath},
    AppState,
};
use crate::{
    error::{AppError, AppResult},
    models::{ListCounts, ListEntry, ListKind, MediaType, RecentEntry, ResolvedMedia, TmdbId},
    services::lists::{self, FavoriteAdded},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    tmdb_id: Option<Value>,
    media_type: Option<String>,
    label: Option<String>,
    slot_index: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntryRequest {
    tmdb_id: Option<Value>,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRequest {
    tmdb_id: Option<Value>,
    media_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListEntryAdded {
    pub success: bool,
    pub item: ListEntry,
}

/// TMDB ids arrive either as JSON numbers or numeric strings
fn parse_tmdb_id(value: Option<&Value>) -> Option<TmdbId> {
    let id = match value? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

fn parse_media_type(value: Option<&str>) -> Option<MediaType> {
    value?.parse().ok()
}

fn parse_slot(value: Option<&Value>) -> Option<i32> {
    value?.as_i64().and_then(|n| i32::try_from(n).ok())
}

pub async fn favorites(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<Vec<ResolvedMedia>>> {
    let favorites = lists::favorites(state.users.as_ref(), state.catalog.clone(), &username).await?;
    Ok(Json(favorites))
}

/// Pins a title into one of the user's favorite slots
pub async fn set_favorite(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
    AppJson(body): AppJson<FavoriteRequest>,
) -> AppResult<Json<FavoriteAdded>> {
    let (Some(tmdb_id), Some(media_type), Some(slot)) = (
        parse_tmdb_id(body.tmdb_id.as_ref()),
        parse_media_type(body.media_type.as_deref()),
        parse_slot(body.slot_index.as_ref()),
    ) else {
        return Err(AppError::InvalidInput(
            "Missing or invalid fields".to_string(),
        ));
    };

    let added = lists::set_favorite(
        state.users.as_ref(),
        state.catalog.as_ref(),
        &username,
        tmdb_id,
        media_type,
        body.label,
        slot,
    )
    .await?;

    Ok(Json(added))
}

pub async fn movie_list(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<Vec<ListEntry>>> {
    Ok(Json(
        lists::list(state.users.as_ref(), &username, ListKind::Movies).await?,
    ))
}

pub async fn series_list(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<Vec<ListEntry>>> {
    Ok(Json(
        lists::list(state.users.as_ref(), &username, ListKind::Series).await?,
    ))
}

async fn add_entry(
    state: &AppState,
    username: &str,
    kind: ListKind,
    body: ListEntryRequest,
) -> AppResult<Json<ListEntryAdded>> {
    let tmdb_id = parse_tmdb_id(body.tmdb_id.as_ref())
        .ok_or_else(|| AppError::InvalidInput("Missing fields".to_string()))?;

    let item = lists::add_to_list(state.users.as_ref(), username, kind, tmdb_id, body.label).await?;

    Ok(Json(ListEntryAdded {
        success: true,
        item,
    }))
}

pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
    AppJson(body): AppJson<ListEntryRequest>,
) -> AppResult<Json<ListEntryAdded>> {
    add_entry(&state, &username, ListKind::Movies, body).await
}

pub async fn add_series(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
    AppJson(body): AppJson<ListEntryRequest>,
) -> AppResult<Json<ListEntryAdded>> {
    add_entry(&state, &username, ListKind::Series, body).await
}

pub async fn recents(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<Vec<RecentEntry>>> {
    Ok(Json(lists::recents(state.users.as_ref(), &username).await?))
}

pub async fn add_recent(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
    AppJson(body): AppJson<RecentRequest>,
) -> AppResult<Json<RecentEntry>> {
    let (Some(tmdb_id), Some(media_type)) = (
        parse_tmdb_id(body.tmdb_id.as_ref()),
        parse_media_type(body.media_type.as_deref()),
    ) else {
        return Err(AppError::InvalidInput("Missing fields".to_string()));
    };

    let entry = lists::add_recent(state.users.as_ref(), &username, tmdb_id, media_type).await?;
    Ok(Json(entry))
}

pub async fn recent_movies(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<Vec<ResolvedMedia>>> {
    let titles = lists::recent_titles(
        state.users.as_ref(),
        state.catalog.clone(),
        &username,
        MediaType::Movie,
    )
    .await?;
    Ok(Json(titles))
}

pub async fn recent_series(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<Vec<ResolvedMedia>>> {
    let titles = lists::recent_titles(
        state.users.as_ref(),
        state.catalog.clone(),
        &username,
        MediaType::Tv,
    )
    .await?;
    Ok(Json(titles))
}

pub async fn counts(
    State(state): State<Arc<AppState>>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<ListCounts>> {
    Ok(Json(lists::counts(state.users.as_ref(), &username).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tmdb_id_accepts_numbers_and_strings() {
        assert_eq!(parse_tmdb_id(Some(&json!(603))), Some(603));
        assert_eq!(parse_tmdb_id(Some(&json!("1396"))), Some(1396));
        assert_eq!(parse_tmdb_id(Some(&json!(603.0))), Some(603));
        assert_eq!(parse_tmdb_id(Some(&json!(603.5))), None);
        assert_eq!(parse_tmdb_id(Some(&json!(-603.0))), None);
        assert_eq!(parse_tmdb_id(Some(&json!(0))), None);
        assert_eq!(parse_tmdb_id(Some(&json!("abc"))), None);
        assert_eq!(parse_tmdb_id(Some(&json!(null))), None);
        assert_eq!(parse_tmdb_id(None), None);
    }

    #[test]
    fn test_parse_slot_requires_integer() {
        assert_eq!(parse_slot(Some(&json!(3))), Some(3));
        assert_eq!(parse_slot(Some(&json!("3"))), None);
        assert_eq!(parse_slot(Some(&json!(1.5))), None);
        assert_eq!(parse_slot(None), None);
    }
}
