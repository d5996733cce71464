use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use super::TmdbId;

/// Kind of title stored in a user list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(format!("Unknown media type: {}", other)),
        }
    }
}

/// Which per-user watch list an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Movies,
    Series,
}

impl ListKind {
    /// Message returned when a title is added twice
    pub fn duplicate_message(&self) -> &'static str {
        match self {
            ListKind::Movies => "Movie already in your list",
            ListKind::Series => "Already in series list",
        }
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Account data needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A favorite pinned to one of the user's display slots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub label: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub label: Option<String>,
    pub position: i32,
}

/// A title in the user's movie or series list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tmdb_id: TmdbId,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recently viewed title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
}

/// Number of entries in each of a user's lists
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListCounts {
    pub movie_count: i64,
    pub series_count: i64,
    pub favorite_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_parse() {
        assert_eq!("movie".parse::<MediaType>(), Ok(MediaType::Movie));
        assert_eq!("tv".parse::<MediaType>(), Ok(MediaType::Tv));
        assert!("series".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_media_type_serialization() {
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), "\"tv\"");
        assert_eq!(MediaType::Movie.to_string(), "movie");
    }

    #[test]
    fn test_list_entry_uses_camel_case() {
        let entry = ListEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tmdb_id: 603,
            label: Some("The Matrix".to_string()),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["tmdbId"], 603);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("tmdb_id").is_none());
    }

    #[test]
    fn test_counts_serialization() {
        let counts = ListCounts {
            movie_count: 3,
            series_count: 1,
            favorite_count: 4,
        };
        let value = serde_json::to_value(counts).unwrap();
        assert_eq!(value["movieCount"], 3);
        assert_eq!(value["seriesCount"], 1);
        assert_eq!(value["favoriteCount"], 4);
    }
}
