use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier assigned by TMDB to a movie, series or person
pub type TmdbId = u64;

/// Paginated list response returned by TMDB list and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> CatalogPage<T> {
    /// Rebuilds the page around a new result list, keeping pagination metadata
    pub fn map_results<U>(self, results: Vec<U>) -> CatalogPage<U> {
        CatalogPage {
            page: self.page,
            results,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

/// A movie or TV show as it appears in TMDB list endpoints.
///
/// Only the rating signal is typed. Every other attribute (title, name,
/// poster path, release dates, ...) is kept verbatim in `extra` and written
/// back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: TmdbId,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub vote_count: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_float",
        skip_serializing_if = "Option::is_none"
    )]
    pub vote_average: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_float",
        skip_serializing_if = "Option::is_none"
    )]
    pub popularity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem {
    /// Display title, falling back to `name` for TV shows
    pub fn display_title(&self) -> Option<&str> {
        self.extra
            .get("title")
            .or_else(|| self.extra.get("name"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full movie record from `movie/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: TmdbId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvCreator {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full series record from `tv/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvDetails {
    pub id: TmdbId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub created_by: Vec<TvCreator>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cast and crew of a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieCredits {
    pub id: TmdbId,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvRole {
    pub credit_id: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvJob {
    pub credit_id: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvCastMember {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub roles: Vec<TvRole>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvCrewMember {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub jobs: Vec<TvJob>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cast and crew aggregated over every season of a series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvAggregateCredits {
    pub id: TmdbId,
    #[serde(default)]
    pub cast: Vec<TvCastMember>,
    #[serde(default)]
    pub crew: Vec<TvCrewMember>,
}

/// Person record from `person/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonDetails {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The public projection of a person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonSummary {
    pub id: TmdbId,
    pub name: String,
    pub known_for_department: Option<String>,
}

impl From<PersonDetails> for PersonSummary {
    fn from(person: PersonDetails) -> Self {
        Self {
            id: person.id,
            name: person.name,
            known_for_department: person.known_for_department,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchMediaType {
    Movie,
    Tv,
    Person,
    #[serde(other)]
    Other,
}

/// A single hit from `search/multi`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: TmdbId,
    pub media_type: SearchMediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_for_department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stand-in for a title whose details could not be fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaPlaceholder {
    pub id: TmdbId,
    pub title: String,
    pub name: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: f64,
}

impl MediaPlaceholder {
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";

    pub fn new(id: TmdbId, label: Option<&str>) -> Self {
        let title = label
            .filter(|l| !l.is_empty())
            .unwrap_or(Self::UNKNOWN_TITLE)
            .to_string();

        Self {
            id,
            name: title.clone(),
            title,
            poster_path: None,
            release_date: None,
            first_air_date: None,
            vote_average: 0.0,
        }
    }
}

/// A user-list entry resolved against the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResolvedMedia {
    Movie(MovieDetails),
    Tv(TvDetails),
    Placeholder(MediaPlaceholder),
}

/// Accepts any JSON value and keeps it only if it is a non-negative integer
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_u64().or_else(|| {
            v.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
    }))
}

/// Accepts any JSON value and keeps it only if it is a finite number
fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|f| f.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_item_keeps_display_fields() {
        let json = json!({
            "id": 550,
            "title": "Fight Club",
            "poster_path": "/poster.jpg",
            "release_date": "1999-10-15",
            "vote_count": 27000,
            "vote_average": 8.4,
            "popularity": 61.4
        });

        let item: CatalogItem = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(item.id, 550);
        assert_eq!(item.vote_count, Some(27000));
        assert_eq!(item.vote_average, Some(8.4));
        assert_eq!(item.display_title(), Some("Fight Club"));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn test_catalog_item_missing_numbers_become_none() {
        let item: CatalogItem =
            serde_json::from_value(json!({ "id": 1, "name": "Some Show" })).unwrap();
        assert_eq!(item.vote_count, None);
        assert_eq!(item.vote_average, None);
        assert_eq!(item.popularity, None);
        assert_eq!(item.display_title(), Some("Some Show"));
    }

    #[test]
    fn test_catalog_item_non_numeric_values_become_none() {
        let item: CatalogItem = serde_json::from_value(json!({
            "id": 1,
            "vote_count": "lots",
            "vote_average": null,
            "popularity": [1, 2]
        }))
        .unwrap();
        assert_eq!(item.vote_count, None);
        assert_eq!(item.vote_average, None);
        assert_eq!(item.popularity, None);
    }

    #[test]
    fn test_vote_count_rejects_negative_and_fractional() {
        let negative: CatalogItem =
            serde_json::from_value(json!({ "id": 1, "vote_count": -4 })).unwrap();
        assert_eq!(negative.vote_count, None);

        let fractional: CatalogItem =
            serde_json::from_value(json!({ "id": 1, "vote_count": 12.5 })).unwrap();
        assert_eq!(fractional.vote_count, None);

        let integral_float: CatalogItem =
            serde_json::from_value(json!({ "id": 1, "vote_count": 120.0 })).unwrap();
        assert_eq!(integral_float.vote_count, Some(120));
    }

    #[test]
    fn test_catalog_page_defaults() {
        let page: CatalogPage<CatalogItem> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(page.page, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_search_result_media_types() {
        let person: SearchResult =
            serde_json::from_value(json!({ "id": 287, "media_type": "person", "name": "Brad Pitt" }))
                .unwrap();
        assert_eq!(person.media_type, SearchMediaType::Person);

        let unknown: SearchResult =
            serde_json::from_value(json!({ "id": 3, "media_type": "collection" })).unwrap();
        assert_eq!(unknown.media_type, SearchMediaType::Other);
    }

    #[test]
    fn test_placeholder_uses_label_or_unknown() {
        let labelled = MediaPlaceholder::new(42, Some("Heat"));
        assert_eq!(labelled.title, "Heat");
        assert_eq!(labelled.name, "Heat");
        assert_eq!(labelled.vote_average, 0.0);

        let unlabelled = MediaPlaceholder::new(42, None);
        assert_eq!(unlabelled.title, MediaPlaceholder::UNKNOWN_TITLE);

        let empty = MediaPlaceholder::new(42, Some(""));
        assert_eq!(empty.name, MediaPlaceholder::UNKNOWN_TITLE);
    }

    #[test]
    fn test_resolved_placeholder_serializes_flat() {
        let resolved = ResolvedMedia::Placeholder(MediaPlaceholder::new(7, Some("Se7en")));
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["title"], "Se7en");
        assert_eq!(value["poster_path"], Value::Null);
    }

    #[test]
    fn test_movie_details_deserialization() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "runtime": 136,
            "genres": [{ "id": 28, "name": "Action" }],
            "tagline": "Welcome to the Real World."
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.title.as_deref(), Some("The Matrix"));
        assert_eq!(details.runtime, Some(136));
        assert_eq!(details.genres[0].name, "Action");
        assert_eq!(details.extra["tagline"], "Welcome to the Real World.");
    }
}
