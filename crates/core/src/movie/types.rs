//! Core movie data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External id given to movies created through the catalog API rather than
/// imported from the feed.
pub const MANUAL_ENTRY: &str = "manual-entry";

/// Normalize a title for uniqueness comparison: trim surrounding whitespace
/// and lower-case.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Opaque identifier assigned by the store.
    pub id: String,
    /// Feed identifier, or [`MANUAL_ENTRY`] for manually created movies.
    pub external_id: String,
    /// Title as submitted (original casing and whitespace).
    pub title: String,
    /// Episode number, unique across the catalog.
    pub episode_number: i64,
    pub director: String,
    pub producer: String,
    /// Release date in calendar-date form (not validated).
    pub release_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Whether this movie was created manually rather than by a feed sync.
    pub fn is_manual_entry(&self) -> bool {
        self.external_id == MANUAL_ENTRY
    }
}

/// Fields for a movie that does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub episode_number: i64,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    #[serde(default)]
    pub opening_text: Option<String>,
}

impl NewMovie {
    /// Shape validation for the boundary layer: required text fields must not
    /// be blank.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("title", &self.title),
            ("director", &self.director),
            ("producer", &self.producer),
            ("release_date", &self.release_date),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", name));
            }
        }
        Ok(())
    }
}

/// A record ready to be inserted: the new movie plus its external id.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub external_id: String,
    pub movie: NewMovie,
}

impl MovieRecord {
    /// A record created through the catalog API.
    pub fn manual(movie: NewMovie) -> Self {
        Self {
            external_id: MANUAL_ENTRY.to_string(),
            movie,
        }
    }

    /// A record imported from the external feed.
    pub fn from_feed(external_id: impl Into<String>, movie: NewMovie) -> Self {
        Self {
            external_id: external_id.into(),
            movie,
        }
    }
}

/// Partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MoviePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub episode_number: Option<i64>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub opening_text: Option<String>,
}

impl MoviePatch {
    /// True when the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.episode_number.is_none()
            && self.director.is_none()
            && self.producer.is_none()
            && self.release_date.is_none()
            && self.opening_text.is_none()
    }

    /// Shape validation: supplied required text fields must not be blank.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("title", &self.title),
            ("director", &self.director),
            ("producer", &self.producer),
            ("release_date", &self.release_date),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    return Err(format!("{} must not be empty", name));
                }
            }
        }
        Ok(())
    }
}

/// Attributes a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    #[default]
    EpisodeNumber,
    Director,
    Producer,
    ReleaseDate,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Column name in the movies table.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::EpisodeNumber => "episode_number",
            SortField::Director => "director",
            SortField::Producer => "producer",
            SortField::ReleaseDate => "release_date",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Parse a field name as it appears in a query string.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(SortField::Title),
            "episode_number" => Some(SortField::EpisodeNumber),
            "director" => Some(SortField::Director),
            "producer" => Some(SortField::Producer),
            "release_date" => Some(SortField::ReleaseDate),
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Ordering for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovieSort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Store-level filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MovieFilter {
    /// Every movie.
    #[default]
    All,
    /// Normalized title equals the given value (already normalized).
    TitleKey(String),
    /// Episode number equals the given value.
    EpisodeNumber(i64),
    /// Title, director or producer contains the term, case-insensitively.
    Search(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_movie() -> NewMovie {
        NewMovie {
            title: "A New Hope".to_string(),
            episode_number: 4,
            director: "George Lucas".to_string(),
            producer: "Gary Kurtz".to_string(),
            release_date: "1977-05-25".to_string(),
            opening_text: None,
        }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  A New Hope "), "a new hope");
        assert_eq!(normalize_title("a new hope"), "a new hope");
        assert_eq!(normalize_title("ÉPISODE"), "épisode");
    }

    #[test]
    fn test_new_movie_validate() {
        assert!(new_movie().validate().is_ok());

        let mut movie = new_movie();
        movie.director = "   ".to_string();
        let err = movie.validate().unwrap_err();
        assert!(err.contains("director"));
    }

    #[test]
    fn test_patch_validate_and_empty() {
        assert!(MoviePatch::default().is_empty());
        assert!(MoviePatch::default().validate().is_ok());

        let patch = MoviePatch {
            title: Some("".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_manual_record() {
        let record = MovieRecord::manual(new_movie());
        assert_eq!(record.external_id, MANUAL_ENTRY);
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(SortField::parse("title"), Some(SortField::Title));
        assert_eq!(
            SortField::parse("episode_number"),
            Some(SortField::EpisodeNumber)
        );
        assert_eq!(SortField::parse("opening_text"), None);
        assert_eq!(SortField::default(), SortField::EpisodeNumber);
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("DESC"), None);
    }

    #[test]
    fn test_patch_deserialize_partial() {
        let patch: MoviePatch = serde_json::from_str(r#"{"director": "Irvin Kershner"}"#).unwrap();
        assert_eq!(patch.director.as_deref(), Some("Irvin Kershner"));
        assert!(patch.title.is_none());
    }
}
