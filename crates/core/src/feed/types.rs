//! Lenient views over feed payloads.

use serde_json::Value;

use super::FeedError;

/// Film attributes as carried by the feed. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilmProperties {
    pub title: Option<String>,
    pub episode_id: Option<i64>,
    pub director: Option<String>,
    pub producer: Option<String>,
    pub release_date: Option<String>,
    pub opening_crawl: Option<String>,
}

impl FilmProperties {
    /// Read the property bag. Empty strings, zero, and non-matching types
    /// count as missing.
    pub fn from_value(value: &Value) -> Self {
        Self {
            title: text(value, "title"),
            episode_id: value
                .get("episode_id")
                .and_then(Value::as_i64)
                .filter(|n| *n != 0),
            director: text(value, "director"),
            producer: text(value, "producer"),
            release_date: text(value, "release_date"),
            opening_crawl: text(value, "opening_crawl"),
        }
    }
}

/// A single feed entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    /// Feed identifier; numeric ids are carried as their decimal text.
    pub uid: Option<String>,
    /// `None` when the entry has no property object.
    pub properties: Option<FilmProperties>,
}

impl FeedEntry {
    pub fn from_value(value: &Value) -> Self {
        let uid = match value.get("uid") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let properties = value
            .get("properties")
            .filter(|p| p.is_object())
            .map(FilmProperties::from_value);
        Self { uid, properties }
    }
}

/// Extract the film list from a payload.
///
/// The list lives under `result`, or `results` when `result` is absent. Any
/// other shape, including an empty list, is [`FeedError::UnexpectedFormat`].
pub fn parse_feed(payload: &Value) -> Result<Vec<FeedEntry>, FeedError> {
    let list = payload
        .get("result")
        .filter(|v| !v.is_null())
        .or_else(|| payload.get("results"))
        .and_then(Value::as_array)
        .ok_or(FeedError::UnexpectedFormat)?;

    if list.is_empty() {
        return Err(FeedError::UnexpectedFormat);
    }

    Ok(list.iter().map(FeedEntry::from_value).collect())
}

fn text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
