//! Raw list-entry metadata as it arrives from upstream.
//!
//! Two shapes reach the listing: the public proxy API (Invidious-style,
//! camelCase keys) and the local scraper (snake_case keys, two different
//! author layouts). Neither is trusted to be well-formed, so every field is
//! optional and a value of the wrong JSON type degrades to `None` instead of
//! rejecting the whole record.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::{Number, Value};
use tracing::warn;

use crate::format::InvalidDurationError;

/// Which upstream produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Proxy,
    Local,
}

/// Keys whose mere presence marks a proxy API response.
const PROXY_SIGNAL_KEYS: [&str; 4] = ["descriptionHtml", "index", "authorId", "publishedText"];

/// Classifies an untyped record. A key counts as present even when its value
/// is `null`; `authorThumbnails` additionally has to be an object-like value.
/// Anything without a proxy signal, including non-objects, is local data.
pub fn classify(record: &Value) -> SchemaKind {
    let Some(fields) = record.as_object() else {
        return SchemaKind::Local;
    };

    if PROXY_SIGNAL_KEYS.iter().any(|key| fields.contains_key(*key)) {
        return SchemaKind::Proxy;
    }

    match fields.get("authorThumbnails") {
        Some(Value::Object(_) | Value::Array(_) | Value::Null) => SchemaKind::Proxy,
        _ => SchemaKind::Local,
    }
}

/// A duration in seconds as upstream sends it: usually a number, sometimes a
/// numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Seconds {
    Number(Number),
    Text(String),
}

impl Seconds {
    /// Converts to whole seconds. Fractional, non-numeric and out-of-range
    /// inputs are rejected; negativity is checked by the formatter.
    pub fn whole_seconds(&self) -> Result<i64, InvalidDurationError> {
        match self {
            Seconds::Number(number) => {
                if let Some(value) = number.as_i64() {
                    return Ok(value);
                }
                match number.as_f64() {
                    Some(value)
                        if value.is_finite()
                            && value.fract() == 0.0
                            && value.abs() < i64::MAX as f64 =>
                    {
                        Ok(value as i64)
                    }
                    _ => Err(InvalidDurationError::new(number.to_string())),
                }
            }
            Seconds::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| InvalidDurationError::new(text.clone())),
        }
    }
}

/// Proxy API video entry. Only the fields the listing reads are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub video_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author_id: Option<String>,
    #[serde(default, deserialize_with = "seconds_field")]
    pub length_seconds: Option<Seconds>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub live_now: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub view_count: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub view_count_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub published_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub live: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_upcoming: Option<bool>,
}

/// The scraper reports the uploader either as a bare name or as a small
/// object carrying the channel URL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocalAuthor {
    Name(String),
    Channel {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
        #[serde(default, rename = "ref", deserialize_with = "lenient")]
        channel_ref: Option<String>,
    },
}

/// Locally scraped video entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocalRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<LocalAuthor>,
    #[serde(default, deserialize_with = "lenient")]
    pub ucid: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub views: Option<Number>,
    /// `None` also covers the scraper's literal `"undefined"`.
    #[serde(default, deserialize_with = "seconds_field")]
    pub length_seconds: Option<Seconds>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub uploaded_at: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub view_count: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub live: Option<bool>,
}

/// A record tagged with the schema it was classified as.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Proxy(ProxyRecord),
    Local(LocalRecord),
}

impl RawRecord {
    /// Classifies and parses a raw JSON value. Never fails: a value that is
    /// not an object yields an empty record of the detected kind.
    pub fn from_value(value: Value) -> Self {
        match classify(&value) {
            SchemaKind::Proxy => RawRecord::Proxy(parse_or_empty(value, "proxy")),
            SchemaKind::Local => RawRecord::Local(parse_or_empty(value, "local")),
        }
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            RawRecord::Proxy(_) => SchemaKind::Proxy,
            RawRecord::Local(_) => SchemaKind::Local,
        }
    }
}

fn parse_or_empty<T: DeserializeOwned + Default>(value: Value, label: &str) -> T {
    serde_json::from_value(value).unwrap_or_else(|err| {
        warn!(schema = label, error = %err, "unreadable video record; using empty fields");
        T::default()
    })
}

/// Accepts any JSON value and keeps it only when it fits `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn seconds_field<'de, D>(deserializer: D) -> Result<Option<Seconds>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds: Option<Seconds> = lenient(deserializer)?;
    Ok(seconds.filter(|value| !matches!(value, Seconds::Text(text) if text == "undefined")))
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
