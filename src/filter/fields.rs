//! Comparison-ready fields derived from a HAR entry.
//!
//! Every function here is pure and total: a malformed URL or a garbage size
//! never fails, it falls back to an empty string or zero.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::har::Entry;

/// Resource classification of an entry, in the order they are offered as
/// quick filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Document,
    Xhr,
    Script,
    Stylesheet,
    Image,
    Font,
    Media,
    Websocket,
    Manifest,
    Other,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 10] = [
        ResourceClass::Document,
        ResourceClass::Xhr,
        ResourceClass::Script,
        ResourceClass::Stylesheet,
        ResourceClass::Image,
        ResourceClass::Font,
        ResourceClass::Media,
        ResourceClass::Websocket,
        ResourceClass::Manifest,
        ResourceClass::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceClass::Document => "document",
            ResourceClass::Xhr => "xhr",
            ResourceClass::Script => "script",
            ResourceClass::Stylesheet => "stylesheet",
            ResourceClass::Image => "image",
            ResourceClass::Font => "font",
            ResourceClass::Media => "media",
            ResourceClass::Websocket => "websocket",
            ResourceClass::Manifest => "manifest",
            ResourceClass::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceClass::Document => "Document",
            ResourceClass::Xhr => "Fetch/XHR",
            ResourceClass::Script => "Script (JS)",
            ResourceClass::Stylesheet => "Stylesheet (CSS)",
            ResourceClass::Image => "Image",
            ResourceClass::Font => "Font",
            ResourceClass::Media => "Media",
            ResourceClass::Websocket => "WebSocket",
            ResourceClass::Manifest => "Manifest",
            ResourceClass::Other => "Other",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "document" => Some(ResourceClass::Document),
            "xhr" | "fetch" => Some(ResourceClass::Xhr),
            "script" => Some(ResourceClass::Script),
            "stylesheet" => Some(ResourceClass::Stylesheet),
            "image" => Some(ResourceClass::Image),
            "font" => Some(ResourceClass::Font),
            "media" => Some(ResourceClass::Media),
            "websocket" => Some(ResourceClass::Websocket),
            "manifest" => Some(ResourceClass::Manifest),
            "other" => Some(ResourceClass::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields a property filter can compare against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "method")]
    Method,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "mimeType")]
    MimeType,
    #[serde(rename = "resourceType")]
    ResourceType,
    #[serde(rename = "extension")]
    Extension,
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "size")]
    Size,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "statusRange")]
    StatusRange,
}

impl Field {
    pub fn is_numeric(self) -> bool {
        matches!(self, Field::Status | Field::Size | Field::Time)
    }
}

/// A field value as seen by the comparison operators.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => parse_number(s),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Loose numeric coercion: surrounding whitespace is ignored, an empty string
/// is zero and anything unparseable is NaN (so it never compares equal).
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn response_mime(entry: &Entry) -> String {
    entry
        .response
        .content
        .mime_type
        .as_deref()
        .unwrap_or("")
        .to_lowercase()
}

pub fn request_mime(entry: &Entry) -> String {
    entry
        .request
        .post_data
        .as_ref()
        .and_then(|p| p.mime_type.as_deref())
        .unwrap_or("")
        .to_lowercase()
}

/// Classify an entry: explicit resource type hint, then URL scheme, then the
/// response MIME type.
pub fn classify(entry: &Entry) -> ResourceClass {
    if let Some(class) = entry.resource_type.as_deref().and_then(ResourceClass::parse) {
        return class;
    }

    let url = entry.request.url.trim_start().to_ascii_lowercase();
    if url.starts_with("ws://") || url.starts_with("wss://") {
        return ResourceClass::Websocket;
    }

    let mime = response_mime(entry);
    if mime.contains("html") {
        ResourceClass::Document
    } else if mime.contains("javascript") {
        ResourceClass::Script
    } else if mime.contains("css") {
        ResourceClass::Stylesheet
    } else if mime.contains("image/") {
        ResourceClass::Image
    } else if mime.contains("font") {
        ResourceClass::Font
    } else if mime.contains("video/") || mime.contains("audio/") {
        ResourceClass::Media
    } else if mime.contains("manifest") {
        ResourceClass::Manifest
    } else {
        ResourceClass::Other
    }
}

/// File extension of the URL path including the leading dot (`.png`).
///
/// Anything longer than six characters is not an extension (`/v1.2/users`
/// style dots) and yields an empty string.
pub fn extension(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let path = parsed.path();
    let Some(dot) = path.rfind('.') else {
        return String::new();
    };
    let mut ext = path[dot..].to_lowercase();
    if let Some(q) = ext.find('?') {
        ext.truncate(q);
    }
    if ext.chars().count() > 6 {
        return String::new();
    }
    ext
}

pub fn domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Response size in bytes: the larger of `content.size` and `bodySize`,
/// never negative.
pub fn size(entry: &Entry) -> u64 {
    let content = entry.response.content.size.unwrap_or(0);
    let body = entry.response.body_size.unwrap_or(0);
    content.max(body).max(0) as u64
}

/// Total time in whole milliseconds.
pub fn time(entry: &Entry) -> u64 {
    match entry.time {
        Some(t) if t.is_finite() && t > 0.0 => t.round() as u64,
        _ => 0,
    }
}

pub fn status_range(status: i64) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "0xx",
    }
}

pub fn field_value(entry: &Entry, field: Field) -> FieldValue {
    match field {
        Field::Url => FieldValue::Text(entry.request.url.clone()),
        Field::Method => FieldValue::Text(entry.request.method.clone()),
        Field::Status => FieldValue::Number(entry.response.status as f64),
        Field::MimeType => FieldValue::Text(
            entry
                .response
                .content
                .mime_type
                .clone()
                .unwrap_or_default(),
        ),
        Field::ResourceType => FieldValue::Text(classify(entry).as_str().to_string()),
        Field::Extension => FieldValue::Text(extension(&entry.request.url)),
        Field::Domain => FieldValue::Text(domain(&entry.request.url)),
        Field::Size => FieldValue::Number(size(entry) as f64),
        Field::Time => FieldValue::Number(time(entry) as f64),
        Field::StatusRange => FieldValue::Text(status_range(entry.response.status).to_string()),
    }
}
