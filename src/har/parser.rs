use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use crate::error::{HarsiftError, Result};

/// Keys a host may have attached to an entry for its own bookkeeping.
/// They are never part of an exported archive.
pub const HOST_BOOKKEEPING_KEYS: &[&str] = &["_checked", "_origIndex"];

/// A HAR document. Everything outside `log.entries` is carried verbatim so a
/// reshaped archive keeps the original envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Har {
    pub log: Log,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub entries: Vec<Entry>,
    /// `version`, `creator`, `browser`, `pages`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One captured request/response exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default)]
    pub request: Request,
    #[serde(default)]
    pub response: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<Map<String, Value>>,
    #[serde(
        rename = "serverIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub server_ip_address: Option<String>,
    /// Resource type hint written by some browsers (Chrome DevTools).
    #[serde(
        rename = "_resourceType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string: Option<Vec<QueryParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<Cookie>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<Cookie>>,
    #[serde(default)]
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_size: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Content {
    pub fn is_base64_encoded(&self) -> bool {
        self.encoding.as_deref() == Some("base64")
    }

    /// Body text with a base64 transfer encoding undone. Anything that does
    /// not decode to UTF-8 is returned as stored.
    pub fn decoded_text(&self) -> Cow<'_, str> {
        let Some(text) = self.text.as_deref() else {
            return Cow::Borrowed("");
        };
        if !self.is_base64_encoded() {
            return Cow::Borrowed(text);
        }
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        match STANDARD.decode(compact.as_bytes()) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(decoded) => Cow::Owned(decoded),
                Err(_) => Cow::Borrowed(text),
            },
            Err(_) => Cow::Borrowed(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    /// `path`, `domain`, `expires`, `httpOnly`, `secure`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse a HAR file from disk into strongly typed structures.
pub fn parse_har_file(path: &Path) -> Result<Har> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let har: Har = serde_json::from_reader(reader).map_err(|err| {
        if err.is_data() {
            HarsiftError::InvalidHar(format!("{}: {}", path.display(), err))
        } else {
            HarsiftError::Json(err)
        }
    })?;
    Ok(har)
}

/// Parse raw archive bytes read from `origin`.
pub fn parse_har_bytes(bytes: &[u8], origin: &Path) -> Result<Har> {
    serde_json::from_slice(bytes).map_err(|err| {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            HarsiftError::InvalidHar(format!("{}: {}", origin.display(), err))
        } else {
            HarsiftError::Json(err)
        }
    })
}

/// Parse a HAR document held in memory.
pub fn parse_har_str(json: &str) -> Result<Har> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize a HAR document, pretty-printed unless `pretty` is false.
pub fn write_har<W: Write>(har: &Har, mut writer: W, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, har)?;
    } else {
        serde_json::to_writer(&mut writer, har)?;
    }
    writeln!(writer)?;
    Ok(())
}
