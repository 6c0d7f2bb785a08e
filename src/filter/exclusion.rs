//! Auxiliary exclusion layers: quick filters (resource class or extension),
//! derived content tags and domains.
//!
//! All three maps are `key -> bool`; only keys mapped to `true` are active.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::export::base64::is_base64_content;
use crate::filter::fields::{self, ResourceClass};
use crate::har::Entry;

pub type FilterMap = BTreeMap<String, bool>;

/// Extension quick filters and their labels, in display order.
pub const EXTENSION_FILTERS: [(&str, &str); 13] = [
    (".png", ".png"),
    (".jpg", ".jpg/.jpeg"),
    (".gif", ".gif"),
    (".svg", ".svg"),
    (".ico", ".ico"),
    (".webp", ".webp"),
    (".woff", ".woff"),
    (".woff2", ".woff2"),
    (".ttf", ".ttf"),
    (".css", ".css"),
    (".js", ".js"),
    (".map", ".map"),
    (".json", ".json"),
];

fn active_keys(map: &FilterMap) -> impl Iterator<Item = &str> {
    map.iter().filter(|(_, on)| **on).map(|(k, _)| k.as_str())
}

/// Every quick filter key: resource classes first, then extensions.
pub fn quick_filter_keys() -> impl Iterator<Item = &'static str> {
    ResourceClass::ALL
        .iter()
        .map(|c| c.as_str())
        .chain(EXTENSION_FILTERS.iter().map(|(k, _)| *k))
}

pub fn quick_filter_label(key: &str) -> Option<&'static str> {
    if let Some(class) = ResourceClass::ALL.iter().find(|c| c.as_str() == key) {
        return Some(class.label());
    }
    EXTENSION_FILTERS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

/// Whether `entry` falls under quick filter `key`. Unknown keys match nothing.
pub fn quick_key_matches(entry: &Entry, key: &str) -> bool {
    if let Some(class) = ResourceClass::ALL.iter().find(|c| c.as_str() == key) {
        return fields::classify(entry) == *class;
    }
    if EXTENSION_FILTERS.iter().any(|(k, _)| *k == key) {
        let ext = fields::extension(&entry.request.url);
        return ext == key || (key == ".jpg" && ext == ".jpeg");
    }
    false
}

pub fn is_quick_excluded(entry: &Entry, quick: &FilterMap) -> bool {
    active_keys(quick).any(|k| quick_key_matches(entry, k))
}

/// Quick exclusion ignoring `skip`, used when counting the impact of `skip`.
pub fn is_quick_excluded_except(entry: &Entry, quick: &FilterMap, skip: &str) -> bool {
    active_keys(quick)
        .filter(|k| *k != skip)
        .any(|k| quick_key_matches(entry, k))
}

/// Content tags derived from an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "resp-json")]
    RespJson,
    #[serde(rename = "req-json")]
    ReqJson,
    #[serde(rename = "payload")]
    Payload,
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "base64")]
    Base64,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::Html,
        Tag::RespJson,
        Tag::ReqJson,
        Tag::Payload,
        Tag::Query,
        Tag::Base64,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Html => "html",
            Tag::RespJson => "resp-json",
            Tag::ReqJson => "req-json",
            Tag::Payload => "payload",
            Tag::Query => "query",
            Tag::Base64 => "base64",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_html_mime(mime: &str) -> bool {
    let m = mime.to_lowercase();
    m.contains("text/html") || m.contains("xhtml")
}

pub fn is_json_mime(mime: &str) -> bool {
    mime.to_lowercase().contains("json")
}

pub fn entry_tags(entry: &Entry) -> Vec<Tag> {
    let mut tags = Vec::new();
    let resp_mime = fields::response_mime(entry);
    let req_mime = fields::request_mime(entry);
    let req_body = entry
        .request
        .post_data
        .as_ref()
        .and_then(|p| p.text.as_deref())
        .unwrap_or("");
    let resp_body = entry.response.content.text.as_deref().unwrap_or("");

    if is_html_mime(&resp_mime) {
        tags.push(Tag::Html);
    }
    if is_json_mime(&resp_mime) {
        tags.push(Tag::RespJson);
    }
    if is_json_mime(&req_mime) {
        tags.push(Tag::ReqJson);
    }
    if !req_body.is_empty() {
        tags.push(Tag::Payload);
    }
    if entry
        .request
        .query_string
        .as_ref()
        .is_some_and(|q| !q.is_empty())
    {
        tags.push(Tag::Query);
    }
    if entry.response.content.is_base64_encoded()
        || is_base64_content(resp_body)
        || is_base64_content(req_body)
    {
        tags.push(Tag::Base64);
    }
    tags
}

/// With at least one active tag, an entry carrying any active tag is
/// excluded. No active tag excludes nothing.
pub fn is_tag_excluded(entry: &Entry, tags: &FilterMap) -> bool {
    let mut active = active_keys(tags).peekable();
    if active.peek().is_none() {
        return false;
    }
    let carried = entry_tags(entry);
    active.any(|key| carried.iter().any(|t| t.as_str() == key))
}

pub fn is_domain_excluded(entry: &Entry, domains: &FilterMap) -> bool {
    let domain = fields::domain(&entry.request.url);
    domains.get(&domain).copied().unwrap_or(false)
}
