//! Reshapes one record for export according to [`ExportSettings`].
//!
//! The predicates deciding which headers survive and how bodies are
//! rewritten are shared with the token estimator, so an estimate always
//! describes the archive the transform would produce.

use serde_json::Map;
use url::Url;

use crate::export::base64::{is_base64_content, placeholder};
use crate::export::minify::{is_html_body, minify_html, minify_json};
use crate::export::settings::ExportSettings;
use crate::filter::exclusion::{is_json_mime, FilterMap};
use crate::filter::Record;
use crate::har::{Content, Entry, Header, Response, HOST_BOOKKEEPING_KEYS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

/// Headers whose lowercase name is not mapped to `false`, order preserved.
pub fn filter_headers(headers: &[Header], included: &FilterMap) -> Vec<Header> {
    headers
        .iter()
        .filter(|h| included.get(&h.key()).copied().unwrap_or(true))
        .cloned()
        .collect()
}

/// Whether a header line is kept in the exported record. Noise headers are
/// always dropped; `hide_noise_*` only affects header listings.
pub fn header_survives(header: &Header, direction: Direction, settings: &ExportSettings) -> bool {
    let key = header.key();
    let (cookie_header, keep_cookies, included) = match direction {
        Direction::Request => (
            "cookie",
            settings.request_cookies,
            &settings.included_request_headers,
        ),
        Direction::Response => (
            "set-cookie",
            settings.response_cookies,
            &settings.included_response_headers,
        ),
    };
    if !keep_cookies && key == cookie_header {
        return false;
    }
    if settings.is_noise(&key) {
        return false;
    }
    included.get(&key).copied().unwrap_or(true)
}

/// A body after minification and base64 elision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapedBody {
    pub text: String,
    pub changed: bool,
    pub base64_stripped: bool,
}

/// Body pipeline: HTML minify, JSON minify, base64 elision. Minification is
/// skipped for bodies stored with a base64 transfer encoding.
pub fn shape_body(
    text: &str,
    mime: Option<&str>,
    base64_encoded: bool,
    settings: &ExportSettings,
) -> ShapedBody {
    let mime_str = mime.unwrap_or("");
    let mut out = text.to_string();

    if !base64_encoded {
        if settings.minify_html && is_html_body(mime_str) {
            out = minify_html(&out);
        }
        if settings.minify_json && is_json_mime(mime_str) {
            out = minify_json(&out);
        }
    }

    let mut base64_stripped = false;
    if settings.strip_base64 && (base64_encoded || is_base64_content(&out)) {
        out = placeholder(&out, mime);
        base64_stripped = true;
    }

    ShapedBody {
        changed: out != text,
        text: out,
        base64_stripped,
    }
}

/// URL as exported: the query component is dropped when query strings are
/// off. Unparseable URLs are kept as they are.
pub fn export_url(url: &str, settings: &ExportSettings) -> String {
    if settings.query_string {
        return url.to_string();
    }
    match Url::parse(url) {
        Ok(mut parsed) if parsed.query().is_some() => {
            parsed.set_query(None);
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}

fn excluded_response(response: &Response) -> Response {
    let mut extra = Map::new();
    if let Some(version) = response.extra.get("httpVersion") {
        extra.insert("httpVersion".to_string(), version.clone());
    }
    Response {
        status: response.status,
        status_text: response.status_text.clone(),
        headers: Vec::new(),
        cookies: Some(Vec::new()),
        content: Content {
            size: Some(0),
            mime_type: Some(String::new()),
            text: Some(String::new()),
            encoding: None,
            extra: Map::new(),
        },
        body_size: Some(0),
        extra,
    }
}

fn char_len(text: &str) -> i64 {
    text.chars().count() as i64
}

/// Produce the exported form of `record`. The input is never modified.
pub fn transform_entry(record: &Record<'_>, settings: &ExportSettings) -> Entry {
    let mut entry = record.entry.clone();
    let response_excluded = settings.is_response_excluded(record.position);

    if response_excluded {
        entry.response = excluded_response(&entry.response);
    }

    if !settings.request_body {
        entry.request.post_data = None;
    }
    if !settings.response_body && !response_excluded {
        entry.response.content.text = Some(String::new());
        entry.response.content.size = Some(0);
    }

    if let Some(post) = entry.request.post_data.as_mut() {
        if let Some(text) = post.text.as_deref().filter(|t| !t.is_empty()) {
            let shaped = shape_body(text, post.mime_type.as_deref(), false, settings);
            if shaped.changed {
                post.text = Some(shaped.text);
            }
        }
    }

    if !response_excluded {
        let content = &mut entry.response.content;
        if let Some(text) = content.text.as_deref().filter(|t| !t.is_empty()) {
            let shaped = shape_body(
                text,
                content.mime_type.as_deref(),
                content.is_base64_encoded(),
                settings,
            );
            if shaped.base64_stripped {
                content.encoding = None;
            }
            if shaped.changed {
                content.size = Some(char_len(&shaped.text));
                content.text = Some(shaped.text);
            }
        }
    }

    if !settings.request_cookies {
        entry.request.cookies = Some(Vec::new());
    }
    if !settings.response_cookies {
        entry.response.cookies = Some(Vec::new());
    }

    if !settings.timings {
        entry.timings = None;
    }
    if !settings.server_ip {
        entry.server_ip_address = None;
    }
    if !settings.query_string {
        if entry.request.query_string.is_some() {
            entry.request.query_string = Some(Vec::new());
        }
        entry.request.url = export_url(&entry.request.url, settings);
    }
    if !settings.include_initiator {
        entry.extra.remove("_initiator");
    }

    entry
        .request
        .headers
        .retain(|h| header_survives(h, Direction::Request, settings));
    entry
        .response
        .headers
        .retain(|h| header_survives(h, Direction::Response, settings));

    entry.resource_type = None;
    for key in HOST_BOOKKEEPING_KEYS {
        entry.extra.remove(*key);
    }

    entry
}
