//! Token estimates, computed without building the exported records.

use crate::export::assemble::export_selection;
use crate::export::settings::ExportSettings;
use crate::export::transform::{export_url, header_survives, shape_body, Direction};
use crate::filter::{FilterConfig, Record};
use crate::har::{Entry, Header};

/// Fixed per-record overhead for separators and the status line.
const RECORD_OVERHEAD: usize = 20;

/// Roughly four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

fn header_tokens(header: &Header) -> usize {
    estimate_tokens(&format!("{}: {}", header.name, header.value))
}

/// Estimate for a record as it would be exported with `settings`.
pub fn estimate_entry_tokens(record: &Record<'_>, settings: &ExportSettings) -> usize {
    let entry = record.entry;
    let request = &entry.request;
    let response_excluded = settings.is_response_excluded(record.position);

    let mut tokens = estimate_tokens(&format!(
        "{} {}",
        request.method,
        export_url(&request.url, settings)
    ));

    tokens += request
        .headers
        .iter()
        .filter(|h| header_survives(h, Direction::Request, settings))
        .map(header_tokens)
        .sum::<usize>();

    if !response_excluded {
        tokens += entry
            .response
            .headers
            .iter()
            .filter(|h| header_survives(h, Direction::Response, settings))
            .map(header_tokens)
            .sum::<usize>();
    }

    if settings.request_body {
        if let Some(post) = &request.post_data {
            if let Some(text) = post.text.as_deref().filter(|t| !t.is_empty()) {
                let shaped = shape_body(text, post.mime_type.as_deref(), false, settings);
                tokens += estimate_tokens(&shaped.text);
            }
        }
    }

    if !response_excluded && settings.response_body {
        let content = &entry.response.content;
        if let Some(text) = content.text.as_deref().filter(|t| !t.is_empty()) {
            let shaped = shape_body(
                text,
                content.mime_type.as_deref(),
                content.is_base64_encoded(),
                settings,
            );
            tokens += estimate_tokens(&shaped.text);
        }
    }

    if settings.query_string {
        tokens += request
            .query_string
            .iter()
            .flatten()
            .map(|q| estimate_tokens(&format!("{}={}", q.name, q.value)))
            .sum::<usize>();
    }

    tokens + RECORD_OVERHEAD
}

/// Estimate for the whole export selection.
pub fn estimate_export_tokens(
    records: &[Record<'_>],
    filters: &FilterConfig,
    settings: &ExportSettings,
) -> usize {
    export_selection(records, filters, settings)
        .iter()
        .map(|r| estimate_entry_tokens(r, settings))
        .sum()
}

/// Estimate of a record as captured, ignoring export settings.
pub fn estimate_raw_tokens(entry: &Entry) -> usize {
    let request = &entry.request;
    let mut tokens = estimate_tokens(&format!("{} {}", request.method, request.url));
    tokens += request.headers.iter().map(header_tokens).sum::<usize>();
    tokens += entry.response.headers.iter().map(header_tokens).sum::<usize>();
    if let Some(text) = request.post_data.as_ref().and_then(|p| p.text.as_deref()) {
        tokens += estimate_tokens(text);
    }
    if let Some(text) = entry.response.content.text.as_deref() {
        tokens += estimate_tokens(text);
    }
    tokens + RECORD_OVERHEAD
}
