//! Selection, ordering and serialization of the export.

use chrono::Timelike;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::export::settings::ExportSettings;
use crate::export::tokens::estimate_entry_tokens;
use crate::export::transform::transform_entry;
use crate::filter::{FilterConfig, Record, Visibility};
use crate::har::{Entry, Har, Log};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Har,
    Text,
}

/// Visible records that are not deselected, in view order or, when
/// `useOriginalOrder` is on, in archive order.
pub fn export_selection<'a>(
    records: &[Record<'a>],
    filters: &FilterConfig,
    settings: &ExportSettings,
) -> Vec<Record<'a>> {
    let mut selection: Vec<Record<'a>> = Visibility::new(filters)
        .visible(records)
        .into_iter()
        .filter(|r| !settings.is_deselected(r.position))
        .collect();
    if settings.use_original_order {
        selection.sort_by_key(|r| r.position);
    }
    selection
}

/// The archive with `log.entries` replaced by the transformed selection.
/// Everything else in the envelope is kept.
pub fn build_filtered_har(har: &Har, selection: &[Record<'_>], settings: &ExportSettings) -> Har {
    Har {
        log: Log {
            entries: selection
                .iter()
                .map(|r| transform_entry(r, settings))
                .collect(),
            extra: har.log.extra.clone(),
        },
        extra: har.extra.clone(),
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    if bytes == 0 {
        "0 B".to_string()
    } else if bytes < 1024 {
        format!("{} B", bytes)
    } else if (bytes as f64) < MB {
        format!("{:.1} KB", bytes as f64 / KB)
    } else {
        format!("{:.1} MB", bytes as f64 / MB)
    }
}

fn push_text_entry(lines: &mut Vec<String>, n: usize, entry: &Entry) {
    let request = &entry.request;
    let response = &entry.response;

    lines.push(format!("--- #{} ---", n));
    lines.push(format!("{} {}", request.method, request.url));
    for h in &request.headers {
        lines.push(format!("{}: {}", h.name, h.value));
    }
    if let Some(body) = request
        .post_data
        .as_ref()
        .and_then(|p| p.text.as_deref())
        .filter(|t| !t.is_empty())
    {
        lines.push(String::new());
        lines.push(body.to_string());
    }

    let body = response.content.text.as_deref().unwrap_or("");
    lines.push(String::new());
    lines.push(format!(
        "> {} {} ({})",
        response.status,
        response.status_text,
        format_size(body.chars().count() as u64)
    ));
    for h in &response.headers {
        lines.push(format!("{}: {}", h.name, h.value));
    }
    if !body.is_empty() {
        lines.push(String::new());
        lines.push(body.to_string());
    }
    lines.push(String::new());
}

/// Plain-text rendering of the transformed selection.
pub fn build_text_export(selection: &[Record<'_>], settings: &ExportSettings) -> String {
    let mut lines = Vec::new();
    for (i, record) in selection.iter().enumerate() {
        let entry = transform_entry(record, settings);
        push_text_entry(&mut lines, i + 1, &entry);
    }
    lines.join("\n")
}

/// Default download name: `filtered-HH-MM_<name>` for archives,
/// `ai-HH-MM_<name>.txt` for text.
pub fn export_file_name<T: Timelike>(format: ExportFormat, source_name: &str, at: &T) -> String {
    match format {
        ExportFormat::Har => format!("filtered-{:02}-{:02}_{}", at.hour(), at.minute(), source_name),
        ExportFormat::Text => {
            format!("ai-{:02}-{:02}_{}.txt", at.hour(), at.minute(), source_name)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total: usize,
    pub visible: usize,
    pub selected: usize,
    pub estimated_tokens: usize,
}

pub fn summarize(
    records: &[Record<'_>],
    filters: &FilterConfig,
    settings: &ExportSettings,
) -> ExportSummary {
    let visible = Visibility::new(filters).visible(records).len();
    let selection = export_selection(records, filters, settings);
    ExportSummary {
        total: records.len(),
        visible,
        selected: selection.len(),
        estimated_tokens: selection
            .iter()
            .map(|r| estimate_entry_tokens(r, settings))
            .sum(),
    }
}
