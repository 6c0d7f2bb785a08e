use std::path::Path;

use serde::Serialize;

use super::util::{load_archive, print_json, SnapshotSource};
use crate::error::Result;
use crate::export::format_size;
use crate::filter::fields;
use crate::filter::{classify, records, sort_view, Highlight, Visibility};

#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    /// Include hidden records, marked as such.
    pub all: bool,
    pub json: bool,
    pub snapshot: SnapshotSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRow {
    position: usize,
    method: String,
    status: i64,
    resource_type: &'static str,
    size: u64,
    time: u64,
    url: String,
    visible: bool,
    deselected: bool,
    highlights: Vec<Highlight>,
}

/// Print the records in view order.
pub fn run_list(input: &Path, options: &ListOptions) -> Result<()> {
    let archive = load_archive(input)?;
    let filters = options.snapshot.load_filters(&archive)?;
    let settings = options.snapshot.load_settings(&archive)?;
    let visibility = Visibility::new(&filters);

    let all = records(&archive.har);
    let shown = if options.all {
        sort_view(&all, filters.sort_column.as_deref(), filters.sort_direction)
    } else {
        visibility.visible(&all)
    };

    let rows: Vec<ListRow> = shown
        .iter()
        .map(|r| {
            let entry = r.entry;
            ListRow {
                position: r.position,
                method: entry.request.method.clone(),
                status: entry.response.status,
                resource_type: classify(entry).as_str(),
                size: fields::size(entry),
                time: fields::time(entry),
                url: entry.request.url.clone(),
                visible: visibility.is_visible(entry),
                deselected: settings.is_deselected(r.position),
                highlights: visibility.highlights(entry),
            }
        })
        .collect();

    if options.json {
        return print_json(&rows);
    }

    for row in &rows {
        let marker = match (row.visible, row.deselected) {
            (false, _) => '-',
            (true, true) => '~',
            (true, false) => ' ',
        };
        let mut line = format!(
            "{}{:>5}  {:<7} {:>3}  {:<10} {:>9} {:>7}ms  {}",
            marker,
            row.position,
            row.method,
            row.status,
            row.resource_type,
            format_size(row.size),
            row.time,
            row.url
        );
        for h in &row.highlights {
            line.push_str(&format!("  [{}] {}", h.color, h.tooltip));
        }
        println!("{}", line);
    }
    Ok(())
}
