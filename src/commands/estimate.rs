use std::path::Path;

use super::util::{load_archive, print_json, SnapshotSource};
use crate::error::Result;
use crate::export::summarize;
use crate::filter::records;

#[derive(Clone, Debug, Default)]
pub struct EstimateOptions {
    pub json: bool,
    pub snapshot: SnapshotSource,
}

/// Report how much of the archive an export would carry.
pub fn run_estimate(input: &Path, options: &EstimateOptions) -> Result<()> {
    let archive = load_archive(input)?;
    let filters = options.snapshot.load_filters(&archive)?;
    let settings = options.snapshot.load_settings(&archive)?;

    let all = records(&archive.har);
    let summary = summarize(&all, &filters, &settings);

    if options.json {
        return print_json(&summary);
    }
    println!("Entries: {}", summary.total);
    println!("Visible: {}", summary.visible);
    println!("Selected: {}", summary.selected);
    println!("Estimated tokens: ~{}", summary.estimated_tokens);
    Ok(())
}
