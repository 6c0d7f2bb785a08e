use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use super::util::{load_archive, open_output, SnapshotSource};
use crate::error::Result;
use crate::export::{
    build_filtered_har, build_text_export, estimate_entry_tokens, export_file_name,
    export_selection, ExportFormat,
};
use crate::filter::records;
use crate::har::write_har;

/// Options for writing a filtered archive or its text rendering.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Destination file, `-` for stdout. Defaults to a timestamped name in
    /// the working directory.
    pub output: Option<PathBuf>,
    pub compact: bool,
    pub snapshot: SnapshotSource,
}

pub fn run_export(input: &Path, options: &ExportOptions) -> Result<()> {
    let archive = load_archive(input)?;
    let filters = options.snapshot.load_filters(&archive)?;
    let settings = options.snapshot.load_settings(&archive)?;

    let all = records(&archive.har);
    let selection = export_selection(&all, &filters, &settings);
    let tokens: usize = selection
        .iter()
        .map(|r| estimate_entry_tokens(r, &settings))
        .sum();

    let output_path = options.output.clone().unwrap_or_else(|| {
        PathBuf::from(export_file_name(
            options.format,
            &archive.name,
            &Local::now(),
        ))
    });

    let mut writer = open_output(&output_path)?;
    match options.format {
        ExportFormat::Har => {
            let har = build_filtered_har(&archive.har, &selection, &settings);
            write_har(&har, &mut writer, !options.compact)?;
        }
        ExportFormat::Text => {
            let text = build_text_export(&selection, &settings);
            writer.write_all(text.as_bytes())?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;

    info!(
        selected = selection.len(),
        total = all.len(),
        tokens,
        output = %output_path.display(),
        "export written"
    );

    if output_path != Path::new("-") {
        println!(
            "Exported {} of {} entries (~{} tokens) to {}",
            selection.len(),
            all.len(),
            tokens,
            output_path.display()
        );
    }

    Ok(())
}
