use std::path::Path;
use std::time::{Duration, Instant};

use super::util::{load_archive, print_json, save_filters, SnapshotSource};
use crate::error::{HarsiftError, Result};
use crate::filter::exclusion::quick_filter_keys;
use crate::filter::{quick_filter_buttons, records, Preset};
use crate::store::{SaveDebouncer, DEFAULT_SAVE_DELAY};

#[derive(Clone, Debug)]
pub struct QuickOptions {
    pub json: bool,
    /// Applied before any toggles.
    pub preset: Option<String>,
    /// Quick filter keys to flip.
    pub toggle: Vec<String>,
    /// Persist the edited filters.
    pub save: bool,
    pub save_delay: Duration,
    pub snapshot: SnapshotSource,
}

impl Default for QuickOptions {
    fn default() -> Self {
        Self {
            json: false,
            preset: None,
            toggle: Vec::new(),
            save: false,
            save_delay: DEFAULT_SAVE_DELAY,
            snapshot: SnapshotSource::default(),
        }
    }
}

/// Show quick filter buttons with the number of records each would hide,
/// optionally after applying a preset and toggles.
pub fn run_quick(input: &Path, options: &QuickOptions) -> Result<()> {
    let archive = load_archive(input)?;
    let mut filters = options.snapshot.load_filters(&archive)?;
    let mut saver = SaveDebouncer::new(options.save_delay);

    if let Some(name) = &options.preset {
        let preset = Preset::parse(name).ok_or_else(|| {
            let known: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
            HarsiftError::InvalidArgs(format!(
                "Unknown preset '{}' (expected one of: {})",
                name,
                known.join(", ")
            ))
        })?;
        filters = preset.apply(&filters);
        saver.schedule(filters.clone(), Instant::now());
    }

    for key in &options.toggle {
        if !quick_filter_keys().any(|k| k == key.as_str()) {
            return Err(HarsiftError::InvalidArgs(format!(
                "Unknown quick filter '{}'",
                key
            )));
        }
        let active = filters.quick_filters.get(key).copied().unwrap_or(false);
        filters = filters.with_quick_filter(key, !active);
        saver.schedule(filters.clone(), Instant::now());
    }

    if options.save {
        saver.flush(|f| save_filters(&options.snapshot, &archive, &f));
    } else {
        saver.cancel();
    }

    let buttons = quick_filter_buttons(&records(&archive.har), &filters);
    if options.json {
        return print_json(&buttons);
    }
    for b in &buttons {
        println!(
            "[{}] {:<12} {} ({})",
            if b.active { "x" } else { " " },
            b.key,
            b.label,
            b.count
        );
    }
    Ok(())
}
