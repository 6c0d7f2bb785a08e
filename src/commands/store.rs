use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::util::{load_archive, open_store, print_json, read_json};
use crate::error::Result;
use crate::export::ExportSettings;
use crate::filter::FilterConfig;
use crate::store::CopyMode;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredSnapshot {
    key: String,
    filters: FilterConfig,
    export_settings: ExportSettings,
}

/// Print what the store holds for an archive.
pub fn run_store_show(input: &Path, store_dir: Option<&Path>) -> Result<()> {
    let archive = load_archive(input)?;
    let store = open_store(store_dir)?;
    print_json(&StoredSnapshot {
        filters: store.load_filters(&archive.key)?,
        export_settings: store.load_export_settings(&archive.key)?,
        key: archive.key,
    })
}

#[derive(Clone, Debug, Default)]
pub struct StoreSaveOptions {
    pub filters: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
}

/// Record snapshot files in the store under the archive's key.
pub fn run_store_save(input: &Path, options: &StoreSaveOptions) -> Result<()> {
    let archive = load_archive(input)?;
    let store = open_store(options.store_dir.as_deref())?;
    if let Some(path) = &options.filters {
        let filters: FilterConfig = read_json(path)?;
        store.save_filters(&archive.key, &filters)?;
    }
    if let Some(path) = &options.settings {
        let settings: ExportSettings = read_json(path)?;
        store.save_export_settings(&archive.key, &settings)?;
    }
    println!("Saved settings for {} ({})", archive.name, archive.key);
    Ok(())
}

#[derive(Clone, Debug, Default)]
pub struct StoreCopyOptions {
    pub merge: bool,
    /// Carry custom and disabled noise headers along.
    pub noise: bool,
    /// Also replace the target's export settings.
    pub export_settings: bool,
    pub store_dir: Option<PathBuf>,
}

/// Copy stored filters (and optionally export settings) between archives.
pub fn run_store_copy(source: &Path, target: &Path, options: &StoreCopyOptions) -> Result<()> {
    let from = load_archive(source)?;
    let to = load_archive(target)?;
    let store = open_store(options.store_dir.as_deref())?;

    let mode = if options.merge {
        CopyMode::Merge
    } else {
        CopyMode::Replace
    };
    store.copy_filters(&from.key, &to.key, mode, options.noise)?;
    if options.export_settings {
        store.copy_export_settings(&from.key, &to.key, options.noise)?;
    }
    info!(source = %from.key, target = %to.key, ?mode, "copied settings");

    println!("Copied filters from {} to {}", from.name, to.name);
    Ok(())
}
