use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{HarsiftError, Result};
use crate::export::ExportSettings;
use crate::filter::FilterConfig;
use crate::har::{parse_har_bytes, Har};
use crate::store::{archive_key, SettingsStore};

/// A parsed archive together with its store key and display name.
pub struct Archive {
    pub har: Har,
    pub key: String,
    pub name: String,
}

pub fn load_archive(path: &Path) -> Result<Archive> {
    let bytes = fs::read(path)?;
    let har = parse_har_bytes(&bytes, path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive.har".to_string());
    info!(
        path = %path.display(),
        entries = har.log.entries.len(),
        "loaded archive"
    );
    Ok(Archive {
        har,
        key: archive_key(&bytes),
        name,
    })
}

/// Where filter and settings snapshots come from. An explicit file wins over
/// the store; with neither, defaults apply.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSource {
    pub filters: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub use_store: bool,
    pub store_dir: Option<PathBuf>,
}

impl SnapshotSource {
    pub fn store(&self) -> Result<Option<SettingsStore>> {
        if !self.use_store {
            return Ok(None);
        }
        open_store(self.store_dir.as_deref()).map(Some)
    }

    pub fn load_filters(&self, archive: &Archive) -> Result<FilterConfig> {
        if let Some(path) = &self.filters {
            return read_json(path);
        }
        match self.store()? {
            Some(store) => store.load_filters(&archive.key),
            None => Ok(FilterConfig::default()),
        }
    }

    pub fn load_settings(&self, archive: &Archive) -> Result<ExportSettings> {
        if let Some(path) = &self.settings {
            return read_json(path);
        }
        match self.store()? {
            Some(store) => store.load_export_settings(&archive.key),
            None => Ok(ExportSettings::default()),
        }
    }
}

pub fn open_store(dir: Option<&Path>) -> Result<SettingsStore> {
    let dir = dir.ok_or_else(|| {
        HarsiftError::InvalidArgs(
            "No settings store directory; pass --store-dir or set [store] dir".to_string(),
        )
    })?;
    SettingsStore::open(dir)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    debug!(path = %path.display(), "read snapshot");
    serde_json::from_str(&contents).map_err(|err| {
        HarsiftError::InvalidArgs(format!("Failed to parse {}: {}", path.display(), err))
    })
}

pub fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdout().lock()));
    }
    Ok(Box::new(BufWriter::new(File::create(path)?)))
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

/// Write edited filters back where they came from: the `--filters` file if
/// one was given, else the store.
pub fn save_filters(source: &SnapshotSource, archive: &Archive, filters: &FilterConfig) -> Result<()> {
    if let Some(path) = &source.filters {
        return write_json(path, filters);
    }
    open_store(source.store_dir.as_deref())?.save_filters(&archive.key, filters)
}

pub fn save_settings(
    source: &SnapshotSource,
    archive: &Archive,
    settings: &ExportSettings,
) -> Result<()> {
    if let Some(path) = &source.settings {
        return write_json(path, settings);
    }
    open_store(source.store_dir.as_deref())?.save_export_settings(&archive.key, settings)
}
