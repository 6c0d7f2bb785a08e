//! Per-archive persistence of filter configuration and export settings.
//!
//! Each archive is identified by the blake3 digest of its bytes, so a file
//! that is renamed or moved keeps its settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::export::ExportSettings;
use crate::filter::{FilterConfig, FilterMap};

pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyMode {
    /// Target settings become the source's.
    Replace,
    /// Maps are merged with the source winning; tree and sort come from the
    /// source.
    Merge,
}

pub fn archive_key(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn archive_key_for_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(archive_key(&bytes))
}

fn merged(target: &FilterMap, source: &FilterMap) -> FilterMap {
    let mut out = target.clone();
    out.extend(source.iter().map(|(k, v)| (k.clone(), *v)));
    out
}

#[derive(Clone, Debug)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn filters_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.filters.json", key))
    }

    fn settings_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.export.json", key))
    }

    fn load<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    pub fn load_filters(&self, key: &str) -> Result<FilterConfig> {
        self.load(&self.filters_path(key))
    }

    pub fn save_filters(&self, key: &str, filters: &FilterConfig) -> Result<()> {
        self.save(&self.filters_path(key), filters)
    }

    pub fn load_export_settings(&self, key: &str) -> Result<ExportSettings> {
        self.load(&self.settings_path(key))
    }

    pub fn save_export_settings(&self, key: &str, settings: &ExportSettings) -> Result<()> {
        self.save(&self.settings_path(key), settings)
    }

    /// Copy filters from one archive to another. Noise header lists travel
    /// with the filters only when `copy_noise` is set.
    pub fn copy_filters(
        &self,
        source: &str,
        target: &str,
        mode: CopyMode,
        copy_noise: bool,
    ) -> Result<()> {
        let from = self.load_filters(source)?;
        let to = self.load_filters(target)?;

        let next = match mode {
            CopyMode::Replace => from,
            CopyMode::Merge => FilterConfig {
                expression_tree: from.expression_tree,
                quick_filters: merged(&to.quick_filters, &from.quick_filters),
                tag_filters: merged(&to.tag_filters, &from.tag_filters),
                domain_filters: merged(&to.domain_filters, &from.domain_filters),
                sort_column: from.sort_column,
                sort_direction: from.sort_direction,
            },
        };
        self.save_filters(target, &next)?;

        if copy_noise {
            let from = self.load_export_settings(source)?;
            let mut to = self.load_export_settings(target)?;
            match mode {
                CopyMode::Replace => {
                    to.user_noise_headers = from.user_noise_headers;
                    to.disabled_noise_headers = from.disabled_noise_headers;
                }
                CopyMode::Merge => {
                    to.user_noise_headers =
                        merged(&to.user_noise_headers, &from.user_noise_headers);
                    to.disabled_noise_headers =
                        merged(&to.disabled_noise_headers, &from.disabled_noise_headers);
                }
            }
            self.save_export_settings(target, &to)?;
        }
        Ok(())
    }

    /// Replace the target's export settings with the source's, keeping the
    /// target's noise lists unless `copy_noise` is set.
    pub fn copy_export_settings(&self, source: &str, target: &str, copy_noise: bool) -> Result<()> {
        let mut next = self.load_export_settings(source)?;
        if !copy_noise {
            let current = self.load_export_settings(target)?;
            next.user_noise_headers = current.user_noise_headers;
            next.disabled_noise_headers = current.disabled_noise_headers;
        }
        self.save_export_settings(target, &next)
    }
}

/// Coalesces rapid edits into one save once edits have been quiet for the
/// delay. Time is passed in, so the owner drives it from its own loop.
#[derive(Debug)]
pub struct SaveDebouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Default for SaveDebouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY)
    }
}

impl<T> SaveDebouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue `value`, replacing anything pending and restarting the delay.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Save the pending value if its delay has elapsed. Returns whether a
    /// save was attempted.
    pub fn poll<F>(&mut self, now: Instant, sink: F) -> bool
    where
        F: FnOnce(T) -> Result<()>,
    {
        match &self.pending {
            Some((_, due)) if *due <= now => self.flush(sink),
            _ => false,
        }
    }

    /// Save the pending value immediately. A failed save is logged and
    /// dropped.
    pub fn flush<F>(&mut self, sink: F) -> bool
    where
        F: FnOnce(T) -> Result<()>,
    {
        let Some((value, _)) = self.pending.take() else {
            return false;
        };
        if let Err(err) = sink(value) {
            warn!(error = %err, "failed to save settings");
        }
        true
    }
}
