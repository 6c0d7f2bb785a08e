use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarsiftError, Result};
use crate::export::ExportFormat;

const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: Option<ExportConfig>,
    #[serde(default)]
    pub filters: Option<FiltersConfig>,
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExportConfig {
    pub format: Option<ExportFormat>,
    pub compact: Option<bool>,
    pub output: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub use_store: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FiltersConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StoreConfig {
    pub dir: Option<PathBuf>,
    pub debounce_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ResolvedConfig {
    pub export: ResolvedExportConfig,
    pub filters: ResolvedFiltersConfig,
    pub store: ResolvedStoreConfig,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ResolvedExportConfig {
    pub format: ExportFormat,
    pub compact: bool,
    pub output: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub use_store: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ResolvedFiltersConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedStoreConfig {
    pub dir: Option<PathBuf>,
    pub debounce_ms: u64,
}

impl Default for ResolvedStoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl ResolvedConfig {
    pub fn from_config(config: &Config) -> Self {
        let mut resolved = Self::default();
        if let Some(cfg) = &config.export {
            resolved.export.apply(cfg);
        }
        if let Some(cfg) = &config.filters {
            resolved.filters.apply(cfg);
        }
        if let Some(cfg) = &config.store {
            resolved.store.apply(cfg);
        }
        resolved
    }
}

impl ResolvedExportConfig {
    fn apply(&mut self, cfg: &ExportConfig) {
        if let Some(value) = cfg.format {
            self.format = value;
        }
        if let Some(value) = cfg.compact {
            self.compact = value;
        }
        if let Some(value) = cfg.output.clone() {
            self.output = Some(value);
        }
        if let Some(value) = cfg.settings.clone() {
            self.settings = Some(value);
        }
        if let Some(value) = cfg.use_store {
            self.use_store = value;
        }
    }
}

impl ResolvedFiltersConfig {
    fn apply(&mut self, cfg: &FiltersConfig) {
        if let Some(value) = cfg.path.clone() {
            self.path = Some(value);
        }
    }
}

impl ResolvedStoreConfig {
    fn apply(&mut self, cfg: &StoreConfig) {
        if let Some(value) = cfg.dir.clone() {
            self.dir = Some(value);
        }
        if let Some(value) = cfg.debounce_ms {
            self.debounce_ms = value;
        }
    }

    /// Configured store directory, else the per-user data directory.
    pub fn dir_or_default(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(default_store_dir)
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_search_paths()?)
}

/// Load and merge every existing file in `paths`; later files win field by
/// field.
pub fn load_config_from(paths: &[PathBuf]) -> Result<Config> {
    let mut config = Config::default();
    for path in paths {
        if !path.exists() {
            continue;
        }
        let contents = fs::read_to_string(path)?;
        let parsed: Config = toml::from_str(&contents).map_err(|err| {
            HarsiftError::InvalidArgs(format!(
                "Failed to parse config {}: {}",
                path.display(),
                err
            ))
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        merge_config(&mut config, parsed);
    }
    Ok(config)
}

fn merge_config(base: &mut Config, other: Config) {
    merge_section(&mut base.export, other.export, ExportConfig::merge);
    merge_section(&mut base.filters, other.filters, FiltersConfig::merge);
    merge_section(&mut base.store, other.store, StoreConfig::merge);
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
    if let Some(other_section) = other {
        match base {
            Some(existing) => merge(existing, other_section),
            None => *base = Some(other_section),
        }
    }
}

impl ExportConfig {
    fn merge(&mut self, other: ExportConfig) {
        merge_opt(&mut self.format, other.format);
        merge_opt(&mut self.compact, other.compact);
        merge_opt(&mut self.output, other.output);
        merge_opt(&mut self.settings, other.settings);
        merge_opt(&mut self.use_store, other.use_store);
    }
}

impl FiltersConfig {
    fn merge(&mut self, other: FiltersConfig) {
        merge_opt(&mut self.path, other.path);
    }
}

impl StoreConfig {
    fn merge(&mut self, other: StoreConfig) {
        merge_opt(&mut self.dir, other.dir);
        merge_opt(&mut self.debounce_ms, other.debounce_ms);
    }
}

fn merge_opt<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

fn config_search_paths() -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    if let Some(home) = home_dir() {
        if let Some(config_home) = config_home_dir(&home) {
            paths.push(config_home.join("harsift").join("harsift.toml"));
        }
        if let Some(appdata) = env::var_os("APPDATA") {
            paths.push(PathBuf::from(appdata).join("harsift").join("harsift.toml"));
        }
        paths.push(home.join(".harsiftrc"));
    }

    if let Ok(cwd) = env::current_dir() {
        let mut dirs = Vec::new();
        let mut current: Option<&Path> = Some(cwd.as_path());
        while let Some(dir) = current {
            dirs.push(dir.to_path_buf());
            current = dir.parent();
        }
        dirs.reverse();
        for dir in dirs {
            paths.push(dir.join(".harsiftrc"));
            paths.push(dir.join("harsift.toml"));
        }
    }

    Ok(paths)
}

fn config_home_dir(home: &Path) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    Some(home.join(".config"))
}

fn default_store_dir() -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg).join("harsift").join("store"));
    }
    home_dir().map(|home| home.join(".local").join("share").join("harsift").join("store"))
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
}

pub fn render_config(config: &ResolvedConfig) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|err| HarsiftError::InvalidArgs(format!("Failed to render config: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn later_files_override_field_by_field() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("harsift.toml");
        fs::write(
            &global,
            "[export]\nformat = \"text\"\ncompact = true\n\n[store]\ndebounce_ms = 250\n",
        )
        .unwrap();
        fs::write(&local, "[export]\ncompact = false\n\n[filters]\npath = \"f.json\"\n").unwrap();

        let config = load_config_from(&[global, dir.path().join("missing.toml"), local]).unwrap();
        let resolved = ResolvedConfig::from_config(&config);
        assert_eq!(resolved.export.format, ExportFormat::Text);
        assert!(!resolved.export.compact);
        assert_eq!(resolved.filters.path, Some(PathBuf::from("f.json")));
        assert_eq!(resolved.store.debounce_ms, 250);
    }

    #[test]
    fn bad_toml_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".harsiftrc");
        fs::write(&path, "[export\n").unwrap();
        let err = load_config_from(&[path]).unwrap_err();
        assert!(matches!(err, HarsiftError::InvalidArgs(_)));
        assert!(err.to_string().contains(".harsiftrc"));
    }

    #[test]
    fn renders_defaults() {
        let text = render_config(&ResolvedConfig::default()).unwrap();
        assert!(text.contains("[export]"));
        assert!(text.contains("format = \"har\""));
        assert!(text.contains("debounce_ms = 500"));
    }
}
