use std::time::{Duration, Instant};

use super::util::{load_archive, print_json, save_settings, SnapshotSource};
use crate::error::{HarsiftError, Result};
use crate::export::noise::noise_headers;
use crate::export::ExportSettings;
use crate::store::{SaveDebouncer, DEFAULT_SAVE_DELAY};

#[derive(Clone, Debug)]
pub struct NoiseOptions {
    pub json: bool,
    /// Archive whose settings to read. Without one, only the builtin list
    /// with defaults is shown.
    pub input: Option<std::path::PathBuf>,
    pub add: Vec<String>,
    pub remove: Vec<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub save: bool,
    pub save_delay: Duration,
    pub snapshot: SnapshotSource,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            json: false,
            input: None,
            add: Vec::new(),
            remove: Vec::new(),
            enable: Vec::new(),
            disable: Vec::new(),
            save: false,
            save_delay: DEFAULT_SAVE_DELAY,
            snapshot: SnapshotSource::default(),
        }
    }
}

fn has_edits(options: &NoiseOptions) -> bool {
    !(options.add.is_empty()
        && options.remove.is_empty()
        && options.enable.is_empty()
        && options.disable.is_empty())
}

/// List noise headers, builtin and custom, with their enabled state.
pub fn run_noise(options: &NoiseOptions) -> Result<()> {
    let archive = options.input.as_deref().map(load_archive).transpose()?;
    let mut settings = match &archive {
        Some(archive) => options.snapshot.load_settings(archive)?,
        None if options.snapshot.settings.is_some() || options.snapshot.use_store => {
            return Err(HarsiftError::InvalidArgs(
                "Reading noise settings needs an archive".to_string(),
            ))
        }
        None => ExportSettings::default(),
    };
    if options.save && archive.is_none() {
        return Err(HarsiftError::InvalidArgs(
            "--save needs an archive".to_string(),
        ));
    }

    let mut saver = SaveDebouncer::new(options.save_delay);
    for name in &options.add {
        settings = settings.add_user_noise_header(name);
        saver.schedule(settings.clone(), Instant::now());
    }
    for name in &options.remove {
        settings = settings.remove_user_noise_header(name);
        saver.schedule(settings.clone(), Instant::now());
    }
    for name in &options.enable {
        settings = settings.toggle_noise_header(name, true);
        saver.schedule(settings.clone(), Instant::now());
    }
    for name in &options.disable {
        settings = settings.toggle_noise_header(name, false);
        saver.schedule(settings.clone(), Instant::now());
    }

    match (&archive, options.save && has_edits(options)) {
        (Some(archive), true) => {
            saver.flush(|s| save_settings(&options.snapshot, archive, &s));
        }
        _ => {
            saver.cancel();
        }
    }

    let headers = noise_headers(&settings.user_noise_headers, &settings.disabled_noise_headers);
    if options.json {
        return print_json(&headers);
    }
    for h in &headers {
        println!(
            "[{}] {} ({})",
            if h.enabled { "x" } else { " " },
            h.name,
            if h.builtin { "builtin" } else { "custom" }
        );
    }
    Ok(())
}
