use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::Shell;
use crate::output::ColorMode;

pub const SETTINGS_FILE: &str = ".histfix.toml";

/// Optional defaults read from `~/.histfix.toml`. Command-line flags win.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub shell: Option<Shell>,
    /// External filter program (default `strings`)
    pub strings_bin: Option<String>,
    pub builtin_filter: Option<bool>,
    pub min_len: Option<usize>,
    pub refuse_empty: Option<bool>,
    pub banner: Option<bool>,
    pub progress: Option<bool>,
    pub color: Option<ColorMode>,
}

impl Settings {
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(SETTINGS_FILE)
    }

    /// A missing file is only an error when the path was given explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !path.exists() {
            if explicit {
                anyhow::bail!("settings file not found: {}", path.display());
            }
            tracing::debug!(path = %path.display(), "no settings file");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        if settings.min_len == Some(0) {
            anyhow::bail!("{}: min_len must be at least 1", path.display());
        }
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }
}
