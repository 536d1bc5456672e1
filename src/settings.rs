//! Project-wide settings, stored as TOML.
//!
//! ```toml
//! apply_default_layout_on_start = true
//! auto_add_missing_players = true
//! click_to_focus = true
//! focus_highlighting = false
//!
//! [default_layout]
//! preset = "four-player-grid"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ViewportError;
use crate::layout::{LayoutDefinition, LayoutPreset};

/// Where the startup layout comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultLayoutSource {
    Preset { preset: LayoutPreset },
    File { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportManagerSettings {
    pub apply_default_layout_on_start: bool,
    pub auto_add_missing_players: bool,
    pub click_to_focus: bool,
    pub focus_highlighting: bool,
    /// Kept last so it serializes as a trailing table.
    pub default_layout: Option<DefaultLayoutSource>,
}

impl Default for ViewportManagerSettings {
    fn default() -> Self {
        Self {
            apply_default_layout_on_start: true,
            auto_add_missing_players: true,
            click_to_focus: true,
            focus_highlighting: false,
            default_layout: None,
        }
    }
}

impl ViewportManagerSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, ViewportError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ViewportError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads settings from `path`. Relative layout paths inside the file are
    /// resolved against the settings file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewportError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ViewportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml_str(&text)?;
        if let Some(DefaultLayoutSource::File { path: layout_path }) = &mut settings.default_layout
            && layout_path.is_relative()
            && let Some(dir) = path.parent()
        {
            *layout_path = dir.join(&*layout_path);
        }
        tracing::debug!(path = %path.display(), "loaded viewport settings");
        Ok(settings)
    }

    pub fn with_default_preset(mut self, preset: LayoutPreset) -> Self {
        self.default_layout = Some(DefaultLayoutSource::Preset { preset });
        self
    }

    pub fn with_default_layout_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_layout = Some(DefaultLayoutSource::File { path: path.into() });
        self
    }

    /// Builds the configured default layout, if any.
    pub fn resolve_default_layout(&self) -> Result<Option<LayoutDefinition>, ViewportError> {
        match &self.default_layout {
            None => Ok(None),
            Some(DefaultLayoutSource::Preset { preset }) => Ok(Some(preset.build())),
            Some(DefaultLayoutSource::File { path }) => LayoutDefinition::load(path).map(Some),
        }
    }
}
