//! Layered settings: built-in defaults, then an optional TOML file, then
//! `GESSO_*` environment variables, then explicit CLI flags.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use gesso::{ChemistryDetection, ColorScheme, RenderOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub color_scheme: ColorScheme,
    pub chemistry: ChemistryDetection,
    pub debug: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl Settings {
    /// Load file and environment layers. CLI flag overrides are applied by
    /// the caller, which knows whether a flag was actually passed.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name("gesso").required(false));
        }
        builder = builder.add_source(Environment::with_prefix("GESSO"));
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new(self.color_scheme)
            .with_debug_mode(self.debug)
            .with_chemistry(self.chemistry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_assistant_html() {
        let settings = Settings::default();
        assert_eq!(settings.color_scheme, ColorScheme::Assistant);
        assert_eq!(settings.format, OutputFormat::Html);
        assert!(!settings.debug);
    }
}
