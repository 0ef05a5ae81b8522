use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use eyre::WrapErr;
use serde::{Deserialize, Serialize};

use crate::{config::get_config_file, notebook::Notebook};

/// Application wide settings, kept in the user's config folder.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub debug: bool,
    #[serde(default)]
    pub notebooks: Vec<Notebook>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file(&get_config_file())
    }

    pub fn from_file(config_file: &Path) -> Result<Self, ConfigError> {
        let default_str = include_str!("defaultconfig.toml");
        let config_file = config_file.to_string_lossy();

        let config = Config::builder()
            .add_source(File::from_str(default_str, config::FileFormat::Toml))
            .add_source(File::with_name(config_file.as_ref()).required(false))
            // Eg.. `NOTEKEEPER_DEBUG=true notekeeper` sets the `debug` key
            .add_source(Environment::with_prefix("notekeeper").prefix_separator("_"))
            .build()?;
        config.try_deserialize::<Settings>()
    }

    /// Adds `notebook` unless a notebook with the same path is already known.
    pub fn add_notebook(&mut self, notebook: Notebook) -> bool {
        if self.notebooks.iter().any(|n| n.path == notebook.path) {
            return false;
        }
        self.notebooks.push(notebook);
        true
    }
}

pub fn save_settings(settings: &Settings) -> eyre::Result<()> {
    save_settings_to(settings, &get_config_file())
}

pub fn save_settings_to(settings: &Settings, config_path: &Path) -> eyre::Result<()> {
    let toml = toml::to_string(settings)?;
    if let Some(folder) = config_path.parent() {
        std::fs::create_dir_all(folder)?;
    }
    std::fs::write(config_path, toml)
        .wrap_err_with(|| format!("Could not save settings to {config_path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(&dir.path().join("config.toml")).unwrap();

        assert!(settings.notebooks.is_empty());
    }

    #[test]
    fn saved_settings_load_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notekeeper").join("config.toml");
        let mut settings = Settings::default();
        settings.add_notebook(Notebook::new("Work", dir.path().join("work")));
        settings.add_notebook(Notebook::new("Home", dir.path().join("home")));
        save_settings_to(&settings, &path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.notebooks, settings.notebooks);
    }

    #[test]
    fn notebooks_are_unique_by_path() {
        let mut settings = Settings::default();
        assert!(settings.add_notebook(Notebook::new("Notes", "/tmp/notes")));
        assert!(!settings.add_notebook(Notebook::new("Other name", "/tmp/notes")));
        assert_eq!(settings.notebooks.len(), 1);
    }
}
