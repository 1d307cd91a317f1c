use chrono::Locale;
use serde::Deserialize;
use std::convert::TryFrom;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Color, Error, ErrorKind, ProgramId, Result};
use crate::period::Granularity;

const CONFIG_PATH_ENV_VAR: &str = "SYLLABUS_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("syllabus").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".syllabus.toml"));
    }

    locations
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TOML file with programs, sessions and assignments. The built-in sample
    /// data is used when unset.
    pub data_file: Option<PathBuf>,
    pub locale: String,
    pub default_view: Granularity,
    /// Program filter selected on startup.
    pub program: Option<ProgramId>,
    pub palette: Vec<Color>,
    pub rows_per_slot: usize,
    pub column_width: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            data_file: None,
            locale: "en_GB".to_owned(),
            default_view: Granularity::Week,
            program: None,
            palette: ["#4f46e5", "#16a34a", "#ea580c", "#db2777", "#0891b2"]
                .iter()
                .filter_map(|c| c.parse().ok())
                .collect(),
            rows_per_slot: 2,
            column_width: 18,
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn locale(&self) -> Result<Locale> {
        Locale::try_from(self.locale.as_str()).map_err(|_| {
            Error::new(
                ErrorKind::ConfigParse,
                &format!("unknown locale '{}'", self.locale),
            )
        })
    }

    fn validate(&self) -> Result<()> {
        self.locale()?;

        if self.rows_per_slot == 0 {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                "rows_per_slot must be at least 1",
            ));
        }

        if self.column_width < 8 {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                "column_width must be at least 8",
            ));
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::from(e).with_msg(&format!("Could not read config file {}", path.display()))
    })?;

    Config::from_toml_str(&contents).map_err(|e| {
        let msg = format!(
            "{} ({})",
            e.message.as_deref().unwrap_or("rejected"),
            path.display()
        );
        e.with_msg(&msg)
    })
}

/// Loads `path` if given, otherwise the first existing default location, and
/// falls back to the built-in defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return load_config(path);
    }

    match find_configfile_locations().into_iter().find(|p| p.exists()) {
        Some(path) => {
            log::info!("Using config file {}", path.display());
            load_config(&path)
        }
        None => {
            log::info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.palette.len(), 5);
        assert_eq!(config.default_view, Granularity::Week);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r##"
            default_view = "month"
            program = "cs"
            palette = ["#000000"]
            "##,
        )
        .unwrap();

        assert_eq!(config.default_view, Granularity::Month);
        assert_eq!(config.program, Some(ProgramId::new("cs")));
        assert_eq!(config.palette, vec!["#000000".parse::<Color>().unwrap()]);
        assert_eq!(config.rows_per_slot, 2);
        assert_eq!(config.locale, "en_GB");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_toml_str("rows_per_slot = 0").is_err());
        assert!(Config::from_toml_str("locale = \"xx_YY\"").is_err());
        assert!(Config::from_toml_str("palette = [\"blue\"]").is_err());
        assert!(Config::from_toml_str("default_view = \"year\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(load_suitable_config(Some(Path::new("/nonexistent/syllabus.toml"))).is_err());
    }
}
