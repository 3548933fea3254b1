//! Optional `brickyard.toml` configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use brickyard_core::{catalog, Baseplate, PieceColor};
use log::debug;
use serde::Deserialize;

/// Configuration file looked up in the working directory.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "brickyard.toml";

/// Defaults applied when a command does not override them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Baseplate for new builds and free-standing snaps.
    pub(crate) baseplate: Baseplate,
    /// Color used when placing pieces.
    pub(crate) color: PieceColor,
    /// Catalog part number or piece name used when placing pieces.
    pub(crate) part: String,
    /// Directory backing the build library.
    pub(crate) library_dir: PathBuf,
    /// Mirror every edited scene into the library's autosave slot.
    pub(crate) autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baseplate: Baseplate::default(),
            color: PieceColor::default(),
            part: catalog::DEFAULT_PART.to_owned(),
            library_dir: PathBuf::from("brickyard-library"),
            autosave: false,
        }
    }
}

impl Config {
    /// Loads the configuration from `explicit`, or from the default file when
    /// one exists. Only an explicitly named file is required to exist.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            Self::from_path(path)
        } else {
            debug!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
            Ok(Self::default())
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if catalog::find(&config.part).is_none() {
            bail!("configured part `{}` is not in the catalog", config.part);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(Config::parse("").expect("parses"), Config::default());
    }

    #[test]
    fn fields_override_defaults_individually() {
        let config = Config::parse(
            r#"
            baseplate = "large"
            color = "darkblue"
            autosave = true
            "#,
        )
        .expect("parses");

        assert_eq!(config.baseplate, Baseplate::Large);
        assert_eq!(config.color, PieceColor::DarkBlue);
        assert!(config.autosave);
        assert_eq!(config.part, catalog::DEFAULT_PART);
    }

    #[test]
    fn unknown_parts_and_keys_are_rejected() {
        assert!(Config::parse(r#"part = "99999""#).is_err());
        assert!(Config::parse(r#"colour = "red""#).is_err());
    }

    #[test]
    fn parts_may_be_named() {
        let config = Config::parse(r#"part = "3x2 Slope 25°""#).expect("parses");
        assert_eq!(config.part, "3x2 Slope 25°");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("custom.toml");
        fs::write(&path, "library_dir = \"builds\"\n").expect("writes");

        let config = Config::load(Some(&path)).expect("loads");
        assert_eq!(config.library_dir, PathBuf::from("builds"));
    }
}
