//! On-disk library of named builds plus an autosave slot.
//!
//! Every named build lives in its own JSON file inside the library directory.
//! Builds are addressed by their stored name, never by file name, so renaming
//! a file by hand does not lose the build.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use brickyard_core::Scene;
use log::{debug, warn};
use thiserror::Error;

use crate::{
    build_file::{export_build, import_build, BuildFile},
    scene::{decode_scene, encode_scene, LoadReport},
    SceneFileError,
};

/// File holding the most recent session, outside the named build list.
pub const AUTOSAVE_FILE: &str = "autosave.scene";

const BUILD_SUFFIX: &str = "_build.json";

/// Errors raised while reading or writing the build library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Filesystem access failed.
    #[error("failed to access {}", path.display())]
    Io {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A stored file could not be decoded.
    #[error("build file {} is invalid", path.display())]
    Invalid {
        /// Offending file.
        path: PathBuf,
        /// Decoding failure.
        #[source]
        source: SceneFileError,
    },
    /// No build with the requested name exists.
    #[error("no saved build named '{0}'")]
    NotFound(String),
    /// Builds must carry a non-blank name.
    #[error("build name must not be blank")]
    EmptyName,
}

/// Listing entry for a saved build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildSummary {
    /// Stored build name.
    pub name: String,
    /// Last modification timestamp.
    pub modified: String,
    /// Number of placed pieces.
    pub piece_count: usize,
    /// File backing the build.
    pub path: PathBuf,
}

/// Directory of named build files.
#[derive(Clone, Debug)]
pub struct BuildLibrary {
    root: PathBuf,
}

impl BuildLibrary {
    /// Opens the library rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| LibraryError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Directory backing the library.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves the scene under `name`, replacing any build with the same name.
    ///
    /// A replaced build keeps its creation time and file.
    pub fn save_named(
        &self,
        scene: Scene,
        name: &str,
        description: Option<String>,
        timestamp: &str,
    ) -> Result<BuildFile, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }

        let (build, path) = match self.find(name)? {
            Some((path, mut existing)) => {
                existing.update(scene, timestamp);
                if description.is_some() {
                    existing.description = description;
                }
                (existing, path)
            }
            None => (
                BuildFile::new(scene, name, description, timestamp),
                self.unused_path(name),
            ),
        };

        let json = export_build(&build).map_err(|source| LibraryError::Invalid {
            path: path.clone(),
            source,
        })?;
        write(&path, json.as_bytes())?;
        debug!("saved build '{name}' to {}", path.display());
        Ok(build)
    }

    /// Lists every readable build, ordered by name.
    ///
    /// Files that fail to decode are skipped with a warning.
    pub fn list(&self) -> Result<Vec<BuildSummary>, LibraryError> {
        let mut summaries: Vec<_> = self
            .builds()?
            .into_iter()
            .map(|(path, build)| BuildSummary {
                name: build.name,
                modified: build.modified,
                piece_count: build.metadata.piece_count,
                path,
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    /// Loads the build stored under `name`.
    pub fn load(&self, name: &str) -> Result<(BuildFile, LoadReport), LibraryError> {
        let (path, _) = self
            .find(name.trim())?
            .ok_or_else(|| LibraryError::NotFound(name.to_owned()))?;
        read_build(&path)
    }

    /// Deletes the build stored under `name`, reporting whether one existed.
    pub fn delete(&self, name: &str) -> Result<bool, LibraryError> {
        let Some((path, _)) = self.find(name.trim())? else {
            return Ok(false);
        };
        fs::remove_file(&path).map_err(|source| LibraryError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("deleted build '{name}' at {}", path.display());
        Ok(true)
    }

    /// Overwrites the autosave slot with the scene.
    pub fn autosave(&self, scene: &Scene) -> Result<(), LibraryError> {
        let path = self.root.join(AUTOSAVE_FILE);
        let json = encode_scene(scene).map_err(|source| LibraryError::Invalid {
            path: path.clone(),
            source,
        })?;
        write(&path, json.to_string().as_bytes())
    }

    /// Restores the autosave slot, if one has been written.
    pub fn restore_autosave(&self) -> Result<Option<(Scene, LoadReport)>, LibraryError> {
        let path = self.root.join(AUTOSAVE_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(LibraryError::Io { path, source }),
        };
        let decoded = serde_json::from_str(&contents)
            .map_err(SceneFileError::from)
            .and_then(|value| decode_scene(&value));
        match decoded {
            Ok(restored) => Ok(Some(restored)),
            Err(source) => Err(LibraryError::Invalid { path, source }),
        }
    }

    fn builds(&self) -> Result<Vec<(PathBuf, BuildFile)>, LibraryError> {
        let entries = fs::read_dir(&self.root).map_err(|source| LibraryError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut builds = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| LibraryError::Io {
                    path: self.root.clone(),
                    source,
                })?
                .path();
            if path.extension().and_then(|extension| extension.to_str()) != Some("json") {
                continue;
            }
            match read_build(&path) {
                Ok((build, _)) => builds.push((path, build)),
                Err(error) => warn!("ignoring unreadable build: {error}"),
            }
        }
        Ok(builds)
    }

    fn find(&self, name: &str) -> Result<Option<(PathBuf, BuildFile)>, LibraryError> {
        Ok(self
            .builds()?
            .into_iter()
            .find(|(_, build)| build.name == name))
    }

    fn unused_path(&self, name: &str) -> PathBuf {
        let stem = file_stem(name);
        let mut candidate = self.root.join(format!("{stem}{BUILD_SUFFIX}"));
        let mut attempt = 2;
        while candidate.exists() {
            candidate = self.root.join(format!("{stem}_{attempt}{BUILD_SUFFIX}"));
            attempt += 1;
        }
        candidate
    }
}

/// File-system friendly form of a build name.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn read_build(path: &Path) -> Result<(BuildFile, LoadReport), LibraryError> {
    let contents = fs::read_to_string(path).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_build(&contents).map_err(|source| LibraryError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &[u8]) -> Result<(), LibraryError> {
    fs::write(path, contents).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stems_replace_everything_but_ascii_alphanumerics() {
        assert_eq!(file_stem("My Castle #2"), "my_castle__2");
        assert_eq!(file_stem("Żuraw"), "_uraw");
    }

    #[test]
    fn blank_names_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let library = BuildLibrary::open(dir.path()).expect("opens");

        assert!(matches!(
            library.save_named(Scene::default(), "   ", None, "0"),
            Err(LibraryError::EmptyName)
        ));
    }

    #[test]
    fn colliding_stems_get_distinct_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let library = BuildLibrary::open(dir.path()).expect("opens");

        let _ = library
            .save_named(Scene::default(), "My Car", None, "0")
            .expect("saves");
        let _ = library
            .save_named(Scene::default(), "my car", None, "0")
            .expect("saves");

        let listed = library.list().expect("lists");
        assert_eq!(listed.len(), 2);
        assert_ne!(listed[0].path, listed[1].path);
    }
}
