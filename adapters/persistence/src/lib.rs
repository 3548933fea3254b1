#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence adapter for Brickyard scenes.
//!
//! Scenes travel in three shapes: self-describing build files, compact share
//! codes for the clipboard, and a directory-backed library of named builds.
//! All three decode pieces tolerantly and report what they had to repair.

use thiserror::Error;

pub mod build_file;
pub mod library;
pub mod scene;
pub mod share_code;

pub use build_file::{
    export_build, import_build, BuildFile, BuildMetadata, Dimensions, BUILD_FILE_VERSION,
};
pub use library::{BuildLibrary, BuildSummary, LibraryError};
pub use scene::{decode_scene, encode_scene, LoadReport, SkippedPiece};
pub use share_code::{decode_share_code, encode_share_code, ShareCodeError};

/// Errors raised while reading or writing scene documents.
#[derive(Debug, Error)]
pub enum SceneFileError {
    /// The document is not well-formed JSON.
    #[error("malformed scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The build file does not state its format version.
    #[error("build file has no version")]
    MissingVersion,
    /// The build file does not contain a scene.
    #[error("build file has no scene")]
    MissingScene,
    /// The scene has no piece list, so nothing in it can be trusted.
    #[error("scene has no piece list")]
    MissingPieceList,
}
