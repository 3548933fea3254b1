//! Single-line share codes for clipboard transfer of a scene.
//!
//! A code reads `bricks:v1:<extent>:<payload>`, where the extent selects the
//! baseplate and the payload is the unpadded base64 encoding of the piece
//! list as JSON.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use brickyard_core::{Baseplate, PlacedPiece, Scene};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    scene::{decode_scene, LoadReport},
    SceneFileError,
};

const SHARE_DOMAIN: &str = "bricks";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded payload.
pub const SHARE_HEADER: &str = "bricks:v1";
/// Delimiter used to separate the prefix, baseplate extent and payload.
const FIELD_DELIMITER: char = ':';

#[derive(Serialize)]
struct SharedPieces<'a> {
    bricks: &'a [PlacedPiece],
}

/// Errors that can occur while encoding or decoding share codes.
#[derive(Debug, Error)]
pub enum ShareCodeError {
    /// The provided string was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the code.
    #[error("share code is missing the prefix")]
    MissingPrefix,
    /// The code did not contain a version segment.
    #[error("share code is missing the version")]
    MissingVersion,
    /// The code did not include the baseplate extent.
    #[error("share code is missing the baseplate extent")]
    MissingExtent,
    /// The code did not include the payload segment.
    #[error("share code is missing the payload")]
    MissingPayload,
    /// The code used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The extent does not name a known baseplate.
    #[error("'{0}' is not a supported baseplate extent")]
    InvalidExtent(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share code payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload was not valid JSON.
    #[error("could not parse share code payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The payload did not describe a scene.
    #[error(transparent)]
    Scene(#[from] SceneFileError),
}

/// Encodes the scene into a single-line share code.
pub fn encode_share_code(scene: &Scene) -> Result<String, ShareCodeError> {
    let payload = SharedPieces {
        bricks: &scene.bricks,
    };
    let json = serde_json::to_vec(&payload).map_err(SceneFileError::from)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SHARE_HEADER}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{encoded}",
        scene.baseplate.extent()
    ))
}

/// Decodes a share code back into a scene.
///
/// Pieces are decoded as tolerantly as build files; the report lists what
/// had to be repaired.
pub fn decode_share_code(value: &str) -> Result<(Scene, LoadReport), ShareCodeError> {
    let code = value.trim();
    if code.is_empty() {
        return Err(ShareCodeError::EmptyPayload);
    }

    let Segments { extent, payload } = Segments::split(code)?;
    let baseplate = extent
        .parse::<u32>()
        .ok()
        .and_then(Baseplate::from_extent)
        .ok_or_else(|| ShareCodeError::InvalidExtent(extent.to_owned()))?;
    let bytes = STANDARD_NO_PAD
        .decode(payload)
        .map_err(ShareCodeError::InvalidEncoding)?;
    let pieces: Value = serde_json::from_slice(&bytes).map_err(ShareCodeError::InvalidPayload)?;

    let (scene, report) = decode_scene(&pieces)?;
    Ok((Scene { baseplate, ..scene }, report))
}

/// Header-validated fields of a share code.
struct Segments<'a> {
    extent: &'a str,
    payload: &'a str,
}

impl<'a> Segments<'a> {
    /// Splits `code` into its four fields, checking the prefix and version.
    ///
    /// The payload keeps any further delimiters, so a damaged payload is
    /// reported as an encoding error rather than silently truncated.
    fn split(code: &'a str) -> Result<Self, ShareCodeError> {
        let fields: Vec<&str> = code.splitn(4, FIELD_DELIMITER).collect();
        match fields[..] {
            [] => Err(ShareCodeError::EmptyPayload),
            [domain, ..] if domain.is_empty() => Err(ShareCodeError::MissingPrefix),
            [domain, ..] if domain != SHARE_DOMAIN => {
                Err(ShareCodeError::InvalidPrefix(domain.to_owned()))
            }
            [_] => Err(ShareCodeError::MissingVersion),
            [_, version, ..] if version != SHARE_VERSION => {
                Err(ShareCodeError::UnsupportedVersion(version.to_owned()))
            }
            [_, _] => Err(ShareCodeError::MissingExtent),
            [_, _, _] => Err(ShareCodeError::MissingPayload),
            [_, _, extent, payload, ..] => Ok(Self {
                extent: extent.trim(),
                payload,
            }),
        }
    }
}
