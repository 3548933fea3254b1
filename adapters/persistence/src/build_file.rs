//! Self-describing build file documents.

use brickyard_core::{height_in_layers, oriented_extent, PieceCategory, PieceColor, Scene};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    scene::{decode_scene, LoadReport},
    SceneFileError,
};

/// Format version written into new build files.
pub const BUILD_FILE_VERSION: &str = "1.0.0";

/// Name given to imported builds that do not carry one.
pub const UNTITLED: &str = "Untitled";

/// Bounding box of a build measured in studs and layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Studs covered along x.
    pub width: u32,
    /// Layers covered along y.
    pub height: u32,
    /// Studs covered along z.
    pub depth: u32,
}

/// Summary information derived from a scene.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    /// Number of placed pieces.
    pub piece_count: usize,
    /// Total number of studs across all pieces.
    pub stud_count: u64,
    /// Distinct colors in first-use order.
    pub colors: Vec<PieceColor>,
    /// Distinct categories in first-use order.
    pub categories: Vec<PieceCategory>,
    /// Bounding box of every footprint.
    pub dimensions: Dimensions,
}

impl BuildMetadata {
    /// Derives the metadata for the provided scene.
    #[must_use]
    pub fn of(scene: &Scene) -> Self {
        let mut metadata = Self {
            piece_count: scene.bricks.len(),
            ..Self::default()
        };
        let mut bounds: Option<([i64; 3], [i64; 3])> = None;

        for piece in &scene.bricks {
            metadata.stud_count = metadata.stud_count.saturating_add(piece.size.stud_count());
            if !metadata.colors.contains(&piece.color) {
                metadata.colors.push(piece.color);
            }
            if !metadata.categories.contains(&piece.size.category) {
                metadata.categories.push(piece.size.category);
            }

            let extent = oriented_extent(&piece.size, piece.rotation);
            let anchor = piece.anchor;
            let low = [
                i64::from(anchor.x()),
                i64::from(anchor.y()),
                i64::from(anchor.z()),
            ];
            let high = [
                low[0] + i64::from(extent.width),
                low[1] + i64::from(height_in_layers(&piece.size)),
                low[2] + i64::from(extent.length),
            ];
            bounds = Some(match bounds {
                None => (low, high),
                Some((min, max)) => (
                    [min[0].min(low[0]), min[1].min(low[1]), min[2].min(low[2])],
                    [max[0].max(high[0]), max[1].max(high[1]), max[2].max(high[2])],
                ),
            });
        }

        if let Some((min, max)) = bounds {
            metadata.dimensions = Dimensions {
                width: span(min[0], max[0]),
                height: span(min[1], max[1]),
                depth: span(min[2], max[2]),
            };
        }
        metadata
    }
}

fn span(min: i64, max: i64) -> u32 {
    u32::try_from(max - min).unwrap_or(u32::MAX)
}

/// Persisted build document wrapping a scene.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildFile {
    /// Format version.
    pub version: String,
    /// Creation timestamp, stored verbatim.
    pub created: String,
    /// Last modification timestamp, stored verbatim.
    pub modified: String,
    /// User facing build name.
    pub name: String,
    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Summary derived from the scene.
    pub metadata: BuildMetadata,
    /// The build itself.
    pub scene: Scene,
}

impl BuildFile {
    /// Wraps a scene into a fresh build document.
    #[must_use]
    pub fn new(
        scene: Scene,
        name: impl Into<String>,
        description: Option<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        let timestamp = timestamp.into();
        Self {
            version: BUILD_FILE_VERSION.to_owned(),
            created: timestamp.clone(),
            modified: timestamp,
            name: name.into(),
            description,
            metadata: BuildMetadata::of(&scene),
            scene,
        }
    }

    /// Replaces the scene, refreshing the metadata and modification time.
    pub fn update(&mut self, scene: Scene, timestamp: impl Into<String>) {
        self.metadata = BuildMetadata::of(&scene);
        self.scene = scene;
        self.modified = timestamp.into();
    }
}

/// Serialises a build file as pretty-printed JSON.
pub fn export_build(build: &BuildFile) -> Result<String, SceneFileError> {
    Ok(serde_json::to_string_pretty(build)?)
}

/// Parses a build file, repairing what can be repaired.
///
/// `version` and `scene` are mandatory. Metadata is always derived from the
/// decoded scene; stored metadata that disagrees with it is logged and
/// discarded.
pub fn import_build(json: &str) -> Result<(BuildFile, LoadReport), SceneFileError> {
    let document: Value = serde_json::from_str(json)?;
    let version = document
        .get("version")
        .and_then(Value::as_str)
        .filter(|version| !version.is_empty())
        .ok_or(SceneFileError::MissingVersion)?
        .to_owned();
    let stored_scene = document
        .get("scene")
        .filter(|scene| !scene.is_null())
        .ok_or(SceneFileError::MissingScene)?;
    let (scene, report) = decode_scene(stored_scene)?;

    let text = |key: &str| document.get(key).and_then(Value::as_str).map(str::to_owned);
    let metadata = BuildMetadata::of(&scene);
    match document.get("metadata").map(BuildMetadata::deserialize) {
        Some(Ok(stored)) if stored != metadata => {
            warn!("stored build metadata does not match the scene; recomputing");
        }
        Some(Err(error)) => warn!("recomputing unreadable build metadata: {error}"),
        _ => {}
    }

    let build = BuildFile {
        version,
        created: text("created").unwrap_or_default(),
        modified: text("modified").unwrap_or_default(),
        name: text("name").unwrap_or_else(|| UNTITLED.to_owned()),
        description: text("description"),
        metadata,
        scene,
    };
    Ok((build, report))
}
