//! Tolerant scene decoding.
//!
//! A scene is rejected only when it has no piece list at all. Individual
//! pieces that cannot be interpreted are skipped and reported so a single
//! damaged entry never costs the user the rest of the build.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use brickyard_core::{
    catalog, Baseplate, GridCell, PieceColor, PieceId, PieceSize, PlacedPiece, Rotation, Scene,
};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::SceneFileError;

/// Piece entry that could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPiece {
    /// Position of the entry in the stored piece list.
    pub index: usize,
    /// Human readable decoding failure.
    pub reason: String,
}

/// Summary of the repairs applied while decoding a scene.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries dropped from the piece list.
    pub skipped: Vec<SkippedPiece>,
    /// Pieces whose stored identifier was missing, invalid or duplicated.
    pub reassigned_ids: usize,
    /// Set when the stored baseplate was unreadable and the default was used.
    pub baseplate_defaulted: bool,
}

impl LoadReport {
    /// Reports whether the scene decoded without any repair.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.reassigned_ids == 0 && !self.baseplate_defaulted
    }
}

/// Stored shape of a piece before identifiers are validated.
#[derive(Deserialize)]
struct PieceRecord {
    #[serde(default)]
    id: Option<Value>,
    size: PieceSize,
    color: PieceColor,
    #[serde(default)]
    rotation: Rotation,
    pos: GridCell,
}

/// Serialises a scene into its stored JSON shape.
pub fn encode_scene(scene: &Scene) -> Result<Value, SceneFileError> {
    Ok(serde_json::to_value(scene)?)
}

/// Decodes a stored scene, skipping pieces that cannot be interpreted.
///
/// Fails with [`SceneFileError::MissingPieceList`] when `bricks` is absent or
/// not a list. Identical descriptors are shared, and catalog descriptors are
/// reused when a stored size matches one exactly.
pub fn decode_scene(value: &Value) -> Result<(Scene, LoadReport), SceneFileError> {
    let entries = value
        .get("bricks")
        .and_then(Value::as_array)
        .ok_or(SceneFileError::MissingPieceList)?;
    let mut report = LoadReport::default();

    let baseplate = match value.get("baseplate") {
        None | Some(Value::Null) => Baseplate::default(),
        Some(raw) => Baseplate::deserialize(raw).unwrap_or_else(|error| {
            warn!("unreadable baseplate {raw}: {error}; using the default");
            report.baseplate_defaulted = true;
            Baseplate::default()
        }),
    };

    let mut descriptors = DescriptorCache::seeded();
    let mut records = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        match PieceRecord::deserialize(raw) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!("skipping stored piece {index}: {error}");
                report.skipped.push(SkippedPiece {
                    index,
                    reason: error.to_string(),
                });
            }
        }
    }

    let ids = assign_identifiers(&records);
    report.reassigned_ids = ids.iter().filter(|(_, reassigned)| *reassigned).count();
    if report.reassigned_ids > 0 {
        debug!("assigned fresh identifiers to {} pieces", report.reassigned_ids);
    }

    let bricks = records
        .into_iter()
        .zip(ids)
        .map(|(record, (id, _))| PlacedPiece {
            id,
            size: descriptors.intern(record.size),
            color: record.color,
            rotation: record.rotation,
            anchor: record.pos,
        })
        .collect();

    Ok((Scene { baseplate, bricks }, report))
}

fn stored_identifier(raw: Option<&Value>) -> Option<u32> {
    raw.and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
}

/// Keeps the first use of every valid identifier and numbers the rest
/// above the highest kept one, filling gaps once the range runs out.
fn assign_identifiers(records: &[PieceRecord]) -> Vec<(PieceId, bool)> {
    let mut taken = BTreeSet::new();
    let stored: Vec<Option<PieceId>> = records
        .iter()
        .map(|record| {
            stored_identifier(record.id.as_ref())
                .map(PieceId::new)
                .filter(|id| taken.insert(*id))
        })
        .collect();

    let mut next = match taken.last() {
        Some(highest) => highest.successor(),
        None => Some(PieceId::new(0)),
    };
    stored
        .into_iter()
        .map(|id| match id {
            Some(id) => (id, false),
            None => {
                let fresh = match next {
                    Some(fresh) => {
                        next = fresh.successor();
                        fresh
                    }
                    None => PieceId::lowest_unused(taken.iter().copied())
                        .unwrap_or(PieceId::new(u32::MAX)),
                };
                let _ = taken.insert(fresh);
                (fresh, true)
            }
        })
        .collect()
}

struct DescriptorCache {
    shared: HashMap<PieceSize, Arc<PieceSize>>,
}

impl DescriptorCache {
    fn seeded() -> Self {
        let shared = catalog::library()
            .iter()
            .map(|size| (PieceSize::clone(size), Arc::clone(size)))
            .collect();
        Self { shared }
    }

    fn intern(&mut self, size: PieceSize) -> Arc<PieceSize> {
        if let Some(shared) = self.shared.get(&size) {
            return Arc::clone(shared);
        }
        let shared = Arc::new(size.clone());
        let _ = self.shared.insert(size, Arc::clone(&shared));
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn piece(id: Value, x: i32) -> Value {
        json!({
            "id": id,
            "size": { "w": 2, "l": 2, "kind": "brick", "name": "2×2 Brick" },
            "color": "red",
            "rotation": 0,
            "pos": { "x": x, "y": 0, "z": 0 }
        })
    }

    #[test]
    fn missing_piece_list_is_distinguishable() {
        let error = decode_scene(&json!({ "baseplate": "small" })).expect_err("no bricks");
        assert!(matches!(error, SceneFileError::MissingPieceList));

        let error = decode_scene(&json!({ "bricks": "nope" })).expect_err("not a list");
        assert!(matches!(error, SceneFileError::MissingPieceList));
    }

    #[test]
    fn empty_list_is_a_valid_scene() {
        let (scene, report) = decode_scene(&json!({ "bricks": [] })).expect("decodes");
        assert_eq!(scene, Scene::empty(Baseplate::Medium));
        assert!(report.is_clean());
    }

    #[test]
    fn undecodable_pieces_are_skipped_and_reported() {
        let value = json!({
            "baseplate": "large",
            "bricks": [
                piece(json!(0), 0),
                { "id": 1, "color": "red", "pos": { "x": 4, "y": 0, "z": 0 } },
                piece(json!(2), 8),
            ]
        });

        let (scene, report) = decode_scene(&value).expect("decodes");

        assert_eq!(scene.baseplate, Baseplate::Large);
        assert_eq!(scene.bricks.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
    }

    #[test]
    fn legacy_and_duplicate_identifiers_are_renumbered() {
        let value = json!({
            "bricks": [
                piece(json!("V1StGXR8_Z5jdHi6B-myT"), 0),
                piece(json!(7), 4),
                piece(json!(7), 8),
            ]
        });

        let (scene, report) = decode_scene(&value).expect("decodes");
        let ids: Vec<_> = scene.bricks.iter().map(|piece| piece.id.get()).collect();

        assert_eq!(ids, vec![8, 7, 9]);
        assert_eq!(report.reassigned_ids, 2);
    }

    #[test]
    fn renumbering_past_the_last_identifier_fills_gaps() {
        let value = json!({
            "bricks": [
                piece(json!(u32::MAX), 0),
                piece(json!("abc"), 4),
                piece(json!(1), 8),
                piece(json!("def"), 12),
            ]
        });

        let (scene, report) = decode_scene(&value).expect("decodes");
        let ids: Vec<_> = scene.bricks.iter().map(|piece| piece.id.get()).collect();

        assert_eq!(ids, vec![u32::MAX, 0, 1, 2]);
        assert_eq!(report.reassigned_ids, 2);
    }

    #[test]
    fn unknown_baseplate_falls_back_to_default() {
        let (scene, report) =
            decode_scene(&json!({ "baseplate": "huge", "bricks": [] })).expect("decodes");
        assert_eq!(scene.baseplate, Baseplate::Medium);
        assert!(report.baseplate_defaulted);
    }

    #[test]
    fn catalog_descriptors_are_shared() {
        let stored = catalog::find_by_part("3001").expect("2×4 brick");
        let value = json!({
            "bricks": [
                { "id": 0, "size": &*stored, "color": "blue", "pos": { "x": 0, "y": 0, "z": 0 } },
                { "id": 1, "size": &*stored, "color": "blue", "pos": { "x": 4, "y": 0, "z": 0 } },
            ]
        });

        let (scene, _) = decode_scene(&value).expect("decodes");

        assert!(Arc::ptr_eq(&scene.bricks[0].size, &stored));
        assert!(Arc::ptr_eq(&scene.bricks[0].size, &scene.bricks[1].size));
    }

    #[test]
    fn missing_optional_fields_use_kind_defaults() {
        let value = json!({
            "bricks": [{
                "id": 3,
                "size": { "w": 1, "l": 4, "kind": "plate", "future": true },
                "color": "white",
                "pos": { "x": 0, "y": 0, "z": 0 }
            }]
        });

        let (scene, report) = decode_scene(&value).expect("decodes");

        assert!(report.is_clean());
        assert_eq!(scene.bricks[0].rotation, Rotation::Deg0);
        assert_eq!(scene.bricks[0].footprint().height(), 1);
    }
}
