#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system converting pointer hits into candidate grid anchors.
//!
//! Hit points arrive in baseplate-centred world coordinates, with the origin
//! in the middle of the plate. Anchors are produced in grid space, where the
//! plate spans `[0, extent)` along both horizontal axes.

use brickyard_core::{
    oriented_extent, Baseplate, GridCell, PieceId, PieceSize, PlacedPiece, Rotation,
    ToolSelection,
};
use glam::Vec3;

/// Surface the pointer ray intersected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitSurface {
    /// The baseplate itself.
    Baseplate,
    /// The top of an existing piece.
    Piece(PieceId),
}

/// Latest pointer intersection reported by the input adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerHit {
    /// Intersection point in baseplate-centred world coordinates.
    pub point: Vec3,
    /// Surface that was hit.
    pub surface: HitSurface,
}

impl PointerHit {
    /// Creates a hit against the baseplate.
    #[must_use]
    pub const fn on_baseplate(point: Vec3) -> Self {
        Self {
            point,
            surface: HitSurface::Baseplate,
        }
    }

    /// Creates a hit against the top of an existing piece.
    #[must_use]
    pub const fn on_piece(point: Vec3, piece: PieceId) -> Self {
        Self {
            point,
            surface: HitSurface::Piece(piece),
        }
    }
}

/// Horizontal position snapped to the stud grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Snap {
    /// Anchor column in grid space.
    pub grid_x: i32,
    /// Anchor row in grid space.
    pub grid_z: i32,
    /// Anchor column in baseplate-centred world coordinates.
    pub world_x: i32,
    /// Anchor row in baseplate-centred world coordinates.
    pub world_z: i32,
}

/// Snaps a hit point to the nearest stud and clamps the footprint onto the plate.
///
/// The anchor is clamped so the oriented footprint stays inside
/// `[0, baseplate_extent)`. A piece wider than the plate clamps to zero, so the
/// result is always deterministic, even for non-finite input.
#[must_use]
pub fn snap(
    hit_x: f32,
    hit_z: f32,
    size: &PieceSize,
    rotation: Rotation,
    baseplate_extent: u32,
) -> Snap {
    let extent = oriented_extent(size, rotation);
    let half_extent = i64::from(baseplate_extent / 2);
    let grid_x = snap_axis(hit_x, half_extent, baseplate_extent, extent.width);
    let grid_z = snap_axis(hit_z, half_extent, baseplate_extent, extent.length);

    Snap {
        grid_x: narrow(grid_x),
        grid_z: narrow(grid_z),
        world_x: narrow(grid_x - half_extent),
        world_z: narrow(grid_z - half_extent),
    }
}

fn snap_axis(hit: f32, half_extent: i64, baseplate_extent: u32, piece_extent: u32) -> i64 {
    let upper = (i64::from(baseplate_extent) - i64::from(piece_extent)).max(0);
    // Halves round towards positive infinity.
    let nearest = (f64::from(hit) + half_extent as f64 + 0.5).floor();
    let nearest = if nearest.is_nan() { 0 } else { nearest as i64 };
    nearest.clamp(0, upper)
}

fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Layer a new piece starts at when placed on the hit surface.
///
/// Returns `None` when the hit names a piece the lookup no longer knows.
pub fn resolve_layer<'a, F>(surface: HitSurface, piece: F) -> Option<i32>
where
    F: FnOnce(PieceId) -> Option<&'a PlacedPiece>,
{
    match surface {
        HitSurface::Baseplate => Some(0),
        HitSurface::Piece(id) => piece(id).map(PlacedPiece::top_layer),
    }
}

/// Candidate placement derived from a pointer hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Grid-space anchor handed to the validator and the world.
    pub anchor: GridCell,
    /// Horizontal position in baseplate-centred world coordinates.
    pub world_x: i32,
    /// Horizontal position in baseplate-centred world coordinates.
    pub world_z: i32,
}

/// Resolves a pointer hit into a candidate anchor for the current tool.
///
/// The `piece` lookup must mirror the world's `query::piece` helper so the
/// resolver can stack onto the hit piece.
pub fn resolve<'a, F>(
    hit: &PointerHit,
    tool: &ToolSelection,
    baseplate: Baseplate,
    piece: F,
) -> Option<Candidate>
where
    F: FnOnce(PieceId) -> Option<&'a PlacedPiece>,
{
    let layer = resolve_layer(hit.surface, piece)?;
    let snapped = snap(
        hit.point.x,
        hit.point.z,
        tool.size(),
        tool.rotation(),
        baseplate.extent(),
    );
    Some(Candidate {
        anchor: GridCell::new(snapped.grid_x, layer, snapped.grid_z),
        world_x: snapped.world_x,
        world_z: snapped.world_z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickyard_core::{PieceColor, PieceKind};
    use std::sync::Arc;

    fn one_by_one() -> PieceSize {
        PieceSize::new(1, 1, PieceKind::Brick)
    }

    #[test]
    fn far_hit_clamps_to_last_stud() {
        let snapped = snap(1000.0, 0.0, &one_by_one(), Rotation::Deg0, 32);
        assert_eq!(snapped.grid_x, 31);
        assert_eq!(snapped.world_x, 15);
        assert_eq!(snapped.grid_z, 16);
        assert_eq!(snapped.world_z, 0);
    }

    #[test]
    fn rotation_changes_which_axis_is_clamped() {
        let size = PieceSize::new(2, 4, PieceKind::Brick);
        let upright = snap(1000.0, 1000.0, &size, Rotation::Deg0, 16);
        let turned = snap(1000.0, 1000.0, &size, Rotation::Deg90, 16);

        assert_eq!((upright.grid_x, upright.grid_z), (14, 12));
        assert_eq!((turned.grid_x, turned.grid_z), (12, 14));
    }

    #[test]
    fn oversized_piece_clamps_to_origin() {
        let size = PieceSize::new(40, 40, PieceKind::Plate);
        let snapped = snap(5.0, -5.0, &size, Rotation::Deg0, 16);
        assert_eq!((snapped.grid_x, snapped.grid_z), (0, 0));
    }

    #[test]
    fn non_finite_hits_stay_deterministic() {
        let snapped = snap(f32::NAN, f32::NEG_INFINITY, &one_by_one(), Rotation::Deg0, 16);
        assert_eq!((snapped.grid_x, snapped.grid_z), (0, 0));
        let snapped = snap(f32::INFINITY, 0.0, &one_by_one(), Rotation::Deg0, 16);
        assert_eq!(snapped.grid_x, 15);
    }

    #[test]
    fn halves_round_up() {
        let snapped = snap(-0.5, 0.49, &one_by_one(), Rotation::Deg0, 32);
        assert_eq!(snapped.world_x, 0);
        assert_eq!(snapped.world_z, 0);
    }

    #[test]
    fn stacking_uses_the_hit_piece_height() {
        let brick = PlacedPiece {
            id: PieceId::new(4),
            size: Arc::new(PieceSize::new(2, 4, PieceKind::Brick)),
            color: PieceColor::Red,
            rotation: Rotation::Deg0,
            anchor: GridCell::new(0, 3, 0),
        };

        assert_eq!(resolve_layer(HitSurface::Baseplate, |_| None), Some(0));
        assert_eq!(
            resolve_layer(HitSurface::Piece(brick.id), |_| Some(&brick)),
            Some(6)
        );
        assert_eq!(resolve_layer(HitSurface::Piece(PieceId::new(9)), |_| None), None);
    }

    #[test]
    fn resolve_combines_snap_and_layer() {
        let tool = ToolSelection::default();
        let hit = PointerHit::on_baseplate(Vec3::new(-16.2, 0.0, 3.6));
        let candidate =
            resolve(&hit, &tool, Baseplate::Medium, |_| None).expect("baseplate hit resolves");

        assert_eq!(candidate.anchor, GridCell::new(0, 0, 20));
        assert_eq!((candidate.world_x, candidate.world_z), (-16, 4));
    }
}
