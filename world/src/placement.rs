//! Cell-level collision checks for candidate placements.
//!
//! Bounds are not checked here: the pointer resolver clamps candidates to the
//! baseplate before they reach the validator.

use brickyard_core::{Footprint, GridCell, PieceSize, Rotation};

use crate::occupancy::{footprint_cells, OccupancyIndex};

/// Reports whether a piece may occupy the candidate position.
///
/// A single occupied cell anywhere in the footprint vetoes the placement.
#[must_use]
pub fn can_place(
    index: &OccupancyIndex,
    anchor: GridCell,
    size: &PieceSize,
    rotation: Rotation,
) -> bool {
    find_conflict(index, &footprint_cells(anchor, size, rotation)).is_none()
}

/// Returns the first occupied cell inside the footprint.
#[must_use]
pub fn find_conflict(index: &OccupancyIndex, footprint: &Footprint) -> Option<GridCell> {
    footprint.cells().find(|cell| index.is_occupied(*cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickyard_core::{PieceId, PieceKind};

    #[test]
    fn overlapping_anchor_is_rejected() {
        let brick = PieceSize::new(2, 4, PieceKind::Brick);
        let mut index = OccupancyIndex::new();
        index.occupy(
            PieceId::new(0),
            &footprint_cells(GridCell::new(0, 0, 0), &brick, Rotation::Deg0),
        );

        assert!(!can_place(&index, GridCell::new(1, 0, 0), &brick, Rotation::Deg0));
        assert_eq!(
            find_conflict(
                &index,
                &footprint_cells(GridCell::new(1, 0, 0), &brick, Rotation::Deg0)
            ),
            Some(GridCell::new(1, 0, 0))
        );
    }

    #[test]
    fn single_cell_vetoes_the_whole_footprint() {
        let mut index = OccupancyIndex::new();
        index.occupy(
            PieceId::new(0),
            &Footprint::from_anchor_and_dimensions(GridCell::new(5, 1, 7), 1, 1, 1),
        );
        let plate = PieceSize::new(8, 8, PieceKind::Plate);

        assert!(!can_place(&index, GridCell::new(0, 1, 0), &plate, Rotation::Deg0));
        assert!(can_place(&index, GridCell::new(0, 0, 0), &plate, Rotation::Deg0));
        assert!(can_place(&index, GridCell::new(0, 2, 0), &plate, Rotation::Deg0));
    }

    #[test]
    fn empty_index_accepts_anything() {
        let index = OccupancyIndex::new();
        let size = PieceSize::new(64, 64, PieceKind::Brick);
        assert!(can_place(&index, GridCell::new(-3, 0, -3), &size, Rotation::Deg90));
    }
}
