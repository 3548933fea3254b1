//! Sparse three-dimensional occupancy index.
//!
//! The index is derived state: it can always be rebuilt from the placed piece
//! list, and the world rebuilds it whenever a scene is loaded wholesale.

use std::collections::BTreeMap;

use brickyard_core::{Footprint, GridCell, PieceId, PieceSize, PlacedPiece, Rotation};

/// Every cell covered by a piece anchored at `anchor`.
#[must_use]
pub fn footprint_cells(anchor: GridCell, size: &PieceSize, rotation: Rotation) -> Footprint {
    Footprint::of(anchor, size, rotation)
}

/// Set of occupied cells, each remembering the piece that covers it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancyIndex {
    cells: BTreeMap<GridCell, PieceId>,
}

impl OccupancyIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs the index by occupying every piece's footprint in order.
    #[must_use]
    pub fn rebuild(pieces: &[PlacedPiece]) -> Self {
        let mut index = Self::new();
        for piece in pieces {
            index.occupy(piece.id, &piece.footprint());
        }
        index
    }

    /// Marks every cell of the footprint as covered by `piece`.
    ///
    /// Cells that are already occupied keep their current occupant.
    pub fn occupy(&mut self, piece: PieceId, footprint: &Footprint) {
        for cell in footprint.cells() {
            let _ = self.cells.entry(cell).or_insert(piece);
        }
    }

    /// Releases every cell of the footprint that is covered by `piece`.
    pub fn vacate(&mut self, piece: PieceId, footprint: &Footprint) {
        for cell in footprint.cells() {
            if self.cells.get(&cell) == Some(&piece) {
                let _ = self.cells.remove(&cell);
            }
        }
    }

    /// Empties the index.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Reports whether the cell is covered by any piece.
    #[must_use]
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Returns the piece covering the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: GridCell) -> Option<PieceId> {
        self.cells.get(&cell).copied()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Occupied cells in ascending coordinate order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.keys().copied()
    }
}

/// A piece whose footprint collides with a piece listed before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collision {
    /// Piece that would have been rejected had it been placed in list order.
    pub piece: PieceId,
    /// Earlier piece already covering the contested cell.
    pub blocked_by: PieceId,
    /// First contested cell.
    pub cell: GridCell,
}

/// Replays the pieces in list order and reports every piece that overlaps an
/// earlier one.
#[must_use]
pub fn find_collisions(pieces: &[PlacedPiece]) -> Vec<Collision> {
    let mut index = OccupancyIndex::new();
    let mut collisions = Vec::new();
    for piece in pieces {
        let footprint = piece.footprint();
        let conflict = footprint
            .cells()
            .find_map(|cell| index.occupant(cell).map(|owner| (cell, owner)));
        match conflict {
            Some((cell, blocked_by)) => collisions.push(Collision {
                piece: piece.id,
                blocked_by,
                cell,
            }),
            None => index.occupy(piece.id, &footprint),
        }
    }
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use brickyard_core::{PieceColor, PieceKind};

    fn piece(id: u32, w: u32, l: u32, kind: PieceKind, anchor: GridCell) -> PlacedPiece {
        PlacedPiece {
            id: PieceId::new(id),
            size: Arc::new(PieceSize::new(w, l, kind)),
            color: PieceColor::Red,
            rotation: Rotation::Deg0,
            anchor,
        }
    }

    #[test]
    fn occupy_marks_the_whole_box() {
        let mut index = OccupancyIndex::new();
        let size = PieceSize::new(2, 4, PieceKind::Brick);
        let footprint = footprint_cells(GridCell::new(0, 0, 0), &size, Rotation::Deg0);
        index.occupy(PieceId::new(0), &footprint);

        assert_eq!(index.len(), 24);
        assert!(index.is_occupied(GridCell::new(1, 2, 3)));
        assert!(!index.is_occupied(GridCell::new(0, 3, 0)));
    }

    #[test]
    fn occupy_is_idempotent_per_cell() {
        let mut index = OccupancyIndex::new();
        let footprint = Footprint::from_anchor_and_dimensions(GridCell::new(0, 0, 0), 1, 1, 1);
        index.occupy(PieceId::new(1), &footprint);
        index.occupy(PieceId::new(2), &footprint);

        assert_eq!(index.len(), 1);
        assert_eq!(index.occupant(GridCell::new(0, 0, 0)), Some(PieceId::new(1)));
    }

    #[test]
    fn vacate_releases_only_the_owning_piece() {
        let mut index = OccupancyIndex::new();
        let first = Footprint::from_anchor_and_dimensions(GridCell::new(0, 0, 0), 2, 1, 1);
        let second = Footprint::from_anchor_and_dimensions(GridCell::new(2, 0, 0), 2, 1, 1);
        index.occupy(PieceId::new(1), &first);
        index.occupy(PieceId::new(2), &second);

        index.vacate(PieceId::new(1), &first);

        assert_eq!(
            index.cells().collect::<Vec<_>>(),
            vec![GridCell::new(2, 0, 0), GridCell::new(3, 0, 0)]
        );
    }

    #[test]
    fn rebuild_matches_incremental_occupation() {
        let pieces = vec![
            piece(0, 2, 4, PieceKind::Brick, GridCell::new(0, 0, 0)),
            piece(1, 2, 2, PieceKind::Plate, GridCell::new(0, 3, 0)),
            piece(2, 1, 1, PieceKind::Tile, GridCell::new(5, 0, 5)),
        ];
        let mut incremental = OccupancyIndex::new();
        for piece in &pieces {
            incremental.occupy(piece.id, &piece.footprint());
        }

        assert_eq!(OccupancyIndex::rebuild(&pieces), incremental);
    }

    #[test]
    fn collisions_report_the_later_piece() {
        let pieces = vec![
            piece(0, 2, 4, PieceKind::Brick, GridCell::new(0, 0, 0)),
            piece(1, 2, 2, PieceKind::Plate, GridCell::new(1, 2, 0)),
            piece(2, 2, 2, PieceKind::Plate, GridCell::new(0, 3, 0)),
        ];

        assert_eq!(
            find_collisions(&pieces),
            vec![Collision {
                piece: PieceId::new(1),
                blocked_by: PieceId::new(0),
                cell: GridCell::new(1, 2, 0),
            }]
        );
    }
}
