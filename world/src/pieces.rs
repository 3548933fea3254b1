//! Authoritative placed-piece storage.

use std::sync::Arc;

use brickyard_core::{GridCell, PieceColor, PieceId, PieceSize, PlacedPiece, Rotation};

/// Ordered piece list that also allocates identifiers.
#[derive(Debug)]
pub(crate) struct PieceRegistry {
    entries: Vec<PlacedPiece>,
    next_piece_id: Option<PieceId>,
}

impl Default for PieceRegistry {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_piece_id: Some(PieceId::new(0)),
        }
    }
}

impl PieceRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a new piece under a freshly allocated identifier.
    ///
    /// Returns `None` when no identifier is free.
    pub(crate) fn insert(
        &mut self,
        size: Arc<PieceSize>,
        color: PieceColor,
        rotation: Rotation,
        anchor: GridCell,
    ) -> Option<&PlacedPiece> {
        let id = self.allocate()?;
        self.entries.push(PlacedPiece {
            id,
            size,
            color,
            rotation,
            anchor,
        });
        self.entries.last()
    }

    /// Hands out the counter while it lasts, then the lowest free identifier.
    fn allocate(&mut self) -> Option<PieceId> {
        match self.next_piece_id {
            Some(id) => {
                self.next_piece_id = id.successor();
                Some(id)
            }
            None => PieceId::lowest_unused(self.entries.iter().map(|piece| piece.id)),
        }
    }

    /// Removes the piece with the provided identifier, preserving order.
    pub(crate) fn remove(&mut self, id: PieceId) -> Option<PlacedPiece> {
        let position = self.entries.iter().position(|piece| piece.id == id)?;
        Some(self.entries.remove(position))
    }

    pub(crate) fn get(&self, id: PieceId) -> Option<&PlacedPiece> {
        self.entries.iter().find(|piece| piece.id == id)
    }

    pub(crate) fn as_slice(&self) -> &[PlacedPiece] {
        &self.entries
    }

    /// Drops every piece and returns how many were removed.
    ///
    /// The identifier counter keeps running so stale handles never alias new pieces.
    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Replaces the list wholesale; allocation resumes above the highest id.
    pub(crate) fn replace(&mut self, pieces: Vec<PlacedPiece>) {
        let highest = pieces.iter().map(|piece| piece.id).max();
        self.next_piece_id = match highest {
            Some(id) => id.successor(),
            None => Some(PieceId::new(0)),
        };
        self.entries = pieces;
    }
}
