#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system responsible for ghost previews and placement commands.
//!
//! Previews are computed from read-only snapshots on every pointer update and
//! never mutate the world; only a confirmed preview turns into a
//! [`Command::PlacePiece`].

use brickyard_core::{Baseplate, Command, Footprint, GridCell, PieceId, PlacedPiece, ToolSelection};
use brickyard_system_resolver::{resolve, HitSurface, PointerHit};

/// Declarative placement preview describing a potential piece placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Grid-space anchor of the proposed piece.
    pub anchor: GridCell,
    /// Anchor column in baseplate-centred world coordinates, for rendering.
    pub world_x: i32,
    /// Anchor row in baseplate-centred world coordinates, for rendering.
    pub world_z: i32,
    /// Cells that would be occupied by the piece if placed.
    pub footprint: Footprint,
    /// Indicates whether the preview represents a valid placement location.
    pub placeable: bool,
}

impl PlacementPreview {
    /// Computes the ghost preview for the latest pointer hit.
    ///
    /// The `piece` closure should mirror the world's `query::piece` helper and
    /// `can_place` should mirror `query::can_place`. Returns `None` when the hit
    /// names a piece that no longer exists.
    pub fn from_hit<'a, F, P>(
        hit: &PointerHit,
        tool: &ToolSelection,
        baseplate: Baseplate,
        piece: F,
        can_place: P,
    ) -> Option<Self>
    where
        F: FnOnce(PieceId) -> Option<&'a PlacedPiece>,
        P: FnOnce(GridCell) -> bool,
    {
        let candidate = resolve(hit, tool, baseplate, piece)?;
        Some(Self {
            anchor: candidate.anchor,
            world_x: candidate.world_x,
            world_z: candidate.world_z,
            footprint: tool.footprint_at(candidate.anchor),
            placeable: can_place(candidate.anchor),
        })
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Indicates whether the user confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the user requested removal of the hovered piece.
    pub remove_action: bool,
    /// Indicates whether the user asked to rotate the tool.
    pub rotate_action: bool,
    /// Latest pointer hit, if the pointer is over the scene.
    pub pointer: Option<PointerHit>,
}

/// Builder system that translates preview + input into session commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Builder;

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes adapter-derived input to emit builder commands.
    ///
    /// Rotation is emitted last so that it applies to the next preview rather
    /// than to a placement confirmed on the same frame.
    pub fn handle(
        &self,
        preview: Option<PlacementPreview>,
        input: BuilderInput,
        out: &mut Vec<Command>,
    ) {
        if input.confirm_action {
            if let Some(preview) = preview {
                if preview.placeable {
                    out.push(Command::PlacePiece {
                        anchor: preview.anchor,
                    });
                }
            }
        }

        if input.remove_action {
            if let Some(PointerHit {
                surface: HitSurface::Piece(piece),
                ..
            }) = input.pointer
            {
                out.push(Command::RemovePiece { piece });
            }
        }

        if input.rotate_action {
            out.push(Command::RotateClockwise);
        }
    }
}
