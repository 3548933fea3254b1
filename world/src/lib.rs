#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scene and session state for Brickyard.
//!
//! The [`World`] is the only owner of the placed piece list and the occupancy
//! index. Both are updated together or not at all. Adapters mutate it through
//! [`apply`] (or the equivalent methods on [`World`]) and read it through the
//! [`query`] module.

use std::sync::Arc;

use brickyard_core::{
    Baseplate, Command, Event, Footprint, GridCell, PieceColor, PieceId, PieceSize, PlacedPiece,
    PlacementError, Rotation, Scene, ToolSelection,
};
use log::{debug, warn};

pub mod occupancy;
mod pieces;
pub mod placement;

use occupancy::OccupancyIndex;
use pieces::PieceRegistry;

/// Represents the authoritative building session.
#[derive(Debug, Default)]
pub struct World {
    baseplate: Baseplate,
    pieces: PieceRegistry,
    occupancy: OccupancyIndex,
    tool: ToolSelection,
}

/// Outcome of a rejected placement attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rejection {
    reason: PlacementError,
    conflict: GridCell,
}

impl World {
    /// Creates an empty session on the default baseplate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            baseplate: Baseplate::default(),
            pieces: PieceRegistry::new(),
            occupancy: OccupancyIndex::new(),
            tool: ToolSelection::default(),
        }
    }

    /// Creates a session whose state is rebuilt from the provided scene.
    #[must_use]
    pub fn from_scene(scene: Scene) -> Self {
        let mut world = Self::new();
        world.load_scene(scene);
        world
    }

    /// Places the selected piece at `anchor`.
    ///
    /// Returns `false` and leaves the session untouched when any cell of the
    /// footprint is already occupied.
    pub fn place_piece(&mut self, anchor: GridCell) -> bool {
        self.commit_placement(anchor).is_ok()
    }

    /// Removes the piece with the provided identifier.
    ///
    /// Unknown identifiers are ignored.
    pub fn remove_piece(&mut self, id: PieceId) -> Option<PlacedPiece> {
        let removed = self.pieces.remove(id)?;
        self.occupancy.vacate(removed.id, &removed.footprint());
        debug!("removed piece {} at {}", removed.id, removed.anchor);
        Some(removed)
    }

    /// Removes every piece and empties the occupancy index.
    pub fn clear(&mut self) -> usize {
        let removed = self.pieces.clear();
        self.occupancy.clear();
        debug!("cleared {removed} pieces");
        removed
    }

    /// Advances the tool rotation by a quarter turn.
    pub fn rotate_clockwise(&mut self) -> Rotation {
        self.tool.rotate_clockwise()
    }

    /// Replaces the descriptor used by subsequent placements.
    pub fn select_piece(&mut self, size: Arc<PieceSize>) {
        self.tool.set_size(size);
    }

    /// Replaces the color used by subsequent placements.
    pub fn select_color(&mut self, color: PieceColor) {
        self.tool.set_color(color);
    }

    /// Switches the active baseplate. Placed pieces are left untouched.
    pub fn set_baseplate(&mut self, baseplate: Baseplate) {
        self.baseplate = baseplate;
    }

    /// Replaces the piece list and baseplate and rebuilds the occupancy index.
    pub fn load_scene(&mut self, scene: Scene) {
        let Scene { baseplate, bricks } = scene;
        let collisions = occupancy::find_collisions(&bricks);
        if let Some(first) = collisions.first() {
            warn!(
                "loaded scene has {} overlapping pieces (first: piece {} overlaps piece {} at {}); \
                 removing one may free cells the other still covers",
                collisions.len(),
                first.piece,
                first.blocked_by,
                first.cell
            );
        }
        self.occupancy = OccupancyIndex::rebuild(&bricks);
        self.pieces.replace(bricks);
        self.baseplate = baseplate;
        debug!(
            "loaded {} pieces on the {} baseplate",
            self.pieces.as_slice().len(),
            baseplate
        );
    }

    /// Captures the persistable part of the session.
    #[must_use]
    pub fn to_scene(&self) -> Scene {
        Scene {
            baseplate: self.baseplate,
            bricks: self.pieces.as_slice().to_vec(),
        }
    }

    fn commit_placement(&mut self, anchor: GridCell) -> Result<(PieceId, Footprint), Rejection> {
        let footprint = self.tool.footprint_at(anchor);
        if let Some(conflict) = placement::find_conflict(&self.occupancy, &footprint) {
            debug!(
                "rejected {} at {anchor}: cell {conflict} is occupied",
                self.tool.size().name
            );
            return Err(Rejection {
                reason: PlacementError::Occupied,
                conflict,
            });
        }

        let Some(piece) = self.pieces.insert(
            Arc::clone(self.tool.size()),
            self.tool.color(),
            self.tool.rotation(),
            anchor,
        ) else {
            warn!("rejected {} at {anchor}: no free piece identifier", self.tool.size().name);
            return Err(Rejection {
                reason: PlacementError::NoFreeIdentifier,
                conflict: anchor,
            });
        };
        let id = piece.id;
        self.occupancy.occupy(id, &footprint);
        debug!("placed piece {id} at {anchor}");
        Ok((id, footprint))
    }
}

/// Applies the provided command to the world, reporting what changed.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SelectPiece { size } => {
            world.select_piece(Arc::clone(&size));
            out_events.push(Event::PieceSelected { size });
        }
        Command::SelectColor { color } => {
            world.select_color(color);
            out_events.push(Event::ColorSelected { color });
        }
        Command::RotateClockwise => {
            let rotation = world.rotate_clockwise();
            out_events.push(Event::RotationChanged { rotation });
        }
        Command::SetBaseplate { baseplate } => {
            world.set_baseplate(baseplate);
            out_events.push(Event::BaseplateChanged { baseplate });
        }
        Command::PlacePiece { anchor } => match world.commit_placement(anchor) {
            Ok((piece, footprint)) => out_events.push(Event::PiecePlaced { piece, footprint }),
            Err(rejection) => out_events.push(Event::PlacementRejected {
                anchor,
                reason: rejection.reason,
                conflict: rejection.conflict,
            }),
        },
        Command::RemovePiece { piece } => {
            if let Some(removed) = world.remove_piece(piece) {
                out_events.push(Event::PieceRemoved {
                    piece,
                    footprint: removed.footprint(),
                });
            }
        }
        Command::Clear => {
            let removed = world.clear();
            out_events.push(Event::SceneCleared { removed });
        }
        Command::LoadScene { scene } => {
            let baseplate = scene.baseplate;
            world.load_scene(scene);
            out_events.push(Event::SceneLoaded {
                pieces: world.pieces.as_slice().len(),
                baseplate,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use brickyard_core::{Baseplate, GridCell, PieceId, PlacedPiece, Scene, ToolSelection};

    use super::{occupancy::OccupancyIndex, placement, World};

    /// Active baseplate.
    #[must_use]
    pub fn baseplate(world: &World) -> Baseplate {
        world.baseplate
    }

    /// Current tool selection.
    #[must_use]
    pub fn tool(world: &World) -> &ToolSelection {
        &world.tool
    }

    /// Placed pieces in insertion order.
    #[must_use]
    pub fn pieces(world: &World) -> &[PlacedPiece] {
        world.pieces.as_slice()
    }

    /// Looks up a placed piece by identifier.
    #[must_use]
    pub fn piece(world: &World, id: PieceId) -> Option<&PlacedPiece> {
        world.pieces.get(id)
    }

    /// Identifier of the piece covering the cell, if any.
    #[must_use]
    pub fn piece_at(world: &World, cell: GridCell) -> Option<PieceId> {
        world.occupancy.occupant(cell)
    }

    /// Read-only access to the occupancy index.
    #[must_use]
    pub fn occupancy(world: &World) -> &OccupancyIndex {
        &world.occupancy
    }

    /// Reports whether the current tool selection fits at `anchor`.
    ///
    /// Never mutates the world, so it is safe to call for every pointer update.
    #[must_use]
    pub fn can_place(world: &World, anchor: GridCell) -> bool {
        let tool = &world.tool;
        placement::can_place(&world.occupancy, anchor, tool.size(), tool.rotation())
    }

    /// Captures the persistable part of the session.
    #[must_use]
    pub fn scene(world: &World) -> Scene {
        world.to_scene()
    }
}
