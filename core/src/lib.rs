#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Brickyard building engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems read immutable snapshots and respond exclusively with new
//! command batches.
//!
//! Horizontal positions are measured in studs and vertical positions in
//! layers, where one layer is the height of a plate. See [`units`] for the
//! conversions between the two and world-space distances.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod catalog;
pub mod units;

pub use units::{height_in_layers, oriented_extent, Extent};

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the piece descriptor used by subsequent placements.
    SelectPiece {
        /// Descriptor the tool should place next.
        size: Arc<PieceSize>,
    },
    /// Replaces the color used by subsequent placements.
    SelectColor {
        /// Color the tool should apply next.
        color: PieceColor,
    },
    /// Advances the tool rotation by a quarter turn clockwise.
    RotateClockwise,
    /// Switches the active baseplate.
    SetBaseplate {
        /// Baseplate that should become active.
        baseplate: Baseplate,
    },
    /// Requests placement of the selected piece anchored at the provided cell.
    PlacePiece {
        /// Minimum corner of the requested footprint in grid space.
        anchor: GridCell,
    },
    /// Requests removal of an existing piece.
    RemovePiece {
        /// Identifier of the piece targeted for removal.
        piece: PieceId,
    },
    /// Removes every placed piece.
    Clear,
    /// Replaces the scene wholesale and rebuilds occupancy from it.
    LoadScene {
        /// Scene that should become authoritative.
        scene: Scene,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the tool now places a different descriptor.
    PieceSelected {
        /// Descriptor now held by the tool.
        size: Arc<PieceSize>,
    },
    /// Confirms that the tool now applies a different color.
    ColorSelected {
        /// Color now held by the tool.
        color: PieceColor,
    },
    /// Announces the tool rotation after a rotate command.
    RotationChanged {
        /// Rotation now held by the tool.
        rotation: Rotation,
    },
    /// Announces that a different baseplate became active.
    BaseplateChanged {
        /// Baseplate that became active.
        baseplate: Baseplate,
    },
    /// Confirms that a piece was committed to the scene.
    PiecePlaced {
        /// Identifier assigned to the piece by the world.
        piece: PieceId,
        /// Cells now occupied by the piece.
        footprint: Footprint,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Anchor provided in the placement request.
        anchor: GridCell,
        /// Specific reason the placement failed.
        reason: PlacementError,
        /// First occupied cell found inside the requested footprint, or the
        /// anchor itself when no identifier was free.
        conflict: GridCell,
    },
    /// Confirms that a piece was removed from the scene.
    PieceRemoved {
        /// Identifier of the removed piece.
        piece: PieceId,
        /// Cells released by the removal.
        footprint: Footprint,
    },
    /// Confirms that every piece was removed.
    SceneCleared {
        /// Number of pieces that were removed.
        removed: usize,
    },
    /// Confirms that a scene replaced the previous one.
    SceneLoaded {
        /// Number of pieces contained in the loaded scene.
        pieces: usize,
        /// Baseplate activated by the loaded scene.
        baseplate: Baseplate,
    },
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested footprint overlaps an occupied cell.
    Occupied,
    /// Every identifier is already held by a placed piece.
    NoFreeIdentifier,
}

/// Location of a single grid cell.
///
/// `x` and `z` count studs across the baseplate, `y` counts layers above it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCell {
    x: i32,
    y: i32,
    z: i32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Stud index along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Layer index above the baseplate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Stud index along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the cell displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Rotation of a piece about the vertical axis.
///
/// Serialised as whole degrees. Any multiple of 90, including negative values,
/// is accepted and normalised into `[0, 360)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// A quarter turn.
    Deg90,
    /// A half turn.
    Deg180,
    /// Three quarter turns.
    Deg270,
}

impl Rotation {
    /// Every supported rotation in clockwise order.
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Rotation expressed in degrees.
    #[must_use]
    pub const fn degrees(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Normalises an angle in degrees into a supported rotation.
    pub fn from_degrees(degrees: i32) -> Result<Self, RotationError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(RotationError::NotQuarterTurn { degrees }),
        }
    }

    /// Rotation advanced by a quarter turn, wrapping after 270 degrees.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// Reports whether the rotation exchanges the width and length axes.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = RotationError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Errors raised when interpreting a rotation angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RotationError {
    /// The angle is not a multiple of 90 degrees.
    #[error("rotation of {degrees} degrees is not a quarter turn")]
    NotQuarterTurn {
        /// Angle that failed validation.
        degrees: i32,
    },
}

/// Broad family of a piece, which determines its default height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// Full-height brick.
    Brick,
    /// Single-layer plate with studs.
    Plate,
    /// Single-layer plate without studs.
    Tile,
    /// Angled piece at brick height.
    Slope,
    /// Anything else in the catalog.
    Specialty,
    /// Kind written by a newer catalog.
    #[default]
    #[serde(other)]
    Unknown,
}

impl PieceKind {
    /// Height in layers used when a descriptor does not specify one.
    #[must_use]
    pub const fn default_height_in_layers(self) -> u32 {
        match self {
            Self::Plate | Self::Tile => 1,
            Self::Brick | Self::Slope | Self::Specialty | Self::Unknown => {
                units::LAYERS_PER_BRICK
            }
        }
    }

    /// Whether pieces of this kind carry studs unless told otherwise.
    #[must_use]
    pub const fn has_studs_by_default(self) -> bool {
        !matches!(self, Self::Tile)
    }
}

/// Palette grouping used when browsing the catalog.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PieceCategory {
    /// Standard bricks.
    Basic,
    /// Plates and tiles.
    Plates,
    /// Slopes.
    Slopes,
    /// Rounds, cones, arches and other special shapes.
    Specialty,
    /// Technic bricks.
    Technic,
    /// Windows and doors.
    Windows,
    /// Wheels and vehicle bases.
    Wheels,
    /// Category written by a newer catalog.
    #[default]
    #[serde(other)]
    Other,
}

impl PieceCategory {
    /// Categories offered by the built-in catalog, in palette order.
    pub const ALL: [PieceCategory; 7] = [
        Self::Basic,
        Self::Plates,
        Self::Slopes,
        Self::Specialty,
        Self::Technic,
        Self::Windows,
        Self::Wheels,
    ];

    /// Human readable heading for the category.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Basic => "Basic Bricks",
            Self::Plates => "Plates & Tiles",
            Self::Slopes => "Slopes",
            Self::Specialty => "Special Pieces",
            Self::Technic => "Technic",
            Self::Windows => "Windows & Doors",
            Self::Wheels => "Wheels & Vehicle",
            Self::Other => "Other",
        }
    }

    /// Key used in saved descriptors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Plates => "plates",
            Self::Slopes => "slopes",
            Self::Specialty => "specialty",
            Self::Technic => "technic",
            Self::Windows => "windows",
            Self::Wheels => "wheels",
            Self::Other => "other",
        }
    }

    /// Looks up a catalog category by its key, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Geometry strategy the renderer should use for a piece.
///
/// The tag is fixed when the catalog entry is defined; the core never derives
/// it from names or part numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryKind {
    /// Plain rectangular body.
    #[default]
    Box,
    /// Angled top surface.
    Slope,
    /// Cylindrical body.
    Round,
    /// Conical body.
    Cone,
    /// Domed top.
    Dome,
    /// Curved opening.
    Arch,
    /// Hollow window frame.
    WindowFrame,
    /// Door frame.
    DoorFrame,
    /// Brick with axle holes.
    Technic,
    /// Wheel with axle hole.
    Wheel,
    /// Aircraft wing profile.
    Wing,
    /// Engine nacelle.
    Engine,
    /// Cockpit canopy.
    Cockpit,
    /// Fuselage section.
    Fuselage,
    /// Tail fin.
    Tail,
    /// Geometry written by a newer catalog.
    #[serde(other)]
    Other,
}

/// Immutable catalog record describing a placeable piece type.
///
/// Fields that a placement never reads are carried as inert metadata. Missing
/// optional fields fall back to kind-based defaults and unknown fields are
/// ignored when deserialising.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceSize {
    /// Width in studs before rotation.
    pub w: u32,
    /// Length in studs before rotation.
    pub l: u32,
    /// Explicit height in layers, if the piece deviates from its kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
    /// Family of the piece.
    #[serde(default)]
    pub kind: PieceKind,
    /// Palette grouping.
    #[serde(default)]
    pub category: PieceCategory,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Manufacturer part number.
    #[serde(
        default,
        rename = "partNum",
        skip_serializing_if = "Option::is_none"
    )]
    pub part_num: Option<String>,
    /// Overrides whether the top carries studs.
    #[serde(
        default,
        rename = "hasStuds",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_studs: Option<bool>,
    /// Slope angle in degrees for sloped pieces.
    #[serde(
        default,
        rename = "slopeAngle",
        skip_serializing_if = "Option::is_none"
    )]
    pub slope_angle: Option<u32>,
    /// Geometry strategy for the renderer.
    #[serde(default)]
    pub geometry: GeometryKind,
}

impl PieceSize {
    /// Creates a descriptor with the provided footprint and kind.
    #[must_use]
    pub fn new(w: u32, l: u32, kind: PieceKind) -> Self {
        Self {
            w,
            l,
            h: None,
            kind,
            category: PieceCategory::Other,
            name: format!("{w}×{l}"),
            part_num: None,
            has_studs: None,
            slope_angle: None,
            geometry: GeometryKind::Box,
        }
    }

    /// Sets an explicit height in layers.
    #[must_use]
    pub fn with_height(mut self, layers: u32) -> Self {
        self.h = Some(layers);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the manufacturer part number.
    #[must_use]
    pub fn with_part_num(mut self, part_num: impl Into<String>) -> Self {
        self.part_num = Some(part_num.into());
        self
    }

    /// Sets the palette category.
    #[must_use]
    pub fn in_category(mut self, category: PieceCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets the geometry tag.
    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometryKind) -> Self {
        self.geometry = geometry;
        self
    }

    /// Sets the slope angle in degrees.
    #[must_use]
    pub fn with_slope_angle(mut self, degrees: u32) -> Self {
        self.slope_angle = Some(degrees);
        self
    }

    /// Overrides whether the piece carries studs.
    #[must_use]
    pub fn with_studs(mut self, has_studs: bool) -> Self {
        self.has_studs = Some(has_studs);
        self
    }

    /// Whether the top surface carries studs.
    #[must_use]
    pub fn has_studs(&self) -> bool {
        self.has_studs
            .unwrap_or_else(|| self.kind.has_studs_by_default())
    }

    /// Number of studs on the top surface, regardless of rotation.
    #[must_use]
    pub fn stud_count(&self) -> u64 {
        u64::from(self.w) * u64::from(self.l)
    }
}

/// Colors offered by the palette.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    /// Bright red.
    Red,
    /// Bright blue.
    Blue,
    /// Bright yellow.
    Yellow,
    /// Dark green.
    Green,
    /// White.
    White,
    /// Black.
    Black,
    /// Light bluish gray.
    #[default]
    LightGray,
    /// Dark bluish gray.
    DarkGray,
    /// Orange.
    Orange,
    /// Lime.
    LimeGreen,
    /// Dark turquoise.
    Turquoise,
    /// Pink.
    Pink,
    /// Medium lavender purple.
    Purple,
    /// Reddish brown.
    Brown,
    /// Tan.
    Tan,
    /// Dark red.
    DarkRed,
    /// Dark blue.
    DarkBlue,
    /// Dark green.
    DarkGreen,
    /// Sand red.
    Sand,
    /// Lavender.
    Lavender,
}

impl PieceColor {
    /// Every palette color in display order.
    pub const ALL: [PieceColor; 20] = [
        Self::Red,
        Self::Blue,
        Self::Yellow,
        Self::Green,
        Self::White,
        Self::Black,
        Self::LightGray,
        Self::DarkGray,
        Self::Orange,
        Self::LimeGreen,
        Self::Turquoise,
        Self::Pink,
        Self::Purple,
        Self::Brown,
        Self::Tan,
        Self::DarkRed,
        Self::DarkBlue,
        Self::DarkGreen,
        Self::Sand,
        Self::Lavender,
    ];

    /// Palette key used in saved scenes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::White => "white",
            Self::Black => "black",
            Self::LightGray => "lightgray",
            Self::DarkGray => "darkgray",
            Self::Orange => "orange",
            Self::LimeGreen => "limegreen",
            Self::Turquoise => "turquoise",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Brown => "brown",
            Self::Tan => "tan",
            Self::DarkRed => "darkred",
            Self::DarkBlue => "darkblue",
            Self::DarkGreen => "darkgreen",
            Self::Sand => "sand",
            Self::Lavender => "lavender",
        }
    }

    /// Looks up a color by its palette key, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Hexadecimal sRGB value used by the renderer.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Red => "#c91a09",
            Self::Blue => "#0055bf",
            Self::Yellow => "#f2cd37",
            Self::Green => "#237841",
            Self::White => "#ffffff",
            Self::Black => "#05131d",
            Self::LightGray => "#9ba19d",
            Self::DarkGray => "#6d6e6c",
            Self::Orange => "#fe8a18",
            Self::LimeGreen => "#bbd905",
            Self::Turquoise => "#008f9b",
            Self::Pink => "#ff698f",
            Self::Purple => "#845e84",
            Self::Brown => "#583927",
            Self::Tan => "#e4cd9e",
            Self::DarkRed => "#720e0f",
            Self::DarkBlue => "#0a3463",
            Self::DarkGreen => "#184632",
            Self::Sand => "#d67572",
            Self::Lavender => "#e1d5ed",
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Buildable surface sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseplate {
    /// 16 × 16 studs.
    Small,
    /// 32 × 32 studs.
    #[default]
    Medium,
    /// 48 × 48 studs.
    Large,
}

impl Baseplate {
    /// Every baseplate in ascending size.
    pub const ALL: [Baseplate; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Number of studs along each edge of the plate.
    #[must_use]
    pub const fn extent(self) -> u32 {
        match self {
            Self::Small => 16,
            Self::Medium => 32,
            Self::Large => 48,
        }
    }

    /// Looks up the baseplate with the provided stud extent.
    #[must_use]
    pub fn from_extent(extent: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|baseplate| baseplate.extent() == extent)
    }

    /// Key used in saved scenes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Looks up a baseplate by its key, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|baseplate| baseplate.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Baseplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique identifier assigned to a placed piece.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates a new piece identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The identifier following this one, if the range is not exhausted.
    #[must_use]
    pub const fn successor(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }

    /// Lowest identifier that does not appear in `taken`.
    ///
    /// Returns `None` only when every identifier is in use.
    #[must_use]
    pub fn lowest_unused(taken: impl IntoIterator<Item = PieceId>) -> Option<Self> {
        let mut taken: Vec<u32> = taken.into_iter().map(|id| id.0).collect();
        taken.sort_unstable();
        taken.dedup();

        let mut candidate = 0_u32;
        for id in taken {
            if id != candidate {
                break;
            }
            candidate = candidate.checked_add(1)?;
        }
        Some(Self(candidate))
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Three-dimensional box of grid cells covered by a piece.
///
/// The box spans every layer the piece physically occupies, which is what
/// makes stacked pieces collide correctly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    anchor: GridCell,
    width: u32,
    height: u32,
    length: u32,
}

impl Footprint {
    /// Constructs a footprint from an anchor and explicit dimensions.
    #[must_use]
    pub const fn from_anchor_and_dimensions(
        anchor: GridCell,
        width: u32,
        height: u32,
        length: u32,
    ) -> Self {
        Self {
            anchor,
            width,
            height,
            length,
        }
    }

    /// Footprint of a piece anchored at `anchor` with the given rotation.
    #[must_use]
    pub fn of(anchor: GridCell, size: &PieceSize, rotation: Rotation) -> Self {
        let extent = oriented_extent(size, rotation);
        Self::from_anchor_and_dimensions(
            anchor,
            extent.width,
            height_in_layers(size),
            extent.length,
        )
    }

    /// Minimum corner of the box.
    #[must_use]
    pub const fn anchor(&self) -> GridCell {
        self.anchor
    }

    /// Extent along x in studs.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Extent along y in layers.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Extent along z in studs.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Number of cells inside the box.
    #[must_use]
    pub const fn volume(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.length as u64
    }

    /// First layer above the box.
    #[must_use]
    pub const fn top_layer(&self) -> i32 {
        self.anchor.y.saturating_add(span(self.height))
    }

    /// Reports whether the cell lies inside the box.
    #[must_use]
    pub const fn contains(&self, cell: GridCell) -> bool {
        within(cell.x, self.anchor.x, self.width)
            && within(cell.y, self.anchor.y, self.height)
            && within(cell.z, self.anchor.z, self.length)
    }

    /// Reports whether two boxes share at least one cell.
    #[must_use]
    pub const fn intersects(&self, other: &Footprint) -> bool {
        overlaps(self.anchor.x, self.width, other.anchor.x, other.width)
            && overlaps(self.anchor.y, self.height, other.anchor.y, other.height)
            && overlaps(self.anchor.z, self.length, other.anchor.z, other.length)
    }

    /// Iterates every cell inside the box.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> {
        let Footprint {
            anchor,
            width,
            height,
            length,
        } = *self;
        (0..width).flat_map(move |dx| {
            (0..height).flat_map(move |dy| {
                (0..length).map(move |dz| anchor.offset(span(dx), span(dy), span(dz)))
            })
        })
    }
}

const fn span(value: u32) -> i32 {
    if value > i32::MAX as u32 {
        i32::MAX
    } else {
        value as i32
    }
}

const fn within(value: i32, start: i32, extent: u32) -> bool {
    value >= start && (value as i64) < start as i64 + extent as i64
}

const fn overlaps(a_start: i32, a_extent: u32, b_start: i32, b_extent: u32) -> bool {
    let a_end = a_start as i64 + a_extent as i64;
    let b_end = b_start as i64 + b_extent as i64;
    (a_start as i64) < b_end && (b_start as i64) < a_end
}

/// A piece committed to the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedPiece {
    /// Identifier allocated by the world.
    pub id: PieceId,
    /// Shared catalog descriptor.
    pub size: Arc<PieceSize>,
    /// Palette color.
    pub color: PieceColor,
    /// Rotation about the vertical axis.
    #[serde(default)]
    pub rotation: Rotation,
    /// Minimum corner of the footprint in grid space.
    #[serde(rename = "pos")]
    pub anchor: GridCell,
}

impl PlacedPiece {
    /// Cells covered by the piece.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint::of(self.anchor, &self.size, self.rotation)
    }

    /// Layer a piece stacked directly on top of this one starts at.
    #[must_use]
    pub fn top_layer(&self) -> i32 {
        self.footprint().top_layer()
    }
}

/// The unit of persistence: baseplate plus pieces in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Active baseplate.
    #[serde(default)]
    pub baseplate: Baseplate,
    /// Placed pieces in insertion order.
    pub bricks: Vec<PlacedPiece>,
}

impl Scene {
    /// Creates an empty scene on the provided baseplate.
    #[must_use]
    pub const fn empty(baseplate: Baseplate) -> Self {
        Self {
            baseplate,
            bricks: Vec::new(),
        }
    }
}

/// Transient selection parameterising the next placement.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSelection {
    size: Arc<PieceSize>,
    color: PieceColor,
    rotation: Rotation,
}

impl ToolSelection {
    /// Creates a tool selection from explicit values.
    #[must_use]
    pub fn new(size: Arc<PieceSize>, color: PieceColor, rotation: Rotation) -> Self {
        Self {
            size,
            color,
            rotation,
        }
    }

    /// Descriptor the next placement uses.
    #[must_use]
    pub fn size(&self) -> &Arc<PieceSize> {
        &self.size
    }

    /// Color the next placement uses.
    #[must_use]
    pub const fn color(&self) -> PieceColor {
        self.color
    }

    /// Rotation the next placement uses.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Replaces the selected descriptor.
    pub fn set_size(&mut self, size: Arc<PieceSize>) {
        self.size = size;
    }

    /// Replaces the selected color.
    pub fn set_color(&mut self, color: PieceColor) {
        self.color = color;
    }

    /// Advances the rotation by a quarter turn and returns the new value.
    pub fn rotate_clockwise(&mut self) -> Rotation {
        self.rotation = self.rotation.clockwise();
        self.rotation
    }

    /// Footprint the selection would cover at the provided anchor.
    #[must_use]
    pub fn footprint_at(&self, anchor: GridCell) -> Footprint {
        Footprint::of(anchor, &self.size, self.rotation)
    }
}

impl Default for ToolSelection {
    fn default() -> Self {
        Self::new(
            catalog::default_piece(),
            PieceColor::default(),
            Rotation::default(),
        )
    }
}
