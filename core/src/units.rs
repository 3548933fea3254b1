//! Dimension and unit model.
//!
//! Horizontal distances are measured in studs and vertical distances in
//! layers. One layer is the height of a plate; a brick is
//! [`LAYERS_PER_BRICK`] layers tall. The world-space constants mirror real
//! proportions: a stud pitch of 8mm and a plate height of 3.2mm.

use crate::{PieceSize, Rotation};

/// Horizontal pitch of one stud in world units.
pub const STUD: f32 = 1.0;

/// Height of one layer (a plate) in world units.
pub const PLATE: f32 = 0.4;

/// Height of a brick in world units.
pub const BRICK: f32 = 1.2;

/// Number of layers stacked in a single brick.
pub const LAYERS_PER_BRICK: u32 = 3;

/// Radius of a stud cylinder in world units.
pub const STUD_RADIUS: f32 = 0.3;

/// Height of a stud cylinder in world units.
pub const STUD_HEIGHT: f32 = 0.225;

/// Horizontal extent of a piece once rotation is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Studs covered along x.
    pub width: u32,
    /// Studs covered along z.
    pub length: u32,
}

/// Width and length of `size` after rotating it by `rotation`.
///
/// Quarter and three-quarter turns exchange the axes; half turns leave them
/// unchanged.
#[must_use]
pub fn oriented_extent(size: &PieceSize, rotation: Rotation) -> Extent {
    if rotation.swaps_axes() {
        Extent {
            width: size.l,
            length: size.w,
        }
    } else {
        Extent {
            width: size.w,
            length: size.l,
        }
    }
}

/// Height of the piece in layers.
///
/// An explicit positive `h` wins; otherwise the default for the piece kind
/// applies. The result is always at least one.
#[must_use]
pub fn height_in_layers(size: &PieceSize) -> u32 {
    size.h
        .filter(|layers| *layers > 0)
        .unwrap_or_else(|| size.kind.default_height_in_layers())
}

/// World-space elevation of the bottom of a layer.
#[must_use]
pub fn layer_to_world_y(layer: i32) -> f32 {
    layer as f32 * PLATE
}

/// World-space elevation of the vertical centre of a piece resting on `layer`.
#[must_use]
pub fn world_center_y(layer: i32, size: &PieceSize) -> f32 {
    layer_to_world_y(layer) + height_in_layers(size) as f32 * PLATE * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceKind;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = PieceKind> {
        prop_oneof![
            Just(PieceKind::Brick),
            Just(PieceKind::Plate),
            Just(PieceKind::Tile),
            Just(PieceKind::Slope),
            Just(PieceKind::Specialty),
            Just(PieceKind::Unknown),
        ]
    }

    #[test]
    fn brick_height_matches_three_plates() {
        assert!((BRICK - PLATE * LAYERS_PER_BRICK as f32).abs() < 1e-6);
    }

    #[test]
    fn kind_defaults_apply_without_explicit_height() {
        let brick = PieceSize::new(2, 4, PieceKind::Brick);
        let plate = PieceSize::new(2, 4, PieceKind::Plate);
        let tile = PieceSize::new(1, 1, PieceKind::Tile);
        let window = PieceSize::new(1, 4, PieceKind::Specialty).with_height(9);

        assert_eq!(height_in_layers(&brick), 3);
        assert_eq!(height_in_layers(&plate), 1);
        assert_eq!(height_in_layers(&tile), 1);
        assert_eq!(height_in_layers(&window), 9);
    }

    #[test]
    fn zero_height_falls_back_to_kind_default() {
        let size = PieceSize::new(1, 2, PieceKind::Plate).with_height(0);
        assert_eq!(height_in_layers(&size), 1);
    }

    #[test]
    fn quarter_turn_swaps_axes() {
        let size = PieceSize::new(2, 4, PieceKind::Brick);
        assert_eq!(
            oriented_extent(&size, Rotation::Deg90),
            Extent {
                width: 4,
                length: 2
            }
        );
        assert_eq!(
            oriented_extent(&size, Rotation::Deg180),
            Extent {
                width: 2,
                length: 4
            }
        );
    }

    #[test]
    fn world_center_sits_half_a_piece_above_the_layer() {
        let brick = PieceSize::new(1, 1, PieceKind::Brick);
        assert!((world_center_y(0, &brick) - 0.6).abs() < 1e-6);
        assert!((world_center_y(3, &brick) - 1.8).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn half_turns_preserve_extent(
            w in 1u32..=16,
            l in 1u32..=16,
            rotation in prop::sample::select(Rotation::ALL.to_vec()),
        ) {
            let size = PieceSize::new(w, l, PieceKind::Brick);
            let half_turned = rotation.clockwise().clockwise();
            prop_assert_eq!(
                oriented_extent(&size, rotation),
                oriented_extent(&size, half_turned)
            );

            let extent = oriented_extent(&size, rotation);
            if rotation.degrees() % 180 == 90 {
                prop_assert_eq!((extent.width, extent.length), (l, w));
            } else {
                prop_assert_eq!((extent.width, extent.length), (w, l));
            }
        }

        #[test]
        fn height_is_always_positive(
            kind in kind_strategy(),
            h in prop::option::of(0u32..=20),
        ) {
            let mut size = PieceSize::new(1, 1, kind);
            size.h = h;
            prop_assert!(height_in_layers(&size) >= 1);
        }
    }
}
