//! Built-in catalog of piece descriptors.
//!
//! Descriptors are allocated once and shared through [`Arc`], so every placed
//! piece referencing the same catalog entry points at the same record.

use std::sync::{Arc, OnceLock};

use crate::{GeometryKind, PieceCategory, PieceKind, PieceSize};

/// Part number of the descriptor the tool starts with.
pub const DEFAULT_PART: &str = "3002";

struct Entry {
    w: u32,
    l: u32,
    h: Option<u32>,
    kind: PieceKind,
    category: PieceCategory,
    name: &'static str,
    part: &'static str,
    geometry: GeometryKind,
    slope: Option<u32>,
}

const fn entry(
    w: u32,
    l: u32,
    kind: PieceKind,
    category: PieceCategory,
    name: &'static str,
    part: &'static str,
) -> Entry {
    Entry {
        w,
        l,
        h: None,
        kind,
        category,
        name,
        part,
        geometry: GeometryKind::Box,
        slope: None,
    }
}

const fn brick(w: u32, l: u32, name: &'static str, part: &'static str) -> Entry {
    entry(w, l, PieceKind::Brick, PieceCategory::Basic, name, part)
}

const fn plate(w: u32, l: u32, name: &'static str, part: &'static str) -> Entry {
    entry(w, l, PieceKind::Plate, PieceCategory::Plates, name, part)
}

const fn tile(w: u32, l: u32, name: &'static str, part: &'static str) -> Entry {
    entry(w, l, PieceKind::Tile, PieceCategory::Plates, name, part)
}

const fn slope(w: u32, l: u32, angle: u32, name: &'static str, part: &'static str) -> Entry {
    let mut entry = entry(w, l, PieceKind::Slope, PieceCategory::Slopes, name, part);
    entry.geometry = GeometryKind::Slope;
    entry.slope = Some(angle);
    entry
}

const fn special(
    w: u32,
    l: u32,
    category: PieceCategory,
    geometry: GeometryKind,
    name: &'static str,
    part: &'static str,
) -> Entry {
    let mut entry = entry(w, l, PieceKind::Specialty, category, name, part);
    entry.geometry = geometry;
    entry
}

const fn tall(mut entry: Entry, layers: u32) -> Entry {
    entry.h = Some(layers);
    entry
}

const fn vehicle_base(w: u32, l: u32, name: &'static str, part: &'static str) -> Entry {
    entry(w, l, PieceKind::Plate, PieceCategory::Wheels, name, part)
}

const ENTRIES: &[Entry] = &[
    brick(1, 1, "1×1 Brick", "3005"),
    brick(1, 2, "1×2 Brick", "3004"),
    brick(1, 3, "1×3 Brick", "3622"),
    brick(1, 4, "1×4 Brick", "3010"),
    brick(1, 6, "1×6 Brick", "3009"),
    brick(1, 8, "1×8 Brick", "3008"),
    brick(2, 2, "2×2 Brick", "3003"),
    brick(2, 3, "2×3 Brick", "3002"),
    brick(2, 4, "2×4 Brick", "3001"),
    brick(2, 6, "2×6 Brick", "2456"),
    brick(2, 8, "2×8 Brick", "3007"),
    brick(2, 10, "2×10 Brick", "3006"),
    plate(1, 1, "1×1 Plate", "3024"),
    plate(1, 2, "1×2 Plate", "3023"),
    plate(1, 3, "1×3 Plate", "3623"),
    plate(1, 4, "1×4 Plate", "3710"),
    plate(1, 6, "1×6 Plate", "3666"),
    plate(1, 8, "1×8 Plate", "3460"),
    plate(1, 10, "1×10 Plate", "4477"),
    plate(2, 2, "2×2 Plate", "3022"),
    plate(2, 3, "2×3 Plate", "3021"),
    plate(2, 4, "2×4 Plate", "3020"),
    plate(2, 6, "2×6 Plate", "3795"),
    plate(2, 8, "2×8 Plate", "3034"),
    plate(2, 10, "2×10 Plate", "3832"),
    plate(2, 12, "2×12 Plate", "2445"),
    plate(2, 16, "2×16 Plate", "4282"),
    plate(4, 4, "4×4 Plate", "3031"),
    plate(4, 6, "4×6 Plate", "3032"),
    plate(4, 8, "4×8 Plate", "3035"),
    plate(4, 10, "4×10 Plate", "3030"),
    plate(4, 12, "4×12 Plate", "3029"),
    plate(6, 6, "6×6 Plate", "3958"),
    plate(6, 8, "6×8 Plate", "3036"),
    plate(6, 10, "6×10 Plate", "3033"),
    plate(6, 12, "6×12 Plate", "3028"),
    plate(6, 14, "6×14 Plate", "3456"),
    plate(6, 16, "6×16 Plate", "3027"),
    plate(8, 8, "8×8 Plate", "41539"),
    plate(8, 16, "8×16 Plate", "92438"),
    tile(1, 1, "1×1 Tile", "3070"),
    tile(1, 2, "1×2 Tile", "3069"),
    tile(1, 3, "1×3 Tile", "63864"),
    tile(1, 4, "1×4 Tile", "2431"),
    tile(1, 6, "1×6 Tile", "6636"),
    tile(1, 8, "1×8 Tile", "4162"),
    tile(2, 2, "2×2 Tile", "3068"),
    tile(2, 3, "2×3 Tile", "26603"),
    tile(2, 4, "2×4 Tile", "87079"),
    slope(1, 1, 45, "1×1 Slope 45°", "50746"),
    slope(1, 2, 45, "1×2 Slope 45°", "3040"),
    slope(1, 3, 25, "1×3 Slope 25°", "4286"),
    slope(1, 4, 18, "1×4 Slope 18°", "60477"),
    slope(2, 1, 45, "2×1 Slope 45°", "3040"),
    slope(2, 2, 45, "2×2 Slope 45°", "3039"),
    slope(2, 3, 25, "2×3 Slope 25°", "3298"),
    slope(2, 4, 18, "2×4 Slope 18°", "3037"),
    slope(3, 1, 45, "3×1 Slope 45°", "50950"),
    slope(3, 2, 25, "3×2 Slope 25°", "3298"),
    slope(4, 1, 45, "4×1 Slope 45°", "60481"),
    slope(4, 2, 18, "4×2 Slope 18°", "3037"),
    special(1, 1, PieceCategory::Specialty, GeometryKind::Round, "1×1 Round Brick", "3062"),
    special(2, 2, PieceCategory::Specialty, GeometryKind::Round, "2×2 Round Brick", "3941"),
    special(2, 2, PieceCategory::Specialty, GeometryKind::Box, "2×2 Corner Brick", "2357"),
    special(1, 1, PieceCategory::Specialty, GeometryKind::Cone, "1×1 Cone", "4589"),
    special(2, 2, PieceCategory::Specialty, GeometryKind::Dome, "2×2 Dome", "553"),
    special(1, 2, PieceCategory::Specialty, GeometryKind::Box, "1×2 Grille", "2412"),
    special(1, 4, PieceCategory::Specialty, GeometryKind::Arch, "1×4 Arch", "3659"),
    special(1, 6, PieceCategory::Specialty, GeometryKind::Arch, "1×6 Arch", "92950"),
    special(1, 2, PieceCategory::Technic, GeometryKind::Technic, "1×2 Technic Brick", "3700"),
    special(1, 4, PieceCategory::Technic, GeometryKind::Technic, "1×4 Technic Brick", "3701"),
    special(1, 6, PieceCategory::Technic, GeometryKind::Technic, "1×6 Technic Brick", "3894"),
    special(1, 8, PieceCategory::Technic, GeometryKind::Technic, "1×8 Technic Brick", "3702"),
    special(1, 10, PieceCategory::Technic, GeometryKind::Technic, "1×10 Technic Brick", "2730"),
    special(1, 12, PieceCategory::Technic, GeometryKind::Technic, "1×12 Technic Brick", "3895"),
    special(1, 16, PieceCategory::Technic, GeometryKind::Technic, "1×16 Technic Brick", "3703"),
    special(1, 2, PieceCategory::Windows, GeometryKind::WindowFrame, "1×2×2 Window", "60592"),
    tall(
        special(1, 2, PieceCategory::Windows, GeometryKind::WindowFrame, "1×2×3 Window", "60593"),
        9,
    ),
    tall(
        special(1, 4, PieceCategory::Windows, GeometryKind::WindowFrame, "1×4×3 Window", "3853"),
        9,
    ),
    tall(
        special(
            1,
            4,
            PieceCategory::Windows,
            GeometryKind::WindowFrame,
            "1×4×6 Window Frame",
            "57894",
        ),
        18,
    ),
    tall(
        special(
            1,
            4,
            PieceCategory::Windows,
            GeometryKind::DoorFrame,
            "1×4×5 Door Frame",
            "73312",
        ),
        15,
    ),
    special(2, 2, PieceCategory::Wheels, GeometryKind::Wheel, "2×2 Wheel Hub", "3641"),
    special(4, 4, PieceCategory::Wheels, GeometryKind::Wheel, "4×4 Wheel Hub", "4624"),
    special(2, 2, PieceCategory::Wheels, GeometryKind::Wheel, "2×2 Wheel (Small)", "6014"),
    special(3, 3, PieceCategory::Wheels, GeometryKind::Wheel, "3×3 Wheel (Medium)", "30155"),
    special(4, 4, PieceCategory::Wheels, GeometryKind::Wheel, "4×4 Wheel (Large)", "2515"),
    vehicle_base(2, 6, "2×6 Vehicle Base", "52036"),
    vehicle_base(4, 10, "4×10 Vehicle Base", "30076"),
    special(6, 2, PieceCategory::Specialty, GeometryKind::Wing, "6×2 Wing Straight", "A001"),
    special(8, 2, PieceCategory::Specialty, GeometryKind::Wing, "8×2 Wing Swept", "A002"),
    special(4, 3, PieceCategory::Specialty, GeometryKind::Wing, "4×3 Wing Delta", "A003"),
    special(10, 2, PieceCategory::Specialty, GeometryKind::Wing, "10×2 Wing Fighter", "A004"),
    special(2, 4, PieceCategory::Specialty, GeometryKind::Engine, "2×4 Engine Nacelle", "A101"),
    special(3, 6, PieceCategory::Specialty, GeometryKind::Engine, "3×6 Engine Large", "A102"),
    special(2, 3, PieceCategory::Specialty, GeometryKind::Cockpit, "2×3 Cockpit Bubble", "A201"),
    special(3, 4, PieceCategory::Specialty, GeometryKind::Cockpit, "3×4 Cockpit Large", "A202"),
    special(2, 8, PieceCategory::Specialty, GeometryKind::Fuselage, "2×8 Fuselage", "A301"),
    special(
        3,
        12,
        PieceCategory::Specialty,
        GeometryKind::Fuselage,
        "3×12 Fuselage Large",
        "A302",
    ),
    special(3, 2, PieceCategory::Specialty, GeometryKind::Tail, "3×2 Vertical Tail", "A401"),
    special(4, 2, PieceCategory::Specialty, GeometryKind::Tail, "4×2 Tail Large", "A402"),
];

impl Entry {
    fn to_size(&self) -> PieceSize {
        let mut size = PieceSize::new(self.w, self.l, self.kind)
            .named(self.name)
            .with_part_num(self.part)
            .in_category(self.category)
            .with_geometry(self.geometry);
        size.h = self.h;
        size.slope_angle = self.slope;
        if self.kind == PieceKind::Tile {
            size = size.with_studs(false);
        }
        size
    }
}

/// Every descriptor in the built-in catalog, in palette order.
#[must_use]
pub fn library() -> &'static [Arc<PieceSize>] {
    static LIBRARY: OnceLock<Vec<Arc<PieceSize>>> = OnceLock::new();
    LIBRARY.get_or_init(|| ENTRIES.iter().map(|entry| Arc::new(entry.to_size())).collect())
}

/// Finds the catalog descriptor with the provided part number.
#[must_use]
pub fn find_by_part(part: &str) -> Option<Arc<PieceSize>> {
    let part = part.trim();
    library()
        .iter()
        .find(|size| size.part_num.as_deref() == Some(part))
        .cloned()
}

/// Finds a descriptor by part number, falling back to its display name.
///
/// Several slope variants share a part number; only the first is reachable
/// by number, the others by name. Names match case-insensitively and accept
/// `x` in place of `×`.
#[must_use]
pub fn find(key: &str) -> Option<Arc<PieceSize>> {
    find_by_part(key).or_else(|| {
        let wanted = normalise_name(key.trim());
        library()
            .iter()
            .find(|size| normalise_name(&size.name) == wanted)
            .cloned()
    })
}

fn normalise_name(name: &str) -> String {
    name.to_lowercase().replace('×', "x")
}

/// Descriptors listed under the provided category.
pub fn by_category(category: PieceCategory) -> impl Iterator<Item = &'static Arc<PieceSize>> {
    library()
        .iter()
        .filter(move |size| size.category == category)
}

/// Descriptor the tool starts with.
#[must_use]
pub fn default_piece() -> Arc<PieceSize> {
    find_by_part(DEFAULT_PART)
        .unwrap_or_else(|| Arc::new(PieceSize::new(2, 3, PieceKind::Brick).named("2×3 Brick")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_in_layers;

    #[test]
    fn part_lookup_returns_shared_descriptor() {
        let first = find_by_part("3001").expect("2×4 brick in catalog");
        let second = find_by_part(" 3001 ").expect("lookup trims input");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((first.w, first.l), (2, 4));
        assert_eq!(height_in_layers(&first), 3);
    }

    #[test]
    fn windows_carry_explicit_heights() {
        let frame = find_by_part("57894").expect("window frame in catalog");
        assert_eq!(height_in_layers(&frame), 18);
        assert_eq!(frame.geometry, GeometryKind::WindowFrame);
    }

    #[test]
    fn tiles_have_no_studs() {
        assert!(by_category(PieceCategory::Plates)
            .filter(|size| size.kind == PieceKind::Tile)
            .all(|size| !size.has_studs()));
    }

    #[test]
    fn every_catalog_category_is_populated() {
        for category in PieceCategory::ALL {
            assert!(
                by_category(category).next().is_some(),
                "category {category:?} should offer at least one piece"
            );
        }
    }

    #[test]
    fn every_entry_has_a_positive_footprint() {
        assert!(library().iter().all(|size| size.w > 0 && size.l > 0));
    }

    #[test]
    fn unknown_part_is_absent() {
        assert!(find_by_part("99999").is_none());
        assert!(find("nothing like this").is_none());
    }

    #[test]
    fn windows_without_explicit_height_stand_one_brick_tall() {
        let window = find_by_part("60592").expect("1×2×2 window in catalog");
        assert_eq!(window.h, None);
        assert_eq!(height_in_layers(&window), 3);
    }

    #[test]
    fn shared_part_numbers_resolve_variants_by_name() {
        let narrow = find("3040").expect("part number lookup");
        assert_eq!((narrow.w, narrow.l), (1, 2));

        let wide = find("2x1 slope 45°").expect("name lookup");
        assert_eq!((wide.w, wide.l), (2, 1));
        assert_eq!(wide.part_num.as_deref(), Some("3040"));

        let shallow = find("4×2 Slope 18°").expect("exact name lookup");
        assert_eq!((shallow.w, shallow.l), (4, 2));
    }

    #[test]
    fn catalog_covers_the_full_piece_library() {
        assert_eq!(library().len(), 100);
        for part in [
            "2412", "2730", "3895", "6014", "2515", "A003", "A004", "A102", "A202", "A302",
            "A402",
        ] {
            assert!(find_by_part(part).is_some(), "part {part} should be listed");
        }
        assert_eq!(by_category(PieceCategory::Technic).count(), 7);
        assert_eq!(by_category(PieceCategory::Wheels).count(), 7);
    }
}
