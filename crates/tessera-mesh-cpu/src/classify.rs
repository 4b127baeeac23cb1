//! Neighborhood classification over the cell-corner lattice.
//!
//! Every lattice vertex gets a configuration bitmask describing which of its
//! diagonal neighbor cells hold the fill tile. 4 bits at a single height
//! level (flat), 8 bits across the layers below and above the vertex
//! (solid). Vertices are independent; ranges of them can be classified on
//! any thread without coordination.

use tessera_theme::Tile;
use tessera_volume::Volume;

// Single-layer neighbor bits, shared by the flat mask and the solid mask's
// below nibble. Left/right split the X axis, forward/backward the Z axis.
pub const LEFT_FORWARD: u8 = 0x01;
pub const RIGHT_FORWARD: u8 = 0x02;
pub const LEFT_BACKWARD: u8 = 0x04;
pub const RIGHT_BACKWARD: u8 = 0x08;

/// Bit distance from the below nibble to the above nibble.
pub const ABOVE_SHIFT: u8 = 4;

pub const FLAT_FULL: u8 = 0x0F;
pub const SOLID_FULL: u8 = 0xFF;

// Axis half-masks of the 8-bit configuration.
pub const HALF_BELOW: u8 = 0x0F;
pub const HALF_ABOVE: u8 = 0xF0;
pub const HALF_LEFT: u8 = 0x55;
pub const HALF_RIGHT: u8 = 0xAA;
pub const HALF_FORWARD: u8 = 0x33;
pub const HALF_BACKWARD: u8 = 0xCC;

/// Per-lattice-vertex classification record. Transient: lives for one
/// generation cycle unless the builder runs in cached mode.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TileVariant {
    pub config: u8,
    pub culled: bool,
}

/// One flag per axis direction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DirFlags {
    pub neg_x: bool,
    pub pos_x: bool,
    pub neg_y: bool,
    pub pos_y: bool,
    pub neg_z: bool,
    pub pos_z: bool,
}

impl DirFlags {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            neg_x: false,
            pos_x: false,
            neg_y: false,
            pos_y: false,
            neg_z: false,
            pos_z: false,
        }
    }

    #[inline]
    pub const fn all() -> Self {
        Self {
            neg_x: true,
            pos_x: true,
            neg_y: true,
            pos_y: true,
            neg_z: true,
            pos_z: true,
        }
    }

    #[inline]
    pub const fn horizontal() -> Self {
        Self {
            neg_x: true,
            pos_x: true,
            neg_y: false,
            pos_y: false,
            neg_z: true,
            pos_z: true,
        }
    }

    #[inline]
    pub const fn vertical(neg_y: bool, pos_y: bool) -> Self {
        Self {
            neg_x: false,
            pos_x: false,
            neg_y,
            pos_y,
            neg_z: false,
            pos_z: false,
        }
    }

    #[inline]
    pub const fn any(self) -> bool {
        self.neg_x || self.pos_x || self.neg_y || self.pos_y || self.neg_z || self.pos_z
    }
}

/// Pure bit-level mask modifiers, applied per vertex after the base
/// classification and before placement.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassifyMods {
    pub filled_boundaries: DirFlags,
    pub skip_directions: DirFlags,
    pub skip_directions_with_borders: DirFlags,
}

#[inline]
pub const fn is_void_flat(config: u8) -> bool {
    config == 0 || config == FLAT_FULL
}

#[inline]
pub const fn is_void_solid(config: u8) -> bool {
    config == 0 || config == SOLID_FULL
}

#[inline]
fn matches(tiles: &Volume<Tile>, fill: Tile, x: i32, y: i32, z: i32) -> bool {
    tiles.cell(x, y, z) == Some(fill)
}

/// 4-bit mask for lattice vertex (x, z) at a fixed height level.
#[inline]
pub fn classify_flat(tiles: &Volume<Tile>, fill: Tile, level: usize, x: usize, z: usize) -> u8 {
    classify_flat_layer(tiles, fill, x as i32, level as i32, z as i32)
}

/// 8-bit mask for lattice vertex (x, y, z): the flat four in the layer below
/// the vertex, then the same four in the layer above.
#[inline]
pub fn classify_solid(tiles: &Volume<Tile>, fill: Tile, x: usize, y: usize, z: usize) -> u8 {
    let below = classify_flat_layer(tiles, fill, x as i32, y as i32 - 1, z as i32);
    let above = classify_flat_layer(tiles, fill, x as i32, y as i32, z as i32);
    below | (above << ABOVE_SHIFT)
}

#[inline]
fn classify_flat_layer(tiles: &Volume<Tile>, fill: Tile, x: i32, y: i32, z: i32) -> u8 {
    let mut mask = 0u8;
    if matches(tiles, fill, x - 1, y, z) {
        mask |= LEFT_FORWARD;
    }
    if matches(tiles, fill, x, y, z) {
        mask |= RIGHT_FORWARD;
    }
    if matches(tiles, fill, x - 1, y, z - 1) {
        mask |= LEFT_BACKWARD;
    }
    if matches(tiles, fill, x, y, z - 1) {
        mask |= RIGHT_BACKWARD;
    }
    mask
}

/// Synthesizes out-of-bounds neighbor bits at the volume's outer lattice
/// shell by mirroring the in-bounds half across the boundary axis. Each of
/// the six directions is gated independently, letting edge tiles behave as
/// if the volume continued past the border.
#[inline]
pub fn apply_filled_boundaries(
    mut mask: u8,
    x: usize,
    y: usize,
    z: usize,
    cells_x: usize,
    cells_y: usize,
    cells_z: usize,
    dirs: DirFlags,
) -> u8 {
    if dirs.neg_x && x == 0 {
        mask |= (mask & HALF_RIGHT) >> 1;
    }
    if dirs.pos_x && x == cells_x {
        mask |= (mask & HALF_LEFT) << 1;
    }
    if dirs.neg_y && y == 0 {
        mask |= (mask & HALF_ABOVE) >> ABOVE_SHIFT;
    }
    if dirs.pos_y && y == cells_y {
        mask |= (mask & HALF_BELOW) << ABOVE_SHIFT;
    }
    if dirs.neg_z && z == 0 {
        mask |= (mask & HALF_FORWARD) << 2;
    }
    if dirs.pos_z && z == cells_z {
        mask |= (mask & HALF_BACKWARD) >> 2;
    }
    mask
}

/// True when the mask is exactly one of the six one-axis-open half patterns:
/// the named direction's half is empty and the opposite half fully set.
#[inline]
pub fn skip_open_direction(mask: u8, dirs: DirFlags) -> bool {
    (dirs.pos_y && mask == HALF_BELOW)
        || (dirs.neg_y && mask == HALF_ABOVE)
        || (dirs.pos_x && mask == HALF_LEFT)
        || (dirs.neg_x && mask == HALF_RIGHT)
        || (dirs.pos_z && mask == HALF_BACKWARD)
        || (dirs.neg_z && mask == HALF_FORWARD)
}

/// More aggressive variant: culls whenever the named direction's half has no
/// bits at all, partial coverage on the opposite half included.
#[inline]
pub fn skip_open_direction_with_borders(mask: u8, dirs: DirFlags) -> bool {
    (dirs.pos_y && (mask & HALF_ABOVE) == 0)
        || (dirs.neg_y && (mask & HALF_BELOW) == 0)
        || (dirs.pos_x && (mask & HALF_RIGHT) == 0)
        || (dirs.neg_x && (mask & HALF_LEFT) == 0)
        || (dirs.pos_z && (mask & HALF_FORWARD) == 0)
        || (dirs.neg_z && (mask & HALF_BACKWARD) == 0)
}

/// Classifies the flat-lattice vertices `first .. first + out.len()` (linear
/// lattice order) into `out`. Callers hand out disjoint slices to batch the
/// work across threads.
pub fn classify_flat_range(
    tiles: &Volume<Tile>,
    fill: Tile,
    level: usize,
    first: usize,
    out: &mut [TileVariant],
) {
    let lattice = tiles.extents().lattice_flat();
    for (k, slot) in out.iter_mut().enumerate() {
        let (x, _, z) = lattice.delinear(first + k);
        let config = classify_flat(tiles, fill, level, x, z);
        *slot = TileVariant {
            config,
            culled: false,
        };
    }
}

/// Solid-lattice counterpart of `classify_flat_range`, applying the optional
/// boundary and skip modifiers per vertex.
pub fn classify_solid_range(
    tiles: &Volume<Tile>,
    fill: Tile,
    mods: &ClassifyMods,
    first: usize,
    out: &mut [TileVariant],
) {
    let cells = tiles.extents();
    let lattice = cells.lattice_solid();
    for (k, slot) in out.iter_mut().enumerate() {
        let (x, y, z) = lattice.delinear(first + k);
        let mut config = classify_solid(tiles, fill, x, y, z);
        if mods.filled_boundaries.any() {
            config = apply_filled_boundaries(
                config,
                x,
                y,
                z,
                cells.x(),
                cells.y(),
                cells.z(),
                mods.filled_boundaries,
            );
        }
        let culled = skip_open_direction(config, mods.skip_directions)
            || skip_open_direction_with_borders(config, mods.skip_directions_with_borders);
        *slot = TileVariant { config, culled };
    }
}
