//! Configuration-to-placement resolution.
//!
//! Each classified lattice vertex resolves its configuration through the
//! theme's transform table into at most `MAX_GROUP_PLACEMENTS` placed piece
//! instances. Cells are independent and write only their own output slot.

use tessera_geom::{Mat3, Vec3};
use tessera_theme::types::MAX_GROUP_PLACEMENTS;
use tessera_theme::{PieceId, Theme, VariantPick};
use tessera_volume::Extents;

use crate::classify::{TileVariant, is_void_flat, is_void_solid};
use crate::tables::basis_for;

/// One resolved placement awaiting combination.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshInstance {
    pub piece: PieceId,
    pub variant: u8,
    pub basis: Mat3,
    pub translation: Vec3,
}

/// Fixed-capacity per-cell output slot. Cells never place more than the
/// group cap, so the buffer is one flat array with no per-cell allocation.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellPlacements {
    len: u8,
    items: [MeshInstance; MAX_GROUP_PLACEMENTS],
}

impl CellPlacements {
    #[inline]
    pub fn push(&mut self, instance: MeshInstance) {
        if (self.len as usize) < MAX_GROUP_PLACEMENTS {
            self.items[self.len as usize] = instance;
            self.len += 1;
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[MeshInstance] {
        &self.items[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Mixes the generation seed with a cell's lattice index into an independent
/// deterministic RNG stream for that cell.
#[inline]
fn cell_rng(seed: u64, cell: usize) -> fastrand::Rng {
    fastrand::Rng::with_seed(seed ^ (cell as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Resolves lattice vertices `first .. first + out.len()` into `out`.
/// `flat_level` carries the meshed height level for flat lattices and is
/// ignored for solid ones (the lattice y coordinate is used instead).
#[allow(clippy::too_many_arguments)]
pub fn resolve_placements_range(
    theme: &Theme,
    variants: &[TileVariant],
    lattice: Extents,
    flat: bool,
    flat_level: usize,
    cell_size: Vec3,
    seed: u64,
    first: usize,
    out: &mut [CellPlacements],
) {
    for (k, slot) in out.iter_mut().enumerate() {
        let i = first + k;
        *slot = resolve_cell(
            theme, variants[i], lattice, flat, flat_level, cell_size, seed, i,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_cell(
    theme: &Theme,
    tv: TileVariant,
    lattice: Extents,
    flat: bool,
    flat_level: usize,
    cell_size: Vec3,
    seed: u64,
    cell: usize,
) -> CellPlacements {
    let mut placed = CellPlacements::default();
    let void = if flat {
        is_void_flat(tv.config)
    } else {
        is_void_solid(tv.config)
    };
    if tv.culled || void {
        return placed;
    }
    let Some(group) = theme.config_group(tv.config) else {
        return placed;
    };
    if group.is_empty() {
        return placed;
    }

    let (x, y, z) = lattice.delinear(cell);
    let y = if flat { flat_level } else { y };
    let translation = Vec3::new(x as f32, y as f32, z as f32).scale_axes(cell_size);

    let mut rng = cell_rng(seed, cell);
    for entry in group.entries.iter() {
        let variant = match entry.variant {
            VariantPick::Fixed(v) => v,
            VariantPick::Random => {
                let count = theme.variant_count(entry.piece);
                if count == 0 {
                    continue;
                }
                rng.usize(0..count) as u8
            }
        };
        placed.push(MeshInstance {
            piece: entry.piece,
            variant,
            basis: basis_for(entry.transform),
            translation,
        });
    }
    placed
}
