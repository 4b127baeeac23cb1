use proptest::prelude::*;
use tessera_mesh_cpu::classify::{
    ClassifyMods, DirFlags, HALF_ABOVE, HALF_BACKWARD, HALF_BELOW, HALF_FORWARD, HALF_LEFT,
    HALF_RIGHT, LEFT_BACKWARD, LEFT_FORWARD, RIGHT_BACKWARD, RIGHT_FORWARD, TileVariant,
    apply_filled_boundaries, classify_flat, classify_flat_range, classify_solid,
    classify_solid_range, is_void_flat, is_void_solid, skip_open_direction,
    skip_open_direction_with_borders,
};
use tessera_theme::Tile;
use tessera_volume::{Extents, Volume};

const FILL: Tile = Tile(1);

fn volume_from_bits(e: Extents, bits: &[bool]) -> Volume<Tile> {
    let mut vol = Volume::filled(e, Tile::EMPTY);
    for (i, &b) in bits.iter().enumerate().take(e.len()) {
        let (x, y, z) = e.delinear(i);
        if b {
            vol.set(x, y, z, FILL);
        }
    }
    vol
}

// Exactly one of the four cells meeting at lattice vertex (1,1) is filled;
// the mask has exactly the matching bit.
#[test]
fn flat_single_cell_sets_single_bit() {
    let e = Extents::new(2, 1, 2);
    let cases = [
        ((0, 1), LEFT_FORWARD),
        ((1, 1), RIGHT_FORWARD),
        ((0, 0), LEFT_BACKWARD),
        ((1, 0), RIGHT_BACKWARD),
    ];
    for ((cx, cz), bit) in cases {
        let mut vol = Volume::filled(e, Tile::EMPTY);
        vol.set(cx, 0, cz, FILL);
        let mask = classify_flat(&vol, FILL, 0, 1, 1);
        assert_eq!(mask, bit, "cell ({cx},{cz})");
        assert_eq!(mask.count_ones(), 1);
    }
}

#[test]
fn solid_layers_split_below_and_above() {
    let e = Extents::new(2, 2, 2);
    let mut vol = Volume::filled(e, Tile::EMPTY);
    // below layer of vertex (1,1,1)
    vol.set(0, 0, 1, FILL);
    // above layer
    vol.set(1, 1, 0, FILL);
    let mask = classify_solid(&vol, FILL, 1, 1, 1);
    assert_eq!(mask, LEFT_FORWARD | (RIGHT_BACKWARD << 4));
}

#[test]
fn fill_value_mismatches_do_not_classify() {
    let e = Extents::new(2, 1, 2);
    let mut vol = Volume::filled(e, Tile(9));
    vol.set(1, 0, 1, FILL);
    assert_eq!(classify_flat(&vol, FILL, 0, 1, 1), RIGHT_FORWARD);
}

#[test]
fn void_sentinels() {
    assert!(is_void_flat(0));
    assert!(is_void_flat(0x0F));
    assert!(!is_void_flat(0x05));
    assert!(is_void_solid(0));
    assert!(is_void_solid(0xFF));
    assert!(!is_void_solid(0x0F));
}

#[test]
fn filled_boundary_mirrors_half_masks() {
    // right bits mirror into left at the -X shell
    let m = apply_filled_boundaries(HALF_RIGHT, 0, 1, 1, 4, 4, 4, DirFlags::all());
    assert_eq!(m, HALF_RIGHT | HALF_LEFT);
    // below mirrors into above at the +Y shell
    let m = apply_filled_boundaries(HALF_BELOW, 1, 4, 1, 4, 4, 4, DirFlags::all());
    assert_eq!(m, 0xFF);
    // interior vertices are untouched
    let m = apply_filled_boundaries(HALF_BELOW, 1, 1, 1, 4, 4, 4, DirFlags::all());
    assert_eq!(m, HALF_BELOW);
    // disabled directions are untouched even on the shell
    let m = apply_filled_boundaries(HALF_RIGHT, 0, 1, 1, 4, 4, 4, DirFlags::empty());
    assert_eq!(m, HALF_RIGHT);
}

// A single filled cell at the volume edge classifies the same as if an
// identical cell sat just outside the boundary.
#[test]
fn filled_boundary_matches_real_continuation() {
    let small = Extents::new(2, 2, 2);
    let mut edge = Volume::filled(small, Tile::EMPTY);
    edge.set(0, 0, 0, FILL);

    let wide = Extents::new(3, 2, 2);
    let mut cont = Volume::filled(wide, Tile::EMPTY);
    cont.set(0, 0, 0, FILL);
    cont.set(1, 0, 0, FILL);

    let dirs = DirFlags {
        neg_x: true,
        ..DirFlags::empty()
    };
    for vy in 0..=2 {
        for vz in 0..=2 {
            let m = classify_solid(&edge, FILL, 0, vy, vz);
            let mirrored = apply_filled_boundaries(m, 0, vy, vz, 2, 2, 2, dirs);
            // vertex (1, vy, vz) of the continued volume sits one cell in,
            // with the synthesized neighbor actually present
            let want = classify_solid(&cont, FILL, 1, vy, vz);
            assert_eq!(mirrored, want, "vertex (0,{vy},{vz})");
        }
    }
}

#[test]
fn skip_rules_match_half_masks() {
    let up_only = DirFlags {
        pos_y: true,
        ..DirFlags::empty()
    };
    // flat ground: open above, full below
    assert!(skip_open_direction(HALF_BELOW, up_only));
    assert!(!skip_open_direction(HALF_ABOVE, up_only));
    // partial below does not satisfy the strict rule...
    assert!(!skip_open_direction(0x05, up_only));
    // ...but does satisfy the with-borders rule (no bits above)
    assert!(skip_open_direction_with_borders(0x05, up_only));
    assert!(!skip_open_direction_with_borders(0x15, up_only));

    for (mask, dir) in [
        (HALF_ABOVE, DirFlags { neg_y: true, ..DirFlags::empty() }),
        (HALF_LEFT, DirFlags { pos_x: true, ..DirFlags::empty() }),
        (HALF_RIGHT, DirFlags { neg_x: true, ..DirFlags::empty() }),
        (HALF_BACKWARD, DirFlags { pos_z: true, ..DirFlags::empty() }),
        (HALF_FORWARD, DirFlags { neg_z: true, ..DirFlags::empty() }),
    ] {
        assert!(skip_open_direction(mask, dir));
        assert!(!skip_open_direction(mask, DirFlags::empty()));
    }
}

#[test]
fn solid_range_culls_open_ground() {
    let e = Extents::new(2, 1, 2);
    let vol = volume_from_bits(e, &[true, true, true, true]);
    let mods = ClassifyMods {
        skip_directions: DirFlags {
            pos_y: true,
            ..DirFlags::empty()
        },
        ..ClassifyMods::default()
    };
    let lattice = e.lattice_solid();
    let mut out = vec![TileVariant::default(); lattice.len()];
    classify_solid_range(&vol, FILL, &mods, 0, &mut out);
    // the interior top vertex sees all four below cells and none above
    let top_center = lattice.linear(1, 1, 1);
    assert_eq!(out[top_center].config, HALF_BELOW);
    assert!(out[top_center].culled);
}

fn rotate_mask_180(m: u8) -> u8 {
    let nibble = |n: u8| {
        let mut r = 0u8;
        if n & LEFT_FORWARD != 0 {
            r |= RIGHT_BACKWARD;
        }
        if n & RIGHT_FORWARD != 0 {
            r |= LEFT_BACKWARD;
        }
        if n & LEFT_BACKWARD != 0 {
            r |= RIGHT_FORWARD;
        }
        if n & RIGHT_BACKWARD != 0 {
            r |= LEFT_FORWARD;
        }
        r
    };
    nibble(m & 0x0F) | (nibble(m >> 4) << 4)
}

proptest! {
    // classification is a pure function of the local neighborhood: embedding
    // the same cells elsewhere (with empty margins) shifts every mask verbatim
    #[test]
    fn classification_is_translation_invariant(
        bits in proptest::collection::vec(any::<bool>(), 64),
        dx in 1usize..=3,
        dy in 1usize..=3,
        dz in 1usize..=3,
    ) {
        let small = Extents::new(4, 4, 4);
        let origin = volume_from_bits(small, &bits);

        let big = Extents::new(8, 8, 8);
        let mut shifted = Volume::filled(big, Tile::EMPTY);
        for i in 0..small.len() {
            let (x, y, z) = small.delinear(i);
            if origin.get(x, y, z) == FILL {
                shifted.set(x + dx, y + dy, z + dz, FILL);
            }
        }

        for vx in 0..=4 {
            for vy in 0..=4 {
                for vz in 0..=4 {
                    let a = classify_solid(&origin, FILL, vx, vy, vz);
                    let b = classify_solid(&shifted, FILL, vx + dx, vy + dy, vz + dz);
                    prop_assert_eq!(a, b, "vertex ({}, {}, {})", vx, vy, vz);
                }
            }
        }
    }

    // 180-degree volume rotation about +Y shows up as a per-nibble bit
    // rotation of every configuration mask
    #[test]
    fn masks_rotate_with_the_volume(bits in proptest::collection::vec(any::<bool>(), 36)) {
        let e = Extents::new(3, 4, 3);
        let vol = volume_from_bits(e, &bits);
        let mut rotated = Volume::filled(e, Tile::EMPTY);
        for i in 0..e.len() {
            let (x, y, z) = e.delinear(i);
            rotated.set(e.x() - 1 - x, y, e.z() - 1 - z, vol.get(x, y, z));
        }

        for vx in 0..=e.x() {
            for vy in 0..=e.y() {
                for vz in 0..=e.z() {
                    let m = classify_solid(&vol, FILL, vx, vy, vz);
                    let r = classify_solid(&rotated, FILL, e.x() - vx, vy, e.z() - vz);
                    prop_assert_eq!(r, rotate_mask_180(m));
                }
            }
        }
    }

    // batched range classification agrees with per-vertex calls regardless
    // of how the lattice is chunked
    #[test]
    fn range_batches_agree_with_single(bits in proptest::collection::vec(any::<bool>(), 27), split in 1usize..16) {
        let e = Extents::new(3, 3, 3);
        let vol = volume_from_bits(e, &bits);
        let lattice = e.lattice_solid();
        let mods = ClassifyMods::default();

        let mut batched = vec![TileVariant::default(); lattice.len()];
        let mut first = 0usize;
        for chunk in batched.chunks_mut(split) {
            let start = first;
            first += chunk.len();
            classify_solid_range(&vol, FILL, &mods, start, chunk);
        }
        for i in 0..lattice.len() {
            let (x, y, z) = lattice.delinear(i);
            prop_assert_eq!(batched[i].config, classify_solid(&vol, FILL, x, y, z));
        }
    }

    // the flat classifier is the below-nibble of the solid classifier one
    // level up
    #[test]
    fn flat_matches_solid_below_nibble(bits in proptest::collection::vec(any::<bool>(), 16)) {
        let e = Extents::new(4, 1, 4);
        let vol = volume_from_bits(e, &bits);
        for vx in 0..=4 {
            for vz in 0..=4 {
                let flat = classify_flat(&vol, FILL, 0, vx, vz);
                let solid = classify_solid(&vol, FILL, vx, 1, vz);
                prop_assert_eq!(flat, solid & 0x0F);
            }
        }
    }

    // flat range entry points agree with direct calls too
    #[test]
    fn flat_range_agrees(bits in proptest::collection::vec(any::<bool>(), 16)) {
        let e = Extents::new(4, 1, 4);
        let vol = volume_from_bits(e, &bits);
        let lattice = e.lattice_flat();
        let mut out = vec![TileVariant::default(); lattice.len()];
        classify_flat_range(&vol, FILL, 0, 0, &mut out);
        for i in 0..lattice.len() {
            let (x, _, z) = lattice.delinear(i);
            prop_assert_eq!(out[i].config, classify_flat(&vol, FILL, 0, x, z));
            prop_assert!(!out[i].culled);
        }
    }
}

#[test]
fn half_masks_partition_the_byte() {
    assert_eq!(HALF_BELOW | HALF_ABOVE, 0xFF);
    assert_eq!(HALF_LEFT | HALF_RIGHT, 0xFF);
    assert_eq!(HALF_FORWARD | HALF_BACKWARD, 0xFF);
    assert_eq!(HALF_BELOW & HALF_ABOVE, 0);
    assert_eq!(HALF_LEFT & HALF_RIGHT, 0);
    assert_eq!(HALF_FORWARD & HALF_BACKWARD, 0);
}
