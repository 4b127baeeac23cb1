//! Sequential finalization: instance compaction and mesh combination.

use tessera_geom::{Aabb, Vec3};
use tessera_theme::Theme;

use crate::mesh_build::MeshBuild;
use crate::placement::{CellPlacements, MeshInstance};

/// Combined output mesh, partitioned by submesh slot. Valid between a
/// completed generation and the next one.
#[derive(Clone, Default)]
pub struct TileMesh {
    pub submeshes: Vec<MeshBuild>,
    pub bbox: Aabb,
}

impl TileMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|m| m.vertex_count()).sum()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|m| m.triangle_count()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.submeshes.iter().all(|m| m.is_empty())
    }
}

/// Flattens all non-empty per-cell slots into one instance list. The length
/// is data-dependent, so this is a single sequential pass run strictly after
/// the placement stage completes.
pub fn compact_instances(cells: &[CellPlacements]) -> Vec<MeshInstance> {
    let total: usize = cells.iter().map(|c| c.len()).sum();
    let mut out = Vec::with_capacity(total);
    for cell in cells {
        out.extend_from_slice(cell.as_slice());
    }
    debug_assert_eq!(out.len(), total, "compaction lost instances");
    out
}

/// Merges every instance's piece geometry into one mesh. Submesh slot `i` of
/// the output receives exactly the slot-`i` geometry of every contributing
/// piece, in increasing slot order; slots are never interleaved. Missing
/// piece variants and empty slots are skipped silently.
pub fn combine_instances(theme: &Theme, instances: &[MeshInstance]) -> TileMesh {
    let slots = theme.submesh_slots();
    let mut submeshes = vec![MeshBuild::default(); slots];
    for (slot, build) in submeshes.iter_mut().enumerate() {
        for inst in instances {
            let Some(mesh) = theme.piece_geometry(inst.piece, inst.variant) else {
                continue;
            };
            let Some(sub) = mesh.submeshes.get(slot) else {
                continue;
            };
            if sub.is_empty() {
                continue;
            }
            build.append_submesh(sub, inst.basis, inst.translation);
        }
    }

    let mut bbox = Aabb::inverted();
    let mut any = false;
    for build in &submeshes {
        for p in build.pos.chunks_exact(3) {
            bbox.expand(Vec3::new(p[0], p[1], p[2]));
            any = true;
        }
    }
    TileMesh {
        submeshes,
        bbox: if any { bbox } else { Aabb::default() },
    }
}
