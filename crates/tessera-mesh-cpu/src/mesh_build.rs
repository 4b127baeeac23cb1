use tessera_geom::{Mat3, Vec3};
use tessera_theme::SubmeshData;

/// Flat output buffers for one submesh of the combined mesh.
#[derive(Default, Clone)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    /// Clears all arrays but retains capacity for reuse across cycles.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a piece submesh under a rigid basis + translation. Bases with
    /// negative determinant (odd mirror count) reverse triangle winding so
    /// mirrored pieces stay outward-facing.
    pub fn append_submesh(&mut self, sub: &SubmeshData, basis: Mat3, translation: Vec3) {
        let base = self.vertex_count() as u32;
        self.pos.reserve(sub.pos.len());
        self.norm.reserve(sub.norm.len());
        for p in sub.pos.chunks_exact(3) {
            let v = basis.mul_vec3(Vec3::new(p[0], p[1], p[2])) + translation;
            self.pos.extend_from_slice(&[v.x, v.y, v.z]);
        }
        // Rotation and mirror bases are orthonormal, so normals transform by
        // the same matrix and stay unit length.
        for n in sub.norm.chunks_exact(3) {
            let v = basis.mul_vec3(Vec3::new(n[0], n[1], n[2]));
            self.norm.extend_from_slice(&[v.x, v.y, v.z]);
        }
        self.uv.extend_from_slice(&sub.uv);
        let flip = basis.determinant() < 0.0;
        self.idx.reserve(sub.idx.len());
        for tri in sub.idx.chunks_exact(3) {
            if flip {
                self.idx.extend_from_slice(&[
                    base + tri[0] as u32,
                    base + tri[2] as u32,
                    base + tri[1] as u32,
                ]);
            } else {
                self.idx.extend_from_slice(&[
                    base + tri[0] as u32,
                    base + tri[1] as u32,
                    base + tri[2] as u32,
                ]);
            }
        }
    }
}
