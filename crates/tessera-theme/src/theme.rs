use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::config::{PlacementDef, SubmeshDef, ThemeConfig, VariantPickDef};
use crate::types::{
    ConfigTransformGroup, FLAT_CONFIG_COUNT, MAX_GROUP_PLACEMENTS, MAX_GROUP_PLACEMENTS_FLAT,
    MAX_SUBMESH_SLOTS, Mirror, Piece, PieceId, PieceMesh, PieceTransform, PlacementEntry,
    SubmeshData, VariantPick,
};

/// Compiled theme content: the configuration lookup table plus piece
/// geometry. Shared read-only (via `Arc`) with every mesher that retains it.
#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub name: String,
    groups: Vec<ConfigTransformGroup>,
    pieces: Vec<Piece>,
    by_name: HashMap<String, PieceId>,
    submesh_materials: Vec<String>,
    submesh_slots: usize,
}

impl Theme {
    /// Size of the configuration lookup table.
    #[inline]
    pub fn configuration_count(&self) -> usize {
        self.groups.len()
    }

    /// O(1) table lookup. Out-of-table configurations read as absent.
    #[inline]
    pub fn config_group(&self, configuration: u8) -> Option<&ConfigTransformGroup> {
        self.groups.get(configuration as usize)
    }

    /// Piece geometry for one variant slot, or `None` when the piece or the
    /// variant does not exist (callers degrade by omitting the instance).
    #[inline]
    pub fn piece_geometry(&self, piece: PieceId, variant: u8) -> Option<&PieceMesh> {
        self.pieces
            .get(piece.0 as usize)
            .and_then(|p| p.variants.get(variant as usize))
    }

    #[inline]
    pub fn variant_count(&self, piece: PieceId) -> usize {
        self.pieces
            .get(piece.0 as usize)
            .map(|p| p.variants.len())
            .unwrap_or(0)
    }

    pub fn piece_id(&self, name: &str) -> Option<PieceId> {
        self.by_name.get(name).copied()
    }

    /// Highest submesh slot count any piece variant occupies.
    #[inline]
    pub fn submesh_slots(&self) -> usize {
        self.submesh_slots
    }

    /// External material key for a submesh slot; opaque glue for renderers.
    pub fn submesh_material(&self, slot: usize) -> Option<&str> {
        self.submesh_materials.get(slot).map(|s| s.as_str())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: ThemeConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: ThemeConfig) -> Result<Self, Box<dyn Error>> {
        let mut theme = Theme {
            name: cfg.name,
            groups: Vec::new(),
            pieces: Vec::new(),
            by_name: HashMap::new(),
            submesh_materials: cfg.submesh_materials,
            submesh_slots: 0,
        };

        for def in cfg.pieces.into_iter() {
            if theme.by_name.contains_key(&def.name) {
                return Err(format!("duplicate piece name {:?}", def.name).into());
            }
            let id = PieceId(theme.pieces.len() as u16);
            let mut variants = Vec::with_capacity(def.variants.len());
            for (vi, var) in def.variants.into_iter().enumerate() {
                let mut mesh = PieceMesh::default();
                for sub in var.submeshes.into_iter() {
                    let slot = sub.slot;
                    if slot >= MAX_SUBMESH_SLOTS {
                        return Err(format!(
                            "piece {:?} variant {} uses submesh slot {} (max {})",
                            def.name,
                            vi,
                            slot,
                            MAX_SUBMESH_SLOTS - 1
                        )
                        .into());
                    }
                    let data = compile_submesh(&def.name, vi, sub)?;
                    if mesh.submeshes.len() <= slot {
                        mesh.submeshes.resize(slot + 1, SubmeshData::default());
                    }
                    mesh.submeshes[slot] = data;
                }
                theme.submesh_slots = theme.submesh_slots.max(mesh.submeshes.len());
                variants.push(mesh);
            }
            theme.by_name.insert(def.name.clone(), id);
            theme.pieces.push(Piece {
                id,
                name: def.name,
                variants,
            });
        }

        theme.groups = vec![ConfigTransformGroup::default(); cfg.configurations];
        // Flat-sized tables carry at most 2 placements per configuration,
        // solid-sized ones at most 4.
        let cap = if cfg.configurations <= FLAT_CONFIG_COUNT {
            MAX_GROUP_PLACEMENTS_FLAT
        } else {
            MAX_GROUP_PLACEMENTS
        };
        for conf in cfg.configs.into_iter() {
            let value = conf.value as usize;
            if value >= theme.groups.len() {
                return Err(format!(
                    "configuration value {} outside declared table size {}",
                    value,
                    theme.groups.len()
                )
                .into());
            }
            let mut entries = Vec::with_capacity(conf.placements.len());
            for p in conf.placements.into_iter() {
                entries.push(compile_placement(&theme.by_name, value, p)?);
            }
            if entries.len() > cap {
                log::warn!(
                    "configuration {} lists {} placements; truncating to {}",
                    value,
                    entries.len(),
                    cap
                );
                entries.truncate(cap);
            }
            theme.groups[value] = ConfigTransformGroup { entries };
        }

        Ok(theme)
    }
}

fn compile_placement(
    by_name: &HashMap<String, PieceId>,
    value: usize,
    def: PlacementDef,
) -> Result<PlacementEntry, Box<dyn Error>> {
    let piece = by_name
        .get(&def.piece)
        .copied()
        .ok_or_else(|| format!("configuration {} references unknown piece {:?}", value, def.piece))?;
    if def.rotation > 3 {
        log::warn!(
            "configuration {} placement rotation {} reduced modulo 4",
            value,
            def.rotation
        );
    }
    let mirror = match def.mirror.as_deref() {
        None => Mirror::None,
        Some(name) => Mirror::from_name(name)
            .ok_or_else(|| format!("configuration {} has unknown mirror {:?}", value, name))?,
    };
    let variant = match def.variant {
        None => VariantPick::Fixed(0),
        Some(VariantPickDef::Index(i)) => VariantPick::Fixed(i),
        Some(VariantPickDef::Named(s)) if s == "random" => VariantPick::Random,
        Some(VariantPickDef::Named(s)) => {
            return Err(format!("configuration {} has unknown variant pick {:?}", value, s).into());
        }
    };
    Ok(PlacementEntry {
        piece,
        transform: PieceTransform::new(def.rotation & 0b11, mirror),
        variant,
    })
}

fn compile_submesh(
    piece: &str,
    variant: usize,
    def: SubmeshDef,
) -> Result<SubmeshData, Box<dyn Error>> {
    let ctx = |what: &str| format!("piece {:?} variant {}: {}", piece, variant, what);
    if def.pos.len() % 3 != 0 {
        return Err(ctx("position buffer length is not a multiple of 3").into());
    }
    let verts = def.pos.len() / 3;
    if def.idx.len() % 3 != 0 {
        return Err(ctx("index buffer length is not a multiple of 3").into());
    }
    if let Some(&bad) = def.idx.iter().find(|&&i| (i as usize) >= verts) {
        return Err(ctx(&format!("index {} out of range ({} vertices)", bad, verts)).into());
    }
    let norm = if def.norm.is_empty() {
        derive_normals(&def.pos, &def.idx)
    } else if def.norm.len() == def.pos.len() {
        def.norm
    } else {
        return Err(ctx("normal buffer length does not match positions").into());
    };
    let uv = if def.uv.is_empty() {
        vec![0.0; verts * 2]
    } else if def.uv.len() == verts * 2 {
        def.uv
    } else {
        return Err(ctx("uv buffer length does not match positions").into());
    };
    Ok(SubmeshData {
        pos: def.pos,
        norm,
        uv,
        idx: def.idx,
    })
}

/// Area-weighted vertex normals for authored geometry that omits them.
fn derive_normals(pos: &[f32], idx: &[u16]) -> Vec<f32> {
    let mut norm = vec![0.0f32; pos.len()];
    for tri in idx.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize * 3, tri[1] as usize * 3, tri[2] as usize * 3);
        let e1 = [pos[b] - pos[a], pos[b + 1] - pos[a + 1], pos[b + 2] - pos[a + 2]];
        let e2 = [pos[c] - pos[a], pos[c + 1] - pos[a + 1], pos[c + 2] - pos[a + 2]];
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        for &v in &[a, b, c] {
            norm[v] += n[0];
            norm[v + 1] += n[1];
            norm[v + 2] += n[2];
        }
    }
    for v in norm.chunks_exact_mut(3) {
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        if len > 0.0 {
            v[0] /= len;
            v[1] /= len;
            v[2] /= len;
        }
    }
    norm
}
