//! CPU tile meshing: lattice classification, placement resolution, and
//! mesh combination (engine-only).
#![forbid(unsafe_code)]

pub mod classify;
pub mod combine;
pub mod mesh_build;
pub mod placement;
pub mod tables;

pub use classify::{
    ClassifyMods, DirFlags, TileVariant, classify_flat_range, classify_solid_range, is_void_flat,
    is_void_solid,
};
pub use combine::{TileMesh, combine_instances, compact_instances};
pub use mesh_build::MeshBuild;
pub use placement::{CellPlacements, MeshInstance, resolve_placements_range};
