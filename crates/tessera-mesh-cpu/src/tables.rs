//! Fixed basis tables for piece transforms.
//!
//! Exactly 4 quarter-turn rotations about +Y and 6 axis-mirror cases exist;
//! both resolve through constant lookups. No trigonometry runs at placement
//! time.

use tessera_geom::Mat3;
use tessera_theme::PieceTransform;

/// Quarter-turn rotations about +Y, indexed by `PieceTransform::rotation_steps`.
pub const ROTATION_BASIS: [Mat3; 4] = [
    Mat3::IDENTITY,
    // 90 degrees
    Mat3::from_rows([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]),
    // 180 degrees
    Mat3::from_rows([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
    // 270 degrees
    Mat3::from_rows([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
];

/// Mirror scale matrices, indexed by `Mirror::index`.
pub const MIRROR_BASIS: [Mat3; 6] = [
    Mat3::IDENTITY,
    Mat3::from_diagonal(-1.0, 1.0, 1.0),
    Mat3::from_diagonal(1.0, -1.0, 1.0),
    Mat3::from_diagonal(1.0, 1.0, -1.0),
    Mat3::from_diagonal(-1.0, 1.0, -1.0),
    Mat3::from_diagonal(-1.0, -1.0, -1.0),
];

/// Composed placement basis: mirror applied after rotation.
#[inline]
pub fn basis_for(transform: PieceTransform) -> Mat3 {
    let rot = ROTATION_BASIS[transform.rotation_steps() as usize];
    let mirror = MIRROR_BASIS[transform.mirror().index()];
    mirror.mul(&rot)
}
