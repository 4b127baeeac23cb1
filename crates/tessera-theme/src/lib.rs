//! Theme content: configuration lookup table and piece geometry.
#![forbid(unsafe_code)]

pub mod config;
pub mod theme;
pub mod types;

pub use theme::Theme;
pub use types::{
    ConfigTransformGroup, Mirror, Piece, PieceId, PieceMesh, PieceTransform, PlacementEntry,
    SubmeshData, Tile, VariantPick,
};
