use std::fmt;

/// A cell value in the input volume. The mesher matches cells against one
/// fill tile per generation pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Tile(pub u16);

impl Tile {
    pub const EMPTY: Tile = Tile(0);
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct PieceId(pub u16);

/// Table sizes required of a theme per dimensionality.
pub const FLAT_CONFIG_COUNT: usize = 16;
pub const SOLID_CONFIG_COUNT: usize = 256;

/// Placement list caps per configuration entry.
pub const MAX_GROUP_PLACEMENTS: usize = 4;
pub const MAX_GROUP_PLACEMENTS_FLAT: usize = 2;

/// Highest submesh slot a piece may occupy.
pub const MAX_SUBMESH_SLOTS: usize = 8;

/// The six axis-mirror cases a piece transform can request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mirror {
    #[default]
    None = 0,
    X = 1,
    Y = 2,
    Z = 3,
    Xz = 4,
    Xyz = 5,
}

impl Mirror {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn from_index(i: usize) -> Mirror {
        match i {
            1 => Mirror::X,
            2 => Mirror::Y,
            3 => Mirror::Z,
            4 => Mirror::Xz,
            5 => Mirror::Xyz,
            _ => Mirror::None,
        }
    }

    pub fn from_name(name: &str) -> Option<Mirror> {
        match name {
            "none" => Some(Mirror::None),
            "x" => Some(Mirror::X),
            "y" => Some(Mirror::Y),
            "z" => Some(Mirror::Z),
            "xz" => Some(Mirror::Xz),
            "xyz" => Some(Mirror::Xyz),
            _ => None,
        }
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mirror::None => "none",
            Mirror::X => "x",
            Mirror::Y => "y",
            Mirror::Z => "z",
            Mirror::Xz => "xz",
            Mirror::Xyz => "xyz",
        };
        f.write_str(s)
    }
}

/// Packed rigid-transform flags: bits 0-1 select one of 4 quarter-turn
/// rotations about +Y, bits 2-4 select one of the 6 mirror cases.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct PieceTransform(pub u8);

impl PieceTransform {
    pub const IDENTITY: PieceTransform = PieceTransform(0);

    #[inline]
    pub const fn new(rotation_steps: u8, mirror: Mirror) -> Self {
        PieceTransform((rotation_steps & 0b11) | ((mirror.index() as u8) << 2))
    }

    #[inline]
    pub const fn rotation_steps(self) -> u8 {
        self.0 & 0b11
    }

    #[inline]
    pub const fn mirror(self) -> Mirror {
        Mirror::from_index(((self.0 >> 2) & 0b111) as usize)
    }
}

/// How a placement chooses among a piece's variants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VariantPick {
    Fixed(u8),
    /// Resolved deterministically from the generation seed and cell index.
    Random,
}

impl Default for VariantPick {
    #[inline]
    fn default() -> Self {
        VariantPick::Fixed(0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlacementEntry {
    pub piece: PieceId,
    pub transform: PieceTransform,
    pub variant: VariantPick,
}

/// Ordered placements for one configuration value. Empty means the
/// configuration renders nothing.
#[derive(Clone, Debug, Default)]
pub struct ConfigTransformGroup {
    pub entries: Vec<PlacementEntry>,
}

impl ConfigTransformGroup {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Flat geometry buffers for one submesh slot of a piece variant.
#[derive(Clone, Debug, Default)]
pub struct SubmeshData {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u16>,
}

impl SubmeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty() || self.idx.is_empty()
    }
}

/// One piece variant, partitioned by submesh slot. A variant with no
/// submeshes is legitimate (sparse variant tables render nothing there).
#[derive(Clone, Debug, Default)]
pub struct PieceMesh {
    pub submeshes: Vec<SubmeshData>,
}

#[derive(Clone, Debug)]
pub struct Piece {
    pub id: PieceId,
    pub name: String,
    pub variants: Vec<PieceMesh>,
}
