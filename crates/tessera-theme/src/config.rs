use serde::Deserialize;

/// On-disk theme description. Loaded with `toml` and compiled into a
/// `Theme` by `theme::Theme::from_config`.
#[derive(Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    /// Declared configuration-table size (16 for flat themes, 256 for solid).
    pub configurations: usize,
    /// External material key per submesh slot; opaque to the mesher.
    #[serde(default)]
    pub submesh_materials: Vec<String>,
    #[serde(default, rename = "piece")]
    pub pieces: Vec<PieceDef>,
    #[serde(default, rename = "config")]
    pub configs: Vec<ConfigDef>,
}

#[derive(Deserialize)]
pub struct PieceDef {
    pub name: String,
    #[serde(default, rename = "variant")]
    pub variants: Vec<VariantDef>,
}

#[derive(Deserialize)]
pub struct VariantDef {
    #[serde(default, rename = "submesh")]
    pub submeshes: Vec<SubmeshDef>,
}

#[derive(Deserialize)]
pub struct SubmeshDef {
    pub slot: usize,
    pub pos: Vec<f32>,
    /// Optional; vertex normals are derived from triangles when omitted.
    #[serde(default)]
    pub norm: Vec<f32>,
    /// Optional; zero-filled when omitted.
    #[serde(default)]
    pub uv: Vec<f32>,
    pub idx: Vec<u16>,
}

#[derive(Deserialize)]
pub struct ConfigDef {
    pub value: u8,
    #[serde(default, rename = "placement")]
    pub placements: Vec<PlacementDef>,
}

#[derive(Deserialize)]
pub struct PlacementDef {
    pub piece: String,
    #[serde(default)]
    pub rotation: u8,
    #[serde(default)]
    pub mirror: Option<String>,
    #[serde(default)]
    pub variant: Option<VariantPickDef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum VariantPickDef {
    Index(u8),
    Named(String),
}
