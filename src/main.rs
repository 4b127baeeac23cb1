//! Demo driver: synthesizes a tile volume from noise, runs the tile mesher,
//! and exports the combined mesh as Wavefront OBJ.

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fastnoise_lite::{FastNoiseLite, NoiseType};
use tessera_geom::Vec3;
use tessera_mesh_cpu::{DirFlags, TileMesh};
use tessera_runtime::{
    Dimensionality, GenerationMode, MeshBuilder, Runtime, TileMesher, TileMesherSettings,
};
use tessera_theme::{Theme, Tile};
use tessera_volume::Volume;

#[derive(Parser, Debug)]
#[command(name = "tessera", about = "Tile mesh generation demo driver")]
struct Args {
    /// Theme TOML describing the configuration table and piece geometry
    #[arg(long)]
    theme: PathBuf,

    /// Output Wavefront OBJ path
    #[arg(long, default_value = "tessera.obj")]
    out: PathBuf,

    #[arg(long, default_value_t = 24)]
    size_x: usize,
    #[arg(long, default_value_t = 12)]
    size_y: usize,
    #[arg(long, default_value_t = 24)]
    size_z: usize,

    /// Mesh a single height level as a flat lattice instead of the full volume
    #[arg(long)]
    flat_level: Option<usize>,

    /// Tile value to fill and mesh
    #[arg(long, default_value_t = 1)]
    fill: u16,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Density threshold in [-1, 1]; higher carves more empty space
    #[arg(long, default_value_t = 0.0)]
    threshold: f32,

    #[arg(long, default_value_t = 0.07)]
    frequency: f32,

    #[arg(long, default_value_t = 1.0)]
    cell_x: f32,
    #[arg(long, default_value_t = 1.0)]
    cell_y: f32,
    #[arg(long, default_value_t = 1.0)]
    cell_z: f32,

    /// Treat volume edges as if the terrain continued past them
    #[arg(long)]
    filled_boundaries: bool,

    /// Cull lattice vertices that are fully open on an axis
    #[arg(long)]
    skip_open: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let theme = Arc::new(Theme::load_from_path(&args.theme)?);
    log::info!(
        "theme {:?}: {} configurations, {} submesh slots",
        theme.name,
        theme.configuration_count(),
        theme.submesh_slots()
    );

    let dimensionality = match args.flat_level {
        Some(level) => Dimensionality::Flat { level },
        None => Dimensionality::Solid,
    };
    let settings = TileMesherSettings {
        size: (args.size_x, args.size_y, args.size_z),
        fill: Tile(args.fill),
        cell_size: Vec3::new(args.cell_x, args.cell_y, args.cell_z),
        dimensionality,
        skip_directions: if args.skip_open {
            DirFlags::all()
        } else {
            DirFlags::empty()
        },
        skip_directions_with_borders: DirFlags::empty(),
        filled_boundaries: if args.filled_boundaries {
            DirFlags::all()
        } else {
            DirFlags::empty()
        },
        mode: GenerationMode::Uncached,
        seed: args.seed,
    };

    let runtime = Arc::new(Runtime::new());
    let mut mesher = TileMesher::new(runtime);
    mesher.init(theme.clone(), settings)?;

    if let Some(volume) = mesher.volume_mut() {
        fill_demo_volume(
            volume,
            Tile(args.fill),
            args.seed,
            args.frequency,
            args.threshold,
        );
    }

    mesher.start_generation();
    mesher.end_generation();
    let Some(mesh) = mesher.take_mesh() else {
        return Err("generation produced no mesh".into());
    };

    for (slot, sub) in mesh.submeshes.iter().enumerate() {
        log::info!(
            "submesh {} ({}): {} vertices, {} triangles",
            slot,
            theme.submesh_material(slot).unwrap_or("unnamed"),
            sub.vertex_count(),
            sub.triangle_count()
        );
    }
    log::info!(
        "total: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    write_obj(&args.out, &theme, &mesh)?;
    log::info!("wrote {}", args.out.display());
    mesher.dispose();
    Ok(())
}

/// Fills the volume with a noise-carved terrain: solid where the density
/// clears the threshold, biased so the bottom of the box tends solid.
fn fill_demo_volume(
    volume: &mut Volume<Tile>,
    fill: Tile,
    seed: u64,
    frequency: f32,
    threshold: f32,
) {
    let mut noise = FastNoiseLite::with_seed(seed as i32);
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(frequency));
    let e = volume.extents();
    for y in 0..e.y() {
        // Height bias in [-1, 1]: bottom rows tend solid, top rows air.
        let bias = 1.0 - 2.0 * (y as f32 + 0.5) / e.y() as f32;
        for z in 0..e.z() {
            for x in 0..e.x() {
                let n = noise.get_noise_3d(x as f32, y as f32, z as f32);
                if n + bias > threshold {
                    volume.set(x, y, z, fill);
                }
            }
        }
    }
}

fn write_obj(path: &PathBuf, theme: &Theme, mesh: &TileMesh) -> Result<(), Box<dyn Error>> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "# tessera tile mesh")?;
    let mut vertex_base = 1usize;
    for (slot, sub) in mesh.submeshes.iter().enumerate() {
        if sub.is_empty() {
            continue;
        }
        writeln!(w, "g submesh_{slot}")?;
        if let Some(material) = theme.submesh_material(slot) {
            writeln!(w, "usemtl {material}")?;
        }
        for p in sub.pos.chunks_exact(3) {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
        }
        for n in sub.norm.chunks_exact(3) {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        for t in sub.uv.chunks_exact(2) {
            writeln!(w, "vt {} {}", t[0], t[1])?;
        }
        for tri in sub.idx.chunks_exact(3) {
            let (a, b, c) = (
                vertex_base + tri[0] as usize,
                vertex_base + tri[1] as usize,
                vertex_base + tri[2] as usize,
            );
            writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        vertex_base += sub.vertex_count();
    }
    Ok(())
}
