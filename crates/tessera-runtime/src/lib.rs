//! Generation runtime: worker pool, job orchestration, and the builder
//! lifecycle shared by mesh generators.
#![forbid(unsafe_code)]

mod builder;
mod mesher;

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, bounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tessera_mesh_cpu::{
    CellPlacements, ClassifyMods, TileMesh, TileVariant, classify_flat_range, classify_solid_range,
    combine_instances, compact_instances, resolve_placements_range,
};
use tessera_theme::types::{FLAT_CONFIG_COUNT, SOLID_CONFIG_COUNT};
use tessera_theme::{Theme, Tile};
use tessera_volume::Volume;

pub use builder::{BuilderState, MeshBuilder};
pub use mesher::{Dimensionality, GenerationMode, TileMesher, TileMesherSettings};

/// Lattice vertices handled per parallel batch task.
const BATCH: usize = 2048;

/// Snapshot of everything one generation cycle reads. The tile volume moves
/// in and comes back in the matching [`TileJobOut`], so the builder cannot
/// touch it mid-flight.
pub struct TileBuildJob {
    pub job_id: u64,
    pub tiles: Volume<Tile>,
    pub theme: Arc<Theme>,
    pub settings: TileMesherSettings,
    /// Cached-mode classification buffer from a prior cycle; when present
    /// and still lattice-compatible the classification stage is skipped.
    pub variants: Option<Volume<TileVariant>>,
}

/// Terminal message of a tile job's task graph.
pub struct TileJobOut {
    pub job_id: u64,
    pub mesh: TileMesh,
    pub tiles: Volume<Tile>,
    pub variants: Option<Volume<TileVariant>>,
    pub instance_count: usize,
    pub t_classify_ms: u32,
    pub t_place_ms: u32,
    pub t_combine_ms: u32,
}

#[inline]
fn ms_since(t: Instant) -> u32 {
    t.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

/// Shared worker pool. One per process region; builders hold it by `Arc` and
/// submit whole generation cycles as single coordinator tasks that fan the
/// parallel stages out over the same pool.
pub struct Runtime {
    pool: ThreadPool,
    workers: usize,
}

impl Runtime {
    pub fn new() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tessera-mesh-{i}"))
            .build()
            .expect("mesh pool");
        Self { pool, workers }
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Enqueues one generation cycle and returns its completion handle.
    /// Never blocks; the receiver yields exactly one [`TileJobOut`].
    pub fn submit_tile_job(&self, job: TileBuildJob) -> Receiver<TileJobOut> {
        let (tx, rx) = bounded::<TileJobOut>(1);
        self.pool.spawn(move || {
            let out = run_tile_job(job);
            let _ = tx.send(out);
        });
        rx
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes the staged task graph of one tile job on the current pool:
/// classification and placement fan out over disjoint index batches, then
/// compaction and combination run sequentially. Stage boundaries are hard
/// dependency edges.
fn run_tile_job(job: TileBuildJob) -> TileJobOut {
    let TileBuildJob {
        job_id,
        tiles,
        theme,
        settings,
        variants,
    } = job;

    let (flat, flat_level) = match settings.dimensionality {
        Dimensionality::Flat { level } => (true, level),
        Dimensionality::Solid => (false, 0),
    };
    let lattice = if flat {
        tiles.extents().lattice_flat()
    } else {
        tiles.extents().lattice_solid()
    };

    let (mut vars, reuse) = match variants {
        Some(v) if v.extents() == lattice => (v, true),
        Some(_) => {
            log::warn!(
                "cached classification buffer no longer matches the lattice; reclassifying"
            );
            (Volume::filled(lattice, TileVariant::default()), false)
        }
        None => (Volume::filled(lattice, TileVariant::default()), false),
    };

    let t0 = Instant::now();
    if !reuse {
        let mods = ClassifyMods {
            filled_boundaries: settings.filled_boundaries,
            skip_directions: settings.skip_directions,
            skip_directions_with_borders: settings.skip_directions_with_borders,
        };
        let tiles_ref = &tiles;
        let slice = vars.as_mut_slice();
        rayon::scope(|s| {
            let mut first = 0usize;
            for chunk in slice.chunks_mut(BATCH) {
                let start = first;
                first += chunk.len();
                s.spawn(move |_| {
                    if flat {
                        classify_flat_range(tiles_ref, settings.fill, flat_level, start, chunk);
                    } else {
                        classify_solid_range(tiles_ref, settings.fill, &mods, start, chunk);
                    }
                });
            }
        });
    }
    let t_classify_ms = ms_since(t0);

    let t0 = Instant::now();
    let mut cells = vec![CellPlacements::default(); lattice.len()];
    {
        let theme_ref = theme.as_ref();
        let vars_slice: &[TileVariant] = vars.as_slice();
        rayon::scope(|s| {
            let mut first = 0usize;
            for chunk in cells.chunks_mut(BATCH) {
                let start = first;
                first += chunk.len();
                s.spawn(move |_| {
                    resolve_placements_range(
                        theme_ref,
                        vars_slice,
                        lattice,
                        flat,
                        flat_level,
                        settings.cell_size,
                        settings.seed,
                        start,
                        chunk,
                    );
                });
            }
        });
    }
    let t_place_ms = ms_since(t0);

    let t0 = Instant::now();
    let instances = compact_instances(&cells);
    drop(cells);
    let mesh = combine_instances(&theme, &instances);
    let t_combine_ms = ms_since(t0);

    log::info!(
        target: "perf",
        "ms_classify={} ms_place={} ms_combine={} lattice={} instances={} job_id={:#x}",
        t_classify_ms,
        t_place_ms,
        t_combine_ms,
        lattice.len(),
        instances.len(),
        job_id
    );

    let keep_variants = matches!(settings.mode, GenerationMode::Cached);
    TileJobOut {
        job_id,
        mesh,
        tiles,
        variants: keep_variants.then_some(vars),
        instance_count: instances.len(),
        t_classify_ms,
        t_place_ms,
        t_combine_ms,
    }
}

/// Required configuration-table size for a dimensionality.
#[inline]
pub fn required_configurations(dimensionality: Dimensionality) -> usize {
    match dimensionality {
        Dimensionality::Flat { .. } => FLAT_CONFIG_COUNT,
        Dimensionality::Solid => SOLID_CONFIG_COUNT,
    }
}
