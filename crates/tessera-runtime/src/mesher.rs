use std::error::Error;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use tessera_geom::Vec3;
use tessera_mesh_cpu::{DirFlags, TileMesh, TileVariant};
use tessera_theme::{Theme, Tile};
use tessera_volume::{Extents, Volume};

use crate::builder::{BuilderState, MeshBuilder};
use crate::{Runtime, TileBuildJob, TileJobOut, required_configurations};

/// Which lattice the mesher classifies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dimensionality {
    /// Single-level 4-bit classification at the given height.
    Flat { level: usize },
    /// Full 8-bit corner classification.
    Solid,
}

/// Whether classification survives between generation cycles.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GenerationMode {
    /// Reclassify every cycle; cheapest on memory.
    #[default]
    Uncached,
    /// Keep the `TileVariant` buffer so callers can inject variation into
    /// cached slots before re-meshing.
    Cached,
}

#[derive(Clone, Copy, Debug)]
pub struct TileMesherSettings {
    /// Requested cell dimensions; clamped per axis at init.
    pub size: (usize, usize, usize),
    /// Tile value the classifier matches against.
    pub fill: Tile,
    pub cell_size: Vec3,
    pub dimensionality: Dimensionality,
    pub skip_directions: DirFlags,
    pub skip_directions_with_borders: DirFlags,
    pub filled_boundaries: DirFlags,
    pub mode: GenerationMode,
    pub seed: u64,
}

impl Default for TileMesherSettings {
    fn default() -> Self {
        Self {
            size: (16, 16, 16),
            fill: Tile(1),
            cell_size: Vec3::ONE,
            dimensionality: Dimensionality::Solid,
            skip_directions: DirFlags::empty(),
            skip_directions_with_borders: DirFlags::empty(),
            filled_boundaries: DirFlags::empty(),
            mode: GenerationMode::default(),
            seed: 0,
        }
    }
}

/// Configuration-driven tile mesher. Owns its tile volume between cycles;
/// during a cycle the volume travels through the job and comes back with the
/// result, so mutation mid-generation is impossible by construction.
pub struct TileMesher {
    state: BuilderState,
    runtime: Arc<Runtime>,
    settings: TileMesherSettings,
    theme: Option<Arc<Theme>>,
    tiles: Option<Volume<Tile>>,
    variants: Option<Volume<TileVariant>>,
    mesh: Option<TileMesh>,
    pending: Option<Receiver<TileJobOut>>,
    next_job_id: u64,
}

impl TileMesher {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self {
            state: BuilderState::Uninitialized,
            runtime,
            settings: TileMesherSettings::default(),
            theme: None,
            tiles: None,
            variants: None,
            mesh: None,
            pending: None,
            next_job_id: 1,
        }
    }

    /// Validates settings against the theme, allocates (or reuses) the tile
    /// volume, retains the theme, and transitions to `Initialized`. On any
    /// validation failure the builder stays `Uninitialized` apart from an
    /// already-initialized builder keeping its previous configuration.
    pub fn init(
        &mut self,
        theme: Arc<Theme>,
        settings: TileMesherSettings,
    ) -> Result<(), Box<dyn Error>> {
        if self.state == BuilderState::Generating {
            log::error!("init rejected: generation in progress");
            return Err("init while generating".into());
        }
        let required = required_configurations(settings.dimensionality);
        if theme.configuration_count() < required {
            log::error!(
                "theme {:?} has {} configuration entries; {} required",
                theme.name,
                theme.configuration_count(),
                required
            );
            return Err(format!(
                "theme configuration table too small ({} < {})",
                theme.configuration_count(),
                required
            )
            .into());
        }
        let cs = settings.cell_size;
        if !(cs.x.is_finite() && cs.y.is_finite() && cs.z.is_finite())
            || cs.x <= 0.0
            || cs.y <= 0.0
            || cs.z <= 0.0
        {
            log::error!("degenerate cell size {:?}", cs);
            return Err("cell size must be finite and positive per axis".into());
        }

        let extents = Extents::clamped(settings.size.0, settings.size.1, settings.size.2);
        if let Dimensionality::Flat { level } = settings.dimensionality {
            if level >= extents.y() {
                log::warn!(
                    "flat level {} is outside the volume height {}; classification will see empty cells",
                    level,
                    extents.y()
                );
            }
        }

        match self.tiles.as_ref() {
            Some(existing) if existing.extents() == extents => {}
            _ => self.tiles = Some(Volume::filled(extents, Tile::EMPTY)),
        }
        // A cached classification buffer only survives re-init when the
        // inputs it was derived from are unchanged.
        let lattice = match settings.dimensionality {
            Dimensionality::Flat { .. } => extents.lattice_flat(),
            Dimensionality::Solid => extents.lattice_solid(),
        };
        let cache_still_valid = settings.mode == GenerationMode::Cached
            && settings.fill == self.settings.fill
            && settings.dimensionality == self.settings.dimensionality
            && self.variants.as_ref().is_some_and(|v| v.extents() == lattice);
        if !cache_still_valid {
            self.variants = None;
        }
        self.mesh = None;
        self.theme = Some(theme);
        self.settings = settings;
        self.state = BuilderState::Initialized;
        Ok(())
    }

    /// The combined mesh of the last completed cycle. Stale while
    /// `Generating`; callers poll `is_generating` first.
    #[inline]
    pub fn mesh(&self) -> Option<&TileMesh> {
        self.mesh.as_ref()
    }

    /// Takes ownership of the last combined mesh.
    pub fn take_mesh(&mut self) -> Option<TileMesh> {
        self.mesh.take()
    }

    #[inline]
    pub fn settings(&self) -> &TileMesherSettings {
        &self.settings
    }

    #[inline]
    pub fn volume(&self) -> Option<&Volume<Tile>> {
        self.tiles.as_ref()
    }

    /// Mutable access to the tile volume. `None` while a generation is in
    /// flight (the volume travels with the job).
    #[inline]
    pub fn volume_mut(&mut self) -> Option<&mut Volume<Tile>> {
        self.tiles.as_mut()
    }

    /// Cached-mode classification buffer between cycles; `None` while
    /// generating, in uncached mode, or before the first cached cycle.
    #[inline]
    pub fn tile_variants_mut(&mut self) -> Option<&mut Volume<TileVariant>> {
        self.variants.as_mut()
    }
}

impl MeshBuilder for TileMesher {
    #[inline]
    fn state(&self) -> BuilderState {
        self.state
    }

    fn start_generation(&mut self) {
        if self.state != BuilderState::Initialized {
            log::error!("start_generation ignored: builder is {:?}", self.state);
            return;
        }
        let Some(theme) = self.theme.clone() else {
            log::error!("start_generation ignored: no theme retained");
            return;
        };
        let Some(tiles) = self.tiles.take() else {
            log::error!("start_generation ignored: no tile volume");
            return;
        };
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        let variants = match self.settings.mode {
            GenerationMode::Cached => self.variants.take(),
            GenerationMode::Uncached => None,
        };
        let job = TileBuildJob {
            job_id,
            tiles,
            theme,
            settings: self.settings,
            variants,
        };
        self.pending = Some(self.runtime.submit_tile_job(job));
        self.state = BuilderState::Generating;
    }

    fn end_generation(&mut self) {
        if self.state != BuilderState::Generating {
            log::warn!("end_generation ignored: builder is {:?}", self.state);
            return;
        }
        let Some(rx) = self.pending.take() else {
            log::error!("generating state without a pending job; resetting");
            self.state = BuilderState::Uninitialized;
            return;
        };
        match rx.recv() {
            Ok(out) => {
                self.tiles = Some(out.tiles);
                self.variants = out.variants;
                self.mesh = Some(out.mesh);
                self.state = BuilderState::Initialized;
            }
            Err(_) => {
                // The worker dropped without a result; the volume went with
                // it, so the builder cannot return to Initialized.
                log::error!("generation worker dropped without a result");
                self.theme = None;
                self.variants = None;
                self.mesh = None;
                self.state = BuilderState::Uninitialized;
            }
        }
    }

    fn dispose(&mut self) {
        if let Some(rx) = self.pending.take() {
            let _ = rx.recv();
        }
        self.tiles = None;
        self.variants = None;
        self.mesh = None;
        self.theme = None;
        self.state = BuilderState::Uninitialized;
    }
}
