/// Lifecycle states shared by every mesh generator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BuilderState {
    #[default]
    Uninitialized,
    Initialized,
    Generating,
}

/// Two-phase generation contract shared by all mesh builders: scheduling
/// never blocks, completing is the sole blocking point, and disposing is
/// valid from any state. Concrete generators supply only their task graph
/// and finalization; the protocol itself is uniform.
///
/// Out-of-sequence calls are diagnostics plus no-ops, never panics: the
/// caller's state machine stays wherever it was.
pub trait MeshBuilder {
    fn state(&self) -> BuilderState;

    /// Schedules the generation task graph and returns immediately.
    /// Requires `Initialized`.
    fn start_generation(&mut self);

    /// Blocks until the scheduled graph completes, installs the output mesh,
    /// and releases per-cycle temporaries. Requires `Generating`.
    fn end_generation(&mut self);

    /// Releases all owned resources from any state. Idempotent; an in-flight
    /// generation is drained first.
    fn dispose(&mut self);

    #[inline]
    fn is_generating(&self) -> bool {
        self.state() == BuilderState::Generating
    }
}
