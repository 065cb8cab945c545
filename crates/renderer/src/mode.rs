/// Which visual the animated surface is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceMode {
    #[default]
    Rendering,
    Fallback,
}

/// Why the surface gave up on the wave planes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderFailure {
    /// The GPU context or wave pipeline could not be created.
    #[error("render surface failed to initialise: {0}")]
    Initialization(String),
    /// A frame update raised an error.
    #[error("render surface failed mid-frame: {0}")]
    Frame(String),
    /// The caller asked to start degraded.
    #[error("fallback forced by configuration")]
    Forced,
}

/// One-way switch from [`SurfaceMode::Rendering`] to [`SurfaceMode::Fallback`].
///
/// Once tripped it stays tripped for the lifetime of the latch; repeated
/// failures are ignored instead of toggling modes.
#[derive(Debug, Default)]
pub struct ModeLatch {
    failure: Option<RenderFailure>,
}

impl ModeLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SurfaceMode {
        if self.failure.is_some() {
            SurfaceMode::Fallback
        } else {
            SurfaceMode::Rendering
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        self.failure.as_ref()
    }

    /// Records `failure` and switches to fallback. Returns `true` only for the
    /// call that performed the transition.
    pub fn trip(&mut self, failure: RenderFailure) -> bool {
        if self.failure.is_some() {
            tracing::debug!(%failure, "render surface already in fallback; ignoring");
            return false;
        }
        tracing::error!(%failure, "switching animated background to gradient fallback");
        self.failure = Some(failure);
        true
    }
}
