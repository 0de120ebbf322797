//! Indicator options

/// Options for an indicator pass
#[derive(Debug, Clone, Default)]
pub struct IndicatorOptions {
    /// Divide each indicator by the number of faces the region shares with other regions
    scale_by_flux_faces: bool,
    /// Number of worker threads. `None` uses the global pool.
    num_threads: Option<usize>,
}

impl IndicatorOptions {
    /// Set whether indicators are divided by the number of flux faces
    ///
    /// This keeps regions on the boundary from being penalised for having
    /// fewer neighbours than interior regions.
    pub fn set_scale_by_flux_faces(&mut self, scale: bool) {
        self.scale_by_flux_faces = scale;
    }

    /// Set the number of worker threads
    pub fn set_num_threads(&mut self, num_threads: Option<usize>) {
        self.num_threads = num_threads;
    }

    /// Whether indicators are divided by the number of flux faces
    pub fn scale_by_flux_faces(&self) -> bool {
        self.scale_by_flux_faces
    }

    /// Number of worker threads
    pub fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }
}
