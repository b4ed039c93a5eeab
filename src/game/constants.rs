/// Geometry constants
pub mod geo {
    /// Mean earth radius in meters (spherical model)
    pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
}

/// Scoring rule constants
pub mod scoring {
    /// Decay rate applied when a contest selects decaying scoring without
    /// specifying one (altitude units per second)
    pub const DEFAULT_DECAY_RATE: f64 = 1.0;
    /// `valid_since` of a zone that has never been claimed
    pub const UNCLAIMED_SINCE: f64 = 0.0;
    /// Floor of the threshold reported by the live status query
    pub const MIN_REPORTED_THRESHOLD: f64 = 0.0;
}

/// Contest lifecycle constants
pub mod contest {
    /// Contest length used when a contest is created without an end time
    pub const DEFAULT_DURATION_SECS: f64 = 3.0 * 3600.0;
}

/// Service constants
pub mod net {
    /// Default HTTP port
    pub const DEFAULT_PORT: u16 = 8080;
    /// Default maximum accepted request body (4 MiB)
    pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
    /// Smallest configurable body limit
    pub const MIN_BODY_BYTES: usize = 1024;
    /// Largest configurable body limit (64 MiB)
    pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;
}

/// Metrics constants
pub mod metrics {
    /// Rolling window of compute-time samples kept for percentiles
    pub const TIMING_WINDOW: usize = 1000;
    /// Samples required before percentiles are published
    pub const MIN_PERCENTILE_SAMPLES: usize = 10;
}
