use crate::error::ConfigError;
use crate::sim::grid::TimeGrid;

// ---------------------------------------------------------------------------
// Error control for the adaptive integrator
// ---------------------------------------------------------------------------

/// Per-component error bounds. A step is accepted when the RMS of
/// `err_i / (atol + |y_i| * rtol)` is below one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub rtol: f64,
    pub atol: f64,
    /// Hard cap on accepted steps; `None` integrates until done or breakdown.
    pub max_steps: Option<usize>,
}

impl Tolerances {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol, max_steps: None }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("rtol", self.rtol), ("atol", self.atol)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-3, 1e-6)
    }
}

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub t_max: f64, // s, simulated duration
    pub fps: f64,   // output samples per simulated second
    pub tolerances: Tolerances,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.t_max.is_finite() && self.t_max >= 0.0) {
            return Err(ConfigError::InvalidDuration(self.t_max));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ConfigError::InvalidFrameRate(self.fps));
        }
        TimeGrid::frame_count(self.t_max, self.fps)?;
        self.tolerances.validate()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            t_max: 111.0,
            fps: 60.0,
            tolerances: Tolerances::default(),
        }
    }
}
