use crate::error::ConfigError;

/// Upper bound on output samples for one run (a little over 46 hours at 60 fps).
pub const MAX_FRAMES: usize = 10_000_000;

/// Output sample instants: `floor(t_max * fps) + 1` points spread evenly
/// over `[0, t_max]`, both ends included.
///
/// This is the contract between solver and renderer: one state per instant,
/// in order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    pub fn new(t_max: f64, fps: f64) -> Result<Self, ConfigError> {
        if !(t_max.is_finite() && t_max >= 0.0) {
            return Err(ConfigError::InvalidDuration(t_max));
        }
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ConfigError::InvalidFrameRate(fps));
        }

        let n = Self::frame_count(t_max, fps)?;
        let times = if n == 1 {
            vec![0.0]
        } else {
            let step = t_max / (n - 1) as f64;
            let mut times: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
            // Pin the endpoint so the last sample lands on t_max exactly.
            times[n - 1] = t_max;
            times
        };

        Ok(Self { times })
    }

    /// Number of samples for `t_max` seconds at `fps`, or `TooManyFrames`
    /// when that exceeds [`MAX_FRAMES`].
    pub fn frame_count(t_max: f64, fps: f64) -> Result<usize, ConfigError> {
        let intervals = (t_max * fps).floor();
        if !(intervals < MAX_FRAMES as f64) {
            return Err(ConfigError::TooManyFrames { t_max, fps });
        }
        (intervals as usize)
            .checked_add(1)
            .ok_or(ConfigError::TooManyFrames { t_max, fps })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn t_max(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}
