//! Scenario files describing a single pendulum run.
//!
//! Every field is optional and falls back to the reference run, so an empty
//! document is a valid scenario. A complete file looks like:
//!
//! ```yaml
//! physics:
//!   g: 9.8
//!   l1: 1.0
//!   l2: 1.5
//!   m1: 2.0
//!   m2: 2.0
//!
//! initial:               # radians and rad/s
//!   theta1: 1.0471975511965976
//!   theta2: 1.1471975511965976
//!   omega1: 0.5
//!   omega2: 0.5
//!
//! simulation:
//!   t_max: 111.0         # s
//!   fps: 60.0
//!   tolerances:
//!     rtol: 1.0e-3
//!     atol: 1.0e-6
//!     max_steps: ~       # optional step budget
//!
//! output:
//!   dir: "output"
//!   name: "chaotic_pendulum"
//!   video: true
//!   csv: true
//!   summary: true
//!   width: 720
//!   height: 720
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dynamics::state::{reference_initial_state, state, validate_state, PendulumParams, StateVector};
use crate::error::{ConfigError, ScenarioError};
use crate::sim::config::{SimConfig, Tolerances};

/// Gravity, arm lengths and masses.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    pub g: f64,
    pub l1: f64,
    pub l2: f64,
    pub m1: f64,
    pub m2: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let p = PendulumParams::default();
        Self { g: p.g, l1: p.l1, l2: p.l2, m1: p.m1, m2: p.m2 }
    }
}

/// Initial arm angles (rad) and angular velocities (rad/s).
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct InitialConfig {
    pub theta1: f64,
    pub theta2: f64,
    pub omega1: f64,
    pub omega2: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        let y = reference_initial_state();
        Self { theta1: y[0], theta2: y[1], omega1: y[2], omega2: y[3] }
    }
}

/// Integrator error bounds.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct TolerancesConfig {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: Option<usize>,
}

impl Default for TolerancesConfig {
    fn default() -> Self {
        let t = Tolerances::default();
        Self { rtol: t.rtol, atol: t.atol, max_steps: t.max_steps }
    }
}

/// Duration, frame rate and error control.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub t_max: f64,
    pub fps: f64,
    pub tolerances: TolerancesConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let c = SimConfig::default();
        Self { t_max: c.t_max, fps: c.fps, tolerances: TolerancesConfig::default() }
    }
}

/// Which artifacts to write and where.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub name: String,
    pub video: bool,
    pub csv: bool,
    pub summary: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            name: "chaotic_pendulum".into(),
            video: true,
            csv: true,
            summary: true,
            width: 720,
            height: 720,
        }
    }
}

impl OutputConfig {
    pub fn video_path(&self) -> PathBuf {
        self.dir.join(format!("{}.mp4", self.name))
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.dir.join(format!("{}_frames", self.name))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.name))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }
}

/// Top-level scenario document.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub physics: PhysicsConfig,
    pub initial: InitialConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

impl Scenario {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not an empty mapping.
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(s)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_yaml_str(&text)?)
    }

    pub fn params(&self) -> PendulumParams {
        let p = &self.physics;
        PendulumParams { g: p.g, l1: p.l1, l2: p.l2, m1: p.m1, m2: p.m2 }
    }

    pub fn initial_state(&self) -> StateVector {
        let i = &self.initial;
        state(i.theta1, i.theta2, i.omega1, i.omega2)
    }

    pub fn sim_config(&self) -> SimConfig {
        let s = &self.simulation;
        SimConfig {
            t_max: s.t_max,
            fps: s.fps,
            tolerances: Tolerances {
                rtol: s.tolerances.rtol,
                atol: s.tolerances.atol,
                max_steps: s.tolerances.max_steps,
            },
        }
    }

    /// Check everything the run depends on before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params().validate()?;
        validate_state(&self.initial_state())?;
        self.sim_config().validate()?;
        let (width, height) = (self.output.width, self.output.height);
        // yuv420p subsamples chroma 2x2, so x264 needs even dimensions.
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(ConfigError::InvalidFrameSize { width, height });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_reference_run() {
        let s = Scenario::from_yaml_str("").unwrap();
        assert_eq!(s.params(), PendulumParams::default());
        assert_eq!(s.initial_state(), reference_initial_state());
        assert_eq!(s.sim_config(), SimConfig::default());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let yaml = "
physics:
  m1: 1.0
simulation:
  t_max: 5.0
  tolerances:
    rtol: 1.0e-8
";
        let s = Scenario::from_yaml_str(yaml).unwrap();
        assert_eq!(s.params().m1, 1.0);
        assert_eq!(s.params().m2, 2.0);
        assert_eq!(s.sim_config().t_max, 5.0);
        assert_eq!(s.sim_config().fps, 60.0);
        assert_eq!(s.sim_config().tolerances.rtol, 1e-8);
        assert_eq!(s.sim_config().tolerances.atol, 1e-6);
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(Scenario::from_yaml_str("physics:\n  mass: 3.0\n").is_err());
    }

    #[test]
    fn negative_mass_fails_validation() {
        let s = Scenario::from_yaml_str("physics:\n  m2: -2.0\n").unwrap();
        assert!(matches!(s.validate(), Err(ConfigError::Param(_))));
    }

    #[test]
    fn zero_frame_size_fails_validation() {
        let s = Scenario::from_yaml_str("output:\n  width: 0\n").unwrap();
        assert!(matches!(s.validate(), Err(ConfigError::InvalidFrameSize { .. })));
    }

    #[test]
    fn odd_frame_size_fails_validation() {
        let s = Scenario::from_yaml_str("output:\n  width: 721\n").unwrap();
        assert!(matches!(
            s.validate(),
            Err(ConfigError::InvalidFrameSize { width: 721, height: 720 })
        ));
    }

    #[test]
    fn oversized_duration_fails_validation() {
        let s = Scenario::from_yaml_str("simulation:\n  t_max: 1.0e300\n").unwrap();
        assert!(matches!(s.validate(), Err(ConfigError::TooManyFrames { .. })));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Scenario::load(Path::new("no/such/scenario.yaml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Read { .. }));
    }

    #[test]
    fn output_paths_share_name() {
        let out = OutputConfig::default();
        assert_eq!(out.video_path(), PathBuf::from("output/chaotic_pendulum.mp4"));
        assert_eq!(out.csv_path(), PathBuf::from("output/chaotic_pendulum.csv"));
        assert_eq!(out.summary_path(), PathBuf::from("output/chaotic_pendulum.json"));
    }
}
