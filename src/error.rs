use std::path::PathBuf;

use thiserror::Error;

/// Physical parameters that make the equations of motion undefined.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("initial state component {name} must be finite, got {value}")]
    NonFiniteState { name: &'static str, value: f64 },
}

/// Simulation settings the solver cannot work with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("t_max must be finite and >= 0, got {0}")]
    InvalidDuration(f64),

    #[error("fps must be finite and > 0, got {0}")]
    InvalidFrameRate(f64),

    #[error("{name} tolerance must be positive and finite, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("t_max={t_max} at fps={fps} asks for more than {max} frames", max = crate::sim::grid::MAX_FRAMES)]
    TooManyFrames { t_max: f64, fps: f64 },

    #[error("frame size must be non-zero and even, got {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Failures while reading a scenario document.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario YAML")]
    Parse(#[from] serde_yaml::Error),
}

/// Failures while turning frames into an output artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write frame {path}")]
    Frame {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("video encoder I/O failed")]
    Io(#[from] std::io::Error),

    #[error("ffmpeg exited with {0}")]
    Encoder(std::process::ExitStatus),
}
