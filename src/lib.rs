pub mod config;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod render;
pub mod sim;

pub use config::Scenario;
pub use dynamics::{derivatives, DoublePendulum, OdeSystem, PendulumParams, StateVector};
pub use error::{ConfigError, ParamError, RenderError, ScenarioError};
pub use sim::{simulate, solve, PendulumTrajectory, SimConfig, SolveStatus, TimeGrid, Tolerances};
