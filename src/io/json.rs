use std::io::{self, Write};
use std::path::Path;

use crate::dynamics::energy;
use crate::dynamics::state::{PendulumParams, StateVector};
use crate::render::annotation::initial_conditions_text;
use crate::sim::config::SimConfig;
use crate::sim::trajectory::{PendulumTrajectory, SolveStatus, SolverStats};

/// Summary of one run, computed from its trajectory.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub params: PendulumParams,
    pub initial: StateVector,
    pub t_max: f64,
    pub fps: f64,
    pub rtol: f64,
    pub atol: f64,
    pub requested_frames: usize,
    pub produced_frames: usize,
    pub status: SolveStatus,
    pub stats: SolverStats,
    pub simulated_time: f64,
    pub initial_energy: f64,
    pub max_energy_drift: f64,
    pub caption: String,
}

impl RunSummary {
    pub fn from_trajectory(
        params: &PendulumParams,
        initial: &StateVector,
        config: &SimConfig,
        trajectory: &PendulumTrajectory,
    ) -> Self {
        RunSummary {
            params: *params,
            initial: *initial,
            t_max: config.t_max,
            fps: config.fps,
            rtol: config.tolerances.rtol,
            atol: config.tolerances.atol,
            requested_frames: trajectory.requested(),
            produced_frames: trajectory.len(),
            status: trajectory.status(),
            stats: trajectory.stats(),
            simulated_time: trajectory.last().map_or(0.0, |(t, _)| t),
            initial_energy: energy::total(initial, params),
            max_energy_drift: energy::max_relative_drift(trajectory.states(), params),
            caption: initial_conditions_text(params, initial),
        }
    }

    pub fn truncated(&self) -> bool {
        self.produced_frames < self.requested_frames
    }
}

/// Write run summary as JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, s: &RunSummary) -> io::Result<()> {
    let p = &s.params;
    let y = &s.initial;

    writeln!(writer, "{{")?;
    writeln!(writer, "  \"caption\": \"{}\",", s.caption.replace('\n', "\\n"))?;
    writeln!(writer, "  \"params\": {{")?;
    writeln!(writer, "    \"g\": {},", p.g)?;
    writeln!(writer, "    \"l1\": {},", p.l1)?;
    writeln!(writer, "    \"l2\": {},", p.l2)?;
    writeln!(writer, "    \"m1\": {},", p.m1)?;
    writeln!(writer, "    \"m2\": {}", p.m2)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"initial\": {{")?;
    writeln!(writer, "    \"theta1\": {},", y[0])?;
    writeln!(writer, "    \"theta2\": {},", y[1])?;
    writeln!(writer, "    \"omega1\": {},", y[2])?;
    writeln!(writer, "    \"omega2\": {}", y[3])?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"simulation\": {{")?;
    writeln!(writer, "    \"t_max\": {},", s.t_max)?;
    writeln!(writer, "    \"fps\": {},", s.fps)?;
    writeln!(writer, "    \"rtol\": {:e},", s.rtol)?;
    writeln!(writer, "    \"atol\": {:e}", s.atol)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"result\": {{")?;
    match s.status {
        SolveStatus::Completed => {
            writeln!(writer, "    \"status\": \"completed\",")?;
        }
        SolveStatus::EarlyTerminated { at, reason } => {
            writeln!(writer, "    \"status\": \"early_terminated\",")?;
            writeln!(writer, "    \"terminated_at\": {:.6},", at)?;
            writeln!(writer, "    \"reason\": \"{}\",", reason)?;
        }
    }
    writeln!(writer, "    \"requested_frames\": {},", s.requested_frames)?;
    writeln!(writer, "    \"produced_frames\": {},", s.produced_frames)?;
    writeln!(writer, "    \"simulated_time_s\": {:.6},", s.simulated_time)?;
    writeln!(writer, "    \"accepted_steps\": {},", s.stats.accepted_steps)?;
    writeln!(writer, "    \"rejected_steps\": {},", s.stats.rejected_steps)?;
    writeln!(writer, "    \"fn_evals\": {},", s.stats.fn_evals)?;
    writeln!(writer, "    \"initial_energy_j\": {:.6},", s.initial_energy)?;
    writeln!(writer, "    \"max_energy_drift\": {:e}", s.max_energy_drift)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write run summary JSON to a file.
pub fn write_summary_file(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
