use std::io::{self, Write};
use std::path::Path;

use crate::dynamics::energy;
use crate::dynamics::state::{PendulumParams, OMEGA1, OMEGA2, THETA1, THETA2};
use crate::render::coords::to_cartesian;
use crate::sim::trajectory::PendulumTrajectory;

/// Write trajectory data to CSV format.
///
/// Columns: time, theta1, theta2, omega1, omega2, x1, y1, x2, y2, energy
pub fn write_trajectory<W: Write>(
    writer: &mut W,
    trajectory: &PendulumTrajectory,
    params: &PendulumParams,
) -> io::Result<()> {
    writeln!(writer, "time,theta1,theta2,omega1,omega2,x1,y1,x2,y2,energy")?;

    for (t, y) in trajectory.iter() {
        let pos = to_cartesian(y, params);
        writeln!(
            writer,
            "{:.6},{:.8},{:.8},{:.8},{:.8},{:.6},{:.6},{:.6},{:.6},{:.8}",
            t,
            y[THETA1], y[THETA2],
            y[OMEGA1], y[OMEGA2],
            pos.bob1.x, pos.bob1.y,
            pos.bob2.x, pos.bob2.y,
            energy::total(y, params),
        )?;
    }

    Ok(())
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(
    path: &Path,
    trajectory: &PendulumTrajectory,
    params: &PendulumParams,
) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, trajectory, params)?;
    file.flush()
}
