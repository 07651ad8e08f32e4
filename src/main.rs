use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use chaotic_pendulum::config::Scenario;
use chaotic_pendulum::dynamics::energy;
use chaotic_pendulum::io::{self, RunSummary};
use chaotic_pendulum::render::annotation::{breakdown_notice, initial_conditions_text};
use chaotic_pendulum::render::{open_sink, render_animation, Animation, FrameRenderer};
use chaotic_pendulum::sim::{self, SolveStatus};

#[derive(Parser, Debug)]
#[command(version, about = "Integrate a double pendulum and render its motion to video")]
struct Args {
    /// Scenario YAML file; the reference run is used when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Directory for the video, CSV and summary
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Simulated duration in seconds
    #[arg(long)]
    t_max: Option<f64>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Skip rendering; write only CSV and summary
    #[arg(long)]
    no_video: bool,
}

fn load_scenario(args: &Args) -> Result<Scenario> {
    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => Scenario::default(),
    };

    if let Some(dir) = &args.out_dir {
        scenario.output.dir = dir.clone();
    }
    if let Some(t_max) = args.t_max {
        scenario.simulation.t_max = t_max;
    }
    if let Some(fps) = args.fps {
        scenario.simulation.fps = fps;
    }
    if args.no_video {
        scenario.output.video = false;
    }

    scenario.validate().context("invalid scenario")?;
    Ok(scenario)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scenario = load_scenario(&args)?;

    let params = scenario.params();
    let y0 = scenario.initial_state();
    let config = scenario.sim_config();
    let out = &scenario.output;

    // -----------------------------------------------------------------------
    // Integrate
    // -----------------------------------------------------------------------
    info!("integrating {} s at {} fps", config.t_max, config.fps);
    let trajectory = sim::simulate(&params, &y0, &config)?;

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  CHAOTIC PENDULUM");
    println!("====================================================================");
    println!();
    for line in initial_conditions_text(&params, &y0).lines() {
        println!("  {line}");
    }
    println!(
        "  L1={} m, L2={} m, g={} m/s^2",
        params.l1, params.l2, params.g
    );
    println!();

    println!("  Integration");
    println!("  ──────────────────────────────────────────────────────────────────");
    let stats = trajectory.stats();
    println!(
        "  Frames:        {:>8} / {:<8}  Steps: {} accepted, {} rejected",
        trajectory.len(),
        trajectory.requested(),
        stats.accepted_steps,
        stats.rejected_steps
    );
    println!(
        "  Tolerances:    rtol={:e}  atol={:e}",
        config.tolerances.rtol, config.tolerances.atol
    );
    match trajectory.status() {
        SolveStatus::Completed => println!("  Status:        completed"),
        SolveStatus::EarlyTerminated { at, reason } => {
            println!("  Status:        stopped at t={at:.3} s ({reason})")
        }
    }
    println!(
        "  Energy drift:  {:.3e} (relative to M g (L1 + L2))",
        energy::max_relative_drift(trajectory.states(), &params)
    );
    println!();

    if let Some(notice) = breakdown_notice(&trajectory) {
        println!("{notice}");
    }

    // -----------------------------------------------------------------------
    // Outputs
    // -----------------------------------------------------------------------
    fs::create_dir_all(&out.dir)
        .with_context(|| format!("failed to create {}", out.dir.display()))?;

    if out.csv {
        let path = out.csv_path();
        io::write_trajectory_file(&path, &trajectory, &params)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Trajectory written to {}", path.display());
    }

    if out.summary {
        let path = out.summary_path();
        let summary = RunSummary::from_trajectory(&params, &y0, &config, &trajectory);
        io::write_summary_file(&path, &summary)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }

    if out.video {
        println!("Saving animation... This may take a few moments.");
        let animation = Animation::new(&trajectory, &params, config.fps);
        let renderer = FrameRenderer::new(out.width, out.height);
        let sink = open_sink(&out.video_path(), &out.frames_dir(), &renderer, config.fps)?;
        let (path, frames) =
            render_animation(&animation, &renderer, sink).context("failed to render animation")?;
        println!("Animation saved: {} ({} frames)", path.display(), frames);
    }

    println!();
    Ok(())
}
