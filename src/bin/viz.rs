use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, Points};

use chaotic_pendulum::config::Scenario;
use chaotic_pendulum::render::annotation::{breakdown_notice, initial_conditions_text};
use chaotic_pendulum::render::Animation;
use chaotic_pendulum::sim;

#[derive(Parser, Debug)]
#[command(about = "Play back a double pendulum run in a window")]
struct Args {
    /// Scenario YAML file; the reference run is used when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => Scenario::default(),
    };
    scenario.validate().context("invalid scenario")?;

    let params = scenario.params();
    let y0 = scenario.initial_state();
    let config = scenario.sim_config();
    let trajectory = sim::simulate(&params, &y0, &config)?;

    let app = PendulumViz {
        animation: Animation::new(&trajectory, &params, config.fps),
        caption: initial_conditions_text(&params, &y0),
        notice: breakdown_notice(&trajectory),
        extent: 3.5_f64.max(params.reach() * 1.1),
        started: None,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native("Chaotic Pendulum", options, Box::new(|_| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

struct PendulumViz {
    animation: Animation,
    caption: String,
    notice: Option<String>,
    extent: f64,
    started: Option<f64>,
}

impl eframe::App for PendulumViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        let started = *self.started.get_or_insert(now);
        let elapsed = now - started;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Chaotic Pendulum");
            ui.label(&self.caption);
            if let Some(notice) = &self.notice {
                ui.colored_label(egui::Color32::from_rgb(200, 60, 40), notice);
            }
            if ui.button("Restart").clicked() {
                self.started = Some(now);
            }
        });

        let Some(frame) = self.animation.frame_at(elapsed) else {
            return;
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(format!(
                "t = {:.2} s   frame {}/{}",
                frame.time,
                frame.index + 1,
                self.animation.len()
            ));

            let trail: PlotPoints = frame.trail.iter().map(|p| [p.x, p.y]).collect();
            let arm: PlotPoints = frame.arm.iter().map(|p| [p.x, p.y]).collect();
            let bobs: PlotPoints = frame.arm[1..].iter().map(|p| [p.x, p.y]).collect();
            let e = self.extent;

            Plot::new("pendulum")
                .data_aspect(1.0)
                .include_x(-e)
                .include_x(e)
                .include_y(-e)
                .include_y(e)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new("Trail", trail)
                            .color(egui::Color32::from_rgba_unmultiplied(220, 40, 40, 128))
                            .width(1.0),
                    );
                    plot_ui.line(
                        Line::new("Arms", arm)
                            .color(egui::Color32::from_rgb(31, 61, 214))
                            .width(3.0),
                    );
                    plot_ui.points(
                        Points::new("Bobs", bobs)
                            .color(egui::Color32::from_rgb(31, 61, 214))
                            .radius(6.0),
                    );
                });
        });

        if elapsed < self.animation.duration() {
            ctx.request_repaint();
        }
    }
}
