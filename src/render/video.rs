use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;
use log::{info, warn};

use crate::error::RenderError;
use crate::render::frame::Animation;
use crate::render::raster::FrameRenderer;

// ---------------------------------------------------------------------------
// Frame sinks
// ---------------------------------------------------------------------------

/// Destination for rendered frames, written in playback order.
pub trait FrameSink {
    fn write_frame(&mut self, img: &RgbaImage) -> Result<(), RenderError>;

    /// Flush everything and return the path of the finished artifact.
    fn finish(self: Box<Self>) -> Result<PathBuf, RenderError>;
}

/// Streams raw RGBA frames into an `ffmpeg` child producing H.264 MP4.
pub struct FfmpegEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    output: PathBuf,
}

impl FfmpegEncoder {
    pub fn spawn(output: &Path, width: u32, height: u32, fps: f64) -> Result<Self, RenderError> {
        let mut command = Command::new("ffmpeg");
        command
            .args(["-y", "-loglevel", "error"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgba"])
            .arg("-s")
            .arg(format!("{width}x{height}"))
            .arg("-r")
            .arg(format!("{fps}"))
            .args(["-i", "-"])
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(output);
        Self::with_command(command, output)
    }

    fn with_command(mut command: Command, output: &Path) -> Result<Self, RenderError> {
        let mut child = command.stdin(Stdio::piped()).spawn()?;
        let stdin = child.stdin.take();

        Ok(Self {
            child,
            stdin,
            output: output.to_path_buf(),
        })
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, img: &RgbaImage) -> Result<(), RenderError> {
        match self.stdin.as_mut() {
            Some(stdin) => match stdin.write_all(img.as_raw()) {
                Ok(()) => Ok(()),
                Err(err) => {
                    // The encoder went away; its exit status says more than EPIPE.
                    drop(self.stdin.take());
                    let status = self.child.wait()?;
                    if status.success() {
                        Err(RenderError::Io(err))
                    } else {
                        Err(RenderError::Encoder(status))
                    }
                }
            },
            None => Err(RenderError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "ffmpeg stdin closed",
            ))),
        }
    }

    fn finish(mut self: Box<Self>) -> Result<PathBuf, RenderError> {
        // Closing stdin signals end of stream.
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            return Err(RenderError::Encoder(status));
        }
        Ok(self.output)
    }
}

/// Writes `frame_000000.png`, `frame_000001.png`, ... into a directory.
pub struct PngSequence {
    dir: PathBuf,
    next: usize,
}

impl PngSequence {
    pub fn create(dir: &Path) -> Result<Self, RenderError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            next: 0,
        })
    }
}

impl FrameSink for PngSequence {
    fn write_frame(&mut self, img: &RgbaImage) -> Result<(), RenderError> {
        let path = self.dir.join(format!("frame_{:06}.png", self.next));
        img.save(&path)
            .map_err(|source| RenderError::Frame { path, source })?;
        self.next += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf, RenderError> {
        Ok(self.dir)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Open an MP4 encoder at `video_path`, or a PNG sequence in `frames_dir`
/// when ffmpeg is not on PATH.
pub fn open_sink(
    video_path: &Path,
    frames_dir: &Path,
    renderer: &FrameRenderer,
    fps: f64,
) -> Result<Box<dyn FrameSink>, RenderError> {
    if ffmpeg_available() {
        let encoder = FfmpegEncoder::spawn(video_path, renderer.width, renderer.height, fps)?;
        Ok(Box::new(encoder))
    } else {
        warn!(
            "ffmpeg not found on PATH; writing PNG frames to {} instead",
            frames_dir.display()
        );
        Ok(Box::new(PngSequence::create(frames_dir)?))
    }
}

/// Render every frame of `animation` into `sink`. Returns the artifact path
/// and the number of frames written.
pub fn render_animation(
    animation: &Animation,
    renderer: &FrameRenderer,
    mut sink: Box<dyn FrameSink>,
) -> Result<(PathBuf, usize), RenderError> {
    // f64 to usize casts saturate.
    let report_every = ((animation.fps() * 10.0).round() as usize).max(1);
    let total = animation.len();
    let mut written = 0;

    for frame in animation.frames() {
        let img = renderer.render(&frame);
        sink.write_frame(&img)?;
        written += 1;
        if frame.index % report_every == 0 {
            info!("frame {}/{}  t={:.2}", frame.index, total, frame.time);
        }
    }

    let path = sink.finish()?;
    Ok((path, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{reference_initial_state, PendulumParams};
    use crate::sim::{simulate, SimConfig};

    /// Collects frames in memory.
    #[derive(Default)]
    struct Capture {
        frames: Vec<RgbaImage>,
    }

    impl FrameSink for Capture {
        fn write_frame(&mut self, img: &RgbaImage) -> Result<(), RenderError> {
            self.frames.push(img.clone());
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<PathBuf, RenderError> {
            Ok(PathBuf::from(format!("{} frames", self.frames.len())))
        }
    }

    #[test]
    fn every_sample_becomes_a_frame() {
        let params = PendulumParams::default();
        let config = SimConfig { t_max: 0.5, fps: 20.0, ..Default::default() };
        let traj = simulate(&params, &reference_initial_state(), &config).unwrap();
        let anim = Animation::new(&traj, &params, config.fps);
        let renderer = FrameRenderer::new(64, 64);

        let (path, written) = render_animation(&anim, &renderer, Box::new(Capture::default())).unwrap();
        assert_eq!(written, 11);
        assert_eq!(path, PathBuf::from("11 frames"));
    }

    #[test]
    fn extreme_frame_rate_renders_single_frame() {
        let params = PendulumParams::default();
        let config = SimConfig { t_max: 0.0, fps: 1e30, ..Default::default() };
        let traj = simulate(&params, &reference_initial_state(), &config).unwrap();
        let anim = Animation::new(&traj, &params, config.fps);
        let renderer = FrameRenderer::new(16, 16);

        let (_, written) = render_animation(&anim, &renderer, Box::new(Capture::default())).unwrap();
        assert_eq!(written, 1);
    }

    #[cfg(unix)]
    #[test]
    fn dead_encoder_reports_exit_status() {
        let mut command = Command::new("sh");
        command.args(["-c", "exit 3"]);
        let mut encoder = FfmpegEncoder::with_command(command, Path::new("unused.mp4")).unwrap();

        // Larger than a pipe buffer, so the write cannot complete before the child exits.
        let img = RgbaImage::new(512, 512);
        match encoder.write_frame(&img) {
            Err(RenderError::Encoder(status)) => assert_eq!(status.code(), Some(3)),
            other => panic!("expected encoder exit status, got {other:?}"),
        }
    }

    #[test]
    fn png_sequence_numbers_frames() {
        let dir = std::env::temp_dir().join(format!("pendulum-frames-{}", std::process::id()));
        let mut sink = PngSequence::create(&dir).unwrap();
        let img = RgbaImage::new(4, 4);
        sink.write_frame(&img).unwrap();
        sink.write_frame(&img).unwrap();
        let out = Box::new(sink).finish().unwrap();

        assert!(out.join("frame_000000.png").is_file());
        assert!(out.join("frame_000001.png").is_file());
        fs::remove_dir_all(&dir).unwrap();
    }
}
