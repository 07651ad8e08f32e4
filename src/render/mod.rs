pub mod annotation;
pub mod coords;
pub mod frame;
pub mod raster;
pub mod video;

pub use coords::{from_cartesian, to_cartesian, BobPositions};
pub use frame::{Animation, Frame};
pub use raster::FrameRenderer;
pub use video::{open_sink, render_animation, FfmpegEncoder, FrameSink, PngSequence};
