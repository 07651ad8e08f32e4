use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use nalgebra::Point2;

use crate::render::frame::Frame;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID: Rgba<u8> = Rgba([222, 222, 222, 255]);
const AXIS: Rgba<u8> = Rgba([170, 170, 170, 255]);
const TRAIL: Rgba<u8> = Rgba([255, 128, 128, 255]); // red at half opacity over white
const ARM: Rgba<u8> = Rgba([31, 61, 214, 255]);

/// Rasterizes frames onto a square world window `[-extent, extent]^2`
/// centred on the pivot, y up.
#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer {
    pub width: u32,
    pub height: u32,
    pub extent: f64,      // m, half-width of the visible window
    pub grid_spacing: f64, // m
    pub arm_px: i32,
    pub bob_radius_px: i32,
}

impl FrameRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            extent: 3.5,
            grid_spacing: 1.0,
            arm_px: 3,
            bob_radius_px: 6,
        }
    }

    /// Pixels per metre, fitted to the shorter image side.
    fn scale(&self) -> f64 {
        f64::from(self.width.min(self.height)) / (2.0 * self.extent)
    }

    /// World coordinates (m) to pixel coordinates.
    pub fn to_pixel(&self, p: Point2<f64>) -> (f32, f32) {
        let s = self.scale();
        let cx = f64::from(self.width) * 0.5;
        let cy = f64::from(self.height) * 0.5;
        ((cx + p.x * s) as f32, (cy - p.y * s) as f32)
    }

    pub fn render(&self, frame: &Frame<'_>) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        self.draw_grid(&mut img);

        for pair in frame.trail.windows(2) {
            draw_line_segment_mut(&mut img, self.to_pixel(pair[0]), self.to_pixel(pair[1]), TRAIL);
        }

        for pair in frame.arm.windows(2) {
            draw_thick_line(&mut img, self.to_pixel(pair[0]), self.to_pixel(pair[1]), self.arm_px, ARM);
        }
        for p in &frame.arm {
            let (x, y) = self.to_pixel(*p);
            draw_filled_circle_mut(
                &mut img,
                (x.round() as i32, y.round() as i32),
                self.bob_radius_px,
                ARM,
            );
        }

        img
    }

    fn draw_grid(&self, img: &mut RgbaImage) {
        let lines = (self.extent / self.grid_spacing).floor() as i32;
        let e = self.extent;
        for i in -lines..=lines {
            let v = f64::from(i) * self.grid_spacing;
            let color = if i == 0 { AXIS } else { GRID };
            let (x0, y0) = self.to_pixel(Point2::new(v, -e));
            let (x1, y1) = self.to_pixel(Point2::new(v, e));
            draw_line_segment_mut(img, (x0, y0), (x1, y1), color);
            let (x0, y0) = self.to_pixel(Point2::new(-e, v));
            let (x1, y1) = self.to_pixel(Point2::new(e, v));
            draw_line_segment_mut(img, (x0, y0), (x1, y1), color);
        }
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(720, 720)
    }
}

// Parallel offset segments along the unit normal give a solid stroke.
fn draw_thick_line(img: &mut RgbaImage, start: (f32, f32), end: (f32, f32), thickness: i32, color: Rgba<u8>) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-3 {
        return;
    }
    let nx = -dy / len;
    let ny = dx / len;

    let half = thickness.max(1) / 2;
    for k in -half..=half {
        let off = k as f32;
        draw_line_segment_mut(
            img,
            (start.0 + nx * off, start.1 + ny * off),
            (end.0 + nx * off, end.1 + ny * off),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_maps_to_image_centre() {
        let r = FrameRenderer::new(700, 700);
        assert_eq!(r.to_pixel(Point2::origin()), (350.0, 350.0));
    }

    #[test]
    fn y_axis_points_up() {
        let r = FrameRenderer::new(700, 700);
        let (_, y_up) = r.to_pixel(Point2::new(0.0, 1.0));
        let (_, y_down) = r.to_pixel(Point2::new(0.0, -1.0));
        assert!(y_up < y_down);
    }

    #[test]
    fn extent_fits_shorter_side() {
        let r = FrameRenderer::new(1000, 700);
        let (_, top) = r.to_pixel(Point2::new(0.0, r.extent));
        let (_, bottom) = r.to_pixel(Point2::new(0.0, -r.extent));
        assert!((bottom - top - 700.0).abs() < 1e-3);
    }

    #[test]
    fn arms_and_trail_are_drawn() {
        // 140 px over 7 m puts every test point on an exact pixel.
        let r = FrameRenderer::new(140, 140);
        let trail = [Point2::new(-2.0, -2.0), Point2::new(-2.0, -1.0)];
        let frame = Frame {
            index: 2,
            time: 0.0,
            arm: [Point2::origin(), Point2::new(1.0, -1.0), Point2::new(2.0, -2.0)],
            trail: &trail,
        };
        let img = r.render(&frame);

        let (bx, by) = r.to_pixel(frame.arm[2]);
        assert_eq!(*img.get_pixel(bx as u32, by as u32), ARM);

        let (tx, ty) = r.to_pixel(Point2::new(-2.0, -1.5));
        assert_eq!(*img.get_pixel(tx as u32, ty as u32), TRAIL);
    }
}
