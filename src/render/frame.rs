use nalgebra::Point2;

use crate::dynamics::state::PendulumParams;
use crate::render::coords::{to_cartesian, BobPositions};
use crate::sim::trajectory::PendulumTrajectory;

/// Everything needed to draw one animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    pub index: usize,
    pub time: f64,
    /// Polyline pivot -> bob 1 -> bob 2.
    pub arm: [Point2<f64>; 3],
    /// Bob 2 positions of all earlier frames, oldest first.
    pub trail: &'a [Point2<f64>],
}

/// Bob positions for every trajectory sample, addressed by frame index.
///
/// One frame per sample, so a truncated trajectory yields a shorter
/// animation rather than missing frames.
#[derive(Debug, Clone)]
pub struct Animation {
    times: Vec<f64>,
    bob1: Vec<Point2<f64>>,
    bob2: Vec<Point2<f64>>,
    fps: f64,
}

impl Animation {
    pub fn new(trajectory: &PendulumTrajectory, params: &PendulumParams, fps: f64) -> Self {
        let (bob1, bob2) = trajectory
            .states()
            .iter()
            .map(|y| {
                let BobPositions { bob1, bob2 } = to_cartesian(y, params);
                (bob1, bob2)
            })
            .unzip();

        Self {
            times: trajectory.times().to_vec(),
            bob1,
            bob2,
            fps,
        }
    }

    pub fn len(&self) -> usize {
        self.bob2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bob2.is_empty()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Playback length in seconds at the animation frame rate.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.fps
    }

    pub fn frame(&self, index: usize) -> Option<Frame<'_>> {
        let bob1 = *self.bob1.get(index)?;
        let bob2 = self.bob2[index];
        Some(Frame {
            index,
            time: self.times[index],
            arm: [Point2::origin(), bob1, bob2],
            trail: &self.bob2[..index],
        })
    }

    /// Frame shown `elapsed` seconds into playback, holding the last frame
    /// once playback has run past the end.
    pub fn frame_at(&self, elapsed: f64) -> Option<Frame<'_>> {
        let last = self.len().checked_sub(1)?;
        let index = (elapsed.max(0.0) * self.fps).floor() as usize;
        self.frame(index.min(last))
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame<'_>> {
        (0..self.len()).filter_map(move |i| self.frame(i))
    }

    /// Full bob 2 path, for plotting the whole trail at once.
    pub fn path(&self) -> &[Point2<f64>] {
        &self.bob2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::reference_initial_state;
    use crate::sim::{simulate, SimConfig};

    fn animation() -> Animation {
        let params = PendulumParams::default();
        let config = SimConfig { t_max: 1.0, fps: 30.0, ..Default::default() };
        let traj = simulate(&params, &reference_initial_state(), &config).unwrap();
        Animation::new(&traj, &params, config.fps)
    }

    #[test]
    fn one_frame_per_sample() {
        let anim = animation();
        assert_eq!(anim.len(), 31);
        assert_eq!(anim.frames().count(), 31);
        assert!(anim.frame(31).is_none());
    }

    #[test]
    fn first_frame_has_empty_trail() {
        let anim = animation();
        let f = anim.frame(0).unwrap();
        assert!(f.trail.is_empty());
        assert_eq!(f.arm[0], Point2::origin());
        assert_eq!(f.time, 0.0);
    }

    #[test]
    fn trail_is_prefix_of_bob2_path() {
        let anim = animation();
        let f = anim.frame(10).unwrap();
        assert_eq!(f.trail.len(), 10);
        assert_eq!(f.trail, &anim.path()[..10]);
        assert_eq!(f.arm[2], anim.path()[10]);
    }

    #[test]
    fn frame_is_pure_function_of_index() {
        let anim = animation();
        assert_eq!(anim.frame(7), anim.frame(7));
    }

    #[test]
    fn playback_clock_maps_to_frames() {
        let anim = animation();
        assert_eq!(anim.frame_at(0.0).unwrap().index, 0);
        assert_eq!(anim.frame_at(0.5).unwrap().index, 15);
        assert_eq!(anim.frame_at(100.0).unwrap().index, 30);
        assert_eq!(anim.frame_at(-1.0).unwrap().index, 0);
    }
}
