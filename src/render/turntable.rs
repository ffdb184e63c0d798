//! Time-driven model rotation for the text showcase.
//!
//! The model slowly spins around Y while nodding around X:
//! `rot_y(t * spin) * rot_x(nod * sin(t))`.

use std::time::Instant;

use glam::Mat4;

#[derive(Debug, Clone)]
pub struct Turntable {
    start: Instant,
    /// Radians per second around Y.
    pub spin: f32,
    /// Peak nod angle around X, in radians.
    pub nod: f32,
}

impl Turntable {
    pub fn new(spin: f32, nod: f32) -> Self {
        Self {
            start: Instant::now(),
            spin,
            nod,
        }
    }

    /// Seconds since creation.
    #[inline]
    pub fn elapsed_s(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Rotation at `t` seconds.
    pub fn model_at(&self, t: f32) -> Mat4 {
        Mat4::from_rotation_y(t * self.spin) * Mat4::from_rotation_x(self.nod * t.sin())
    }

    /// Rotation now.
    #[inline]
    pub fn model(&self) -> Mat4 {
        self.model_at(self.elapsed_s())
    }
}

impl Default for Turntable {
    fn default() -> Self {
        Self::new(0.1, 10f32.to_radians())
    }
}
