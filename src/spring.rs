//! Position-based distance constraints between two particles of one polygon.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::Vec;

/// Mesh role of a spring. All kinds are relaxed identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpringKind {
    /// Boundary neighbour, `i -> i+1`.
    Structural,
    /// `i -> i-1`.
    Shear,
    /// Skip-one vertex, `i -> i+2`.
    Bending,
}

/// Distance constraint over two particle indices in the owning polygon.
#[derive(Clone, Debug)]
pub struct Spring<F: Float> {
    pub a: usize,
    pub b: usize,
    pub rest_length: F,
    pub kind: SpringKind,
}

impl<F: Float> Spring<F> {
    pub fn new(a: usize, b: usize, rest_length: F, kind: SpringKind) -> Self {
        Spring { a, b, rest_length, kind }
    }

    /// Spring whose rest length is the current distance between `a` and `b`.
    pub fn from_particles(a: usize, b: usize, particles: &[Particle<F>], kind: SpringKind) -> Self {
        let rest_length = particles[a].pos.distance(particles[b].pos);
        Spring { a, b, rest_length, kind }
    }

    /// One Gauss-Seidel correction. With both ends free the correction is
    /// split evenly; a single free end absorbs all of it.
    pub fn relax(&self, particles: &mut [Particle<F>]) {
        let delta = particles[self.b].pos - particles[self.a].pos;
        let dist = delta.length();
        if dist < F::from_f32(1e-6) {
            return;
        }
        let diff = (dist - self.rest_length) / dist;

        match (particles[self.a].fixed, particles[self.b].fixed) {
            (false, false) => {
                let correction = delta.scale(F::half() * diff);
                particles[self.a].pos += correction;
                particles[self.b].pos -= correction;
            }
            (false, true) => particles[self.a].pos += delta.scale(diff),
            (true, false) => particles[self.b].pos -= delta.scale(diff),
            (true, true) => {}
        }
    }

    /// Signed length error, positive when stretched.
    pub fn stretch(&self, particles: &[Particle<F>]) -> F {
        particles[self.a].pos.distance(particles[self.b].pos) - self.rest_length
    }
}
