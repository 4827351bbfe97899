//! Boundary segments used as collision geometry.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::Vec2;

/// Ordered pair of boundary particle indices. The ring runs `i -> (i+1) mod N`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        Edge { a, b }
    }

    /// Endpoint positions `(a, b)`.
    pub fn endpoints<F: Float>(&self, particles: &[Particle<F>]) -> (Vec2<F>, Vec2<F>) {
        (particles[self.a].pos, particles[self.b].pos)
    }
}
