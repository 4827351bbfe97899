//! Point masses with split force/position integration.

use crate::float::Float;
use crate::vec::{Vec, Vec2};

/// A point mass owned by a polygon.
///
/// `prev_pos` is the Verlet reference for the tick: it is snapshotted before
/// integration so the net positional change across the tick can be turned
/// back into a velocity. A `fixed` particle has infinite mass: nothing but
/// an explicit [`Particle::translate`] moves it.
#[derive(Clone, Debug)]
pub struct Particle<F: Float> {
    pub pos: Vec2<F>,
    pub prev_pos: Vec2<F>,
    pub velocity: Vec2<F>,
    pub mass: F,
    pub fixed: bool,
}

impl<F: Float> Particle<F> {
    pub fn new(pos: Vec2<F>, mass: F) -> Self {
        Particle {
            pos,
            prev_pos: pos,
            velocity: Vec2::zero(),
            mass,
            fixed: false,
        }
    }

    pub fn fixed(pos: Vec2<F>, mass: F) -> Self {
        Particle { fixed: true, ..Particle::new(pos, mass) }
    }

    /// Inverse mass, zero for fixed particles.
    pub fn inv_mass(&self) -> F {
        if self.fixed || self.mass.is_near_zero(F::from_f32(1e-12)) {
            F::zero()
        } else {
            F::one() / self.mass
        }
    }

    /// Snapshot `prev_pos`, then accelerate and damp. Positions are untouched.
    pub fn begin_step(&mut self, dt: F, gravity: Vec2<F>, damping: F) {
        if self.fixed {
            return;
        }
        self.prev_pos = self.pos;
        self.velocity = (self.velocity + gravity.scale(dt)).scale(damping);
    }

    pub fn integrate(&mut self, dt: F) {
        if self.fixed {
            return;
        }
        self.pos += self.velocity.scale(dt);
    }

    /// Positional correction from a constraint or contact.
    pub fn nudge(&mut self, delta: Vec2<F>) {
        if !self.fixed {
            self.pos += delta;
        }
    }

    pub fn add_velocity(&mut self, dv: Vec2<F>) {
        if !self.fixed {
            self.velocity += dv;
        }
    }

    /// Velocity change written through to position, so it survives the
    /// Verlet resynthesis at the end of the tick.
    pub fn apply_velocity_change(&mut self, dv: Vec2<F>, dt: F) {
        if !self.fixed {
            self.velocity += dv;
            self.pos += dv.scale(dt);
        }
    }

    /// Velocity implied by the positional change since `begin_step`.
    pub fn implicit_velocity(&self, dt: F) -> Vec2<F> {
        if self.fixed || dt.is_near_zero(F::from_f32(1e-30)) {
            return Vec2::zero();
        }
        (self.pos - self.prev_pos).scale(F::one() / dt)
    }

    /// Rebuild `velocity` from the tick's net displacement, zeroing
    /// components smaller than `dead_band`.
    pub fn resynthesize_velocity(&mut self, dt: F, dead_band: F) {
        if self.fixed {
            return;
        }
        let mut v = self.implicit_velocity(dt);
        if v.x.abs() < dead_band {
            v.x = F::zero();
        }
        if v.y.abs() < dead_band {
            v.y = F::zero();
        }
        self.velocity = v;
    }

    pub fn fix(&mut self) {
        self.fixed = true;
        self.velocity = Vec2::zero();
        self.prev_pos = self.pos;
    }

    pub fn release(&mut self) {
        self.fixed = false;
        self.prev_pos = self.pos;
    }

    /// Rigid editing move (paste, duplicate). Applies to fixed particles too.
    pub fn translate(&mut self, delta: Vec2<F>) {
        self.pos += delta;
        self.prev_pos += delta;
    }
}
