//! Simulation parameters and tuning constants.

use crate::float::Float;
use crate::vec::Vec2;

/// Tunable constants. None of these are exact contracts; they were picked so
/// small and large shapes stack and settle without visible jitter.
pub mod tuning {
    /// Contact skin as a fraction of a polygon's shortest boundary edge.
    pub const THICKNESS_FRACTION: f32 = 0.5;
    /// Velocity components below this (m/s) are zeroed after resynthesis.
    pub const VELOCITY_DEAD_BAND: f32 = 5e-3;
    /// Particles this close to the ground count as grounded.
    pub const GROUND_EPSILON: f32 = 1e-3;
    /// Coulomb coefficient between polygons and the ground.
    pub const GROUND_FRICTION: f32 = 0.7;
    /// Polygon-polygon friction while sticking.
    pub const STATIC_FRICTION: f32 = 0.8;
    /// Polygon-polygon friction while sliding.
    pub const DYNAMIC_FRICTION: f32 = 0.6;
    /// Relative tangential speed below which contact friction is static.
    pub const STATIC_SPEED: f32 = 1e-2;
    /// Added to distances when weighting point impulses, avoids 1/0.
    pub const IMPULSE_SOFTENING: f32 = 1e-3;
    /// Polygon count above which adaptive iterations drop to the cheap tier.
    pub const ADAPTIVE_THRESHOLD: usize = 100;
}

/// Configuration for one simulation tick.
///
/// # Builder Pattern
/// ```
/// use softpoly::config::SimulationConfig;
/// use softpoly::vec::Vec2;
///
/// let config: SimulationConfig<f32> = SimulationConfig::new()
///     .with_iterations(10, 10)
///     .with_gravity(Vec2::new(0.0, -9.8))
///     .with_damping(0.98)
///     .with_ground(-1.0);
/// ```
#[derive(Clone, Debug)]
pub struct SimulationConfig<F: Float> {
    /// Fixed timestep in seconds. Default: 1/60.
    pub dt: F,
    /// Gauss-Seidel rounds over every spring per tick. Default: 6.
    pub spring_iterations: usize,
    /// Collision rounds per neighbour pair per tick. Default: 12.
    pub collision_iterations: usize,
    /// Ground plane height; `None` disables ground contact. Default: -1.
    pub ground_y: Option<F>,
    /// Gravity acceleration. Default: (0, -9.8).
    pub gravity: Vec2<F>,
    /// Per-tick velocity multiplier in (0, 1]. 1.0 = no damping. Default: 0.98.
    pub damping: F,
    /// Broad-phase cell edge length. Default: 1.0.
    pub cell_size: F,
    /// Coulomb coefficient against the ground.
    pub ground_friction: F,
    pub static_friction: F,
    pub dynamic_friction: F,
    /// Pick iteration counts from the polygon count instead of the fields above.
    pub adaptive_iterations: bool,
}

impl<F: Float> SimulationConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SimulationConfig {
            dt: F::one() / F::from_f32(60.0),
            spring_iterations: 6,
            collision_iterations: 12,
            ground_y: Some(-F::one()),
            gravity: Vec2::new(F::zero(), F::from_f32(-9.8)),
            damping: F::from_f32(0.98),
            cell_size: F::one(),
            ground_friction: F::from_f32(tuning::GROUND_FRICTION),
            static_friction: F::from_f32(tuning::STATIC_FRICTION),
            dynamic_friction: F::from_f32(tuning::DYNAMIC_FRICTION),
            adaptive_iterations: false,
        }
    }

    pub fn with_dt(mut self, dt: F) -> Self {
        self.dt = dt;
        self
    }

    /// Set spring and collision iteration counts.
    pub fn with_iterations(mut self, spring: usize, collision: usize) -> Self {
        self.spring_iterations = spring;
        self.collision_iterations = collision;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2<F>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the damping factor, clamped into (0, 1].
    pub fn with_damping(mut self, damping: F) -> Self {
        self.damping = damping.clamp(F::from_f32(1e-6), F::one());
        self
    }

    pub fn with_ground(mut self, ground_y: F) -> Self {
        self.ground_y = Some(ground_y);
        self
    }

    pub fn without_ground(mut self) -> Self {
        self.ground_y = None;
        self
    }

    pub fn with_cell_size(mut self, cell_size: F) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_ground_friction(mut self, mu: F) -> Self {
        self.ground_friction = mu;
        self
    }

    pub fn with_contact_friction(mut self, static_mu: F, dynamic_mu: F) -> Self {
        self.static_friction = static_mu;
        self.dynamic_friction = dynamic_mu;
        self
    }

    pub fn with_adaptive_iterations(mut self) -> Self {
        self.adaptive_iterations = true;
        self
    }

    /// `(spring, collision)` iteration counts for a scene of `polygon_count`.
    ///
    /// Crowded scenes trade accuracy for frame time: 3/2 rounds above
    /// [`tuning::ADAPTIVE_THRESHOLD`] polygons, 6/12 otherwise.
    pub fn iterations_for(&self, polygon_count: usize) -> (usize, usize) {
        if !self.adaptive_iterations {
            return (self.spring_iterations, self.collision_iterations);
        }
        if polygon_count > tuning::ADAPTIVE_THRESHOLD {
            (3, 2)
        } else {
            (6, 12)
        }
    }
}

impl<F: Float> Default for SimulationConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_iterations_follow_polygon_count() {
        let config: SimulationConfig<f32> = SimulationConfig::new().with_adaptive_iterations();
        assert_eq!(config.iterations_for(10), (6, 12));
        assert_eq!(config.iterations_for(101), (3, 2));
    }

    #[test]
    fn fixed_iterations_ignore_polygon_count() {
        let config: SimulationConfig<f64> = SimulationConfig::new().with_iterations(10, 4);
        assert_eq!(config.iterations_for(500), (10, 4));
    }

    #[test]
    fn damping_is_clamped() {
        let config: SimulationConfig<f64> = SimulationConfig::new().with_damping(1.5);
        assert_eq!(config.damping, 1.0);
    }
}
