//! Ground plane contact: position clamp and Coulomb friction.

use crate::config::tuning;
use crate::float::Float;
use crate::particle::Particle;
use crate::vec::Vec2;

/// The parts of a polygon the stacking heuristic looks at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodySummary<F: Float> {
    pub center: Vec2<F>,
    pub radius: F,
    pub mass: F,
}

/// Push particles below `ground_y` back onto it and drop their downward velocity.
pub fn clamp<F: Float>(particles: &mut [Particle<F>], ground_y: F) {
    for p in particles.iter_mut().filter(|p| !p.fixed) {
        if p.pos.y < ground_y {
            p.pos.y = ground_y;
            if p.velocity.y < F::zero() {
                p.velocity.y = F::zero();
            }
        }
    }
}

/// Whether `p` touches the ground this tick.
pub fn is_grounded<F: Float>(p: &Particle<F>, ground_y: F) -> bool {
    !p.fixed && (p.pos.y - ground_y).abs() < F::from_f32(tuning::GROUND_EPSILON)
}

/// Total mass of bodies resting on `body`: a candidate counts when its center
/// is higher and horizontally within `body`'s bounding radius.
pub fn mass_above<F: Float, I>(body: &BodySummary<F>, others: I) -> F
where
    I: IntoIterator<Item = BodySummary<F>>,
{
    others
        .into_iter()
        .filter(|o| o.center.y > body.center.y && (o.center.x - body.center.x).abs() < body.radius)
        .fold(F::zero(), |m, o| m + o.mass)
}

/// Coulomb friction against horizontal motion.
///
/// The impulse budget `mu * normal_force * dt` is split evenly over the
/// grounded particles; each one loses at most its share of horizontal
/// momentum and is never pushed past zero.
pub fn apply_friction<F: Float>(
    particles: &mut [Particle<F>],
    ground_y: F,
    normal_force: F,
    mu: F,
    dt: F,
) {
    let grounded = particles.iter().filter(|p| is_grounded(p, ground_y)).count();
    if grounded == 0 {
        return;
    }
    let share = mu * normal_force * dt / F::from_usize(grounded);

    for p in particles.iter_mut().filter(|p| is_grounded(p, ground_y)) {
        let momentum = p.mass * p.velocity.x;
        let impulse = (-momentum).clamp(-share, share);
        p.add_velocity(Vec2::new(impulse / p.mass, F::zero()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_lifts_and_stops_downward_motion() {
        let mut particles = [Particle::new(Vec2::new(0.0f64, -1.5), 1.0)];
        particles[0].velocity = Vec2::new(1.0, -3.0);
        clamp(&mut particles, -1.0);
        assert_eq!(particles[0].pos.y, -1.0);
        assert_eq!(particles[0].velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn clamp_leaves_fixed_particles() {
        let mut particles = [Particle::fixed(Vec2::new(0.0f64, -5.0), 1.0)];
        clamp(&mut particles, 0.0);
        assert_eq!(particles[0].pos.y, -5.0);
    }

    #[test]
    fn small_slide_is_stopped_without_reversal() {
        let mut particles = [
            Particle::new(Vec2::new(0.0f64, 0.0), 1.0),
            Particle::new(Vec2::new(1.0, 0.0), 1.0),
        ];
        for p in particles.iter_mut() {
            p.velocity.x = 0.01;
        }
        apply_friction(&mut particles, 0.0, 19.6, 0.7, 1.0 / 60.0);
        assert!(particles.iter().all(|p| p.velocity.x == 0.0));
    }

    #[test]
    fn fast_slide_loses_at_most_its_budget() {
        let mut particles = [Particle::new(Vec2::new(0.0f64, 0.0), 1.0)];
        particles[0].velocity.x = 10.0;
        let dt = 1.0 / 60.0;
        apply_friction(&mut particles, 0.0, 9.8, 0.7, dt);
        let expected = 10.0 - 0.7 * 9.8 * dt;
        assert!((particles[0].velocity.x - expected).abs() < 1e-12);
    }

    #[test]
    fn airborne_particles_feel_no_friction() {
        let mut particles = [Particle::new(Vec2::new(0.0f64, 0.5), 1.0)];
        particles[0].velocity.x = 3.0;
        apply_friction(&mut particles, 0.0, 9.8, 0.7, 1.0 / 60.0);
        assert_eq!(particles[0].velocity.x, 3.0);
    }

    #[test]
    fn mass_above_counts_only_stacked_bodies() {
        let body = BodySummary { center: Vec2::new(0.0f64, 0.0), radius: 0.5, mass: 4.0 };
        let others = [
            BodySummary { center: Vec2::new(0.1, 0.6), radius: 0.5, mass: 2.0 },
            BodySummary { center: Vec2::new(2.0, 0.6), radius: 0.5, mass: 3.0 },
            BodySummary { center: Vec2::new(0.0, -0.6), radius: 0.5, mass: 5.0 },
        ];
        assert_eq!(mass_above(&body, others), 2.0);
    }

    #[test]
    fn mass_above_window_is_own_radius() {
        let body = BodySummary { center: Vec2::new(0.0f64, 0.0), radius: 0.5, mass: 4.0 };
        // Within the sum of radii but outside the body's own radius.
        let leaning = BodySummary { center: Vec2::new(0.7, 0.6), radius: 0.5, mass: 2.0 };
        assert_eq!(mass_above(&body, [leaning]), 0.0);
        let centered = BodySummary { center: Vec2::new(0.49, 0.6), radius: 0.1, mass: 2.0 };
        assert_eq!(mass_above(&body, [centered]), 2.0);
    }
}
