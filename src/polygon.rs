//! Deformable polygons: a particle arena, springs and a boundary ring.

use crate::collision;
use crate::config::{tuning, SimulationConfig};
use crate::edge::Edge;
use crate::error::PolygonError;
use crate::float::Float;
use crate::ground::{self, BodySummary};
use crate::observer::StepObserver;
use crate::particle::Particle;
use crate::spring::{Spring, SpringKind};
use crate::vec::{Vec, Vec2};
use std::vec::Vec as AllocVec;
use tracing::{debug, warn};

/// A soft polygon built from particles joined by distance constraints.
///
/// Springs and edges refer to particles by index, so `clone()` is a plain
/// deep copy. Particle `i` sits on the boundary ring between edges `i - 1`
/// and `i`.
#[derive(Clone, Debug)]
pub struct Polygon<F: Float> {
    particles: AllocVec<Particle<F>>,
    springs: AllocVec<Spring<F>>,
    edges: AllocVec<Edge>,
    collision_thickness: F,
}

impl<F: Float> Polygon<F> {
    /// Regular `sides`-gon inscribed in an ellipse with semi-axes
    /// `width / 2` and `height / 2`, first vertex at `rotation` radians.
    /// Every particle has unit mass.
    pub fn regular(
        center: Vec2<F>,
        sides: usize,
        width: F,
        height: F,
        rotation: F,
    ) -> Result<Self, PolygonError> {
        Self::regular_with_mass(center, sides, width, height, rotation, F::one())
    }

    /// Like [`Polygon::regular`] with a uniform per-particle mass.
    ///
    /// Springs: `sides` structural (`i -> i+1`); for four or more sides also
    /// `sides` shear (`i -> i-1`) and `sides` bending (`i -> i+2`) springs.
    pub fn regular_with_mass(
        center: Vec2<F>,
        sides: usize,
        width: F,
        height: F,
        rotation: F,
        particle_mass: F,
    ) -> Result<Self, PolygonError> {
        if let Err(err) = validate(center, sides, width, height, rotation, particle_mass) {
            warn!(%err, "rejected polygon");
            return Err(err);
        }

        let n = sides;
        let half_w = width * F::half();
        let half_h = height * F::half();
        let two_pi = F::two() * F::pi();

        let mut particles = AllocVec::with_capacity(n);
        for i in 0..n {
            let angle = two_pi * F::from_usize(i) / F::from_usize(n) + rotation;
            let offset = Vec2::new(half_w * angle.cos(), half_h * angle.sin());
            particles.push(Particle::new(center + offset, particle_mass));
        }

        let spring_count = if n >= 4 { 3 * n } else { n };
        let mut springs = AllocVec::with_capacity(spring_count);
        let mut edges = AllocVec::with_capacity(n);
        for i in 0..n {
            let j = (i + 1) % n;
            springs.push(Spring::from_particles(i, j, &particles, SpringKind::Structural));
            edges.push(Edge::new(i, j));
        }
        if n >= 4 {
            for i in 0..n {
                springs.push(Spring::from_particles(i, (i + n - 1) % n, &particles, SpringKind::Shear));
            }
            for i in 0..n {
                springs.push(Spring::from_particles(i, (i + 2) % n, &particles, SpringKind::Bending));
            }
        }

        let mut polygon = Polygon {
            particles,
            springs,
            edges,
            collision_thickness: F::zero(),
        };
        polygon.collision_thickness =
            polygon.min_edge_length() * F::from_f32(tuning::THICKNESS_FRACTION);
        debug!(
            sides = n,
            thickness = polygon.collision_thickness.to_f64(),
            "created polygon"
        );
        Ok(polygon)
    }

    fn min_edge_length(&self) -> F {
        let mut min: Option<F> = None;
        for edge in &self.edges {
            let (a, b) = edge.endpoints(&self.particles);
            let len = a.distance(b);
            min = Some(min.map_or(len, |m| m.min(len)));
        }
        min.unwrap_or_else(F::zero)
    }

    // ------------------------------------------------------------------
    // Per-tick phases
    // ------------------------------------------------------------------

    /// Phase 1: snapshot `prev_pos`, apply gravity and damping to velocity.
    pub fn apply_forces(&mut self, dt: F, gravity: Vec2<F>, damping: F) {
        for p in self.particles.iter_mut() {
            p.begin_step(dt, gravity, damping);
        }
    }

    /// Phase 2: advance positions to their tentative values.
    pub fn integrate(&mut self, dt: F) {
        for p in self.particles.iter_mut() {
            p.integrate(dt);
        }
    }

    /// Phase 4: Gauss-Seidel passes over every spring.
    pub fn relax_springs<O: StepObserver>(&mut self, iterations: usize, observer: &mut O) {
        for i in 0..iterations {
            for spring in self.springs.iter() {
                spring.relax(&mut self.particles);
            }
            observer.on_constraint_iteration(i);
        }
    }

    /// Phase 5.
    pub fn clamp_to_ground(&mut self, ground_y: F) {
        ground::clamp(&mut self.particles, ground_y);
    }

    /// Phase 6: velocity from the net displacement of the tick.
    pub fn resynthesize_velocities(&mut self, dt: F) {
        let dead_band = F::from_f32(tuning::VELOCITY_DEAD_BAND);
        for p in self.particles.iter_mut() {
            p.resynthesize_velocity(dt, dead_band);
        }
    }

    /// Phase 7: Coulomb friction for particles touching the ground, with the
    /// normal force raised by `mass_above` resting on this polygon.
    pub fn apply_ground_friction(&mut self, ground_y: F, config: &SimulationConfig<F>, mass_above: F) {
        let weight = (self.total_mass() + mass_above) * (-config.gravity.y).max(F::zero());
        ground::apply_friction(
            &mut self.particles,
            ground_y,
            weight,
            config.ground_friction,
            config.dt,
        );
    }

    /// Advance this polygon by one tick of `config.dt`.
    ///
    /// Collisions are resolved against every polygon in `neighbors`, which
    /// may have their particles moved as well. The caller is responsible for
    /// not listing `self` among the neighbours.
    pub fn step<O: StepObserver>(
        &mut self,
        config: &SimulationConfig<F>,
        neighbors: &mut [&mut Polygon<F>],
        observer: &mut O,
    ) {
        self.step_with_settled(config, neighbors, &[], observer);
    }

    /// [`Polygon::step`] where `settled` neighbours already resolved their
    /// contact with this polygon during the tick. They only count toward the
    /// load resting on it.
    pub fn step_with_settled<O: StepObserver>(
        &mut self,
        config: &SimulationConfig<F>,
        neighbors: &mut [&mut Polygon<F>],
        settled: &[&mut Polygon<F>],
        observer: &mut O,
    ) {
        let dt = config.dt;

        self.apply_forces(dt, config.gravity, config.damping);
        self.integrate(dt);
        observer.on_integrate();

        if !neighbors.is_empty() {
            for i in 0..config.collision_iterations {
                for other in neighbors.iter_mut() {
                    collision::resolve(self, other, config);
                }
                observer.on_collision_iteration(i);
            }
        }

        self.relax_springs(config.spring_iterations, observer);

        if let Some(ground_y) = config.ground_y {
            self.clamp_to_ground(ground_y);
        }

        self.resynthesize_velocities(dt);

        if let Some(ground_y) = config.ground_y {
            let me = self.summary();
            let others = neighbors.iter().chain(settled.iter()).map(|other| other.summary());
            let above = ground::mass_above(&me, others);
            self.apply_ground_friction(ground_y, config, above);
        }

        observer.on_step_complete();
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Mean of the particle positions.
    pub fn center(&self) -> Vec2<F> {
        if self.particles.is_empty() {
            return Vec2::zero();
        }
        let mut sum = Vec2::zero();
        for p in &self.particles {
            sum += p.pos;
        }
        sum.scale(F::one() / F::from_usize(self.particles.len()))
    }

    /// Largest distance from the center to any particle.
    pub fn bounding_radius(&self) -> F {
        let c = self.center();
        self.particles
            .iter()
            .fold(F::zero(), |r, p| r.max(p.pos.distance(c)))
    }

    pub fn total_mass(&self) -> F {
        self.particles.iter().fold(F::zero(), |m, p| m + p.mass)
    }

    /// Inverse of the total mass, or zero when any particle is fixed
    /// (a pinned polygon is immovable as a whole during contact).
    pub fn inverse_mass(&self) -> F {
        let mass = self.total_mass();
        if self.has_fixed_particles() || mass.is_near_zero(F::from_f32(1e-12)) {
            F::zero()
        } else {
            F::one() / mass
        }
    }

    pub fn has_fixed_particles(&self) -> bool {
        self.particles.iter().any(|p| p.fixed)
    }

    pub fn summary(&self) -> BodySummary<F> {
        BodySummary {
            center: self.center(),
            radius: self.bounding_radius(),
            mass: self.total_mass(),
        }
    }

    /// Ray-casting point-in-polygon test against the boundary ring, with
    /// every vertex pushed radially outward from the center by `extra_margin`.
    pub fn contains_point(&self, point: Vec2<F>, extra_margin: F) -> bool {
        let n = self.edges.len();
        if n < 3 {
            return false;
        }
        let c = self.center();
        let ring: AllocVec<Vec2<F>> = self
            .edges
            .iter()
            .map(|edge| {
                let v = self.particles[edge.a].pos;
                v + (v - c).normalize().scale(extra_margin)
            })
            .collect();

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = ring[i];
            let pj = ring[j];
            let dy = pj.y - pi.y;
            if !dy.is_near_zero(F::from_f32(1e-12))
                && ((pi.y > point.y) != (pj.y > point.y))
                && (point.x < (pj.x - pi.x) * (point.y - pi.y) / dy + pi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Spread a velocity impulse over the free particles, weighted by
    /// inverse distance to `point`. Weights are normalized to a mean of one,
    /// so with uniform masses the center moves with exactly `impulse`.
    pub fn apply_impulse_at(&mut self, point: Vec2<F>, impulse: Vec2<F>) {
        let softening = F::from_f32(tuning::IMPULSE_SOFTENING);
        let weight = |p: &Particle<F>| F::one() / (p.pos.distance(point) + softening);

        let mut total = F::zero();
        let mut free = 0usize;
        for p in self.particles.iter().filter(|p| !p.fixed) {
            total += weight(p);
            free += 1;
        }
        if free == 0 || total.is_near_zero(F::from_f32(1e-12)) {
            return;
        }

        let norm = F::from_usize(free) / total;
        for p in self.particles.iter_mut() {
            let w = weight(p) * norm;
            p.add_velocity(impulse.scale(w));
        }
    }

    /// Rigidly translate the polygon so its center lands on `target`.
    pub fn move_center_to(&mut self, target: Vec2<F>) {
        let delta = target - self.center();
        for p in self.particles.iter_mut() {
            p.translate(delta);
        }
    }

    /// Pin particle `index` in place.
    pub fn fix_particle(&mut self, index: usize) -> Result<(), PolygonError> {
        let count = self.particles.len();
        self.particles
            .get_mut(index)
            .ok_or(PolygonError::ParticleOutOfBounds { index, count })?
            .fix();
        Ok(())
    }

    pub fn release_particle(&mut self, index: usize) -> Result<(), PolygonError> {
        let count = self.particles.len();
        self.particles
            .get_mut(index)
            .ok_or(PolygonError::ParticleOutOfBounds { index, count })?
            .release();
        Ok(())
    }

    /// Largest absolute velocity over all particles.
    pub fn max_speed(&self) -> F {
        self.particles
            .iter()
            .fold(F::zero(), |s, p| s.max(p.velocity.length()))
    }

    pub fn positions(&self) -> AllocVec<Vec2<F>> {
        self.particles.iter().map(|p| p.pos).collect()
    }

    pub fn particles(&self) -> &[Particle<F>] { &self.particles }
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle<F>] { &mut self.particles }
    pub fn particle(&self, index: usize) -> Option<&Particle<F>> { self.particles.get(index) }
    pub fn springs(&self) -> &[Spring<F>] { &self.springs }
    pub fn edges(&self) -> &[Edge] { &self.edges }
    pub fn particle_count(&self) -> usize { self.particles.len() }
    pub fn collision_thickness(&self) -> F { self.collision_thickness }
}

fn validate<F: Float>(
    center: Vec2<F>,
    sides: usize,
    width: F,
    height: F,
    rotation: F,
    particle_mass: F,
) -> Result<(), PolygonError> {
    if sides < 3 {
        return Err(PolygonError::TooFewSides { sides });
    }
    if !center.is_finite() {
        return Err(PolygonError::NonFinite { what: "center" });
    }
    if !rotation.is_finite() {
        return Err(PolygonError::NonFinite { what: "rotation" });
    }
    if !(width.is_finite() && height.is_finite() && width > F::zero() && height > F::zero()) {
        return Err(PolygonError::InvalidDimensions {
            width: width.to_f64(),
            height: height.to_f64(),
        });
    }
    if !(particle_mass.is_finite() && particle_mass > F::zero()) {
        return Err(PolygonError::InvalidMass { mass: particle_mass.to_f64() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoOpStepObserver;

    fn square() -> Polygon<f64> {
        Polygon::regular(
            Vec2::new(0.0, 0.0),
            4,
            2.0,
            2.0,
            core::f64::consts::FRAC_PI_4,
        )
        .unwrap()
    }

    #[test]
    fn triangle_has_only_structural_springs() {
        let tri: Polygon<f32> = Polygon::regular(Vec2::new(0.0, 0.0), 3, 1.0, 1.0, 0.0).unwrap();
        assert_eq!(tri.particle_count(), 3);
        assert_eq!(tri.edges().len(), 3);
        assert_eq!(tri.springs().len(), 3);
        assert!(tri.springs().iter().all(|s| s.kind == SpringKind::Structural));
    }

    #[test]
    fn hexagon_spring_layout() {
        let hex: Polygon<f64> = Polygon::regular(Vec2::new(1.0, 1.0), 6, 1.0, 1.0, 0.0).unwrap();
        assert_eq!(hex.springs().len(), 18);
        for (i, edge) in hex.edges().iter().enumerate() {
            assert_eq!(edge.a, i);
            assert_eq!(edge.b, (i + 1) % 6);
        }
        let bending: AllocVec<_> = hex
            .springs()
            .iter()
            .filter(|s| s.kind == SpringKind::Bending)
            .collect();
        assert_eq!(bending.len(), 6);
        assert!(bending.iter().all(|s| s.b == (s.a + 2) % 6));
    }

    #[test]
    fn thickness_is_half_the_shortest_edge() {
        let sq = square();
        let side = 2.0f64.sqrt();
        assert!((sq.collision_thickness() - 0.5 * side).abs() < 1e-9);
    }

    #[test]
    fn degenerate_input_fails_fast() {
        let c = Vec2::new(0.0f64, 0.0);
        assert_eq!(
            Polygon::regular(c, 2, 1.0, 1.0, 0.0).unwrap_err(),
            PolygonError::TooFewSides { sides: 2 }
        );
        assert!(matches!(
            Polygon::regular(c, 4, 0.0, 1.0, 0.0),
            Err(PolygonError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Polygon::regular(c, 4, 1.0, -1.0, 0.0),
            Err(PolygonError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Polygon::regular(c, 4, f64::NAN, 1.0, 0.0),
            Err(PolygonError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Polygon::regular_with_mass(c, 4, 1.0, 1.0, 0.0, 0.0),
            Err(PolygonError::InvalidMass { .. })
        ));
        assert!(matches!(
            Polygon::regular(Vec2::new(f64::INFINITY, 0.0), 4, 1.0, 1.0, 0.0),
            Err(PolygonError::NonFinite { what: "center" })
        ));
    }

    #[test]
    fn queries() {
        let sq = square();
        let c = sq.center();
        assert!(c.x.abs() < 1e-12 && c.y.abs() < 1e-12);
        assert!((sq.bounding_radius() - 1.0).abs() < 1e-12);
        assert_eq!(sq.total_mass(), 4.0);
        assert_eq!(sq.inverse_mass(), 0.25);
    }

    #[test]
    fn contains_point_with_margin() {
        let sq = square();
        assert!(sq.contains_point(Vec2::new(0.0, 0.0), 0.0));
        assert!(sq.contains_point(Vec2::new(0.69, 0.0), 0.0));
        assert!(!sq.contains_point(Vec2::new(0.75, 0.0), 0.0));
        // Dilated by 0.2 along the diagonals, the side moves out by 0.2 / sqrt(2).
        assert!(sq.contains_point(Vec2::new(0.75, 0.0), 0.2));
        assert!(!sq.contains_point(Vec2::new(1.3, 0.0), 0.2));
    }

    #[test]
    fn move_center_to_translates_rigidly() {
        let mut sq = square();
        let before = sq.positions();
        sq.move_center_to(Vec2::new(3.0, -2.0));
        let c = sq.center();
        assert!((c.x - 3.0).abs() < 1e-12 && (c.y + 2.0).abs() < 1e-12);
        for (a, b) in before.iter().zip(sq.positions().iter()) {
            assert!((b.x - a.x - 3.0).abs() < 1e-12);
            assert!((b.y - a.y + 2.0).abs() < 1e-12);
        }
        let p = sq.particle(0).unwrap();
        assert_eq!(p.prev_pos, p.pos);
    }

    #[test]
    fn impulse_moves_center_by_impulse() {
        let mut sq = square();
        sq.apply_impulse_at(Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
        let mean_vx: f64 = sq.particles().iter().map(|p| p.velocity.x).sum::<f64>() / 4.0;
        assert!((mean_vx - 2.0).abs() < 1e-9);
        // The particle nearest the impulse point gets the largest share.
        let nearest = sq
            .particles()
            .iter()
            .map(|p| p.velocity.x)
            .fold(0.0, f64::max);
        assert!(nearest > 2.0);
    }

    #[test]
    fn fix_particle_bounds_checked() {
        let mut sq = square();
        assert!(sq.fix_particle(1).is_ok());
        assert!(sq.particle(1).unwrap().fixed);
        assert!(sq.particle(4).is_none());
        assert_eq!(sq.inverse_mass(), 0.0);
        assert_eq!(
            sq.fix_particle(9),
            Err(PolygonError::ParticleOutOfBounds { index: 9, count: 4 })
        );
        assert!(sq.release_particle(1).is_ok());
        assert!(!sq.particle(1).unwrap().fixed);
    }

    #[test]
    fn clone_is_independent() {
        let original = square();
        let mut copy = original.clone();
        copy.move_center_to(Vec2::new(5.0, 5.0));
        assert!(original.center().x.abs() < 1e-12);
        assert_eq!(copy.springs().len(), original.springs().len());
        assert_eq!(copy.edges(), original.edges());
    }

    #[test]
    fn step_without_ground_or_neighbours_is_free_fall() {
        let mut sq = square();
        let config = SimulationConfig::new()
            .without_ground()
            .with_damping(1.0)
            .with_gravity(Vec2::new(0.0, -10.0));
        sq.step(&config, &mut [], &mut NoOpStepObserver);
        let dt = config.dt;
        assert!((sq.center().y + 10.0 * dt * dt).abs() < 1e-9);
    }
}
