//! Polygon-polygon contact via the separating axis theorem.
//!
//! Each polygon is treated as a convex ring. The candidate axes are the edge
//! normals of both rings, oriented from A's center toward B's. A contact
//! exists when the gap on every axis is smaller than the contact skin
//! `max(thickness_a, thickness_b)`; the axis needing the least push becomes
//! the minimum translation vector.
//!
//! Resolution moves both polygons apart rigidly along the MTV (split by
//! inverse total mass), then exchanges inelastic normal and Coulomb friction
//! impulses between every pair of free particles.

use crate::config::{tuning, SimulationConfig};
use crate::float::Float;
use crate::particle::Particle;
use crate::polygon::Polygon;
use crate::vec::{Vec, Vec2};
use tracing::trace;

/// Result of a narrow-phase test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact<F: Float> {
    /// Unit MTV direction, pointing from A toward B.
    pub normal: Vec2<F>,
    /// Distance B must move relative to A along `normal` to restore the skin gap.
    pub depth: F,
}

fn edge_normals<'a, F: Float>(polygon: &'a Polygon<F>) -> impl Iterator<Item = Vec2<F>> + 'a {
    let particles = polygon.particles();
    polygon.edges().iter().filter_map(move |edge| {
        let (a, b) = edge.endpoints(particles);
        let dir = b - a;
        if dir.length_sq() < F::from_f32(1e-18) {
            return None;
        }
        Some(dir.perp().normalize())
    })
}

fn project<F: Float>(particles: &[Particle<F>], axis: Vec2<F>) -> (F, F) {
    let mut min = particles[0].pos.dot(axis);
    let mut max = min;
    for p in particles.iter().skip(1) {
        let d = p.pos.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Signed gap `min_b - max_a` on every oriented axis, as `(axis, gap)`.
fn axis_gaps<'a, F: Float>(
    a: &'a Polygon<F>,
    b: &'a Polygon<F>,
) -> impl Iterator<Item = (Vec2<F>, F)> + 'a {
    let towards_b = b.center() - a.center();
    edge_normals(a).chain(edge_normals(b)).map(move |axis| {
        let n = if axis.dot(towards_b) < F::zero() { -axis } else { axis };
        let (_, max_a) = project(a.particles(), n);
        let (min_b, _) = project(b.particles(), n);
        (n, min_b - max_a)
    })
}

/// Narrow-phase test without side effects.
pub fn find_contact<F: Float>(a: &Polygon<F>, b: &Polygon<F>) -> Option<Contact<F>> {
    if a.particle_count() < 3 || b.particle_count() < 3 {
        return None;
    }
    let skin = a.collision_thickness().max(b.collision_thickness());

    let mut best: Option<Contact<F>> = None;
    for (normal, gap) in axis_gaps(a, b) {
        let depth = skin - gap;
        if depth <= F::zero() {
            return None;
        }
        if best.map_or(true, |c| depth < c.depth) {
            best = Some(Contact { normal, depth });
        }
    }
    best
}

/// Largest signed gap between `a` and `b` over all SAT axes. Negative when
/// the rings overlap.
pub fn separation<F: Float>(a: &Polygon<F>, b: &Polygon<F>) -> Option<F> {
    axis_gaps(a, b).map(|(_, gap)| gap).reduce(|x, y| x.max(y))
}

/// Detect and resolve one contact between `a` and `b`.
///
/// Fixed particles have zero inverse mass: they are never moved and absorb
/// no impulse. When neither polygon can move the contact is reported but
/// left unresolved.
pub fn resolve<F: Float>(
    a: &mut Polygon<F>,
    b: &mut Polygon<F>,
    config: &SimulationConfig<F>,
) -> Option<Contact<F>> {
    let contact = find_contact(a, b)?;

    let wa = a.inverse_mass();
    let wb = b.inverse_mass();
    let w = wa + wb;
    if w.is_near_zero(F::from_f32(1e-12)) {
        trace!("contact between immovable polygons skipped");
        return Some(contact);
    }

    let shift_a = contact.normal.scale(-contact.depth * wa / w);
    let shift_b = contact.normal.scale(contact.depth * wb / w);
    for p in a.particles_mut() {
        p.nudge(shift_a);
    }
    for p in b.particles_mut() {
        p.nudge(shift_b);
    }

    exchange_impulses(a.particles_mut(), b.particles_mut(), contact.normal, config);
    Some(contact)
}

/// Restitution-zero normal impulse plus clamped tangential friction for every
/// pair of free particles across the contact.
fn exchange_impulses<F: Float>(
    pa: &mut [Particle<F>],
    pb: &mut [Particle<F>],
    normal: Vec2<F>,
    config: &SimulationConfig<F>,
) {
    let dt = config.dt;
    let tangent = normal.perp();
    let static_speed = F::from_f32(tuning::STATIC_SPEED);

    for i in 0..pa.len() {
        if pa[i].fixed {
            continue;
        }
        for j in 0..pb.len() {
            if pb[j].fixed {
                continue;
            }
            let wi = pa[i].inv_mass();
            let wj = pb[j].inv_mass();
            let w = wi + wj;
            if w.is_near_zero(F::from_f32(1e-12)) {
                continue;
            }

            let rel = pb[j].implicit_velocity(dt) - pa[i].implicit_velocity(dt);
            let vn = rel.dot(normal);
            if vn >= F::zero() {
                continue;
            }
            let jn = -vn / w;

            let vt = rel.dot(tangent);
            let mu = if vt.abs() < static_speed {
                config.static_friction
            } else {
                config.dynamic_friction
            };
            let cap = mu * jn;
            let jt = (-vt / w).clamp(-cap, cap);

            let impulse = normal.scale(jn) + tangent.scale(jt);
            pa[i].apply_velocity_change(impulse.scale(-wi), dt);
            pb[j].apply_velocity_change(impulse.scale(wj), dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_at(x: f64, y: f64) -> Polygon<f64> {
        Polygon::regular(Vec2::new(x, y), 4, 1.0, 1.0, core::f64::consts::FRAC_PI_4).unwrap()
    }

    #[test]
    fn distant_squares_do_not_touch() {
        let a = square_at(0.0, 0.0);
        let b = square_at(3.0, 0.0);
        assert!(find_contact(&a, &b).is_none());
        assert!(separation(&a, &b).unwrap() > 2.0);
    }

    #[test]
    fn overlapping_squares_report_mtv_toward_b() {
        let a = square_at(0.0, 0.0);
        let b = square_at(0.5, 0.1);
        let contact = find_contact(&a, &b).unwrap();
        assert!((contact.normal.x - 1.0).abs() < 1e-9);
        assert!(contact.normal.y.abs() < 1e-9);
        // side = 1/sqrt(2); overlap on x = side - 0.5, skin = side / 2
        let side = 0.5f64.sqrt();
        assert!((contact.depth - (side - 0.5 + side * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn resolve_splits_push_by_mass() {
        let mut a = Polygon::regular_with_mass(
            Vec2::new(0.0, 0.0), 4, 1.0, 1.0, core::f64::consts::FRAC_PI_4, 3.0,
        )
        .unwrap();
        let mut b = square_at(0.5, 0.0);
        let config = SimulationConfig::new();
        let contact = resolve(&mut a, &mut b, &config).unwrap();
        let moved_a = a.center().x.abs();
        let moved_b = b.center().x - 0.5;
        assert!((moved_a + moved_b - contact.depth).abs() < 1e-9);
        assert!((moved_b - 3.0 * moved_a).abs() < 1e-9);
    }

    #[test]
    fn pinned_polygon_stays_put() {
        let mut a = square_at(0.0, 0.0);
        a.fix_particle(0).unwrap();
        let before = a.positions();
        let mut b = square_at(0.4, 0.0);
        resolve(&mut a, &mut b, &SimulationConfig::new()).unwrap();
        assert_eq!(before, a.positions());
        assert!(b.center().x > 0.4);
    }

    #[test]
    fn closing_velocity_is_reduced_by_impulses() {
        let mut a = square_at(0.0, 0.0);
        let mut b = square_at(1.0, 0.0);
        let config = SimulationConfig::<f64>::new();
        let dt = config.dt;
        // B moving left into A at 20 m/s since the last snapshot.
        for p in b.particles_mut() {
            p.prev_pos = p.pos + Vec2::new(20.0 * dt, 0.0);
        }
        let mean_vx = |poly: &Polygon<f64>| {
            poly.particles().iter().map(|p| p.implicit_velocity(dt).x).sum::<f64>() / 4.0
        };
        resolve(&mut a, &mut b, &config).unwrap();
        let closing = mean_vx(&b) - mean_vx(&a);
        assert!(closing > -10.0, "closing speed barely changed: {}", closing);
        // Momentum is conserved by the impulse exchange.
        assert!((mean_vx(&a) + mean_vx(&b) + 20.0).abs() < 1e-6);
    }
}
