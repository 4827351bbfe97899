//! A scene of polygons advanced in lockstep.
//!
//! [`World::step`] runs the tick as a pipeline: forces and integration for
//! every polygon in parallel, then all collision rounds serially over the
//! broad-phase pairs (a contact mutates two polygons, so pairs sharing a
//! polygon cannot run concurrently), then springs, ground, velocity
//! resynthesis and friction in parallel again. The grid is rebuilt once per
//! tick and is read-only afterwards.

use crate::collision;
use crate::config::SimulationConfig;
use crate::float::Float;
use crate::ground::{self, BodySummary};
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::polygon::Polygon;
use crate::spatial::SpatialHashGrid;
use crate::vec::{Vec, Vec2};
use rayon::prelude::*;
use std::vec::Vec as AllocVec;
use tracing::{debug, trace};

/// Pulls shorter than this are ignored by [`World::grab`] and [`World::flick`].
const MIN_PULL: f32 = 1e-4;

pub struct World<F: Float> {
    polygons: AllocVec<Polygon<F>>,
    grid: SpatialHashGrid<F>,
    config: SimulationConfig<F>,
    ticks: u64,
}

impl<F: Float> World<F> {
    pub fn new(config: SimulationConfig<F>) -> Self {
        World {
            polygons: AllocVec::new(),
            grid: SpatialHashGrid::new(config.cell_size),
            config,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig<F> {
        &self.config
    }

    /// Replace the configuration. The grid picks up a new cell size on the next tick.
    pub fn set_config(&mut self, config: SimulationConfig<F>) {
        if config.cell_size != self.config.cell_size {
            self.grid = SpatialHashGrid::new(config.cell_size);
        }
        self.config = config;
    }

    pub fn add(&mut self, polygon: Polygon<F>) -> usize {
        self.polygons.push(polygon);
        self.polygons.len() - 1
    }

    pub fn extend<I: IntoIterator<Item = Polygon<F>>>(&mut self, polygons: I) {
        self.polygons.extend(polygons);
    }

    /// Swap in a fresh set of polygons (scene reset).
    pub fn replace(&mut self, polygons: AllocVec<Polygon<F>>) {
        debug!(count = polygons.len(), "replacing scene");
        self.polygons = polygons;
        self.grid.clear();
        self.ticks = 0;
    }

    pub fn remove(&mut self, index: usize) -> Option<Polygon<F>> {
        (index < self.polygons.len()).then(|| self.polygons.remove(index))
    }

    pub fn clear(&mut self) {
        self.polygons.clear();
        self.grid.clear();
    }

    pub fn polygons(&self) -> &[Polygon<F>] {
        &self.polygons
    }

    pub fn polygon(&self, index: usize) -> Option<&Polygon<F>> {
        self.polygons.get(index)
    }

    pub fn polygon_mut(&mut self, index: usize) -> Option<&mut Polygon<F>> {
        self.polygons.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Ticks run since creation or the last [`World::replace`].
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn grid(&self) -> &SpatialHashGrid<F> {
        &self.grid
    }

    pub fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (i, polygon) in self.polygons.iter().enumerate() {
            self.grid.insert(i, polygon);
        }
    }

    /// The configuration for this tick, with adaptive iteration counts applied.
    fn tick_config(&self) -> SimulationConfig<F> {
        let (springs, collisions) = self.config.iterations_for(self.polygons.len());
        self.config.clone().with_iterations(springs, collisions)
    }

    /// Advance every polygon by one tick.
    ///
    /// Collision rounds are reported as they finish and are skipped when the
    /// broad phase finds no pairs. Springs relax inside the parallel phase,
    /// so the spring-round notifications arrive together once that phase
    /// (springs, ground, velocities, friction) is done.
    pub fn step<O: StepObserver>(&mut self, observer: &mut O) {
        let config = self.tick_config();
        let dt = config.dt;

        self.rebuild_grid();
        let pairs = self.grid.candidate_pairs();

        self.polygons.par_iter_mut().for_each(|polygon| {
            polygon.apply_forces(dt, config.gravity, config.damping);
            polygon.integrate(dt);
        });
        observer.on_integrate();

        let mut contacts = 0usize;
        let rounds = if pairs.is_empty() { 0 } else { config.collision_iterations };
        for round in 0..rounds {
            for &(i, j) in &pairs {
                let (a, b) = pair_mut(&mut self.polygons, i, j);
                if collision::resolve(a, b, &config).is_some() {
                    contacts += 1;
                }
            }
            observer.on_collision_iteration(round);
        }

        let loads = self.resting_loads();
        self.polygons
            .par_iter_mut()
            .zip(loads.par_iter())
            .for_each(|(polygon, &above)| {
                polygon.relax_springs(config.spring_iterations, &mut NoOpStepObserver);
                if let Some(ground_y) = config.ground_y {
                    polygon.clamp_to_ground(ground_y);
                }
                polygon.resynthesize_velocities(dt);
                if let Some(ground_y) = config.ground_y {
                    polygon.apply_ground_friction(ground_y, &config, above);
                }
            });
        for round in 0..config.spring_iterations {
            observer.on_constraint_iteration(round);
        }

        self.ticks += 1;
        trace!(
            tick = self.ticks,
            polygons = self.polygons.len(),
            pairs = pairs.len(),
            contacts,
            "world step"
        );
        observer.on_step_complete();
    }

    /// Mass resting on each polygon, from its broad-phase neighbours.
    fn resting_loads(&self) -> AllocVec<F> {
        let summaries: AllocVec<BodySummary<F>> =
            self.polygons.par_iter().map(Polygon::summary).collect();
        (0..self.polygons.len())
            .into_par_iter()
            .map(|i| {
                let nearby = self.grid.nearby(i, &self.polygons[i]);
                ground::mass_above(&summaries[i], nearby.iter().map(|&j| summaries[j]))
            })
            .collect()
    }

    /// Advance one polygon at a time, each running its full
    /// [`Polygon::step`]. Later polygons see the contact corrections of
    /// earlier ones within the same tick.
    ///
    /// Polygon `i` resolves contacts only against grid neighbours with a
    /// higher index, so every pair is resolved `collision_iterations` times
    /// per tick. Lower-index neighbours still count toward its resting load.
    pub fn step_sequential<O: StepObserver>(&mut self, observer: &mut O) {
        let config = self.tick_config();
        self.rebuild_grid();

        for i in 0..self.polygons.len() {
            let nearby = self.grid.nearby(i, &self.polygons[i]);
            let lower = nearby.partition_point(|&j| j < i);
            if let Some((polygon, mut neighbors)) = split_out(&mut self.polygons, i, &nearby) {
                let (settled, pending) = neighbors.split_at_mut(lower);
                polygon.step_with_settled(&config, pending, settled, observer);
            }
        }
        self.ticks += 1;
    }

    /// Topmost (most recently added) polygon containing `point`.
    pub fn polygon_at(&self, point: Vec2<F>, margin: F) -> Option<usize> {
        self.polygons
            .iter()
            .rposition(|polygon| polygon.contains_point(point, margin))
    }

    /// Remove the topmost polygon under `point`.
    pub fn erase_at(&mut self, point: Vec2<F>, margin: F) -> Option<Polygon<F>> {
        let index = self.polygon_at(point, margin)?;
        self.remove(index)
    }

    /// Mean center of the listed polygons; out-of-range indices are ignored.
    pub fn group_center(&self, indices: &[usize]) -> Option<Vec2<F>> {
        let mut sum = Vec2::zero();
        let mut count = 0usize;
        for polygon in indices.iter().filter_map(|&i| self.polygons.get(i)) {
            sum += polygon.center();
            count += 1;
        }
        (count > 0).then(|| sum.scale(F::one() / F::from_usize(count)))
    }

    /// Clone the listed polygons around `target`, keeping each one's offset
    /// from the group center. Returns the indices of the copies.
    pub fn duplicate(&mut self, indices: &[usize], target: Vec2<F>) -> AllocVec<usize> {
        let Some(group_center) = self.group_center(indices) else {
            return AllocVec::new();
        };
        let copies: AllocVec<Polygon<F>> = indices
            .iter()
            .filter_map(|&i| self.polygons.get(i))
            .map(|polygon| {
                let mut copy = polygon.clone();
                copy.move_center_to(target + (polygon.center() - group_center));
                copy
            })
            .collect();

        let first = self.polygons.len();
        self.polygons.extend(copies);
        debug!(count = self.polygons.len() - first, "duplicated polygons");
        (first..self.polygons.len()).collect()
    }

    /// Spring-pull the listed polygons toward `target`.
    ///
    /// `anchor` is an offset from each polygon's center in units of its
    /// bounding radius; the pull acts at that point with strength
    /// `stiffness * distance * dt`.
    pub fn grab(&mut self, indices: &[usize], anchor: Vec2<F>, target: Vec2<F>, stiffness: F) {
        let dt = self.config.dt;
        for polygon in self.polygons_mut(indices) {
            let start = polygon.center() + anchor.scale(polygon.bounding_radius());
            let pull = target - start;
            if pull.length() > F::from_f32(MIN_PULL) {
                polygon.apply_impulse_at(start, pull.scale(stiffness * dt));
            }
        }
    }

    /// Slingshot release: each polygon is launched from its anchor point away
    /// from `release`, proportionally to the drag length.
    pub fn flick(&mut self, indices: &[usize], anchor: Vec2<F>, release: Vec2<F>, scale: F) {
        for polygon in self.polygons_mut(indices) {
            let start = polygon.center() + anchor.scale(polygon.bounding_radius());
            let dir = start - release;
            if dir.length() > F::from_f32(MIN_PULL) {
                polygon.apply_impulse_at(start, dir.scale(scale));
            }
        }
    }

    fn polygons_mut<'a>(&'a mut self, indices: &'a [usize]) -> impl Iterator<Item = &'a mut Polygon<F>> + 'a {
        self.polygons
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| indices.contains(i))
            .map(|(_, polygon)| polygon)
    }
}

impl<F: Float> Default for World<F> {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

/// Two distinct polygons borrowed mutably at once. Requires `i < j`.
fn pair_mut<F: Float>(polygons: &mut [Polygon<F>], i: usize, j: usize) -> (&mut Polygon<F>, &mut Polygon<F>) {
    let (head, tail) = polygons.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Borrow polygon `index` and the polygons listed in `others` disjointly.
/// `others` must be sorted, deduplicated and free of `index`.
fn split_out<'a, F: Float>(
    polygons: &'a mut [Polygon<F>],
    index: usize,
    others: &[usize],
) -> Option<(&'a mut Polygon<F>, AllocVec<&'a mut Polygon<F>>)> {
    let mut wanted: AllocVec<usize> = others.to_vec();
    wanted.push(index);
    wanted.sort_unstable();
    if wanted.last().map_or(true, |&last| last >= polygons.len()) {
        return None;
    }

    let mut this = None;
    let mut neighbors = AllocVec::with_capacity(others.len());
    let mut rest = polygons;
    let mut offset = 0;
    for k in wanted {
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(k.checked_sub(offset)?);
        let (item, tail) = tail.split_first_mut()?;
        rest = tail;
        offset = k + 1;
        if k == index {
            this = Some(item);
        } else {
            neighbors.push(item);
        }
    }
    this.map(|polygon| (polygon, neighbors))
}
