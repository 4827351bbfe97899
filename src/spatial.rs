//! Uniform-grid broad phase over polygon centers.

use crate::float::Float;
use crate::polygon::Polygon;
use crate::vec::Vec2;
use std::collections::HashMap;
use std::vec::Vec as AllocVec;

/// Integer cell coordinate `floor(center / cell_size)`.
pub type Cell = (i32, i32);

/// Buckets polygons by the cell holding their center.
///
/// Stores polygon indices only; the owner keeps the polygons. Meant to be
/// cleared and refilled every tick. Polygons clustered into one cell fall
/// back to all-pairs testing inside that cell.
#[derive(Clone, Debug)]
pub struct SpatialHashGrid<F: Float> {
    cell_size: F,
    cells: HashMap<Cell, AllocVec<usize>>,
    entries: AllocVec<(usize, Cell)>,
}

impl<F: Float> SpatialHashGrid<F> {
    /// `cell_size` should be at least the diameter of the largest polygon,
    /// otherwise touching polygons can land two cells apart.
    pub fn new(cell_size: F) -> Self {
        let cell_size = if cell_size > F::zero() { cell_size } else { F::one() };
        SpatialHashGrid {
            cell_size,
            cells: HashMap::new(),
            entries: AllocVec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
    }

    pub fn cell_of(&self, point: Vec2<F>) -> Cell {
        (
            (point.x / self.cell_size).floor().to_i32(),
            (point.y / self.cell_size).floor().to_i32(),
        )
    }

    /// Bucket polygon `index` by its current center.
    pub fn insert(&mut self, index: usize, polygon: &Polygon<F>) {
        let cell = self.cell_of(polygon.center());
        self.cells.entry(cell).or_default().push(index);
        self.entries.push((index, cell));
    }

    /// Indices in the 3x3 block of cells around `polygon`'s cell, without
    /// `index` itself. Sorted and free of duplicates.
    pub fn nearby(&self, index: usize, polygon: &Polygon<F>) -> AllocVec<usize> {
        let mut result = self.around(self.cell_of(polygon.center()));
        result.retain(|&other| other != index);
        result.sort_unstable();
        result.dedup();
        result
    }

    fn around(&self, (cx, cy): Cell) -> AllocVec<usize> {
        let mut found = AllocVec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) {
                    found.extend_from_slice(indices);
                }
            }
        }
        found
    }

    /// Every unordered pair `(i, j)`, `i < j`, whose cells are within
    /// Chebyshev distance 1. Each pair appears once.
    pub fn candidate_pairs(&self) -> AllocVec<(usize, usize)> {
        let mut pairs = AllocVec::new();
        for &(index, cell) in &self.entries {
            for other in self.around(cell) {
                if other > index {
                    pairs.push((index, other));
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    pub fn cell_size(&self) -> F {
        self.cell_size
    }

    /// Number of inserted polygons.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
