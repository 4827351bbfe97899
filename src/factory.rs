//! Scene-building constructors. Deterministic and free of physics state.

use crate::error::PolygonError;
use crate::float::Float;
use crate::polygon::Polygon;
use crate::vec::Vec2;
use std::vec::Vec as AllocVec;

/// Lays out canonical shapes and multi-polygon arrangements.
pub struct PolygonFactory;

impl PolygonFactory {
    pub fn regular_polygon<F: Float>(
        center: Vec2<F>,
        sides: usize,
        width: F,
        height: F,
        rotation: F,
    ) -> Result<Polygon<F>, PolygonError> {
        Polygon::regular(center, sides, width, height, rotation)
    }

    /// A 4-gon turned by 45 degrees, so its sides are axis-aligned. The
    /// resulting box measures `width / sqrt(2)` by `height / sqrt(2)`.
    pub fn rectangle<F: Float>(center: Vec2<F>, width: F, height: F) -> Result<Polygon<F>, PolygonError> {
        let quarter_turn = F::pi() / F::from_f32(4.0);
        Polygon::regular(center, 4, width, height, quarter_turn)
    }

    /// `count` rectangles stacked upward from `base`.
    pub fn stacked_rectangles<F: Float>(
        base: Vec2<F>,
        count: usize,
        width: F,
        height: F,
        spacing: F,
    ) -> Result<AllocVec<Polygon<F>>, PolygonError> {
        (0..count)
            .map(|i| {
                let offset = Vec2::new(F::zero(), F::from_usize(i) * (height + spacing));
                Self::rectangle(base + offset, width, height)
            })
            .collect()
    }

    /// `rows` x `cols` rectangles, row 0 at `base`, growing right and up.
    pub fn wall<F: Float>(
        base: Vec2<F>,
        rows: usize,
        cols: usize,
        width: F,
        height: F,
        spacing: F,
    ) -> Result<AllocVec<Polygon<F>>, PolygonError> {
        let mut polygons = AllocVec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let offset = Vec2::new(
                    F::from_usize(col) * (width + spacing),
                    F::from_usize(row) * (height + spacing),
                );
                polygons.push(Self::rectangle(base + offset, width, height)?);
            }
        }
        Ok(polygons)
    }

    /// `rows` x `cols` unrotated regular `sides`-gons.
    #[allow(clippy::too_many_arguments)]
    pub fn grid_of_polygons<F: Float>(
        base: Vec2<F>,
        rows: usize,
        cols: usize,
        sides: usize,
        width: F,
        height: F,
        spacing_x: F,
        spacing_y: F,
    ) -> Result<AllocVec<Polygon<F>>, PolygonError> {
        let mut polygons = AllocVec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let offset = Vec2::new(
                    F::from_usize(col) * (width + spacing_x),
                    F::from_usize(row) * (height + spacing_y),
                );
                polygons.push(Polygon::regular(base + offset, sides, width, height, F::zero())?);
            }
        }
        Ok(polygons)
    }
}
