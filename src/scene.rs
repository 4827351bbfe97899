//! Named scene presets loaded into a [`World`].

use crate::error::PolygonError;
use crate::factory::PolygonFactory;
use crate::float::Float;
use crate::polygon::Polygon;
use crate::vec::Vec2;
use crate::world::World;
use std::collections::HashMap;
use std::vec::Vec as AllocVec;
use tracing::{debug, warn};

type SceneBuilder<F> = Box<dyn Fn() -> Result<AllocVec<Polygon<F>>, PolygonError> + Send + Sync>;

/// Registry of scene builders keyed by number.
///
/// Loading a scene replaces the world's polygons wholesale; the world's
/// configuration is left alone.
pub struct SceneManager<F: Float> {
    scenes: HashMap<u32, SceneBuilder<F>>,
}

impl<F: Float> SceneManager<F> {
    pub fn new() -> Self {
        SceneManager { scenes: HashMap::new() }
    }

    /// A 3x3 wall (1), a stack of four rectangles (2) and a 2x3 grid of hexagons (3).
    pub fn with_default_scenes() -> Self {
        let mut manager = Self::new();
        manager.register(1, || {
            PolygonFactory::wall(
                Vec2::new(F::from_f32(-1.2), F::from_f32(-0.8)),
                3,
                3,
                F::from_f32(0.4),
                F::from_f32(0.4),
                F::zero(),
            )
        });
        manager.register(2, || {
            PolygonFactory::stacked_rectangles(
                Vec2::new(F::zero(), F::from_f32(-0.8)),
                4,
                F::from_f32(0.2),
                F::from_f32(0.4),
                F::zero(),
            )
        });
        manager.register(3, || {
            PolygonFactory::grid_of_polygons(
                Vec2::new(F::zero(), F::half()),
                2,
                3,
                6,
                F::half(),
                F::half(),
                F::from_f32(0.1),
                F::from_f32(0.1),
            )
        });
        manager
    }

    /// Register `builder` under `key`, replacing any previous scene there.
    pub fn register<B>(&mut self, key: u32, builder: B)
    where
        B: Fn() -> Result<AllocVec<Polygon<F>>, PolygonError> + Send + Sync + 'static,
    {
        if self.scenes.insert(key, Box::new(builder)).is_some() {
            debug!(key, "scene replaced");
        }
    }

    pub fn contains(&self, key: u32) -> bool {
        self.scenes.contains_key(&key)
    }

    /// Registered keys in ascending order.
    pub fn keys(&self) -> AllocVec<u32> {
        let mut keys: AllocVec<u32> = self.scenes.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Build scene `key` without touching any world.
    pub fn build(&self, key: u32) -> Result<AllocVec<Polygon<F>>, PolygonError> {
        let builder = self.scenes.get(&key).ok_or(PolygonError::UnknownScene { key })?;
        builder()
    }

    /// Replace `world`'s polygons with scene `key`. On error the world is unchanged.
    pub fn load(&self, key: u32, world: &mut World<F>) -> Result<(), PolygonError> {
        let polygons = self.build(key).inspect_err(|err| warn!(key, %err, "scene load failed"))?;
        debug!(key, count = polygons.len(), "loading scene");
        world.replace(polygons);
        Ok(())
    }
}

impl<F: Float> Default for SceneManager<F> {
    fn default() -> Self {
        Self::with_default_scenes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn default_scene_sizes() {
        let scenes: SceneManager<f64> = SceneManager::with_default_scenes();
        assert_eq!(scenes.keys(), vec![1, 2, 3]);
        assert_eq!(scenes.build(1).unwrap().len(), 9);
        assert_eq!(scenes.build(2).unwrap().len(), 4);
        assert_eq!(scenes.build(3).unwrap().len(), 6);
    }

    #[test]
    fn unknown_scene_leaves_world_untouched() {
        let scenes: SceneManager<f64> = SceneManager::with_default_scenes();
        let mut world = World::new(SimulationConfig::new());
        scenes.load(2, &mut world).unwrap();
        assert_eq!(world.len(), 4);
        assert_eq!(
            scenes.load(42, &mut world),
            Err(PolygonError::UnknownScene { key: 42 })
        );
        assert_eq!(world.len(), 4);
    }

    #[test]
    fn custom_scene_overrides_preset() {
        let mut scenes: SceneManager<f32> = SceneManager::with_default_scenes();
        scenes.register(1, || {
            Ok(vec![PolygonFactory::regular_polygon(
                Vec2::new(0.0, 0.0),
                5,
                0.3,
                0.3,
                0.0,
            )?])
        });
        assert_eq!(scenes.build(1).unwrap().len(), 1);
    }
}
