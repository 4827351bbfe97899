use softpoly::{SceneManager, SimulationConfig, Vec2, World, NoOpStepObserver};

fn run_scene(key: u32, ticks: usize) -> Vec<Vec<Vec2<f64>>> {
    let scenes = SceneManager::with_default_scenes();
    let mut world = World::new(SimulationConfig::new());
    scenes.load(key, &mut world).unwrap();
    for _ in 0..ticks {
        world.step(&mut NoOpStepObserver);
    }
    world.polygons().iter().map(|p| p.positions()).collect()
}

#[test]
fn parallel_world_is_deterministic() {
    for key in [1, 2, 3] {
        let results: Vec<_> = (0..3).map(|_| run_scene(key, 90)).collect();
        for r in &results[1..] {
            assert_eq!(&results[0], r, "scene {} diverged", key);
        }
    }
}

#[test]
fn sequential_world_is_deterministic() {
    let run = || {
        let scenes = SceneManager::with_default_scenes();
        let mut world = World::new(SimulationConfig::<f32>::new());
        scenes.load(2, &mut world).unwrap();
        for _ in 0..90 {
            world.step_sequential(&mut NoOpStepObserver);
        }
        world.polygons().iter().map(|p| p.positions()).collect::<Vec<_>>()
    };
    let first = run();
    for _ in 0..3 {
        assert_eq!(first, run());
    }
}
