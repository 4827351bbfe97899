//! Real-time 2D soft-body polygons.
//!
//! `softpoly` simulates deformable polygons made of point masses held
//! together by distance springs. Polygons collide with each other through a
//! separating-axis test with a contact skin, rest on a ground line with
//! Coulomb friction, and are advanced together by a [`World`].
//!
//! # Features
//!
//! - **Soft polygons**: regular n-gons with structural, shear and bending springs
//! - **Split integration**: forces, integration, contacts, springs, ground, velocity resynthesis
//! - **SAT contacts**: rigid separation by mass plus inelastic impulses with friction
//! - **Broad phase**: uniform spatial hash over polygon centers
//! - **Parallel ticks**: per-polygon phases run on `rayon`
//! - **Scene tools**: factories, presets, grab, flick, duplicate, erase
//! - **Observable**: Monitor physics steps via the `StepObserver` trait

pub mod float;
pub mod vec;
pub mod particle;
pub mod spring;
pub mod edge;
pub mod polygon;
pub mod collision;
pub mod ground;
pub mod factory;
pub mod spatial;
pub mod world;
pub mod scene;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Vec2};
pub use particle::Particle;
pub use spring::{Spring, SpringKind};
pub use edge::Edge;
pub use polygon::Polygon;
pub use collision::Contact;
pub use ground::BodySummary;
pub use factory::PolygonFactory;
pub use spatial::SpatialHashGrid;
pub use world::World;
pub use scene::SceneManager;
pub use config::SimulationConfig;
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::PolygonError;
