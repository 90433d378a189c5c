//! Scene management
//!
//! A [`World`] is what a game loop owns and renders: one [`Camera`] and an
//! ordered stack of [`Layer`](crate::render::Layer)s.

mod camera;
mod world;

pub use camera::Camera;
pub use world::World;
