//! # Sprite Engine
//!
//! Rendering-support toolkit for small 2D games. It does not rasterize;
//! it organizes what gets drawn, in which order, under which shared state.
//!
//! ## Features
//!
//! - **Resource caches**: lazy, reference-keyed caches with swappable
//!   factories, group tagging and disposal
//! - **Layers**: ordered renderable lists that stay safe to mutate while
//!   they are being drawn
//! - **Transforms**: bind/release state changes composed into groups
//! - **Nested loops**: a stack of game loops for pause menus and cut-scenes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sprite_engine::prelude::*;
//!
//! struct Title {
//!     world: World,
//! }
//!
//! impl GameLoop for Title {
//!     fn world(&self) -> &World {
//!         &self.world
//!     }
//!
//!     fn world_mut(&mut self) -> &mut World {
//!         &mut self.world
//!     }
//!
//!     fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
//!         if ctx.frame > 120 {
//!             return Ok(LoopControl::Finish);
//!         }
//!         Ok(LoopControl::Continue)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     config.init_logging();
//!     let title = Title { world: World::new(config.viewport()) };
//!     Engine::run(config, Box::new(title))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::must_use_candidate,
    clippy::cast_precision_loss
)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod scene;
pub mod runtime;

mod engine;

pub use engine::{AssetConfig, Engine, EngineConfig, EngineError, LoggingConfig, TimingConfig, WindowConfig};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineError,
        assets::{Cache, CacheError, Disposable, GroupedCache, Image, Referenced, Resources},
        config::Config,
        foundation::{
            collections::LockingCollection,
            math::{Color, Rect, Vec2},
        },
        render::{
            BlendMode, BlendTransform, DrawCommand, Layer, OffsetTransform, RenderBackend, RenderContext,
            RenderError, Renderable, RenderableHandle, SpriteFlags, Transform, TransformGroup, WeakRenderable,
        },
        runtime::{GameLoop, LoopControl, LoopError, TickContext},
        scene::{Camera, World},
    };
}
