//! Rendering support
//!
//! The engine does not rasterize. It organizes *what* is drawn and under
//! *which* shared state:
//!
//! ```text
//! Layer ──bind──▶ TransformGroup ──▶ RenderContext (blend / offset stacks)
//!   │
//!   └─for_each─▶ Renderable::draw ──▶ DrawCommand list ──▶ RenderBackend
//! ```

mod backend;
mod commands;
mod context;
mod layer;
mod renderable;
mod transform;

pub use backend::{BackendResult, LogBackend, NullBackend, RenderBackend};
pub use commands::{BlendMode, DrawCommand, SpriteFlags};
pub use context::RenderContext;
pub use layer::Layer;
pub use renderable::{Renderable, RenderableHandle, WeakRenderable};
pub use transform::{BlendTransform, OffsetTransform, Transform, TransformGroup, TransformHandle};

use crate::foundation::collections::CollectionError;
use thiserror::Error;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// A layer or world was rendered from inside its own render pass
    #[error("Render pass error: {0}")]
    Collection(#[from] CollectionError),

    /// The backend failed to present a frame
    #[error("Backend error: {0}")]
    Backend(String),
}
