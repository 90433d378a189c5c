//! Named, mutation-safe rendering buckets
//!
//! A layer owns the render scheduling of its renderables, not their lifetime:
//! the same handle may sit on several layers, and dropping a layer leaves the
//! objects alive for whoever else holds them.

use super::context::RenderContext;
use super::renderable::RenderableHandle;
use super::transform::{Transform, TransformGroup, TransformHandle};
use super::RenderError;
use crate::assets::Referenced;
use crate::foundation::collections::LockingCollection;
use std::cell::Cell;
use std::fmt;

/// Renderables drawn together under one set of transforms
pub struct Layer {
    reference: String,
    renderables: LockingCollection<RenderableHandle>,
    transforms: TransformGroup,
    visible: Cell<bool>,
}

impl Layer {
    /// Create an empty, visible layer
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            renderables: LockingCollection::new(),
            transforms: TransformGroup::new(),
            visible: Cell::new(true),
        }
    }

    /// Builder-style [`TransformGroup::add`]
    pub fn with_transform(self, transform: TransformHandle) -> Self {
        self.transforms.add(transform);
        self
    }

    /// Transforms bound around every render of this layer
    pub fn transforms(&self) -> &TransformGroup {
        &self.transforms
    }

    /// Schedule a renderable; returns `false` if it is already on the layer
    ///
    /// Added during this layer's render, it is first drawn next frame.
    pub fn add(&self, renderable: RenderableHandle) -> bool {
        self.renderables.add(renderable)
    }

    /// Unschedule a renderable
    ///
    /// Removed during this layer's render, it is still drawn this frame.
    pub fn remove(&self, renderable: &RenderableHandle) -> bool {
        self.renderables.remove(renderable)
    }

    /// Whether `renderable` is scheduled (pending changes excluded)
    pub fn contains(&self, renderable: &RenderableHandle) -> bool {
        self.renderables.contains(renderable)
    }

    /// Unschedule everything
    pub fn clear(&self) {
        self.renderables.clear();
    }

    /// Number of scheduled renderables
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    /// Whether nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Whether the layer draws
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Show or hide the layer
    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    /// Bind transforms, draw every renderable, release transforms
    pub fn render(&self, ctx: &mut RenderContext) -> Result<(), RenderError> {
        if !self.visible.get() {
            return Ok(());
        }
        self.transforms.bind(ctx);
        let drawn = self.renderables.for_each(|renderable| renderable.draw(ctx));
        self.transforms.release(ctx);
        drawn?;
        Ok(())
    }
}

impl Referenced for Layer {
    fn reference(&self) -> &str {
        &self.reference
    }
}

/// Layers are identified by name
impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("reference", &self.reference)
            .field("renderables", &self.renderables.len())
            .field("transforms", &self.transforms)
            .field("visible", &self.visible.get())
            .finish()
    }
}
