//! A loop's scene: camera plus ordered layers

use super::camera::Camera;
use crate::assets::Referenced;
use crate::foundation::collections::LockingCollection;
use crate::foundation::math::Vec2;
use crate::render::{Layer, RenderContext, RenderError, Transform};
use std::rc::Rc;

/// Camera and layer stack owned by one game loop
///
/// Layers render in the order they were added. The layer list is itself
/// mutation-safe, so a renderable may add or remove whole layers while the
/// world is being drawn.
#[derive(Debug)]
pub struct World {
    camera: Camera,
    layers: LockingCollection<Rc<Layer>>,
}

impl World {
    /// Create an empty world viewed through a `viewport`-sized camera
    pub fn new(viewport: Vec2) -> Self {
        Self {
            camera: Camera::new(viewport),
            layers: LockingCollection::new(),
        }
    }

    /// The world's camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Layer named `name`, created and appended if it does not exist
    ///
    /// During a render pass a layer created here is queued, and later calls
    /// with the same name return that queued instance.
    pub fn layer(&self, name: &str) -> Rc<Layer> {
        let existing = self
            .find_layer(name)
            .or_else(|| self.layers.find_pending(|layer| layer.reference() == name));
        if let Some(existing) = existing {
            return existing;
        }
        let layer = Rc::new(Layer::new(name));
        self.layers.add(Rc::clone(&layer));
        layer
    }

    /// Append a prepared layer; returns `false` if the name is taken
    pub fn add_layer(&self, layer: Rc<Layer>) -> bool {
        self.layers.add(layer)
    }

    /// Layer named `name`, if present
    pub fn find_layer(&self, name: &str) -> Option<Rc<Layer>> {
        self.layers.find(|layer| layer.reference() == name)
    }

    /// Remove the layer named `name`
    pub fn remove_layer(&self, name: &str) -> bool {
        match self.find_layer(name) {
            Some(layer) => self.layers.remove(&layer),
            None => false,
        }
    }

    /// Layer names in render order
    pub fn layer_names(&self) -> Vec<String> {
        self.layers
            .to_vec()
            .iter()
            .map(|layer| layer.reference().to_string())
            .collect()
    }

    /// Number of layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Bind the camera and render every layer in order
    pub fn render(&self, ctx: &mut RenderContext) -> Result<(), RenderError> {
        self.camera.bind(ctx);
        let result = self.layers.try_for_each(|layer| layer.render(ctx));
        self.camera.release(ctx);
        result
    }
}
