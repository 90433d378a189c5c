//! Renderable objects and the handles layers hold them by

use super::context::RenderContext;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Anything that can draw itself
pub trait Renderable {
    /// Submit this object's draw commands
    fn draw(&mut self, ctx: &mut RenderContext);
}

/// Shared, identity-compared handle to a renderable
///
/// Two handles are equal only if they point at the same object, which is how
/// layers keep their contents duplicate-free.
#[derive(Clone)]
pub struct RenderableHandle(Rc<RefCell<dyn Renderable>>);

impl RenderableHandle {
    /// Wrap a renderable in a new handle
    pub fn new<R: Renderable + 'static>(renderable: R) -> Self {
        Self(Rc::new(RefCell::new(renderable)))
    }

    /// Create a handle to an object the game also keeps for updates
    pub fn from_shared<R: Renderable + 'static>(shared: Rc<RefCell<R>>) -> Self {
        Self(shared)
    }

    /// Draw the underlying object
    ///
    /// An object that is already mutably borrowed (it is drawing itself
    /// through another handle) is skipped.
    pub fn draw(&self, ctx: &mut RenderContext) {
        match self.0.try_borrow_mut() {
            Ok(mut renderable) => renderable.draw(ctx),
            Err(_) => log::warn!("Renderable is already borrowed; skipping draw"),
        }
    }

    /// Non-owning handle, used by objects that need to refer to themselves
    pub fn downgrade(&self) -> WeakRenderable {
        WeakRenderable(Rc::downgrade(&self.0))
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for RenderableHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for RenderableHandle {}

impl fmt::Debug for RenderableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderableHandle({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// Weak counterpart of [`RenderableHandle`]
#[derive(Clone)]
pub struct WeakRenderable(Weak<RefCell<dyn Renderable>>);

struct Detached;

impl Renderable for Detached {
    fn draw(&mut self, _ctx: &mut RenderContext) {}
}

impl Default for WeakRenderable {
    /// A handle that never upgrades
    fn default() -> Self {
        Self(Weak::<RefCell<Detached>>::new())
    }
}

impl WeakRenderable {
    /// Recover a strong handle if the object is still alive
    pub fn upgrade(&self) -> Option<RenderableHandle> {
        self.0.upgrade().map(RenderableHandle)
    }
}

impl fmt::Debug for WeakRenderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakRenderable")
    }
}
