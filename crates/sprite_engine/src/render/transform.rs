//! Bind/release render-state transforms
//!
//! A [`Transform`] changes shared render state on `bind` and restores it on
//! `release`. [`TransformGroup`] sequences several transforms and is itself a
//! transform, so render scopes compose to any depth:
//!
//! ```text
//! bind(group[A, inner[B, C], D])    A.bind  B.bind  C.bind  D.bind
//! release(...)                      D.rel   C.rel   B.rel   A.rel
//! ```
//!
//! The group releases exactly what it bound, in reverse, even if members are
//! added or removed while it is bound (by a renderable drawing inside it).

use super::commands::BlendMode;
use super::context::RenderContext;
use crate::foundation::math::Vec2;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Paired render-state change
pub trait Transform {
    /// Apply the state change
    fn bind(&self, ctx: &mut RenderContext);

    /// Undo the state change made by the matching `bind`
    fn release(&self, ctx: &mut RenderContext);
}

/// Shared handle to a transform
pub type TransformHandle = Rc<dyn Transform>;

fn same_transform(a: &TransformHandle, b: &TransformHandle) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Binds a blend mode
#[derive(Debug)]
pub struct BlendTransform {
    mode: Cell<BlendMode>,
}

impl BlendTransform {
    /// Create a transform binding `mode`
    pub fn new(mode: BlendMode) -> Self {
        Self { mode: Cell::new(mode) }
    }

    /// Blend mode bound by this transform
    pub fn mode(&self) -> BlendMode {
        self.mode.get()
    }

    /// Change the mode for future binds
    pub fn set_mode(&self, mode: BlendMode) {
        self.mode.set(mode);
    }
}

impl Transform for BlendTransform {
    fn bind(&self, ctx: &mut RenderContext) {
        ctx.push_blend(self.mode.get());
    }

    fn release(&self, ctx: &mut RenderContext) {
        ctx.pop_blend();
    }
}

/// Binds a position offset
///
/// The offset is interior-mutable so a shared handle can be scrolled each
/// tick (parallax backgrounds, screen shake).
#[derive(Debug)]
pub struct OffsetTransform {
    offset: Cell<Vec2>,
}

impl OffsetTransform {
    /// Create a transform adding `offset` to everything drawn inside it
    pub fn new(offset: Vec2) -> Self {
        Self { offset: Cell::new(offset) }
    }

    /// Current offset
    pub fn offset(&self) -> Vec2 {
        self.offset.get()
    }

    /// Replace the offset for future binds
    pub fn set_offset(&self, offset: Vec2) {
        self.offset.set(offset);
    }

    /// Shift the offset by `delta`
    pub fn translate(&self, delta: Vec2) {
        self.offset.set(self.offset.get() + delta);
    }
}

impl Transform for OffsetTransform {
    fn bind(&self, ctx: &mut RenderContext) {
        ctx.push_offset(self.offset.get());
    }

    fn release(&self, ctx: &mut RenderContext) {
        ctx.pop_offset();
    }
}

/// Ordered set of transforms bound and released as one
#[derive(Default)]
pub struct TransformGroup {
    members: RefCell<Vec<TransformHandle>>,
    // Stack of transforms currently bound, one frame per outstanding bind.
    bound: RefCell<Vec<TransformHandle>>,
    frames: RefCell<Vec<usize>>,
}

impl TransformGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform; returns `false` if it is already a member
    pub fn add(&self, transform: TransformHandle) -> bool {
        let mut members = self.members.borrow_mut();
        if members.iter().any(|member| same_transform(member, &transform)) {
            return false;
        }
        members.push(transform);
        true
    }

    /// Remove a transform; returns whether it was a member
    pub fn remove(&self, transform: &TransformHandle) -> bool {
        let mut members = self.members.borrow_mut();
        match members.iter().position(|member| same_transform(member, transform)) {
            Some(index) => {
                members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `transform` is a member
    pub fn contains(&self, transform: &TransformHandle) -> bool {
        self.members.borrow().iter().any(|member| same_transform(member, transform))
    }

    /// Number of direct members
    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Whether a bind is outstanding
    pub fn is_bound(&self) -> bool {
        !self.frames.borrow().is_empty()
    }

    fn bound_at(&self, index: usize) -> TransformHandle {
        Rc::clone(&self.bound.borrow()[index])
    }

    fn pop_bound_above(&self, start: usize) -> Option<TransformHandle> {
        let mut bound = self.bound.borrow_mut();
        if bound.len() > start {
            bound.pop()
        } else {
            None
        }
    }
}

impl Transform for TransformGroup {
    fn bind(&self, ctx: &mut RenderContext) {
        let (start, end) = {
            let mut bound = self.bound.borrow_mut();
            let start = bound.len();
            bound.extend(self.members.borrow().iter().cloned());
            (start, bound.len())
        };
        self.frames.borrow_mut().push(start);

        // No borrow is held while members run, so they may touch this group.
        for index in start..end {
            self.bound_at(index).bind(ctx);
        }
    }

    fn release(&self, ctx: &mut RenderContext) {
        let Some(start) = self.frames.borrow_mut().pop() else {
            log::warn!("TransformGroup: release without matching bind");
            return;
        };
        while let Some(transform) = self.pop_bound_above(start) {
            transform.release(ctx);
        }
    }
}

impl fmt::Debug for TransformGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformGroup")
            .field("members", &self.members.borrow().len())
            .field("bound", &self.frames.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        journal: Journal,
    }

    impl Transform for Probe {
        fn bind(&self, _ctx: &mut RenderContext) {
            self.journal.borrow_mut().push(format!("+{}", self.name));
        }

        fn release(&self, _ctx: &mut RenderContext) {
            self.journal.borrow_mut().push(format!("-{}", self.name));
        }
    }

    fn probe(name: &'static str, journal: &Journal) -> TransformHandle {
        Rc::new(Probe { name, journal: Rc::clone(journal) })
    }

    fn ctx() -> RenderContext {
        RenderContext::new(Vec2::new(100.0, 100.0))
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.borrow().clone()
    }

    #[test]
    fn test_release_reverses_bind_order() {
        let journal = Journal::default();
        let group = TransformGroup::new();
        for name in ["a", "b", "c"] {
            assert!(group.add(probe(name, &journal)));
        }

        let mut ctx = ctx();
        group.bind(&mut ctx);
        group.release(&mut ctx);

        assert_eq!(entries(&journal), vec!["+a", "+b", "+c", "-c", "-b", "-a"]);
        assert!(!group.is_bound());
    }

    #[test]
    fn test_empty_group_is_a_no_op() {
        let group = TransformGroup::new();
        let mut ctx = ctx();
        group.bind(&mut ctx);
        assert!(group.is_bound());
        group.release(&mut ctx);
        assert_eq!(ctx.bind_depth(), (0, 0));
    }

    #[test]
    fn test_nested_groups_keep_stack_discipline() {
        let journal = Journal::default();
        let inner = Rc::new(TransformGroup::new());
        inner.add(probe("b", &journal));
        inner.add(probe("c", &journal));

        let outer = TransformGroup::new();
        outer.add(probe("a", &journal));
        outer.add(inner);
        outer.add(probe("d", &journal));

        let mut ctx = ctx();
        outer.bind(&mut ctx);
        outer.release(&mut ctx);

        assert_eq!(
            entries(&journal),
            vec!["+a", "+b", "+c", "+d", "-d", "-c", "-b", "-a"]
        );
    }

    #[test]
    fn test_duplicates_rejected_by_identity() {
        let journal = Journal::default();
        let group = TransformGroup::new();
        let a = probe("a", &journal);
        assert!(group.add(Rc::clone(&a)));
        assert!(!group.add(Rc::clone(&a)));
        assert!(group.add(probe("a", &journal)));
        assert_eq!(group.len(), 2);
        assert!(group.remove(&a));
        assert!(!group.contains(&a));
    }

    #[test]
    fn test_membership_change_while_bound_releases_what_was_bound() {
        let journal = Journal::default();
        let group = TransformGroup::new();
        let a = probe("a", &journal);
        group.add(Rc::clone(&a));

        let mut ctx = ctx();
        group.bind(&mut ctx);
        group.remove(&a);
        group.add(probe("late", &journal));
        group.release(&mut ctx);

        assert_eq!(entries(&journal), vec!["+a", "-a"]);

        journal.borrow_mut().clear();
        group.bind(&mut ctx);
        group.release(&mut ctx);
        assert_eq!(entries(&journal), vec!["+late", "-late"]);
    }

    #[test]
    fn test_offset_and_blend_restore_state() {
        let group = TransformGroup::new();
        group.add(Rc::new(OffsetTransform::new(Vec2::new(3.0, 4.0))));
        group.add(Rc::new(BlendTransform::new(BlendMode::Multiply)));

        let mut ctx = ctx();
        ctx.push_offset(Vec2::new(1.0, 1.0));
        group.bind(&mut ctx);
        assert_relative_eq!(ctx.offset().x, 4.0);
        assert_relative_eq!(ctx.offset().y, 5.0);
        assert_eq!(ctx.blend_mode(), BlendMode::Multiply);
        group.release(&mut ctx);

        assert_relative_eq!(ctx.offset().x, 1.0);
        assert_eq!(ctx.blend_mode(), BlendMode::Alpha);
        assert_eq!(ctx.bind_depth(), (0, 1));
    }

    #[test]
    fn test_same_group_bound_twice_unwinds_in_order() {
        let journal = Journal::default();
        let group = Rc::new(TransformGroup::new());
        group.add(probe("x", &journal));

        let mut ctx = ctx();
        group.bind(&mut ctx);
        group.bind(&mut ctx);
        group.release(&mut ctx);
        assert!(group.is_bound());
        group.release(&mut ctx);

        assert_eq!(entries(&journal), vec!["+x", "+x", "-x", "-x"]);
        assert!(!group.is_bound());
    }
}
