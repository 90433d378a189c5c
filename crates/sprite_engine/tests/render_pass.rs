//! Integration tests for layers, transforms and worlds rendering together
//!
//! Covers the cases that only show up when renderables mutate the structures
//! that are drawing them.

use sprite_engine::foundation::collections::CollectionError;
use sprite_engine::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Draws a marker rect at `x` and counts its draws
struct Marker {
    x: f32,
    draws: Rc<Cell<u32>>,
}

impl Renderable for Marker {
    fn draw(&mut self, ctx: &mut RenderContext) {
        ctx.fill_rect(Rect::new(self.x, 0.0, 1.0, 1.0), Color::WHITE);
        self.draws.set(self.draws.get() + 1);
    }
}

fn marker(x: f32) -> (RenderableHandle, Rc<Cell<u32>>) {
    let draws = Rc::new(Cell::new(0));
    let handle = RenderableHandle::new(Marker {
        x,
        draws: Rc::clone(&draws),
    });
    (handle, draws)
}

/// Removes itself from its layer after `lifetime` draws
struct Expiring {
    me: WeakRenderable,
    layer: Weak<Layer>,
    lifetime: u32,
}

impl Renderable for Expiring {
    fn draw(&mut self, ctx: &mut RenderContext) {
        ctx.draw_line(Vec2::zeros(), Vec2::new(1.0, 1.0), Color::WHITE);
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            if let (Some(me), Some(layer)) = (self.me.upgrade(), self.layer.upgrade()) {
                assert!(layer.remove(&me));
            }
        }
    }
}

fn expiring(layer: &Rc<Layer>, lifetime: u32) -> RenderableHandle {
    let shared = Rc::new(RefCell::new(Expiring {
        me: WeakRenderable::default(),
        layer: Rc::downgrade(layer),
        lifetime,
    }));
    let handle = RenderableHandle::from_shared(Rc::clone(&shared));
    shared.borrow_mut().me = handle.downgrade();
    handle
}

/// Spawns a marker onto its layer on first draw
struct Spawner {
    layer: Weak<Layer>,
    spawned: Option<RenderableHandle>,
}

impl Renderable for Spawner {
    fn draw(&mut self, _ctx: &mut RenderContext) {
        if self.spawned.is_none() {
            let (child, _) = marker(50.0);
            if let Some(layer) = self.layer.upgrade() {
                layer.add(child.clone());
            }
            self.spawned = Some(child);
        }
    }
}

/// Tries to render its own layer while being drawn
struct Recursive {
    layer: Weak<Layer>,
    outcome: Rc<RefCell<Option<Result<(), RenderError>>>>,
}

impl Renderable for Recursive {
    fn draw(&mut self, ctx: &mut RenderContext) {
        if let Some(layer) = self.layer.upgrade() {
            *self.outcome.borrow_mut() = Some(layer.render(ctx));
        }
    }
}

fn render(layer: &Layer) -> Vec<DrawCommand> {
    let mut ctx = RenderContext::new(Vec2::new(100.0, 100.0));
    layer.render(&mut ctx).unwrap();
    assert_eq!(ctx.bind_depth(), (0, 0));
    ctx.take_commands()
}

#[test]
fn test_self_removal_during_draw_applies_after_pass() {
    let layer = Rc::new(Layer::new("actors"));
    let (first, first_draws) = marker(0.0);
    let (last, last_draws) = marker(2.0);
    layer.add(first);
    layer.add(expiring(&layer, 1));
    layer.add(last);

    // Everyone present at the start of the pass draws, including the one leaving
    assert_eq!(render(&layer).len(), 3);
    assert_eq!(layer.len(), 2);
    assert_eq!((first_draws.get(), last_draws.get()), (1, 1));

    assert_eq!(render(&layer).len(), 2);
    assert_eq!((first_draws.get(), last_draws.get()), (2, 2));
}

#[test]
fn test_expiring_renderable_lives_exact_lifetime() {
    let layer = Rc::new(Layer::new("bullets"));
    layer.add(expiring(&layer, 3));

    let drawn: Vec<usize> = (0..5).map(|_| render(&layer).len()).collect();
    assert_eq!(drawn, vec![1, 1, 1, 0, 0]);
    assert!(layer.is_empty());
}

#[test]
fn test_add_during_draw_waits_for_next_frame() {
    let layer = Rc::new(Layer::new("actors"));
    layer.add(RenderableHandle::new(Spawner {
        layer: Rc::downgrade(&layer),
        spawned: None,
    }));

    assert!(render(&layer).is_empty());
    assert_eq!(layer.len(), 2);
    assert_eq!(render(&layer).len(), 1);
}

#[test]
fn test_recursive_layer_render_is_rejected() {
    let layer = Rc::new(Layer::new("ui"));
    let outcome = Rc::new(RefCell::new(None));
    layer.add(RenderableHandle::new(Recursive {
        layer: Rc::downgrade(&layer),
        outcome: Rc::clone(&outcome),
    }));

    let mut ctx = RenderContext::new(Vec2::new(10.0, 10.0));
    layer.render(&mut ctx).unwrap();

    assert!(matches!(
        outcome.borrow_mut().take(),
        Some(Err(RenderError::Collection(CollectionError::ReentrantIteration)))
    ));
    // The outer pass unlocked normally
    let (extra, _) = marker(1.0);
    assert!(layer.add(extra));
    assert_eq!(layer.len(), 2);
}

#[test]
fn test_layer_transforms_wrap_every_draw() {
    let offset = Rc::new(OffsetTransform::new(Vec2::new(10.0, 5.0)));
    let layer = Layer::new("hud")
        .with_transform(offset.clone())
        .with_transform(Rc::new(BlendTransform::new(BlendMode::Additive)));
    let (sprite, _) = marker(1.0);
    layer.add(sprite);

    let commands = render(&layer);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].blend(), BlendMode::Additive);
    assert_eq!(commands[0].position(), Vec2::new(11.0, 5.0));

    offset.translate(Vec2::new(-10.0, 0.0));
    assert_eq!(render(&layer)[0].position(), Vec2::new(1.0, 5.0));
}

#[test]
fn test_hidden_layer_draws_nothing() {
    let layer = Layer::new("debug");
    let (sprite, draws) = marker(0.0);
    layer.add(sprite);
    layer.set_visible(false);

    assert!(render(&layer).is_empty());
    assert_eq!(draws.get(), 0);
}

#[test]
fn test_renderable_on_two_layers_draws_twice() {
    let background = Layer::new("background");
    let foreground = Layer::new("foreground");
    let (shared, draws) = marker(0.0);
    background.add(shared.clone());
    foreground.add(shared.clone());
    assert!(!foreground.add(shared.clone()));

    render(&background);
    render(&foreground);
    assert_eq!(draws.get(), 2);

    drop(background);
    assert!(foreground.contains(&shared));
}

#[test]
fn test_world_renders_layers_in_order_through_camera() {
    let mut world = World::new(Vec2::new(100.0, 100.0));
    let background = world.layer("background");
    let actors = world.layer("actors");
    assert!(Rc::ptr_eq(&world.layer("background"), &background));

    let (far, _) = marker(0.0);
    let (near, _) = marker(1.0);
    actors.add(near);
    background.add(far);
    world.camera_mut().pan(Vec2::new(5.0, 0.0));

    let mut ctx = RenderContext::new(Vec2::new(100.0, 100.0));
    world.render(&mut ctx).unwrap();
    let xs: Vec<f32> = ctx.commands().iter().map(|command| command.position().x).collect();
    assert_eq!(xs, vec![-5.0, -4.0]);
    assert_eq!(ctx.bind_depth(), (0, 0));
    assert_eq!(world.layer_names(), vec!["background", "actors"]);

    assert!(world.remove_layer("background"));
    assert_eq!(world.layer_count(), 1);
}

/// Fetches the same layer by name twice while the world is drawing
struct LayerFetcher {
    world: Weak<World>,
    fetched: Rc<RefCell<Vec<Rc<Layer>>>>,
}

impl Renderable for LayerFetcher {
    fn draw(&mut self, _ctx: &mut RenderContext) {
        if let Some(world) = self.world.upgrade() {
            let mut fetched = self.fetched.borrow_mut();
            fetched.push(world.layer("fx"));
            fetched.push(world.layer("fx"));
        }
    }
}

#[test]
fn test_layer_created_during_pass_is_shared_by_name() {
    let world = Rc::new(World::new(Vec2::new(100.0, 100.0)));
    let fetched = Rc::new(RefCell::new(Vec::new()));
    world.layer("base").add(RenderableHandle::new(LayerFetcher {
        world: Rc::downgrade(&world),
        fetched: Rc::clone(&fetched),
    }));

    let mut ctx = RenderContext::new(Vec2::new(100.0, 100.0));
    world.render(&mut ctx).unwrap();

    let stored = world.find_layer("fx").unwrap();
    let fetched = fetched.borrow();
    assert_eq!(fetched.len(), 2);
    assert!(fetched.iter().all(|layer| Rc::ptr_eq(layer, &stored)));
    assert_eq!(world.layer_names(), vec!["base", "fx"]);

    // Renderables added through either handle are drawn next frame
    let (spark, draws) = marker(3.0);
    fetched[1].add(spark);
    drop(fetched);
    world.render(&mut ctx).unwrap();
    assert_eq!(draws.get(), 1);
}
