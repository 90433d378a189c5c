//! Parallax layers, procedural sprites and renderables that retire themselves
//!
//! Run with `cargo run --bin layers_demo`; `RUST_LOG=debug` also shows the
//! image cache at work.

use demo_app::AsciiBackend;
use rand::rngs::ThreadRng;
use rand::Rng;
use sprite_engine::prelude::*;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Demo length
const FRAMES: u64 = 240;
/// A comet is launched this often
const LAUNCH_INTERVAL: u64 = 15;

/// Sprite that flies across the sky and removes itself from its layer
struct Comet {
    me: WeakRenderable,
    layer: Weak<Layer>,
    image: Rc<Image>,
    position: Vec2,
    velocity: Vec2,
    ttl: u32,
}

impl Comet {
    fn launch(layer: &Rc<Layer>, image: Rc<Image>, position: Vec2, velocity: Vec2, ttl: u32) {
        let shared = Rc::new(RefCell::new(Self {
            me: WeakRenderable::default(),
            layer: Rc::downgrade(layer),
            image,
            position,
            velocity,
            ttl,
        }));
        let handle = RenderableHandle::from_shared(Rc::clone(&shared));
        shared.borrow_mut().me = handle.downgrade();
        layer.add(handle);
    }
}

impl Renderable for Comet {
    fn draw(&mut self, ctx: &mut RenderContext) {
        ctx.draw_sprite(&self.image, self.position, SpriteFlags::FLIP_X);
        self.position += self.velocity;
        self.ttl = self.ttl.saturating_sub(1);
        if self.ttl == 0 {
            // Still drawn this frame; gone from the next one
            if let (Some(me), Some(layer)) = (self.me.upgrade(), self.layer.upgrade()) {
                layer.remove(&me);
                log::debug!("Comet retired");
            }
        }
    }
}

/// Static star pattern, scrolled by its layer's offset
struct Stars {
    points: Vec<Vec2>,
    span: f32,
}

impl Renderable for Stars {
    fn draw(&mut self, ctx: &mut RenderContext) {
        for point in &self.points {
            for copy in [0.0, self.span] {
                ctx.fill_rect(Rect::new(point.x + copy, point.y, 1.0, 1.0), Color::WHITE);
            }
        }
    }
}

struct LayersDemo {
    world: World,
    viewport: Vec2,
    far: Rc<OffsetTransform>,
    near: Rc<OffsetTransform>,
    sky: Rc<Layer>,
    rng: ThreadRng,
}

impl LayersDemo {
    fn new(viewport: Vec2) -> Self {
        let mut rng = rand::thread_rng();
        let world = World::new(viewport);

        let far = Rc::new(OffsetTransform::new(Vec2::zeros()));
        let near = Rc::new(OffsetTransform::new(Vec2::zeros()));
        for (name, transform, count) in [("far", &far, 12), ("near", &near, 6)] {
            let points = (0..count)
                .map(|_| Vec2::new(rng.gen_range(0.0..viewport.x), rng.gen_range(0.0..viewport.y)))
                .collect();
            let layer = Layer::new(name).with_transform(transform.clone());
            layer.add(RenderableHandle::new(Stars { points, span: viewport.x }));
            world.add_layer(Rc::new(layer));
        }

        let sky = Rc::new(Layer::new("sky").with_transform(Rc::new(BlendTransform::new(BlendMode::Additive))));
        world.add_layer(Rc::clone(&sky));

        Self {
            world,
            viewport,
            far,
            near,
            sky,
            rng,
        }
    }

    fn scroll(&self, transform: &OffsetTransform, speed: f32, dt: f32) {
        transform.translate(Vec2::new(-speed * dt, 0.0));
        if transform.offset().x <= -self.viewport.x {
            transform.translate(Vec2::new(self.viewport.x, 0.0));
        }
    }
}

impl GameLoop for LayersDemo {
    fn name(&self) -> &str {
        "layers-demo"
    }

    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn on_start(&mut self, resources: &mut Resources) -> Result<(), LoopError> {
        // Comets are generated, not loaded: "comet-8" is an 8x8 sprite
        resources.images.set_factory(|reference: &str| {
            let size = reference.strip_prefix("comet-")?.parse::<u32>().ok()?;
            Some(Image::solid(reference, size, size, [255, 200, 80, 255]))
        });
        log::info!("Layers demo: {} layers", self.world.layer_count());
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
        if ctx.frame >= FRAMES {
            log::info!("{} comet sprites cached", ctx.resources.images.len());
            return Ok(LoopControl::Finish);
        }

        self.scroll(&self.far, 20.0, ctx.delta_time);
        self.scroll(&self.near, 60.0, ctx.delta_time);

        if ctx.frame % LAUNCH_INTERVAL == 0 {
            let size = self.rng.gen_range(6..=12);
            let image = ctx.resources.image(&format!("comet-{}", size))?;
            let start = Vec2::new(self.viewport.x, self.rng.gen_range(0.0..self.viewport.y * 0.6));
            let velocity = Vec2::new(-self.rng.gen_range(2.0..5.0), self.rng.gen_range(0.0..0.8));
            Comet::launch(&self.sky, image, start, velocity, 60);
        }
        Ok(LoopControl::Continue)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = EngineConfig::default();
    config.window.title = "Layers demo".to_string();
    config.window.width = 320;
    config.window.height = 160;
    config.timing.ticks_per_second = 30;

    let backend = AsciiBackend::new(config.viewport(), 64, 16).every(30);
    let demo = LayersDemo::new(config.viewport());
    let mut engine = Engine::with_backend(config, Box::new(backend))?;
    engine.execute(Box::new(demo))?;
    Ok(())
}
