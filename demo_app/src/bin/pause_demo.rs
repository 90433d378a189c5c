//! Nested loops: a bouncing ball that pauses itself every few seconds
//!
//! The pause screen is a loop of its own. While it runs, the game loop is
//! suspended with its state intact and picks up exactly where it stopped.

use demo_app::AsciiBackend;
use sprite_engine::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Game ticks between pauses
const PLAY_TICKS: u32 = 90;
/// Length of each pause in ticks
const PAUSE_TICKS: u32 = 30;
/// The demo ends after this many pauses
const PAUSES: u32 = 3;

struct Ball {
    position: Vec2,
    velocity: Vec2,
    bounds: Vec2,
}

impl Ball {
    const SIZE: f32 = 8.0;

    fn step(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        for axis in 0..2 {
            let limit = self.bounds[axis] - Self::SIZE;
            if self.position[axis] < 0.0 || self.position[axis] > limit {
                self.velocity[axis] = -self.velocity[axis];
                self.position[axis] = self.position[axis].clamp(0.0, limit);
            }
        }
    }
}

impl Renderable for Ball {
    fn draw(&mut self, ctx: &mut RenderContext) {
        ctx.fill_rect(Rect::new(self.position.x, self.position.y, Ball::SIZE, Ball::SIZE), Color::WHITE);
    }
}

struct Caption(String);

impl Renderable for Caption {
    fn draw(&mut self, ctx: &mut RenderContext) {
        ctx.draw_text(None, self.0.as_str(), Vec2::zeros(), Color::WHITE);
    }
}

struct PauseLoop {
    world: World,
    remaining: u32,
}

impl PauseLoop {
    fn new(viewport: Vec2, number: u32) -> Self {
        let world = World::new(viewport);
        let overlay = Layer::new("overlay")
            .with_transform(Rc::new(OffsetTransform::new(viewport * 0.4)))
            .with_transform(Rc::new(BlendTransform::new(BlendMode::Multiply)));
        overlay.add(RenderableHandle::new(Caption(format!("PAUSED ({}/{})", number, PAUSES))));
        world.add_layer(Rc::new(overlay));
        Self {
            world,
            remaining: PAUSE_TICKS,
        }
    }
}

impl GameLoop for PauseLoop {
    fn name(&self) -> &str {
        "pause"
    }

    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            return Ok(LoopControl::Finish);
        }
        Ok(LoopControl::Continue)
    }
}

struct BallGame {
    world: World,
    ball: Rc<RefCell<Ball>>,
    ticks: u32,
    pauses: u32,
}

impl BallGame {
    fn new(viewport: Vec2) -> Self {
        let world = World::new(viewport);
        let ball = Rc::new(RefCell::new(Ball {
            position: viewport * 0.5,
            velocity: Vec2::new(70.0, 45.0),
            bounds: viewport,
        }));
        world.layer("playfield").add(RenderableHandle::from_shared(Rc::clone(&ball)));
        Self {
            world,
            ball,
            ticks: 0,
            pauses: 0,
        }
    }
}

impl GameLoop for BallGame {
    fn name(&self) -> &str {
        "ball-game"
    }

    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
        self.ball.borrow_mut().step(ctx.delta_time);
        self.ticks += 1;
        if self.ticks % PLAY_TICKS != 0 {
            return Ok(LoopControl::Continue);
        }
        if self.pauses == PAUSES {
            return Ok(LoopControl::Finish);
        }
        self.pauses += 1;
        Ok(LoopControl::Push(Box::new(PauseLoop::new(
            self.world.camera().viewport,
            self.pauses,
        ))))
    }

    fn on_suspend(&mut self) {
        log::info!("Paused with ball at {:?}", self.ball.borrow().position);
    }

    fn on_resume(&mut self) {
        log::info!("Resumed with ball at {:?}", self.ball.borrow().position);
    }

    fn on_finish(&mut self) {
        log::info!("Ball game finished after {} ticks and {} pauses", self.ticks, self.pauses);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = EngineConfig::default();
    config.window.title = "Pause demo".to_string();
    config.window.width = 240;
    config.window.height = 120;
    config.timing.ticks_per_second = 30;

    let backend = AsciiBackend::new(config.viewport(), 48, 12).every(15);
    let game = BallGame::new(config.viewport());
    let mut engine = Engine::with_backend(config, Box::new(backend))?;
    engine.execute(Box::new(game))?;
    Ok(())
}
