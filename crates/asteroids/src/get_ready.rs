//! "Get ready" countdown, run as a nested loop before each life

use sprite_engine::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

struct Banner {
    message: String,
    remaining: Rc<Cell<f32>>,
}

impl Renderable for Banner {
    fn draw(&mut self, ctx: &mut RenderContext) {
        // Drawn around the origin; the layer's offset centers it
        ctx.stroke_rect(Rect::new(-120.0, -30.0, 240.0, 60.0), Color::WHITE);
        ctx.draw_text(None, self.message.as_str(), Vec2::new(-100.0, -6.0), Color::WHITE);
        let seconds = self.remaining.get().ceil().max(0.0);
        ctx.draw_text(None, format!("{}", seconds as u32), Vec2::new(-6.0, 18.0), Color::WHITE);
    }
}

/// Counts down, then hands control back to the game
pub struct GetReadyLoop {
    world: World,
    remaining: Rc<Cell<f32>>,
}

impl GetReadyLoop {
    /// Countdown of `seconds` showing `message` in the middle of `viewport`
    pub fn new(viewport: Vec2, message: impl Into<String>, seconds: f32) -> Self {
        let remaining = Rc::new(Cell::new(seconds));
        let world = World::new(viewport);
        let banner = Layer::new("banner").with_transform(Rc::new(OffsetTransform::new(viewport * 0.5)));
        banner.add(RenderableHandle::new(Banner {
            message: message.into(),
            remaining: Rc::clone(&remaining),
        }));
        world.add_layer(Rc::new(banner));
        Self { world, remaining }
    }

    /// Seconds left
    pub fn remaining(&self) -> f32 {
        self.remaining.get()
    }
}

impl GameLoop for GetReadyLoop {
    fn name(&self) -> &str {
        "get-ready"
    }

    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
        let left = self.remaining.get() - ctx.delta_time;
        self.remaining.set(left);
        if left <= 0.0 {
            log::debug!("Countdown finished");
            return Ok(LoopControl::Finish);
        }
        Ok(LoopControl::Continue)
    }
}
