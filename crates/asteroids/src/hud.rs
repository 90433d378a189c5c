//! Score display and background

use sprite_engine::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

/// Counters shared between the game logic and the HUD
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    /// Points scored
    pub score: Rc<Cell<u32>>,
    /// Ships left
    pub lives: Rc<Cell<u32>>,
    /// Current wave, starting at 1
    pub wave: Rc<Cell<u32>>,
}

impl Scoreboard {
    /// Fresh board with `lives` ships
    pub fn new(lives: u32) -> Self {
        let board = Self::default();
        board.lives.set(lives);
        board.wave.set(1);
        board
    }

    /// Add to the score
    pub fn award(&self, points: u32) {
        self.score.set(self.score.get().saturating_add(points));
    }
}

/// Text overlay drawn on the HUD layer
#[derive(Debug)]
pub struct Hud {
    board: Scoreboard,
}

impl Hud {
    /// Overlay showing `board`
    pub fn new(board: Scoreboard) -> Self {
        Self { board }
    }
}

impl Renderable for Hud {
    fn draw(&mut self, ctx: &mut RenderContext) {
        let width = ctx.viewport().x;
        ctx.draw_text(None, format!("SCORE {:06}", self.board.score.get()), Vec2::new(16.0, 24.0), Color::WHITE);
        ctx.draw_text(None, format!("WAVE {}", self.board.wave.get()), Vec2::new(width * 0.5 - 32.0, 24.0), Color::WHITE);
        for life in 0..self.board.lives.get() {
            let x = width - 24.0 - life as f32 * 20.0;
            ctx.stroke_rect(Rect::new(x, 12.0, 12.0, 12.0), Color::WHITE);
        }
    }
}

/// Scrolling star backdrop
///
/// Stars are drawn twice, one field-width apart, so the layer's scrolling
/// offset can wrap without a visible seam.
#[derive(Debug)]
pub struct Starfield {
    stars: Vec<Vec2>,
    field: Vec2,
}

impl Starfield {
    /// Backdrop over `field` with the given star positions
    pub fn new(stars: Vec<Vec2>, field: Vec2) -> Self {
        Self { stars, field }
    }
}

impl Renderable for Starfield {
    fn draw(&mut self, ctx: &mut RenderContext) {
        let dim = Color::rgb(0.6, 0.6, 0.7);
        for star in &self.stars {
            for copy in [0.0, self.field.x] {
                ctx.fill_rect(Rect::new(star.x + copy, star.y, 1.0, 1.0), dim);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_shows_one_marker_per_life() {
        let board = Scoreboard::new(3);
        board.award(120);
        let mut hud = Hud::new(board.clone());
        let mut ctx = RenderContext::new(Vec2::new(320.0, 240.0));

        hud.draw(&mut ctx);
        let texts: Vec<&str> = ctx
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["SCORE 000120", "WAVE 1"]);
        assert_eq!(ctx.commands().len(), 5);

        board.lives.set(1);
        ctx.reset(1);
        hud.draw(&mut ctx);
        assert_eq!(ctx.commands().len(), 3);
    }
}
