//! Shared pieces for the terminal demos

use sprite_engine::foundation::math::Vec2;
use sprite_engine::render::{BackendResult, DrawCommand, RenderBackend, RenderError};
use std::io::Write;

/// Render backend that rasterizes frames into text
///
/// Each cell covers `viewport / (columns, rows)` world units. Only every
/// `interval`-th frame is printed so a 60 tick/s demo stays readable.
pub struct AsciiBackend {
    columns: usize,
    rows: usize,
    cell: Vec2,
    interval: u64,
    out: Box<dyn Write>,
}

impl AsciiBackend {
    /// Print to stdout with a `columns` x `rows` grid covering `viewport`
    pub fn new(viewport: Vec2, columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            cell: Vec2::new(viewport.x / columns as f32, viewport.y / rows as f32),
            interval: 1,
            out: Box::new(std::io::stdout()),
        }
    }

    /// Print only every `interval`-th frame
    pub fn every(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Write frames to `out` instead of stdout
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    fn cell_of(&self, position: Vec2) -> (isize, isize) {
        (
            (position.x / self.cell.x).floor() as isize,
            (position.y / self.cell.y).floor() as isize,
        )
    }

    fn plot(&self, grid: &mut [Vec<char>], (column, row): (isize, isize), glyph: char) {
        if column < 0 || row < 0 {
            return;
        }
        if let Some(cell) = grid.get_mut(row as usize).and_then(|line| line.get_mut(column as usize)) {
            *cell = glyph;
        }
    }

    fn fill(&self, grid: &mut [Vec<char>], from: Vec2, size: Vec2, outline_only: bool, glyph: char) {
        let (left, top) = self.cell_of(from);
        let (right, bottom) = self.cell_of(from + size - Vec2::repeat(0.001));
        // Walk only the on-grid part; edges still come from the full rect
        let rows = top.max(0)..=bottom.min(self.rows as isize - 1);
        let columns = left.max(0)..=right.min(self.columns as isize - 1);
        for row in rows {
            for column in columns.clone() {
                let edge = row == top || row == bottom || column == left || column == right;
                if !outline_only || edge {
                    self.plot(grid, (column, row), glyph);
                }
            }
        }
    }

    /// Cut a segment down to the part inside the grid (Liang-Barsky)
    fn clip(&self, from: Vec2, to: Vec2) -> Option<(Vec2, Vec2)> {
        let extent = Vec2::new(self.cell.x * self.columns as f32, self.cell.y * self.rows as f32);
        let delta = to - from;
        let (mut enter, mut exit) = (0.0_f32, 1.0_f32);
        for axis in 0..2 {
            for (p, q) in [(-delta[axis], from[axis]), (delta[axis], extent[axis] - from[axis])] {
                if p == 0.0 {
                    if q < 0.0 {
                        return None;
                    }
                } else {
                    let t = q / p;
                    if p < 0.0 {
                        enter = enter.max(t);
                    } else {
                        exit = exit.min(t);
                    }
                }
            }
        }
        (enter <= exit).then(|| (from + delta * enter, from + delta * exit))
    }

    /// Turn one frame's commands into text lines
    pub fn rasterize(&self, commands: &[DrawCommand]) -> Vec<String> {
        let mut grid = vec![vec![' '; self.columns]; self.rows];
        for command in commands {
            match command {
                DrawCommand::Sprite { image, position, .. } => {
                    let size = Vec2::new(image.width() as f32, image.height() as f32);
                    self.fill(&mut grid, *position, size, false, '@');
                }
                DrawCommand::Rect { rect, filled, .. } => {
                    let glyph = if *filled { '#' } else { '+' };
                    self.fill(&mut grid, rect.origin, rect.size, !*filled, glyph);
                }
                DrawCommand::Line { from, to, .. } => {
                    let Some((from, to)) = self.clip(*from, *to) else {
                        continue;
                    };
                    let (start, end) = (self.cell_of(from), self.cell_of(to));
                    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
                    let steps = dx.abs().max(dy.abs()).max(1);
                    for step in 0..=steps {
                        let t = step as f32 / steps as f32;
                        let column = start.0 + (dx as f32 * t).round() as isize;
                        let row = start.1 + (dy as f32 * t).round() as isize;
                        self.plot(&mut grid, (column, row), '*');
                    }
                }
                DrawCommand::Text { text, position, .. } => {
                    let (column, row) = self.cell_of(*position);
                    for (i, glyph) in text.chars().enumerate() {
                        self.plot(&mut grid, (column + i as isize, row), glyph);
                    }
                }
            }
        }
        grid.into_iter().map(|line| line.into_iter().collect()).collect()
    }
}

impl RenderBackend for AsciiBackend {
    fn present(&mut self, frame: u64, commands: &[DrawCommand]) -> BackendResult<()> {
        if frame % self.interval != 0 {
            return Ok(());
        }
        let lines = self.rasterize(commands);
        let border = "-".repeat(self.columns);
        let mut text = format!("+{border}+ frame {frame}\n");
        for line in lines {
            text.push('|');
            text.push_str(&line);
            text.push_str("|\n");
        }
        text.push_str(&format!("+{border}+\n"));
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| RenderError::Backend(e.to_string()))
    }

    fn shutdown(&mut self) {
        log::debug!("AsciiBackend shut down");
    }
}
