//! Shared render state for one frame
//!
//! Transforms bind and release against a [`RenderContext`]; renderables
//! submit draw requests to it. Blend modes and offsets are kept as stacks so
//! every bind has a matching release that restores exactly the state that was
//! current before it.

use super::commands::{BlendMode, DrawCommand, SpriteFlags};
use crate::assets::{Font, Image};
use crate::foundation::math::{Color, Rect, Vec2};
use std::rc::Rc;

/// Per-frame render state and command list
#[derive(Debug)]
pub struct RenderContext {
    viewport: Vec2,
    blend_stack: Vec<BlendMode>,
    offset_stack: Vec<Vec2>,
    commands: Vec<DrawCommand>,
    frame: u64,
}

impl RenderContext {
    /// Create a context for a surface of `viewport` size
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            blend_stack: Vec::new(),
            offset_stack: Vec::new(),
            commands: Vec::new(),
            frame: 0,
        }
    }

    /// Prepare for another frame, keeping allocations
    ///
    /// Unbalanced binds left over from the previous frame are reported and
    /// dropped.
    pub fn reset(&mut self, frame: u64) {
        if !self.blend_stack.is_empty() || !self.offset_stack.is_empty() {
            log::warn!(
                "RenderContext: frame {} ended with {} blend and {} offset binds unreleased",
                self.frame,
                self.blend_stack.len(),
                self.offset_stack.len()
            );
        }
        self.blend_stack.clear();
        self.offset_stack.clear();
        self.commands.clear();
        self.frame = frame;
    }

    /// Frame number this context is recording
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Surface size
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Visible area in the current offset space
    pub fn visible_rect(&self) -> Rect {
        Rect {
            origin: -self.offset(),
            size: self.viewport,
        }
    }

    /// Currently bound blend mode
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_stack.last().copied().unwrap_or_default()
    }

    /// Bind a blend mode until the matching [`pop_blend`](Self::pop_blend)
    pub fn push_blend(&mut self, mode: BlendMode) {
        self.blend_stack.push(mode);
    }

    /// Restore the previous blend mode
    pub fn pop_blend(&mut self) -> Option<BlendMode> {
        let popped = self.blend_stack.pop();
        if popped.is_none() {
            log::warn!("RenderContext: pop_blend without matching push");
        }
        popped
    }

    /// Accumulated offset of every bound offset
    pub fn offset(&self) -> Vec2 {
        self.offset_stack.last().copied().unwrap_or_else(Vec2::zeros)
    }

    /// Bind an additional offset until the matching [`pop_offset`](Self::pop_offset)
    pub fn push_offset(&mut self, delta: Vec2) {
        let accumulated = self.offset() + delta;
        self.offset_stack.push(accumulated);
    }

    /// Restore the previous offset
    pub fn pop_offset(&mut self) -> Option<Vec2> {
        let popped = self.offset_stack.pop();
        if popped.is_none() {
            log::warn!("RenderContext: pop_offset without matching push");
        }
        popped
    }

    /// Depth of the blend and offset stacks
    pub fn bind_depth(&self) -> (usize, usize) {
        (self.blend_stack.len(), self.offset_stack.len())
    }

    /// Draw an image with its top-left corner at `position`
    pub fn draw_sprite(&mut self, image: &Rc<Image>, position: Vec2, flags: SpriteFlags) {
        let command = DrawCommand::Sprite {
            image: Rc::clone(image),
            position: position + self.offset(),
            flags,
            blend: self.blend_mode(),
        };
        self.commands.push(command);
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push_rect(rect, color, true);
    }

    /// Outline a rectangle
    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.push_rect(rect, color, false);
    }

    fn push_rect(&mut self, rect: Rect, color: Color, filled: bool) {
        let command = DrawCommand::Rect {
            rect: rect.translated(self.offset()),
            color,
            filled,
            blend: self.blend_mode(),
        };
        self.commands.push(command);
    }

    /// Draw a line segment
    pub fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        let offset = self.offset();
        let command = DrawCommand::Line {
            from: from + offset,
            to: to + offset,
            color,
            blend: self.blend_mode(),
        };
        self.commands.push(command);
    }

    /// Draw a run of text
    pub fn draw_text(&mut self, font: Option<&Rc<Font>>, text: impl Into<String>, position: Vec2, color: Color) {
        let command = DrawCommand::Text {
            font: font.cloned(),
            text: text.into(),
            position: position + self.offset(),
            color,
            blend: self.blend_mode(),
        };
        self.commands.push(command);
    }

    /// Commands recorded so far this frame
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the list empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}
