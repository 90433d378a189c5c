//! Draw commands handed to the rasterizer
//!
//! The engine never touches pixels. Renderables describe what they want drawn
//! through the [`RenderContext`](super::RenderContext), which resolves the
//! currently bound offset and blend mode into self-contained commands. A
//! [`RenderBackend`](super::RenderBackend) turns the frame's commands into
//! pixels however it likes.

use crate::assets::{Font, Image};
use crate::foundation::math::{Color, Rect, Vec2};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// How a command's pixels combine with what is already on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending
    #[default]
    Alpha,
    /// Source added to destination (glows, particles)
    Additive,
    /// Source multiplied with destination (shadows)
    Multiply,
    /// Source replaces destination
    Opaque,
}

bitflags! {
    /// Per-sprite presentation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpriteFlags: u8 {
        /// Mirror horizontally
        const FLIP_X = 0b0001;
        /// Mirror vertically
        const FLIP_Y = 0b0010;
    }
}

/// A single resolved draw request
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Blit an image with its top-left corner at `position`
    Sprite {
        /// Source image
        image: Rc<Image>,
        /// Screen-space position after all bound offsets
        position: Vec2,
        /// Mirroring
        flags: SpriteFlags,
        /// Blend mode bound at submission
        blend: BlendMode,
    },
    /// Solid or outlined rectangle
    Rect {
        /// Screen-space rectangle after all bound offsets
        rect: Rect,
        /// Fill or outline color
        color: Color,
        /// Fill the interior instead of drawing the outline
        filled: bool,
        /// Blend mode bound at submission
        blend: BlendMode,
    },
    /// Line segment
    Line {
        /// Screen-space start
        from: Vec2,
        /// Screen-space end
        to: Vec2,
        /// Line color
        color: Color,
        /// Blend mode bound at submission
        blend: BlendMode,
    },
    /// Text run, laid out by the backend's glyph rasterizer
    Text {
        /// Font file, or the backend's built-in font if `None`
        font: Option<Rc<Font>>,
        /// Text to draw
        text: String,
        /// Screen-space baseline origin
        position: Vec2,
        /// Text color
        color: Color,
        /// Blend mode bound at submission
        blend: BlendMode,
    },
}

impl DrawCommand {
    /// Blend mode the command was recorded with
    pub fn blend(&self) -> BlendMode {
        match self {
            Self::Sprite { blend, .. }
            | Self::Rect { blend, .. }
            | Self::Line { blend, .. }
            | Self::Text { blend, .. } => *blend,
        }
    }

    /// Anchor position of the command in screen space
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Sprite { position, .. } | Self::Text { position, .. } => *position,
            Self::Rect { rect, .. } => rect.origin,
            Self::Line { from, .. } => *from,
        }
    }
}
