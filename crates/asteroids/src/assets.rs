//! Game sprites
//!
//! The game ships no image files: rock sprites are generated once and parked
//! in the engine's image cache under their own group, so a later level can
//! drop them in one call.

use crate::components::AsteroidSize;
use sprite_engine::assets::{Image, Resources};

/// Cache group holding every generated sprite
pub const SPRITE_GROUP: &str = "asteroids";

const ROCK: [u8; 4] = [150, 140, 130, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Filled disc of `radius` pixels, transparent outside it
fn rock_sprite(reference: &str, radius: f32) -> Option<Image> {
    let side = (radius * 2.0).ceil() as u32;
    let center = side as f32 / 2.0;
    let mut pixels = Vec::with_capacity((side * side * 4) as usize);
    for y in 0..side {
        for x in 0..side {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let texel = if dx * dx + dy * dy <= radius * radius { ROCK } else { CLEAR };
            pixels.extend_from_slice(&texel);
        }
    }
    Image::from_rgba(reference, side, side, pixels)
}

/// Generate any missing rock sprites; returns how many were added
pub fn register_sprites(resources: &mut Resources) -> usize {
    let mut added = 0;
    for size in AsteroidSize::ALL {
        let reference = size.sprite_reference();
        if resources.images.contains(reference) {
            continue;
        }
        match rock_sprite(reference, size.radius()) {
            Some(image) => {
                if resources.images.add_to_group(image, SPRITE_GROUP) {
                    added += 1;
                }
            }
            None => log::warn!("Could not build sprite '{}'", reference),
        }
    }
    log::debug!("Registered {} asteroid sprites", added);
    added
}

/// Drop every generated sprite from the cache
pub fn unload_sprites(resources: &mut Resources) -> usize {
    resources.images.remove_group(SPRITE_GROUP)
}
