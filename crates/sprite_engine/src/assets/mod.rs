//! Asset management
//!
//! Keyed caches that construct objects on first lookup and keep them until
//! they are explicitly removed, plus the engine's image/font/sound caches
//! built on top of them.

mod cache;
mod grouped_cache;
mod resources;

pub use cache::{Cache, CacheError, Disposable, Factory, Referenced};
pub use grouped_cache::GroupedCache;
pub use resources::{AssetBytes, BytesFactory, Font, Image, ImageFactory, Resources, SearchPaths, Sound};
