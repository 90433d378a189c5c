//! Engine-wide image, font and sound caches
//!
//! Owned by the [`Engine`](crate::Engine) and lent to loops each tick. The
//! default factories resolve a reference as a path relative to the configured
//! search roots: images are decoded to RGBA8 through the `image` crate, fonts
//! and sounds are kept as raw bytes for whichever decoder the game uses.
//! Games with procedural assets swap the factory with `set_factory`.

use super::cache::{CacheError, Disposable, Factory, Referenced};
use super::grouped_cache::GroupedCache;
use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Ordered list of directories references are resolved against
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    roots: Vec<PathBuf>,
}

impl SearchPaths {
    /// Create from a list of roots, searched in order
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// First existing file named `reference` under any root
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference);
        if relative.is_absolute() {
            return relative.is_file().then(|| relative.to_path_buf());
        }
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
    }

    /// Configured roots
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Decoded RGBA8 image
pub struct Image {
    reference: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    disposed: Cell<bool>,
}

impl Image {
    /// Create an image from raw RGBA8 pixels
    ///
    /// Returns `None` if `pixels` does not hold exactly `width * height * 4` bytes.
    pub fn from_rgba(reference: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        (pixels.len() == expected).then(|| Self {
            reference: reference.into(),
            width,
            height,
            pixels,
            disposed: Cell::new(false),
        })
    }

    /// Create a single-color image
    pub fn solid(reference: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = (width as usize) * (height as usize);
        let pixels = rgba.iter().copied().cycle().take(count * 4).collect();
        Self {
            reference: reference.into(),
            width,
            height,
            pixels,
            disposed: Cell::new(false),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel data, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the owning cache has disposed this image
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Referenced for Image {
    fn reference(&self) -> &str {
        &self.reference
    }
}

impl Disposable for Image {
    fn dispose(&self) {
        log::trace!("Disposing image '{}'", self.reference);
        self.disposed.set(true);
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("reference", &self.reference)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Undecoded asset bytes (fonts, sounds)
pub struct AssetBytes {
    reference: String,
    data: Vec<u8>,
    disposed: Cell<bool>,
}

impl AssetBytes {
    /// Wrap raw bytes under a reference
    pub fn new(reference: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            reference: reference.into(),
            data,
            disposed: Cell::new(false),
        }
    }

    /// Raw file contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the owning cache has disposed this asset
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Referenced for AssetBytes {
    fn reference(&self) -> &str {
        &self.reference
    }
}

impl Disposable for AssetBytes {
    fn dispose(&self) {
        log::trace!("Disposing '{}'", self.reference);
        self.disposed.set(true);
    }
}

impl fmt::Debug for AssetBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetBytes")
            .field("reference", &self.reference)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Font file contents, handed to an external glyph rasterizer
pub type Font = AssetBytes;

/// Sound file contents, handed to an external mixer
pub type Sound = AssetBytes;

/// Loads images from the search paths through the `image` crate
#[derive(Debug, Clone)]
pub struct ImageFactory {
    paths: SearchPaths,
}

impl ImageFactory {
    /// Create a factory searching `paths`
    pub fn new(paths: SearchPaths) -> Self {
        Self { paths }
    }
}

impl Factory<Image> for ImageFactory {
    fn create(&self, reference: &str) -> Option<Image> {
        let path = self.paths.resolve(reference)?;
        match image::open(&path) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                Image::from_rgba(reference, width, height, rgba.into_raw())
            }
            Err(e) => {
                log::warn!("Failed to decode image {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Reads raw bytes from the search paths
#[derive(Debug, Clone)]
pub struct BytesFactory {
    paths: SearchPaths,
}

impl BytesFactory {
    /// Create a factory searching `paths`
    pub fn new(paths: SearchPaths) -> Self {
        Self { paths }
    }
}

impl Factory<AssetBytes> for BytesFactory {
    fn create(&self, reference: &str) -> Option<AssetBytes> {
        let path = self.paths.resolve(reference)?;
        match std::fs::read(&path) {
            Ok(data) => Some(AssetBytes::new(reference, data)),
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// The engine's resource caches
#[derive(Debug)]
pub struct Resources {
    /// Decoded images
    pub images: GroupedCache<Image>,
    /// Font files
    pub fonts: GroupedCache<Font>,
    /// Sound files
    pub sounds: GroupedCache<Sound>,
}

impl Resources {
    /// Create caches backed by file factories over `paths`
    pub fn new(paths: &SearchPaths) -> Self {
        log::debug!("Resource search paths: {:?}", paths.roots());
        Self {
            images: GroupedCache::disposing()
                .with_label("images")
                .with_factory(ImageFactory::new(paths.clone())),
            fonts: GroupedCache::disposing()
                .with_label("fonts")
                .with_factory(BytesFactory::new(paths.clone())),
            sounds: GroupedCache::disposing()
                .with_label("sounds")
                .with_factory(BytesFactory::new(paths.clone())),
        }
    }

    /// Resolve an image
    pub fn image(&mut self, reference: &str) -> Result<Rc<Image>, CacheError> {
        self.images.get(reference)
    }

    /// Resolve a font
    pub fn font(&mut self, reference: &str) -> Result<Rc<Font>, CacheError> {
        self.fonts.get(reference)
    }

    /// Resolve a sound
    pub fn sound(&mut self, reference: &str) -> Result<Rc<Sound>, CacheError> {
        self.sounds.get(reference)
    }

    /// Drop `group` from every cache, returning the number of entries removed
    pub fn unload_group(&mut self, group: &str) -> usize {
        self.images.remove_group(group) + self.fonts.remove_group(group) + self.sounds.remove_group(group)
    }

    /// Dispose everything
    pub fn clear(&mut self) {
        self.images.clear();
        self.fonts.clear();
        self.sounds.clear();
    }

    /// Total number of cached entries
    pub fn len(&self) -> usize {
        self.images.len() + self.fonts.len() + self.sounds.len()
    }

    /// Whether all caches are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new(&SearchPaths::default())
    }
}
