//! Bounded-size previews of fetched images.

use image::imageops::FilterType;
use tracing::debug;

/// Default bound for either preview dimension
pub const DEFAULT_PREVIEW_SIZE: u32 = 400;

/// RGBA pixels of a preview ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub rgba: Vec<u8>,
}

impl Preview {
    /// Whether the source had to be scaled down
    pub fn was_scaled(&self) -> bool {
        self.width != self.source_width || self.height != self.source_height
    }
}

/// Result of projecting image bytes into a preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Ready(Preview),
    /// The bytes could not be decoded; there is nothing to show
    Unavailable,
}

/// Scales images down to fit a square bound, keeping the aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct PreviewProjector {
    max_dimension: u32,
}

impl Default for PreviewProjector {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_SIZE)
    }
}

impl PreviewProjector {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Decode `bytes` and fit the image inside the bound.
    ///
    /// Images that already fit are passed through at their own size.
    pub fn project(&self, bytes: &[u8]) -> Projection {
        let image = match image::load_from_memory(bytes) {
            Ok(image) => image,
            Err(e) => {
                debug!("Could not decode preview: {}", e);
                return Projection::Unavailable;
            }
        };

        let (source_width, source_height) = (image.width(), image.height());
        let (width, height) = self.fit(source_width, source_height);
        let image = if (width, height) == (source_width, source_height) {
            image
        } else {
            image.resize_exact(width, height, FilterType::Lanczos3)
        };

        Projection::Ready(Preview {
            width,
            height,
            source_width,
            source_height,
            rgba: image.into_rgba8().into_raw(),
        })
    }

    /// Target size for a source of `width` x `height`.
    fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        let max = self.max_dimension;
        if width <= max && height <= max {
            return (width, height);
        }

        // The longer side limits the ratio; integer math keeps the floor exact.
        let longest = u64::from(width.max(height));
        let scale = |side: u32| ((u64::from(side) * u64::from(max) / longest) as u32).clamp(1, max);
        (scale(width), scale(height))
    }
}
