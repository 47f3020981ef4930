use std::cell::RefCell;
use std::fmt;

use blob_features_core::DrawingLayer;
use image::RgbImage;

/// Borrowed handle to the image a blob was extracted from.
///
/// The blob reads pixels through it (mean colour, blob image rendering) and
/// uses its drawing layer as the default target for `draw_*` calls. It never
/// writes to the pixel buffer.
#[derive(Clone, Copy)]
pub struct SourceImage<'a> {
    pixels: &'a RgbImage,
    layer: Option<&'a RefCell<dyn DrawingLayer + 'a>>,
}

impl<'a> SourceImage<'a> {
    pub fn new(pixels: &'a RgbImage) -> Self {
        Self {
            pixels,
            layer: None,
        }
    }

    pub fn with_layer(mut self, layer: &'a RefCell<dyn DrawingLayer + 'a>) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn pixels(&self) -> &'a RgbImage {
        self.pixels
    }

    pub fn layer(&self) -> Option<&'a RefCell<dyn DrawingLayer + 'a>> {
        self.layer
    }
}

impl fmt::Debug for SourceImage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .field("has_layer", &self.layer.is_some())
            .finish()
    }
}
