use blob_features_core::raster::{self, RasterError};
use image::{GrayImage, RgbImage};

/// The four images cropped to a blob's bounding box.
///
/// `*_image` hold source pixels where the blob (or its hull) is present and
/// black elsewhere; `*_mask` are white-on-black masks.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobRasters {
    pub blob_image: RgbImage,
    pub blob_mask: GrayImage,
    pub hull_image: RgbImage,
    pub hull_mask: GrayImage,
}

impl BlobRasters {
    /// Fails when the four images do not share one size.
    pub fn new(
        blob_image: RgbImage,
        blob_mask: GrayImage,
        hull_image: RgbImage,
        hull_mask: GrayImage,
    ) -> Result<Self, RasterError> {
        let expected = blob_mask.dimensions();
        for actual in [
            blob_image.dimensions(),
            hull_image.dimensions(),
            hull_mask.dimensions(),
        ] {
            if actual != expected {
                return Err(RasterError::DimensionMismatch { expected, actual });
            }
        }
        Ok(Self {
            blob_image,
            blob_mask,
            hull_image,
            hull_mask,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.blob_mask.dimensions()
    }

    /// Every raster rotated by `degrees` about its own center.
    pub fn rotated(&self, degrees: f64) -> Result<Self, RasterError> {
        let (w, h) = self.dimensions();
        let pivot = raster::raster_center(w, h);
        Ok(Self {
            blob_image: raster::rotate_rgb(&self.blob_image, degrees, pivot)?,
            blob_mask: raster::rotate_mask(&self.blob_mask, degrees, pivot)?,
            hull_image: raster::rotate_rgb(&self.hull_image, degrees, pivot)?,
            hull_mask: raster::rotate_mask(&self.hull_mask, degrees, pivot)?,
        })
    }
}
