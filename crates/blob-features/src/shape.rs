use blob_features_core::raster;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Blob, BlobError, ShapeParams};

/// Outcome of the three hull-based shape tests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ShapeFlags {
    pub rectangle: bool,
    pub square: bool,
    pub circle: bool,
}

impl Blob<'_> {
    /// `|1 - hull_pixels / (min_rect_width * min_rect_height)|`; zero when the
    /// hull fills its minimum rectangle.
    pub fn rectangle_distance(&self) -> Result<f64, BlobError> {
        let rect = self.proper_min_rect()?;
        let [_, white] = raster::binary_histogram(&self.rasters.hull_mask);
        Ok((1.0 - white as f64 / rect.area()).abs())
    }

    pub fn is_rectangle(&self, tolerance: f64) -> Result<bool, BlobError> {
        Ok(self.rectangle_distance()? < tolerance)
    }

    pub fn is_square(&self, tolerance: f64, ratio_tolerance: f64) -> Result<bool, BlobError> {
        Ok(self.is_rectangle(tolerance)? && (1.0 - self.aspect_ratio()?).abs() < ratio_tolerance)
    }

    /// Fraction of an ideal disk's area that differs from the hull mask.
    ///
    /// The disk has radius `min(width, height) / 2` (integer division) and is
    /// drawn around pixel `(width / 2, height / 2)` of a canvas the size of
    /// the bounding box.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self),
            fields(width = self.width(), height = self.height())
        )
    )]
    pub fn circle_distance(&self) -> Result<f64, BlobError> {
        let (w, h) = (self.width(), self.height());
        let radius = w.min(h) / 2;
        if radius == 0 {
            return Err(BlobError::ZeroRadius {
                width: w,
                height: h,
            });
        }
        let ideal = raster::filled_circle_mask(
            w,
            h,
            raster::center_pixel(w, h),
            i32::try_from(radius).unwrap_or(i32::MAX),
        );
        let radius = radius as f64;
        let hull = &self.rasters.hull_mask;
        let net_diff = raster::add_saturating(
            &raster::subtract_saturating(&ideal, hull)?,
            &raster::subtract_saturating(hull, &ideal)?,
        )?;
        let [_, white] = raster::binary_histogram(&net_diff);
        Ok(white as f64 / (radius * radius * std::f64::consts::PI))
    }

    pub fn is_circle(&self, tolerance: f64) -> Result<bool, BlobError> {
        Ok(self.circle_distance()? < tolerance)
    }

    /// Run all three tests with one set of tolerances.
    pub fn shape_flags(&self, params: &ShapeParams) -> Result<ShapeFlags, BlobError> {
        let rectangle = self.is_rectangle(params.rectangle_tolerance)?;
        let square =
            rectangle && (1.0 - self.aspect_ratio()?).abs() < params.square_ratio_tolerance;
        let circle = self.is_circle(params.circle_tolerance)?;
        Ok(ShapeFlags {
            rectangle,
            square,
            circle,
        })
    }
}
