use std::cell::OnceCell;

use blob_features_core::{
    convex_hull, min_area_rect, polygon_perimeter, raster, BoundingBox, HuMoments, MinAreaRect,
    Moments,
};
use image::{GrayImage, Rgb};
use nalgebra::{Point2, Vector2};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Blob, BlobError, BlobRasters, SourceImage};

pub const DEFAULT_LABEL: &str = "UNASSIGNED";

/// Assembles a [`Blob`] from a contour plus whatever the caller already
/// measured.
///
/// Every field except the contour is optional. Missing geometry is derived
/// from the contour, missing rasters are rendered from it (and from the
/// source image when one is attached).
#[derive(Clone, Debug)]
pub struct BlobBuilder<'a> {
    contour: Vec<Point2<f64>>,
    convex_hull: Option<Vec<Point2<f64>>>,
    holes: Vec<Vec<Point2<f64>>>,
    bounding_box: Option<BoundingBox>,
    min_rect: Option<MinAreaRect>,
    moments: Option<Moments>,
    hu: Option<HuMoments>,
    area: Option<u64>,
    perimeter: Option<f64>,
    rasters: Option<BlobRasters>,
    source: Option<SourceImage<'a>>,
    mean_color: Option<[f64; 3]>,
    label: String,
    label_color: Option<Rgb<u8>>,
}

impl<'a> BlobBuilder<'a> {
    pub fn new(contour: Vec<Point2<f64>>) -> Self {
        Self {
            contour,
            convex_hull: None,
            holes: Vec::new(),
            bounding_box: None,
            min_rect: None,
            moments: None,
            hu: None,
            area: None,
            perimeter: None,
            rasters: None,
            source: None,
            mean_color: None,
            label: DEFAULT_LABEL.to_string(),
            label_color: None,
        }
    }

    pub fn from_xy(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    pub fn convex_hull(mut self, hull: Vec<Point2<f64>>) -> Self {
        self.convex_hull = Some(hull);
        self
    }

    pub fn holes(mut self, holes: Vec<Vec<Point2<f64>>>) -> Self {
        self.holes = holes;
        self
    }

    pub fn bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    pub fn min_rect(mut self, rect: MinAreaRect) -> Self {
        self.min_rect = Some(rect);
        self
    }

    pub fn moments(mut self, moments: Moments) -> Self {
        self.moments = Some(moments);
        self
    }

    pub fn hu_moments(mut self, hu: HuMoments) -> Self {
        self.hu = Some(hu);
        self
    }

    /// Pixel count; defaults to the foreground of the blob mask.
    pub fn area(mut self, area: u64) -> Self {
        self.area = Some(area);
        self
    }

    pub fn perimeter(mut self, perimeter: f64) -> Self {
        self.perimeter = Some(perimeter);
        self
    }

    /// Pre-rendered rasters. They must match the bounding box size.
    pub fn rasters(mut self, rasters: BlobRasters) -> Self {
        self.rasters = Some(rasters);
        self
    }

    pub fn source(mut self, source: SourceImage<'a>) -> Self {
        self.source = Some(source);
        self
    }

    /// Seed the mean colour cache.
    pub fn mean_color(mut self, color: [f64; 3]) -> Self {
        self.mean_color = Some(color);
        self
    }

    pub fn label(mut self, label: impl Into<String>, color: Option<Rgb<u8>>) -> Self {
        self.label = label.into();
        self.label_color = color;
        self
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self),
            fields(points = self.contour.len(), holes = self.holes.len())
        )
    )]
    pub fn build(self) -> Result<Blob<'a>, BlobError> {
        if self.contour.is_empty() {
            return Err(BlobError::EmptyContour);
        }
        let hull_finite = self.convex_hull.as_deref().map(all_finite).unwrap_or(true);
        if !all_finite(&self.contour) || !self.holes.iter().all(|h| all_finite(h)) || !hull_finite {
            return Err(BlobError::NonFiniteCoordinate);
        }

        let hull = match self.convex_hull {
            Some(hull) => hull,
            None => convex_hull(&self.contour),
        };
        if hull.is_empty() {
            return Err(BlobError::EmptyHull);
        }

        let bounding_box = match self.bounding_box {
            Some(b) => b,
            None => BoundingBox::from_points(&self.contour)
                .ok_or(BlobError::CoordinateOutOfRange)?,
        };
        let min_rect = match self.min_rect {
            Some(r) => r,
            None => min_area_rect(&self.contour).ok_or(BlobError::EmptyContour)?,
        };
        let moments = self
            .moments
            .unwrap_or_else(|| Moments::from_polygon(&self.contour));
        let hu = self.hu.or_else(|| moments.hu());
        let perimeter = self
            .perimeter
            .unwrap_or_else(|| polygon_perimeter(&self.contour));

        let rasters = match self.rasters {
            Some(r) => {
                let actual = r.dimensions();
                let expected = (bounding_box.width, bounding_box.height);
                if actual != expected {
                    return Err(raster::RasterError::DimensionMismatch { expected, actual }.into());
                }
                r
            }
            None => render_rasters(
                &self.contour,
                &self.holes,
                &hull,
                &bounding_box,
                self.source.as_ref(),
            )?,
        };
        let area = self
            .area
            .unwrap_or_else(|| raster::foreground_count(&rasters.blob_mask));

        let mean_color = OnceCell::new();
        if let Some(c) = self.mean_color {
            let _ = mean_color.set(c);
        }

        let blob = Blob {
            contour: self.contour,
            convex_hull: hull,
            holes: self.holes,
            bounding_box,
            min_rect,
            moments,
            hu,
            perimeter,
            area,
            rasters,
            source: self.source,
            mean_color,
            label: self.label,
            label_color: self.label_color,
        };

        if blob.is_degenerate() {
            log::warn!(
                "degenerate blob: {} contour points, min rect {:.2} x {:.2}",
                blob.contour.len(),
                blob.min_rect.width,
                blob.min_rect.height
            );
        } else {
            log::debug!("built {blob}");
        }
        Ok(blob)
    }
}

fn all_finite(points: &[Point2<f64>]) -> bool {
    points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}

/// Masks from the polygons in the bounding box frame; images from the
/// source pixels when available, otherwise the masks themselves.
fn render_rasters(
    contour: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
    hull: &[Point2<f64>],
    bbox: &BoundingBox,
    source: Option<&SourceImage<'_>>,
) -> Result<BlobRasters, BlobError> {
    raster::ensure_renderable(bbox.width, bbox.height)?;
    let offset = Vector2::new(bbox.x as f64, bbox.y as f64);

    let mut rings: Vec<&[Point2<f64>]> = Vec::with_capacity(1 + holes.len());
    rings.push(contour);
    rings.extend(holes.iter().map(Vec::as_slice));
    let blob_mask = raster::fill_polygon_mask(bbox.width, bbox.height, &rings, offset);
    let hull_mask = raster::fill_polygon_mask(bbox.width, bbox.height, &[hull], offset);

    let image_for = |mask: &GrayImage| match source {
        Some(s) => raster::copy_masked(s.pixels(), bbox, mask),
        None => Ok(raster::mask_to_rgb(mask)),
    };
    let blob_image = image_for(&blob_mask)?;
    let hull_image = image_for(&hull_mask)?;

    Ok(BlobRasters::new(blob_image, blob_mask, hull_image, hull_mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const UNIT_SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];

    #[test]
    fn derives_geometry_from_contour() {
        let blob = BlobBuilder::from_xy(&UNIT_SQUARE).build().unwrap();
        assert_eq!(*blob.bounding_box(), BoundingBox::new(0, 0, 10, 10));
        assert_eq!(blob.convex_hull().len(), 4);
        assert_eq!(blob.area(), 100);
        assert_eq!(blob.perimeter(), 40.0);
        assert_eq!(blob.label(), DEFAULT_LABEL);
        assert!(blob.hu_moments().is_some());
        assert_eq!(blob.blob_mask().dimensions(), (10, 10));
        assert_eq!(*blob.blob_image().get_pixel(3, 3), Rgb([255, 255, 255]));
    }

    #[test]
    fn holes_are_carved_from_the_blob_mask_only() {
        let hole = vec![
            Point2::new(3.0, 3.0),
            Point2::new(7.0, 3.0),
            Point2::new(7.0, 7.0),
            Point2::new(3.0, 7.0),
        ];
        let blob = BlobBuilder::from_xy(&UNIT_SQUARE)
            .holes(vec![hole])
            .build()
            .unwrap();
        assert_eq!(blob.area(), 100 - 16);
        assert_eq!(raster::foreground_count(blob.hull_mask()), 100);
    }

    #[test]
    fn blob_image_copies_source_pixels() {
        let pixels = RgbImage::from_pixel(32, 32, Rgb([10, 20, 30]));
        let contour = vec![
            Point2::new(4.0, 4.0),
            Point2::new(12.0, 4.0),
            Point2::new(12.0, 12.0),
            Point2::new(4.0, 12.0),
        ];
        let blob = BlobBuilder::new(contour)
            .source(SourceImage::new(&pixels))
            .build()
            .unwrap();
        assert_eq!(*blob.blob_image().get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(blob.mean_color().unwrap(), [10.0, 20.0, 30.0]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            BlobBuilder::new(Vec::new()).build().unwrap_err(),
            BlobError::EmptyContour
        );
        assert_eq!(
            BlobBuilder::from_xy(&[(0.0, 0.0), (f64::NAN, 1.0), (2.0, 0.0)])
                .build()
                .unwrap_err(),
            BlobError::NonFiniteCoordinate
        );
        assert_eq!(
            BlobBuilder::from_xy(&UNIT_SQUARE)
                .convex_hull(Vec::new())
                .build()
                .unwrap_err(),
            BlobError::EmptyHull
        );
    }

    #[test]
    fn supplied_rasters_must_match_the_box() {
        let mask = GrayImage::new(4, 4);
        let rgb = raster::mask_to_rgb(&mask);
        let rasters = BlobRasters::new(rgb.clone(), mask.clone(), rgb, mask).unwrap();
        let err = BlobBuilder::from_xy(&UNIT_SQUARE)
            .rasters(rasters)
            .build()
            .unwrap_err();
        assert!(matches!(err, BlobError::Raster(_)));
    }

    #[test]
    fn huge_contours_fail_instead_of_allocating() {
        let err = BlobBuilder::from_xy(&[(-2e9, 0.0), (2e9, 0.0), (0.0, 5.0)])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BlobError::Raster(raster::RasterError::TooLarge { width: 4_000_000_000, .. })
        ));

        let err = BlobBuilder::from_xy(&[(0.0, 0.0), (1e5, 0.0), (1e5, 1e5), (0.0, 1e5)])
            .build()
            .unwrap_err();
        assert!(matches!(err, BlobError::Raster(raster::RasterError::TooLarge { .. })));

        assert_eq!(
            BlobBuilder::from_xy(&[(0.0, 0.0), (3e9, 1.0), (1.0, 2.0)])
                .build()
                .unwrap_err(),
            BlobError::CoordinateOutOfRange
        );
    }

    #[test]
    fn collinear_contour_is_flagged_degenerate() {
        let blob = BlobBuilder::from_xy(&[(0.0, 0.0), (4.0, 0.0), (8.0, 0.0)])
            .build()
            .unwrap();
        assert!(blob.is_degenerate());
        assert_eq!(blob.height(), 0);
        assert_eq!(blob.area(), 0);
    }
}
