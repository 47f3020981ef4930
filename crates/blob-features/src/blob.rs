use std::cell::OnceCell;
use std::fmt;

use blob_features_core::{
    mean_distance_to, raster, BoundingBox, HuMoments, MinAreaRect, Moments, RigidTransform2,
};
use image::{GrayImage, Rgb, RgbImage};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::builder::BlobBuilder;
use crate::detached::DetachedBlob;
use crate::matching::hu_distance;
use crate::{BlobError, BlobRasters, MajorAxis, MatchParams, RectifyParams, SourceImage};

/// One connected foreground region of a segmented image.
///
/// A `Blob` is created in one step by [`BlobBuilder`] and is read-only
/// afterwards, except for its label. [`Blob::rotate`] consumes it and
/// returns a [`DetachedBlob`], since rotated geometry no longer lines up
/// with the bounding box or the source image.
#[derive(Clone, Debug)]
pub struct Blob<'a> {
    pub(crate) contour: Vec<Point2<f64>>,
    pub(crate) convex_hull: Vec<Point2<f64>>,
    pub(crate) holes: Vec<Vec<Point2<f64>>>,
    pub(crate) bounding_box: BoundingBox,
    pub(crate) min_rect: MinAreaRect,
    pub(crate) moments: Moments,
    pub(crate) hu: Option<HuMoments>,
    pub(crate) perimeter: f64,
    pub(crate) area: u64,
    pub(crate) rasters: BlobRasters,
    pub(crate) source: Option<SourceImage<'a>>,
    pub(crate) mean_color: OnceCell<[f64; 3]>,
    pub(crate) label: String,
    pub(crate) label_color: Option<Rgb<u8>>,
}

impl<'a> Blob<'a> {
    pub fn builder(contour: Vec<Point2<f64>>) -> BlobBuilder<'a> {
        BlobBuilder::new(contour)
    }

    // ---- bounding box ----

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn min_x(&self) -> i32 {
        self.bounding_box.min_x()
    }

    pub fn max_x(&self) -> i32 {
        self.bounding_box.max_x()
    }

    pub fn min_y(&self) -> i32 {
        self.bounding_box.min_y()
    }

    pub fn max_y(&self) -> i32 {
        self.bounding_box.max_y()
    }

    pub fn width(&self) -> u32 {
        self.bounding_box.width
    }

    pub fn height(&self) -> u32 {
        self.bounding_box.height
    }

    pub fn top_left_corner(&self) -> Point2<i32> {
        self.bounding_box.top_left()
    }

    pub fn top_right_corner(&self) -> Point2<i32> {
        self.bounding_box.top_right()
    }

    pub fn bottom_left_corner(&self) -> Point2<i32> {
        self.bounding_box.bottom_left()
    }

    pub fn bottom_right_corner(&self) -> Point2<i32> {
        self.bounding_box.bottom_right()
    }

    /// Integer midpoint of the bounding box.
    pub fn center(&self) -> Point2<i32> {
        self.bounding_box.center()
    }

    /// Longer side of the bounding box.
    pub fn length(&self) -> u32 {
        self.width().max(self.height())
    }

    /// Pixel count of the region (not the box area).
    pub fn area(&self) -> u64 {
        self.area
    }

    /// Bounding box `width / height`.
    pub fn aspect_ratio(&self) -> Result<f64, BlobError> {
        self.bounding_box.aspect_ratio().ok_or(BlobError::ZeroHeight)
    }

    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    // ---- stored geometry ----

    pub fn contour(&self) -> &[Point2<f64>] {
        &self.contour
    }

    pub fn convex_hull(&self) -> &[Point2<f64>] {
        &self.convex_hull
    }

    pub fn holes(&self) -> &[Vec<Point2<f64>>] {
        &self.holes
    }

    pub fn moments(&self) -> &Moments {
        &self.moments
    }

    /// `None` when the region has zero area and no invariants were supplied.
    pub fn hu_moments(&self) -> Option<&HuMoments> {
        self.hu.as_ref()
    }

    pub fn rasters(&self) -> &BlobRasters {
        &self.rasters
    }

    pub fn blob_image(&self) -> &RgbImage {
        &self.rasters.blob_image
    }

    pub fn blob_mask(&self) -> &GrayImage {
        &self.rasters.blob_mask
    }

    pub fn hull_image(&self) -> &RgbImage {
        &self.rasters.hull_image
    }

    pub fn hull_mask(&self) -> &GrayImage {
        &self.rasters.hull_mask
    }

    pub fn source(&self) -> Option<&SourceImage<'a>> {
        self.source.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn label_color(&self) -> Option<Rgb<u8>> {
        self.label_color
    }

    pub fn set_label(&mut self, label: impl Into<String>, color: Option<Rgb<u8>>) {
        self.label = label.into();
        self.label_color = color;
    }

    /// True when the contour collapses to a point or a segment. Angle,
    /// rectangle and moment based results are undefined for such blobs and
    /// the corresponding queries fail.
    pub fn is_degenerate(&self) -> bool {
        self.contour.len() < 3 || self.min_rect.is_degenerate() || self.moments.m00 == 0.0
    }

    /// Average colour of the source pixels under the blob mask, cached after
    /// the first call.
    pub fn mean_color(&self) -> Result<[f64; 3], BlobError> {
        if let Some(c) = self.mean_color.get() {
            return Ok(*c);
        }
        let source = self.source.as_ref().ok_or(BlobError::NoSourceImage)?;
        let color = raster::mean_color_masked(
            source.pixels(),
            &self.bounding_box,
            &self.rasters.blob_mask,
        )?;
        let _ = self.mean_color.set(color);
        Ok(color)
    }

    // ---- minimum-area rectangle ----

    pub fn min_area_rect(&self) -> &MinAreaRect {
        &self.min_rect
    }

    pub fn min_rect_x(&self) -> f64 {
        self.min_rect.center.x
    }

    pub fn min_rect_y(&self) -> f64 {
        self.min_rect.center.y
    }

    pub fn min_rect_width(&self) -> f64 {
        self.min_rect.width
    }

    pub fn min_rect_height(&self) -> f64 {
        self.min_rect.height
    }

    /// The minimum rectangle, or `DegenerateMinRect` when it has no area.
    pub(crate) fn proper_min_rect(&self) -> Result<&MinAreaRect, BlobError> {
        if self.min_rect.is_degenerate() {
            return Err(BlobError::DegenerateMinRect {
                width: self.min_rect.width,
                height: self.min_rect.height,
            });
        }
        Ok(&self.min_rect)
    }

    /// Rectangle angle in degrees: the raw angle when `width < height`,
    /// `90 + raw` otherwise. The result is not wrapped into any range.
    ///
    /// A point or segment has no orientation, so degenerate rectangles fail
    /// with `DegenerateMinRect`.
    pub fn angle(&self) -> Result<f64, BlobError> {
        let rect = self.proper_min_rect()?;
        Ok(if rect.width < rect.height {
            rect.angle
        } else {
            90.0 + rect.angle
        })
    }

    /// Corners of the minimum rectangle: top-left, top-right, bottom-left,
    /// bottom-right in the rectangle's own frame, rotated by [`Blob::angle`]
    /// and translated to its center.
    pub fn min_rect_points(&self) -> Result<[Point2<f64>; 4], BlobError> {
        let rect = self.proper_min_rect()?;
        let t = RigidTransform2::from_rotation_translation(
            blob_features_core::degrees_to_radians(self.angle()?),
            rect.center.x,
            rect.center.y,
        );
        let w = rect.width / 2.0;
        let h = rect.height / 2.0;
        Ok([
            t.apply(Point2::new(-w, h)),
            t.apply(Point2::new(w, h)),
            t.apply(Point2::new(-w, -h)),
            t.apply(Point2::new(w, -h)),
        ])
    }

    // ---- moments ----

    /// `(m10 / m00, m01 / m00)`.
    pub fn centroid(&self) -> Result<Point2<f64>, BlobError> {
        self.moments.centroid().ok_or(BlobError::ZeroArea)
    }

    /// Mean distance from the contour points to the centroid.
    pub fn radius(&self) -> Result<f64, BlobError> {
        let c = self.centroid()?;
        mean_distance_to(&self.contour, c).ok_or(BlobError::EmptyContour)
    }

    /// Mean distance from the hull points to the centroid.
    pub fn hull_radius(&self) -> Result<f64, BlobError> {
        let c = self.centroid()?;
        mean_distance_to(&self.convex_hull, c).ok_or(BlobError::EmptyHull)
    }

    /// Hu-moment distance to `other` with default [`MatchParams`].
    /// Lower is more similar; a blob matched against itself gives `0`.
    pub fn match_moments(&self, other: &Blob<'_>) -> Result<f64, BlobError> {
        self.match_moments_with(other, &MatchParams::default())
    }

    pub fn match_moments_with(
        &self,
        other: &Blob<'_>,
        params: &MatchParams,
    ) -> Result<f64, BlobError> {
        let a = self.hu.as_ref().ok_or(BlobError::ZeroArea)?;
        let b = other.hu.as_ref().ok_or(BlobError::ZeroArea)?;
        hu_distance(a, b, params)
    }

    // ---- rotation ----

    /// Rotate every raster about its own center and every point list about
    /// the origin by `degrees` (counter-clockwise in a y-up frame).
    ///
    /// The result no longer matches the bounding box, the minimum rectangle
    /// or the source image, so it is returned as a [`DetachedBlob`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(points = self.contour.len()))
    )]
    pub fn rotate(self, degrees: f64) -> Result<DetachedBlob, BlobError> {
        let mut detached = DetachedBlob::from_blob(self);
        detached.rotate(degrees)?;
        Ok(detached)
    }

    /// Rotation that [`Blob::rectify_major_axis`] applies.
    ///
    /// The wide branch (`width > height`) keeps the same value unless
    /// `params.adjust_wide_rotation` is set.
    pub fn rectify_rotation(
        &self,
        axis: MajorAxis,
        params: &RectifyParams,
    ) -> Result<f64, BlobError> {
        let mut rotation = self.angle()?;
        if self.min_rect.width > self.min_rect.height && params.adjust_wide_rotation {
            rotation -= 90.0;
        }
        if axis == MajorAxis::Horizontal {
            rotation -= 90.0;
        }
        Ok(rotation)
    }

    /// Rotate so the rectangle's major axis lines up with `axis`.
    pub fn rectify_major_axis(
        self,
        axis: MajorAxis,
        params: &RectifyParams,
    ) -> Result<DetachedBlob, BlobError> {
        let rotation = self.rectify_rotation(axis, params)?;
        log::debug!("rectifying {axis:?} axis with rotation {rotation:.3} deg");
        self.rotate(rotation)
    }
}

impl fmt::Display for Blob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.center();
        write!(f, "Blob at ({}, {}) with area {}", c.x, c.y, self.area)
    }
}
