use blob_features_core::{DrawingLayer, HuMoments, RigidTransform2};
use image::{GrayImage, Rgb, RgbImage};
use nalgebra::Point2;

use crate::draw::{draw_closed, draw_rings};
use crate::matching::hu_distance;
use crate::{Blob, BlobError, BlobRasters, DrawStyle, MatchParams};

/// A blob after rotation.
///
/// Only the data that stays meaningful under rotation is kept: point lists,
/// the four rasters, the Hu invariants and the label. It has no source image,
/// so every drawing call takes an explicit layer.
#[derive(Clone, Debug)]
pub struct DetachedBlob {
    contour: Vec<Point2<f64>>,
    convex_hull: Vec<Point2<f64>>,
    holes: Vec<Vec<Point2<f64>>>,
    rasters: BlobRasters,
    hu: Option<HuMoments>,
    label: String,
    label_color: Option<Rgb<u8>>,
    rotation: f64,
}

impl DetachedBlob {
    pub(crate) fn from_blob(blob: Blob<'_>) -> Self {
        Self {
            contour: blob.contour,
            convex_hull: blob.convex_hull,
            holes: blob.holes,
            rasters: blob.rasters,
            hu: blob.hu,
            label: blob.label,
            label_color: blob.label_color,
            rotation: 0.0,
        }
    }

    /// Rotate further by `degrees`. Rasters turn about their own center,
    /// points about the origin. Nothing changes if the rasters fail.
    pub fn rotate(&mut self, degrees: f64) -> Result<(), BlobError> {
        let rasters = self.rasters.rotated(degrees)?;
        let t = RigidTransform2::rotation_degrees(degrees);

        self.rasters = rasters;
        self.contour = t.apply_all(&self.contour);
        self.convex_hull = t.apply_all(&self.convex_hull);
        for hole in &mut self.holes {
            *hole = t.apply_all(hole);
        }
        self.rotation += degrees;
        Ok(())
    }

    /// Total rotation applied since the blob was detached, in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn contour(&self) -> &[Point2<f64>] {
        &self.contour
    }

    pub fn convex_hull(&self) -> &[Point2<f64>] {
        &self.convex_hull
    }

    pub fn holes(&self) -> &[Vec<Point2<f64>>] {
        &self.holes
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

    pub fn hu_moments(&self) -> Option<&HuMoments> {
        self.hu.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn label_color(&self) -> Option<Rgb<u8>> {
        self.label_color
    }

    /// Hu invariants are unchanged by rotation, so this equals the distance
    /// computed before detaching.
    pub fn match_moments(
        &self,
        other: &DetachedBlob,
        params: &MatchParams,
    ) -> Result<f64, BlobError> {
        let a = self.hu.as_ref().ok_or(BlobError::ZeroArea)?;
        let b = other.hu.as_ref().ok_or(BlobError::ZeroArea)?;
        hu_distance(a, b, params)
    }

    pub fn draw_outline(
        &self,
        layer: &mut dyn DrawingLayer,
        style: DrawStyle,
    ) -> Result<(), BlobError> {
        draw_closed(layer, &self.contour, style)
    }

    pub fn draw_hull(
        &self,
        layer: &mut dyn DrawingLayer,
        style: DrawStyle,
    ) -> Result<(), BlobError> {
        draw_closed(layer, &self.convex_hull, style)
    }

    pub fn draw_holes(
        &self,
        layer: &mut dyn DrawingLayer,
        style: DrawStyle,
    ) -> Result<(), BlobError> {
        draw_rings(layer, &self.holes, style)
    }
}
