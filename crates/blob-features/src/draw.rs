//! Rendering delegation: blobs hand their geometry to a [`DrawingLayer`].
//!
//! Every `Blob::draw_*` method takes an optional layer. With `None` the
//! source image's layer is borrowed for the duration of the call.

use blob_features_core::{raster, DrawingLayer, BLACK};
use nalgebra::{Point2, Vector2};

use crate::{Blob, BlobError, DrawStyle};

/// Filled polygon, or a closed polyline of `style.width` pixels. A two-point
/// ring is a single segment.
pub(crate) fn draw_closed(
    layer: &mut dyn DrawingLayer,
    points: &[Point2<f64>],
    style: DrawStyle,
) -> Result<(), BlobError> {
    if points.is_empty() {
        return Ok(());
    }
    if style.is_filled() {
        layer.polygon(points, style.color, true, style.alpha)?;
        return Ok(());
    }
    for pair in points.windows(2) {
        layer.line(pair[0], pair[1], style.color, style.stroke_width(), style.alpha)?;
    }
    if let [first, .., last] = points {
        if points.len() > 2 {
            layer.line(*last, *first, style.color, style.stroke_width(), style.alpha)?;
        }
    }
    Ok(())
}

pub(crate) fn draw_rings(
    layer: &mut dyn DrawingLayer,
    rings: &[Vec<Point2<f64>>],
    style: DrawStyle,
) -> Result<(), BlobError> {
    for ring in rings {
        draw_closed(layer, ring, style)?;
    }
    Ok(())
}

fn to_f64(p: Point2<i32>) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}

impl Blob<'_> {
    /// Run `f` on `layer`, or on the source image's layer when `layer` is `None`.
    fn with_layer(
        &self,
        layer: Option<&mut dyn DrawingLayer>,
        f: impl FnOnce(&mut dyn DrawingLayer) -> Result<(), BlobError>,
    ) -> Result<(), BlobError> {
        if let Some(layer) = layer {
            return f(layer);
        }
        let cell = self
            .source
            .and_then(|s| s.layer())
            .ok_or(BlobError::NoDrawingLayer)?;
        let mut guard = cell.try_borrow_mut().map_err(|_| BlobError::LayerBusy)?;
        f(&mut *guard)
    }

    /// Filled styles blit the mask tinted with `style.color` at the bounding
    /// box origin (black is transparent). Outline styles draw the contour and
    /// the holes.
    pub fn draw(
        &self,
        style: DrawStyle,
        layer: Option<&mut dyn DrawingLayer>,
    ) -> Result<(), BlobError> {
        self.with_layer(layer, |layer| {
            if style.is_filled() {
                let tinted = raster::tint_mask(&self.rasters.blob_mask, style.color);
                layer.blit(&tinted, self.top_left_corner(), Some(BLACK), style.alpha)?;
                Ok(())
            } else {
                draw_closed(layer, &self.contour, style)?;
                draw_rings(layer, &self.holes, style)
            }
        })
    }

    pub fn draw_outline(
        &self,
        style: DrawStyle,
        layer: Option<&mut dyn DrawingLayer>,
    ) -> Result<(), BlobError> {
        self.with_layer(layer, |layer| draw_closed(layer, &self.contour, style))
    }

    /// No-op for a blob without holes, even when no layer is available.
    pub fn draw_holes(
        &self,
        style: DrawStyle,
        layer: Option<&mut dyn DrawingLayer>,
    ) -> Result<(), BlobError> {
        if self.holes.is_empty() {
            return Ok(());
        }
        self.with_layer(layer, |layer| draw_rings(layer, &self.holes, style))
    }

    pub fn draw_hull(
        &self,
        style: DrawStyle,
        layer: Option<&mut dyn DrawingLayer>,
    ) -> Result<(), BlobError> {
        self.with_layer(layer, |layer| draw_closed(layer, &self.convex_hull, style))
    }

    /// Bounding box; a width below 1 fills it.
    pub fn draw_rect(
        &self,
        style: DrawStyle,
        layer: Option<&mut dyn DrawingLayer>,
    ) -> Result<(), BlobError> {
        let origin = to_f64(self.top_left_corner());
        let size = Vector2::new(self.width() as f64, self.height() as f64);
        self.with_layer(layer, |layer| {
            layer.rectangle(
                origin,
                size,
                style.color,
                style.stroke_width(),
                style.width < 1,
                style.alpha,
            )?;
            Ok(())
        })
    }

    /// Minimum-area rectangle as four edges, or one filled polygon. Fails
    /// with `DegenerateMinRect` before touching the layer when the rectangle
    /// has no area.
    pub fn draw_min_rect(
        &self,
        style: DrawStyle,
        layer: Option<&mut dyn DrawingLayer>,
    ) -> Result<(), BlobError> {
        let [tl, tr, bl, br] = self.min_rect_points()?;
        self.with_layer(layer, |layer| {
            if style.is_filled() {
                layer.polygon(&[tl, tr, br, bl], style.color, true, style.alpha)?;
                return Ok(());
            }
            let w = style.stroke_width();
            for (a, b) in [(tl, tr), (bl, br), (tl, bl), (tr, br)] {
                layer.line(a, b, style.color, w, style.alpha)?;
            }
            Ok(())
        })
    }

    /// Blit the blob image at the bounding box origin shifted by `offset`.
    pub fn draw_mask_to_layer(
        &self,
        offset: Vector2<i32>,
        layer: Option<&mut dyn DrawingLayer>,
    ) -> Result<(), BlobError> {
        let at = self.top_left_corner() + offset;
        self.with_layer(layer, |layer| {
            layer.blit(&self.rasters.blob_image, at, None, None)?;
            Ok(())
        })
    }
}
