//! Raster operations on cropped blob images and masks.
//!
//! Masks are `image::GrayImage` buffers where foreground is white. A pixel
//! counts as foreground when its value is at least
//! [`FOREGROUND_THRESHOLD`], which matches a two-bin histogram split.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use nalgebra::{Point2, Vector2};

use crate::geometry::BoundingBox;
use crate::transform::{degrees_to_radians, RigidTransform2};

pub const FOREGROUND_THRESHOLD: u8 = 128;
pub const WHITE: u8 = 255;

/// Largest `width * height` a blob raster may have (64 Mpx).
pub const MAX_RASTER_PIXELS: u64 = 1 << 26;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("image size mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("region {roi:?} does not fit inside a {width}x{height} image")]
    RoiOutOfBounds {
        roi: BoundingBox,
        width: u32,
        height: u32,
    },
    #[error("mask has no foreground pixels")]
    EmptyMask,
    #[error("rotation angle is not finite")]
    NonFiniteAngle,
    #[error("{width}x{height} raster exceeds {} pixels", MAX_RASTER_PIXELS)]
    TooLarge { width: u32, height: u32 },
}

/// Reject sizes above [`MAX_RASTER_PIXELS`] before anything is allocated.
pub fn ensure_renderable(width: u32, height: u32) -> Result<(), RasterError> {
    if u64::from(width) * u64::from(height) > MAX_RASTER_PIXELS {
        return Err(RasterError::TooLarge { width, height });
    }
    Ok(())
}

fn ensure_same_size(expected: (u32, u32), actual: (u32, u32)) -> Result<(), RasterError> {
    if expected != actual {
        return Err(RasterError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

fn ensure_roi_inside(roi: &BoundingBox, width: u32, height: u32) -> Result<(), RasterError> {
    let inside = roi.x >= 0
        && roi.y >= 0
        && roi.max_x() as i64 <= width as i64
        && roi.max_y() as i64 <= height as i64;
    if !inside {
        return Err(RasterError::RoiOutOfBounds {
            roi: *roi,
            width,
            height,
        });
    }
    Ok(())
}

/// Two-bin histogram `[background, foreground]`.
pub fn binary_histogram(mask: &GrayImage) -> [u64; 2] {
    let mut bins = [0u64; 2];
    for p in mask.pixels() {
        bins[(p.0[0] >= FOREGROUND_THRESHOLD) as usize] += 1;
    }
    bins
}

#[inline]
pub fn foreground_count(mask: &GrayImage) -> u64 {
    binary_histogram(mask)[1]
}

/// Filled white disk on a black canvas, centred on pixel `center`.
///
/// Midpoint rasterisation: the disk spans `center ± radius` pixels
/// inclusive, so its area is close to `π (radius + 0.5)²`.
pub fn filled_circle_mask(width: u32, height: u32, center: Point2<i32>, radius: i32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    draw_filled_circle_mut(&mut mask, (center.x, center.y), radius, Luma([WHITE]));
    mask
}

/// Even-odd scanline fill of one or more closed rings.
///
/// Ring coordinates are shifted by `-offset` first, so passing a bounding
/// box origin renders the polygon into the box's local frame. Rings that
/// overlap cancel out, which carves holes out of an outer contour.
pub fn fill_polygon_mask(
    width: u32,
    height: u32,
    rings: &[&[Point2<f64>]],
    offset: Vector2<f64>,
) -> GrayImage {
    let mut out = GrayImage::new(width, height);
    let mut xs: Vec<f64> = Vec::new();

    for y in 0..height {
        let yc = y as f64 + 0.5 + offset.y;
        xs.clear();
        for ring in rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            for i in 0..n {
                let a = ring[i];
                let b = ring[(i + 1) % n];
                if (a.y <= yc) != (b.y <= yc) {
                    let t = (yc - a.y) / (b.y - a.y);
                    xs.push(a.x + t * (b.x - a.x) - offset.x);
                }
            }
        }
        xs.sort_by(f64::total_cmp);

        for span in xs.chunks_exact(2) {
            let x0 = (span[0] - 0.5).ceil().max(0.0);
            let x1 = (span[1] - 0.5).ceil().min(width as f64);
            if x1 <= x0 {
                continue;
            }
            for x in x0 as u32..x1 as u32 {
                out.put_pixel(x, y, Luma([WHITE]));
            }
        }
    }
    out
}

/// Per-pixel `a - b`, clamped at zero.
pub fn subtract_saturating(a: &GrayImage, b: &GrayImage) -> Result<GrayImage, RasterError> {
    ensure_same_size(a.dimensions(), b.dimensions())?;
    Ok(GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y).0[0].saturating_sub(b.get_pixel(x, y).0[0])])
    }))
}

/// Per-pixel `a + b`, clamped at 255.
pub fn add_saturating(a: &GrayImage, b: &GrayImage) -> Result<GrayImage, RasterError> {
    ensure_same_size(a.dimensions(), b.dimensions())?;
    Ok(GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y).0[0].saturating_add(b.get_pixel(x, y).0[0])])
    }))
}

/// Mean colour of `image` over the non-zero pixels of `mask`, where `mask`
/// covers `roi` of the image.
pub fn mean_color_masked(
    image: &RgbImage,
    roi: &BoundingBox,
    mask: &GrayImage,
) -> Result<[f64; 3], RasterError> {
    ensure_roi_inside(roi, image.width(), image.height())?;
    ensure_same_size((roi.width, roi.height), mask.dimensions())?;

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for (x, y, m) in mask.enumerate_pixels() {
        if m.0[0] == 0 {
            continue;
        }
        let px = image.get_pixel(roi.x as u32 + x, roi.y as u32 + y);
        for c in 0..3 {
            sum[c] += px.0[c] as u64;
        }
        count += 1;
    }
    if count == 0 {
        return Err(RasterError::EmptyMask);
    }
    let n = count as f64;
    Ok([sum[0] as f64 / n, sum[1] as f64 / n, sum[2] as f64 / n])
}

/// Copy the pixels of `roi` where `mask` is set; everything else is black.
pub fn copy_masked(
    image: &RgbImage,
    roi: &BoundingBox,
    mask: &GrayImage,
) -> Result<RgbImage, RasterError> {
    ensure_roi_inside(roi, image.width(), image.height())?;
    ensure_same_size((roi.width, roi.height), mask.dimensions())?;
    Ok(RgbImage::from_fn(roi.width, roi.height, |x, y| {
        if mask.get_pixel(x, y).0[0] == 0 {
            Rgb([0, 0, 0])
        } else {
            *image.get_pixel(roi.x as u32 + x, roi.y as u32 + y)
        }
    }))
}

/// Scale the mask into each channel of `color` (`mask * color / 255`).
pub fn tint_mask(mask: &GrayImage, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let m = mask.get_pixel(x, y).0[0] as u32;
        Rgb(color.0.map(|c| ((m * c as u32 + 127) / 255) as u8))
    })
}

/// Grey mask replicated into three channels.
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    tint_mask(mask, Rgb([WHITE, WHITE, WHITE]))
}

#[inline]
fn get_rgb(src: &RgbImage, x: i64, y: i64) -> [f64; 3] {
    if x < 0 || y < 0 || x >= src.width() as i64 || y >= src.height() as i64 {
        return [0.0; 3];
    }
    src.get_pixel(x as u32, y as u32).0.map(f64::from)
}

/// Bilinear sample with pixel `i` centred at `i + 0.5`; black outside.
pub fn sample_bilinear_rgb(src: &RgbImage, x: f64, y: f64) -> [f64; 3] {
    let gx = x - 0.5;
    let gy = y - 0.5;
    let x0 = gx.floor() as i64;
    let y0 = gy.floor() as i64;
    let fx = gx - x0 as f64;
    let fy = gy - y0 as f64;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0.0; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = a + fy * (b - a);
    }
    out
}

fn inverse_rotation(degrees: f64, pivot: Point2<f64>) -> Result<RigidTransform2, RasterError> {
    if !degrees.is_finite() {
        return Err(RasterError::NonFiniteAngle);
    }
    Ok(RigidTransform2::rotation_about(
        -degrees_to_radians(degrees),
        pivot,
    ))
}

/// Rotate a mask by `degrees` about `pivot`, keeping its size.
///
/// Nearest-neighbour sampling keeps the mask binary. Pixels that map from
/// outside the source are black.
pub fn rotate_mask(
    mask: &GrayImage,
    degrees: f64,
    pivot: Point2<f64>,
) -> Result<GrayImage, RasterError> {
    let dst_to_src = inverse_rotation(degrees, pivot)?;
    let (w, h) = mask.dimensions();
    Ok(GrayImage::from_fn(w, h, |x, y| {
        let p = dst_to_src.apply(Point2::new(x as f64 + 0.5, y as f64 + 0.5));
        let sx = p.x.floor();
        let sy = p.y.floor();
        if sx < 0.0 || sy < 0.0 || sx >= w as f64 || sy >= h as f64 {
            Luma([0])
        } else {
            *mask.get_pixel(sx as u32, sy as u32)
        }
    }))
}

/// Rotate a colour image by `degrees` about `pivot` with bilinear sampling.
pub fn rotate_rgb(
    image: &RgbImage,
    degrees: f64,
    pivot: Point2<f64>,
) -> Result<RgbImage, RasterError> {
    let dst_to_src = inverse_rotation(degrees, pivot)?;
    let (w, h) = image.dimensions();
    Ok(RgbImage::from_fn(w, h, |x, y| {
        let p = dst_to_src.apply(Point2::new(x as f64 + 0.5, y as f64 + 0.5));
        let v = sample_bilinear_rgb(image, p.x, p.y);
        Rgb(v.map(|c| c.round().clamp(0.0, 255.0) as u8))
    }))
}

/// Center of a raster in continuous pixel coordinates.
pub fn raster_center(width: u32, height: u32) -> Point2<f64> {
    Point2::new(width as f64 / 2.0, height as f64 / 2.0)
}

/// Pixel holding the raster center, `(width / 2, height / 2)`.
pub fn center_pixel(width: u32, height: u32) -> Point2<i32> {
    let half = |v: u32| i32::try_from(v / 2).unwrap_or(i32::MAX);
    Point2::new(half(width), half(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, side: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + side, y0),
            Point2::new(x0 + side, y0 + side),
            Point2::new(x0, y0 + side),
        ]
    }

    #[test]
    fn polygon_fill_covers_integer_square_exactly() {
        let poly = square(0.0, 0.0, 10.0);
        let mask = fill_polygon_mask(10, 10, &[&poly], Vector2::zeros());
        assert_eq!(binary_histogram(&mask), [0, 100]);
    }

    #[test]
    fn polygon_fill_uses_offset_and_carves_holes() {
        let outer = square(20.0, 30.0, 10.0);
        let hole = square(23.0, 33.0, 4.0);
        let mask = fill_polygon_mask(10, 10, &[&outer, &hole], Vector2::new(20.0, 30.0));
        assert_eq!(foreground_count(&mask), 100 - 16);
        assert_eq!(mask.get_pixel(0, 0).0[0], WHITE);
        assert_eq!(mask.get_pixel(4, 4).0[0], 0);
    }

    #[test]
    fn circle_mask_area_is_close_to_analytic() {
        let mask = filled_circle_mask(100, 100, Point2::new(50, 50), 40);
        let white = foreground_count(&mask) as f64;
        let ideal = std::f64::consts::PI * 40.5 * 40.5;
        assert!((white - ideal).abs() / ideal < 0.01, "white={white}");
        assert_eq!(mask.get_pixel(10, 50).0[0], WHITE);
        assert_eq!(mask.get_pixel(90, 50).0[0], WHITE);
        assert_eq!(mask.get_pixel(9, 50).0[0], 0);
    }

    #[test]
    fn circle_is_clipped_to_the_canvas() {
        let mask = filled_circle_mask(4, 4, center_pixel(4, 4), 2);
        assert_eq!(center_pixel(4, 4), Point2::new(2, 2));
        assert_eq!(mask.get_pixel(0, 2).0[0], WHITE);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn oversized_rasters_are_refused() {
        assert_eq!(ensure_renderable(8192, 8192), Ok(()));
        assert_eq!(
            ensure_renderable(100_000, 100_000),
            Err(RasterError::TooLarge {
                width: 100_000,
                height: 100_000
            })
        );
        assert!(ensure_renderable(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn saturating_difference_is_symmetric() {
        let a = filled_circle_mask(20, 20, Point2::new(10, 10), 5);
        let b = fill_polygon_mask(20, 20, &[&square(4.0, 4.0, 12.0)], Vector2::zeros());
        let ab = add_saturating(
            &subtract_saturating(&a, &b).unwrap(),
            &subtract_saturating(&b, &a).unwrap(),
        )
        .unwrap();
        let ba = add_saturating(
            &subtract_saturating(&b, &a).unwrap(),
            &subtract_saturating(&a, &b).unwrap(),
        )
        .unwrap();
        assert_eq!(ab, ba);
        assert_eq!(
            foreground_count(&ab),
            foreground_count(&b) - foreground_count(&a)
        );
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = GrayImage::new(4, 4);
        let b = GrayImage::new(4, 5);
        assert_eq!(
            subtract_saturating(&a, &b),
            Err(RasterError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 5)
            })
        );
    }

    #[test]
    fn mean_color_respects_mask_and_roi() {
        let mut img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        img.put_pixel(3, 3, Rgb([110, 120, 130]));
        let roi = BoundingBox::new(2, 2, 2, 2);
        let mut mask = GrayImage::new(2, 2);
        mask.put_pixel(0, 0, Luma([WHITE]));
        mask.put_pixel(1, 1, Luma([WHITE]));
        let mean = mean_color_masked(&img, &roi, &mask).unwrap();
        assert_eq!(mean, [60.0, 70.0, 80.0]);

        let outside = BoundingBox::new(7, 7, 2, 2);
        assert!(matches!(
            mean_color_masked(&img, &outside, &mask),
            Err(RasterError::RoiOutOfBounds { .. })
        ));
        assert_eq!(
            mean_color_masked(&img, &roi, &GrayImage::new(2, 2)),
            Err(RasterError::EmptyMask)
        );
    }

    #[test]
    fn copy_masked_blacks_out_background() {
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 100, 50]));
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(1, 0, Luma([WHITE]));
        let out = copy_masked(&img, &BoundingBox::new(1, 1, 2, 1), &mask).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([200, 100, 50]));
    }

    #[test]
    fn tint_scales_by_mask_value() {
        let mask = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { WHITE }]));
        let tinted = tint_mask(&mask, Rgb([0, 255, 128]));
        assert_eq!(tinted.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(tinted.get_pixel(1, 0), &Rgb([0, 255, 128]));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let mask = fill_polygon_mask(9, 7, &[&square(1.0, 1.0, 4.0)], Vector2::zeros());
        let rotated = rotate_mask(&mask, 0.0, raster_center(9, 7)).unwrap();
        assert_eq!(mask, rotated);

        let img = RgbImage::from_fn(5, 5, |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 7]));
        let rotated = rotate_rgb(&img, 0.0, raster_center(5, 5)).unwrap();
        assert_eq!(img, rotated);
    }

    #[test]
    fn half_turn_mirrors_mask_through_center() {
        let mut mask = GrayImage::new(6, 4);
        mask.put_pixel(0, 0, Luma([WHITE]));
        let rotated = rotate_mask(&mask, 180.0, raster_center(6, 4)).unwrap();
        assert_eq!(foreground_count(&rotated), 1);
        assert_eq!(rotated.get_pixel(5, 3).0[0], WHITE);
    }

    #[test]
    fn non_finite_angle_is_an_error() {
        let mask = GrayImage::new(3, 3);
        assert_eq!(
            rotate_mask(&mask, f64::NAN, raster_center(3, 3)),
            Err(RasterError::NonFiniteAngle)
        );
    }
}
