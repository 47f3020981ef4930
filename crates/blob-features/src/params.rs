use blob_features_core::GREEN;
use image::Rgb;
use serde::{Deserialize, Serialize};

/// Tolerances for the hull-based shape tests.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Upper bound on `rectangle_distance` for a rectangle.
    pub rectangle_tolerance: f64,
    /// Upper bound on `|1 - aspect_ratio|` for a square.
    pub square_ratio_tolerance: f64,
    /// Upper bound on `circle_distance` for a circle.
    pub circle_tolerance: f64,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            rectangle_tolerance: 0.05,
            square_ratio_tolerance: 0.05,
            circle_tolerance: 0.05,
        }
    }
}

/// Hu-moment matching settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Components with `|h|` at or below this value are left out of the
    /// distance on either side.
    pub min_moment_magnitude: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            min_moment_magnitude: 1e-5,
        }
    }
}

/// Target orientation for the long axis in `rectify_major_axis`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MajorAxis {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyParams {
    /// When the minimum rectangle is wider than tall, subtract a further
    /// 90 degrees. Off by default: the wide case then rotates by the same
    /// amount as the tall case.
    pub adjust_wide_rotation: bool,
}

/// Colour, stroke width and opacity for the `draw_*` helpers.
///
/// A negative `width` fills the shape instead of stroking it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawStyle {
    pub color: Rgb<u8>,
    pub width: i32,
    pub alpha: Option<u8>,
}

impl DrawStyle {
    pub fn filled(color: Rgb<u8>) -> Self {
        Self {
            color,
            width: -1,
            alpha: None,
        }
    }

    pub fn outline(color: Rgb<u8>, width: u32) -> Self {
        Self {
            color,
            width: i32::try_from(width).unwrap_or(i32::MAX),
            alpha: None,
        }
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = Some(alpha);
        self
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.width < 0
    }

    #[inline]
    pub(crate) fn stroke_width(&self) -> u32 {
        self.width.max(0) as u32
    }
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self::filled(GREEN)
    }
}
