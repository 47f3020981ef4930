use image::{Rgb, RgbImage};
use nalgebra::{Point2, Vector2};

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Failure reported by a drawing backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("drawing layer failed: {message}")]
pub struct LayerError {
    pub message: String,
}

impl LayerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Overlay that receives vector primitives and image blits.
///
/// Coordinates are image pixels. `alpha` is `0` (transparent) to `255`
/// (opaque); `None` leaves the layer's own default in place.
pub trait DrawingLayer {
    fn line(
        &mut self,
        from: Point2<f64>,
        to: Point2<f64>,
        color: Rgb<u8>,
        width: u32,
        alpha: Option<u8>,
    ) -> Result<(), LayerError>;

    fn polygon(
        &mut self,
        points: &[Point2<f64>],
        color: Rgb<u8>,
        filled: bool,
        alpha: Option<u8>,
    ) -> Result<(), LayerError>;

    fn rectangle(
        &mut self,
        origin: Point2<f64>,
        size: Vector2<f64>,
        color: Rgb<u8>,
        width: u32,
        filled: bool,
        alpha: Option<u8>,
    ) -> Result<(), LayerError>;

    fn circle(
        &mut self,
        center: Point2<f64>,
        radius: f64,
        filled: bool,
        color: Rgb<u8>,
    ) -> Result<(), LayerError>;

    /// Paste `image` with its top-left corner at `at`. Pixels equal to
    /// `color_key` are treated as transparent.
    fn blit(
        &mut self,
        image: &RgbImage,
        at: Point2<i32>,
        color_key: Option<Rgb<u8>>,
        alpha: Option<u8>,
    ) -> Result<(), LayerError>;
}
