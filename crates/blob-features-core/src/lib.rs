//! Geometry, moment and raster building blocks for blob shape analysis.
//!
//! This crate knows nothing about blobs. It provides:
//! - bounding boxes, convex hulls and minimum-area rectangles over
//!   `nalgebra::Point2<f64>` polygons,
//! - polygon moments and the seven Hu invariants,
//! - a homogeneous 2D rotation/translation transform,
//! - raster helpers on `image::GrayImage` / `image::RgbImage` masks,
//! - the [`DrawingLayer`] trait that rendering backends implement.

mod drawing;
mod geometry;
mod logger;
mod moments;
pub mod raster;
mod transform;

pub use drawing::{DrawingLayer, LayerError, BLACK, GREEN, RED, WHITE};
pub use geometry::{
    convex_hull, mean_distance_to, min_area_rect, polygon_perimeter, polygon_signed_area,
    BoundingBox, MinAreaRect,
};
pub use moments::{HuMoments, Moments, NormalizedCentralMoments};
pub use raster::RasterError;
pub use transform::{degrees_to_radians, RigidTransform2};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV_VAR};
