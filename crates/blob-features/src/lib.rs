//! Shape descriptors for one segmented image region.
//!
//! A [`Blob`] bundles a region's contour, convex hull, holes, bounding box,
//! minimum-area rectangle, moments and four cropped rasters, and answers
//! geometric questions about them:
//! - bounding box and minimum-rectangle queries,
//! - rectangle, square and circle tests against the hull mask,
//! - Hu-moment similarity between two blobs,
//! - rotation, which turns the blob into a [`DetachedBlob`],
//! - drawing to any `DrawingLayer` backend.
//!
//! ## Quickstart
//!
//! ```
//! use blob_features::{BlobBuilder, ShapeParams};
//!
//! # fn main() -> Result<(), blob_features::BlobError> {
//! let blob = BlobBuilder::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
//!     .build()?;
//! assert_eq!(blob.area(), 100);
//! assert!(blob.shape_flags(&ShapeParams::default())?.square);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `blob_features::core`: geometry, moments, rasters and the drawing trait.
//! - [`Blob`] / [`BlobBuilder`]: construction and queries.
//! - [`DetachedBlob`]: rotated, geometry-only blob.
//! - [`ShapeParams`], [`MatchParams`], [`RectifyParams`], [`DrawStyle`]: settings.

pub use blob_features_core as core;

mod blob;
mod builder;
mod detached;
mod draw;
mod error;
mod matching;
mod params;
mod rasters;
mod shape;
mod source;

pub use blob::Blob;
pub use builder::{BlobBuilder, DEFAULT_LABEL};
pub use detached::DetachedBlob;
pub use error::BlobError;
pub use matching::hu_distance;
pub use params::{DrawStyle, MajorAxis, MatchParams, RectifyParams, ShapeParams};
pub use rasters::BlobRasters;
pub use shape::ShapeFlags;
pub use source::SourceImage;
