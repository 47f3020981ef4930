use blob_features_core::{LayerError, RasterError};

/// Errors returned by blob queries and transforms.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BlobError {
    #[error("contour is empty")]
    EmptyContour,
    #[error("convex hull is empty")]
    EmptyHull,
    #[error("point coordinates must be finite")]
    NonFiniteCoordinate,
    #[error("contour extent does not fit an i32 bounding box")]
    CoordinateOutOfRange,
    #[error("blob has zero area (m00 == 0)")]
    ZeroArea,
    #[error("bounding box has zero height")]
    ZeroHeight,
    #[error("minimum-area rectangle is degenerate ({width} x {height})")]
    DegenerateMinRect { width: f64, height: f64 },
    #[error("bounding box too small for a reference circle ({width} x {height})")]
    ZeroRadius { width: u32, height: u32 },
    #[error("Hu moment {index} is not finite")]
    NonFiniteMoment { index: usize },
    #[error("blob has no source image")]
    NoSourceImage,
    #[error("no drawing layer given and the source image has none")]
    NoDrawingLayer,
    #[error("source drawing layer is already borrowed")]
    LayerBusy,
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Layer(#[from] LayerError),
}
