use blob_features_core::HuMoments;

use crate::{BlobError, MatchParams};

/// Reciprocal log-transformed Hu distance: `Σ |1/M_i − 1/M'_i|` with
/// `M = sign(h)·ln|h|`.
///
/// A component takes part only when both sides have `|h|` above
/// `params.min_moment_magnitude` and a non-zero log term; otherwise it adds
/// nothing. NaN or infinite moments are rejected.
pub fn hu_distance(a: &HuMoments, b: &HuMoments, params: &MatchParams) -> Result<f64, BlobError> {
    if let Some(index) = a.first_non_finite().or_else(|| b.first_non_finite()) {
        return Err(BlobError::NonFiniteMoment { index });
    }

    let sa = a.log_signature(params.min_moment_magnitude);
    let sb = b.log_signature(params.min_moment_magnitude);

    let mut sum = 0.0;
    let mut used = 0usize;
    for (ma, mb) in sa.iter().zip(sb.iter()) {
        if let (Some(ma), Some(mb)) = (ma, mb) {
            sum += (1.0 / ma - 1.0 / mb).abs();
            used += 1;
        }
    }
    if used < sa.len() {
        log::trace!("hu distance used {used} of {} components", sa.len());
    }
    Ok(sum)
}
