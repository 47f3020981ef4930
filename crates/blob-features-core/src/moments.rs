//! Spatial moments of a polygon and the seven Hu invariants.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Raw spatial moments up to third order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
}

/// Central moments normalized for scale (`nu_pq`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedCentralMoments {
    pub nu20: f64,
    pub nu11: f64,
    pub nu02: f64,
    pub nu30: f64,
    pub nu21: f64,
    pub nu12: f64,
    pub nu03: f64,
}

impl Moments {
    /// Moments of the region enclosed by a closed polygon (Green's theorem).
    ///
    /// Orientation does not matter; a clockwise polygon gives the same
    /// (positive) `m00` as its reversed counterpart.
    pub fn from_polygon(points: &[Point2<f64>]) -> Self {
        let n = points.len();
        if n < 3 {
            return Self::default();
        }

        let mut a00 = 0.0;
        let mut a10 = 0.0;
        let mut a01 = 0.0;
        let mut a20 = 0.0;
        let mut a11 = 0.0;
        let mut a02 = 0.0;
        let mut a30 = 0.0;
        let mut a21 = 0.0;
        let mut a12 = 0.0;
        let mut a03 = 0.0;

        let mut prev = points[n - 1];
        for &cur in points {
            let (xp, yp) = (prev.x, prev.y);
            let (xc, yc) = (cur.x, cur.y);
            let xp2 = xp * xp;
            let yp2 = yp * yp;
            let xc2 = xc * xc;
            let yc2 = yc * yc;

            let dxy = xp * yc - xc * yp;
            let xs = xp + xc;
            let ys = yp + yc;

            a00 += dxy;
            a10 += dxy * xs;
            a01 += dxy * ys;
            a20 += dxy * (xp * xs + xc2);
            a11 += dxy * (xp * (ys + yp) + xc * (ys + yc));
            a02 += dxy * (yp * ys + yc2);
            a30 += dxy * xs * (xp2 + xc2);
            a03 += dxy * ys * (yp2 + yc2);
            a21 += dxy * (xp2 * (3.0 * yp + yc) + 2.0 * xc * xp * ys + xc2 * (yp + 3.0 * yc));
            a12 += dxy * (yp2 * (3.0 * xp + xc) + 2.0 * yc * yp * xs + yc2 * (xp + 3.0 * xc));

            prev = cur;
        }

        let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
            m20: sign * a20 / 12.0,
            m11: sign * a11 / 24.0,
            m02: sign * a02 / 12.0,
            m30: sign * a30 / 20.0,
            m21: sign * a21 / 60.0,
            m12: sign * a12 / 60.0,
            m03: sign * a03 / 20.0,
        }
    }

    /// `(m10 / m00, m01 / m00)`, or `None` for a zero-area region.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.m00 == 0.0 || !self.m00.is_finite() {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }

    pub fn normalized_central(&self) -> Option<NormalizedCentralMoments> {
        let c = self.centroid()?;
        let (cx, cy) = (c.x, c.y);

        let mu20 = self.m20 - cx * self.m10;
        let mu11 = self.m11 - cx * self.m01;
        let mu02 = self.m02 - cy * self.m01;
        let mu30 = self.m30 - cx * (3.0 * mu20 + cx * self.m10);
        let mu21 = self.m21 - cx * (2.0 * mu11 + cx * self.m01) - cy * mu20;
        let mu12 = self.m12 - cy * (2.0 * mu11 + cy * self.m10) - cx * mu02;
        let mu03 = self.m03 - cy * (3.0 * mu02 + cy * self.m01);

        let inv_m00 = 1.0 / self.m00.abs();
        let s2 = inv_m00 * inv_m00;
        let s3 = s2 * inv_m00.sqrt();

        Some(NormalizedCentralMoments {
            nu20: mu20 * s2,
            nu11: mu11 * s2,
            nu02: mu02 * s2,
            nu30: mu30 * s3,
            nu21: mu21 * s3,
            nu12: mu12 * s3,
            nu03: mu03 * s3,
        })
    }

    /// Hu invariants, or `None` for a zero-area region.
    pub fn hu(&self) -> Option<HuMoments> {
        self.normalized_central().map(|nu| HuMoments::from_normalized(&nu))
    }
}

/// The seven Hu moment invariants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HuMoments(pub [f64; 7]);

impl HuMoments {
    pub fn new(values: [f64; 7]) -> Self {
        Self(values)
    }

    pub fn from_normalized(nu: &NormalizedCentralMoments) -> Self {
        let mut t0 = nu.nu30 + nu.nu12;
        let mut t1 = nu.nu21 + nu.nu03;

        let mut q0 = t0 * t0;
        let mut q1 = t1 * t1;

        let n4 = 4.0 * nu.nu11;
        let s = nu.nu20 + nu.nu02;
        let d = nu.nu20 - nu.nu02;

        let mut hu = [0.0; 7];
        hu[0] = s;
        hu[1] = d * d + n4 * nu.nu11;
        hu[3] = q0 + q1;
        hu[5] = d * (q0 - q1) + n4 * t0 * t1;

        t0 *= q0 - 3.0 * q1;
        t1 *= 3.0 * q0 - q1;

        q0 = nu.nu30 - 3.0 * nu.nu12;
        q1 = 3.0 * nu.nu21 - nu.nu03;

        hu[2] = q0 * q0 + q1 * q1;
        hu[4] = q0 * t0 + q1 * t1;
        hu[6] = q1 * t0 - q0 * t1;

        Self(hu)
    }

    pub fn values(&self) -> &[f64; 7] {
        &self.0
    }

    /// Index of the first NaN or infinite invariant.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|h| !h.is_finite())
    }

    /// `sign(h) * ln|h|` per component.
    ///
    /// Components with `|h| <= min_magnitude` (and the `|h| == 1` case, whose
    /// log is zero) are reported as `None`: their reciprocal is undefined or
    /// dominated by noise.
    pub fn log_signature(&self, min_magnitude: f64) -> [Option<f64>; 7] {
        self.0.map(|h| {
            let mag = h.abs();
            if !(mag > min_magnitude) || !mag.is_finite() {
                return None;
            }
            let m = h.signum() * mag.ln();
            if m == 0.0 {
                None
            } else {
                Some(m)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ]
    }

    #[test]
    fn square_moments_match_closed_form() {
        let m = Moments::from_polygon(&rect(0.0, 0.0, 10.0, 10.0));
        assert_relative_eq!(m.m00, 100.0);
        assert_relative_eq!(m.m10, 500.0);
        assert_relative_eq!(m.m01, 500.0);
        // integral of x^2 over [0,10]^2 = 10 * 1000 / 3
        assert_relative_eq!(m.m20, 10_000.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(m.m11, 2500.0, epsilon = 1e-9);
        let c = m.centroid().unwrap();
        assert_relative_eq!(c.x, 5.0);
        assert_relative_eq!(c.y, 5.0);
    }

    #[test]
    fn orientation_does_not_flip_sign() {
        let mut poly = rect(2.0, 3.0, 4.0, 6.0);
        let ccw = Moments::from_polygon(&poly);
        poly.reverse();
        let cw = Moments::from_polygon(&poly);
        assert_relative_eq!(ccw.m00, cw.m00);
        assert_relative_eq!(ccw.m21, cw.m21, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_polygon_has_no_centroid() {
        let m = Moments::from_polygon(&[Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        assert!(m.centroid().is_none());
        assert!(m.hu().is_none());
    }

    #[test]
    fn hu_of_square_is_translation_and_scale_invariant() {
        let a = Moments::from_polygon(&rect(0.0, 0.0, 10.0, 10.0)).hu().unwrap();
        let b = Moments::from_polygon(&rect(37.0, -12.0, 3.0, 3.0)).hu().unwrap();
        // nu20 = nu02 = 1/12 for any square.
        assert_relative_eq!(a.0[0], 1.0 / 6.0, epsilon = 1e-12);
        for i in 0..7 {
            assert_relative_eq!(a.0[i], b.0[i], epsilon = 1e-12);
        }
        // Fully symmetric shape: every higher invariant vanishes.
        assert_relative_eq!(a.0[1], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn log_signature_skips_vanishing_components() {
        let hu = HuMoments::new([0.2, -0.01, 0.0, 1.0, 1e-7, -1e-7, 3.0]);
        let sig = hu.log_signature(1e-5);
        assert_relative_eq!(sig[0].unwrap(), 0.2f64.ln());
        assert_relative_eq!(sig[1].unwrap(), -(0.01f64.ln()));
        assert_eq!(sig[2], None);
        assert_eq!(sig[3], None);
        assert_eq!(sig[4], None);
        assert_eq!(sig[5], None);
        assert_relative_eq!(sig[6].unwrap(), 3f64.ln());
    }

    #[test]
    fn reports_non_finite_components() {
        assert_eq!(HuMoments::new([0.1; 7]).first_non_finite(), None);
        let mut v = [0.1; 7];
        v[4] = f64::NAN;
        assert_eq!(HuMoments::new(v).first_non_finite(), Some(4));
    }
}
