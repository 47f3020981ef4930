use nalgebra::{Matrix3, Point2, Vector3};

/// 2D rotation + translation stored as a homogeneous 3×3 matrix.
///
/// ```text
/// [ cos a, -sin a, tx ]
/// [ sin a,  cos a, ty ]
/// [ 0    ,  0    , 1  ]
/// ```
///
/// Angles follow the usual mathematical convention: positive is
/// counter-clockwise in a y-up frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidTransform2 {
    pub m: Matrix3<f64>,
}

impl RigidTransform2 {
    pub fn new(m: Matrix3<f64>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Rotation by `theta` radians about the origin, followed by a translation.
    pub fn from_rotation_translation(theta: f64, tx: f64, ty: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(Matrix3::new(
            c, -s, tx, //
            s, c, ty, //
            0.0, 0.0, 1.0,
        ))
    }

    /// Rotation by `theta` radians about the origin.
    pub fn rotation(theta: f64) -> Self {
        Self::from_rotation_translation(theta, 0.0, 0.0)
    }

    /// Rotation by `theta` radians about `pivot`.
    pub fn rotation_about(theta: f64, pivot: Point2<f64>) -> Self {
        let to_origin = Self::from_rotation_translation(0.0, -pivot.x, -pivot.y);
        let back = Self::from_rotation_translation(0.0, pivot.x, pivot.y);
        Self::new(back.m * Self::rotation(theta).m * to_origin.m)
    }

    /// Rotation by `degrees` about the origin.
    pub fn rotation_degrees(degrees: f64) -> Self {
        Self::rotation(degrees_to_radians(degrees))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.m * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0] / v[2], v[1] / v[2])
    }

    pub fn apply_all(&self, pts: &[Point2<f64>]) -> Vec<Point2<f64>> {
        pts.iter().map(|&p| self.apply(p)).collect()
    }

    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(Self::new)
    }
}

/// `2π · degrees / 360`.
#[inline]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    2.0 * std::f64::consts::PI * (degrees / 360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_close(a: Point2<f64>, b: Point2<f64>, tol: f64) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "expected ({:.9},{:.9}) ~ ({:.9},{:.9}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let t = RigidTransform2::rotation_degrees(90.0);
        assert_close(t.apply(Point2::new(1.0, 0.0)), Point2::new(0.0, 1.0), 1e-12);
        assert_close(t.apply(Point2::new(0.0, 1.0)), Point2::new(-1.0, 0.0), 1e-12);
    }

    #[test]
    fn translation_is_applied_after_rotation() {
        let t = RigidTransform2::from_rotation_translation(std::f64::consts::FRAC_PI_2, 10.0, 5.0);
        assert_close(t.apply(Point2::new(2.0, 0.0)), Point2::new(10.0, 7.0), 1e-12);
    }

    #[test]
    fn rotation_about_keeps_pivot_fixed() {
        let pivot = Point2::new(3.0, -4.0);
        let t = RigidTransform2::rotation_about(0.7, pivot);
        assert_close(t.apply(pivot), pivot, 1e-12);

        let p = Point2::new(5.0, -4.0);
        let q = t.apply(p);
        assert_relative_eq!((q - pivot).norm(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn inverse_round_trips_points() {
        let t = RigidTransform2::from_rotation_translation(0.3, -2.0, 8.5);
        let inv = t.inverse().expect("invertible");
        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(50.0, -20.0),
            Point2::new(320.0, 200.0),
        ] {
            assert_close(inv.apply(t.apply(p)), p, 1e-9);
        }
    }

    #[test]
    fn degrees_convert_to_radians() {
        assert_relative_eq!(degrees_to_radians(180.0), std::f64::consts::PI);
        assert_relative_eq!(degrees_to_radians(-90.0), -std::f64::consts::FRAC_PI_2);
    }
}
