//! Quadratic-form coefficients of the softened distance to an orbit.
//!
//! For a body at eccentric anomaly `E` on an orbit with frame `(x̂, ŷ, ẑ)`, the squared
//! softened separation from a field point `rp` is
//!
//! ```text
//! |r(E) − rp|² + eps² = A − 2 Bcos cos E − 2 Bsin sin E + C cos² E
//! ```
//!
//! with
//!
//! ```text
//! A    = |rp|² + a² + eps² + 2 a e (rp·x̂)
//! Bcos = a (rp·x̂) + a² e
//! Bsin = a √(1−e²) (rp·ŷ)
//! C    = a² e²
//! ```

use nalgebra::Vector3;

use crate::body::Body;

/// Coefficients `(A, B cosε, B sinε, C)` of the softened distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticForm {
    pub a: f64,
    pub b_cos: f64,
    pub b_sin: f64,
    pub c: f64,
}

impl QuadraticForm {
    /// Extract the coefficients for a field point and a body.
    ///
    /// No validation is performed; NaN in the inputs propagates to the coefficients.
    pub fn new(eps: f64, rp: &Vector3<f64>, body: &Body) -> Self {
        let frame = body.coordinate_system();
        let a = body.semi_major_axis;
        let e = body.ecc();
        let rp_x = rp.dot(&frame.periapse);
        let rp_y = rp.dot(&frame.perpendicular);

        QuadraticForm {
            a: rp.norm_squared() + a * a + eps * eps + 2.0 * a * e * rp_x,
            b_cos: a * rp_x + a * a * e,
            b_sin: a * (1.0 - e * e).sqrt() * rp_y,
            c: a * a * e * e,
        }
    }

    /// `B² = Bcos² + Bsin²`.
    #[inline]
    pub fn b_squared(&self) -> f64 {
        self.b_cos * self.b_cos + self.b_sin * self.b_sin
    }

    /// Softened squared distance at eccentric anomaly `E`.
    pub fn distance_squared(&self, ecc_anomaly: f64) -> f64 {
        let (s, c) = ecc_anomaly.sin_cos();
        self.a - 2.0 * self.b_cos * c - 2.0 * self.b_sin * s + self.c * c * c
    }

    /// Characteristic cubic `λ³ + (C−A)λ² + (B²−AC)λ + C·Bsin²` evaluated at `lambda`.
    pub fn characteristic(&self, lambda: f64) -> f64 {
        let (c2, c1, c0) = self.characteristic_coefficients();
        ((lambda + c2) * lambda + c1) * lambda + c0
    }

    /// Derivative of [`QuadraticForm::characteristic`] with respect to `λ`.
    pub fn characteristic_derivative(&self, lambda: f64) -> f64 {
        let (c2, c1, _) = self.characteristic_coefficients();
        (3.0 * lambda + 2.0 * c2) * lambda + c1
    }

    /// Coefficients `(C − A, B² − AC, C·Bsin²)` of the monic characteristic cubic.
    pub fn characteristic_coefficients(&self) -> (f64, f64, f64) {
        (
            self.c - self.a,
            self.b_squared() - self.a * self.c,
            self.c * self.b_sin * self.b_sin,
        )
    }
}
