//! Force law in the rotated basis.
//!
//! The numerator of the pointwise acceleration is linear in `(1, sin E, cos E)`:
//!
//! ```text
//! r(E) − rp = F0 + F1 sin E + F2 cos E
//! F0 = −rp − a e x̂,   F1 = a √(1−e²) ŷ,   F2 = a x̂
//! ```
//!
//! and the time weight `1 − e cos E` is linear in the same coordinates.
//!
//! After the change of variables given by [`rotation_matrix`](super::rotation::rotation_matrix)
//! only two independent combinations survive the average. Their coefficients on the
//! `(F0, F1, F2)` basis are `U` and `V`, and the projected force vectors are
//! `F_U = Σ Uj Fj`, `F_V = Σ Vj Fj`.

use nalgebra::{Matrix3, Vector3};

use crate::body::Body;

/// Geometric force directions `F0`, `F1`, `F2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceBasis {
    pub f0: Vector3<f64>,
    pub f1: Vector3<f64>,
    pub f2: Vector3<f64>,
}

impl ForceBasis {
    pub fn new(rp: &Vector3<f64>, body: &Body) -> Self {
        let frame = body.coordinate_system();
        let a = body.semi_major_axis;
        let e = body.ecc();

        ForceBasis {
            f0: -rp - frame.periapse * (a * e),
            f1: frame.perpendicular * (a * (1.0 - e * e).sqrt()),
            f2: frame.periapse * a,
        }
    }

    /// Vector `Σ wj Fj`.
    pub fn combine(&self, weights: &Vector3<f64>) -> Vector3<f64> {
        self.f0 * weights[0] + self.f1 * weights[1] + self.f2 * weights[2]
    }
}

/// Combination vectors `U` and `V` from the rotation matrix.
///
/// ```text
/// U[k] = Q[k][0] (Q00 − e Q20) + Q[k][2] (Q02 − e Q22)
/// V[k] = Q[k][1] (Q01 − e Q21) − Q[k][2] (Q02 − e Q22)
/// ```
///
/// The weights `Q0i − e Q2i` are the time weight `1 − e cos E` expressed on column `i`.
pub fn uv_from_rotation(q: &Matrix3<f64>, e: f64) -> (Vector3<f64>, Vector3<f64>) {
    let w = |i: usize| q[(0, i)] - e * q[(2, i)];
    let (w0, w1, w2) = (w(0), w(1), w(2));

    let u = q.column(0) * w0 + q.column(2) * w2;
    let v = q.column(1) * w1 - q.column(2) * w2;
    (u, v)
}

/// Projected force vectors `(F_U, F_V)`.
pub fn project(u: &Vector3<f64>, v: &Vector3<f64>, basis: &ForceBasis) -> (Vector3<f64>, Vector3<f64>) {
    (basis.combine(u), basis.combine(v))
}
