//! Diagonalising matrix of the quadratic form.
//!
//! Writing the orbit in homogeneous coordinates `(1, sin E, cos E)`, the softened distance
//! is a quadratic form `M` and the constraint `sin² E + cos² E = 1` is the form
//! `η = diag(1, −1, −1)`. The characteristic roots diagonalise the pencil `M + λ η`:
//! the matrix `Q` built here satisfies `Qᵀ M Q = diag(λ0, −λ1, −λ2)` and is
//! pseudo-orthogonal, `Qᵀ η Q = Q η Qᵀ = η`, not orthogonal in the Euclidean sense.
//!
//! With `d0 = (λ0−λ1)(λ0−λ2)`, `d1 = (λ0−λ1)(λ1−λ2)`, `d2 = (λ0−λ2)(λ1−λ2)`:
//!
//! ```text
//!        ⎡ √(λ0(λ0+C)/d0)        √(λ1(λ1+C)/d1)        √(−λ2(λ2+C)/d2)      ⎤
//!   Q =  ⎢ r0 √((λ0+C)/d0)       r1 √((λ1+C)/d1)       −r2 √((λ2+C)/d2)     ⎥
//!        ⎣ Bcos √(λ0/((λ0+C)d0)) Bcos √(λ1/((λ1+C)d1)) Bcos √(−λ2/((λ2+C)d2))⎦
//! ```
//!
//! where `ri = Bsin / √|λi|`. The sign contract `λ1 ≥ 0 ≥ λ2 ≥ −C` makes every radicand
//! non-negative without absolute values.
//!
//! Two families of geometries make a radicand vanish: `Bsin = 0` drives one root to zero,
//! and `Bcos = 0` drives `λ2` onto `−C`. Both are handled through the product identities
//!
//! ```text
//! |λ0| |λ1| |λ2|                = C·Bsin²
//! (λ0 + C)(λ1 + C)(λ2 + C)      = C·Bcos²
//! ```
//!
//! which give the small factor without cancellation and the finite limit of `Bsin/√|λi|`
//! and `Bcos/√(λi + C)`.

use nalgebra::{Matrix3, Vector3};

use crate::analytic_average::characteristic::CharacteristicRoots;
use crate::analytic_average::quadratic_form::QuadraticForm;

/// Factors smaller than this fraction of the largest one are rebuilt from their product.
const SMALL_FACTOR_RATIO: f64 = 1e-8;

/// The Lorentzian metric `η = diag(1, −1, −1)` preserved by the rotation.
pub fn minkowski_metric() -> Matrix3<f64> {
    Matrix3::from_diagonal(&Vector3::new(1.0, -1.0, -1.0))
}

/// Three non-negative factors `μi` whose product is known in closed form.
#[derive(Debug, Clone, Copy)]
struct RootFactors {
    mu: [f64; 3],
}

impl RootFactors {
    /// Rebuild the small factors as `product / Π_{j≠i} μj`.
    fn new(mu: [f64; 3], product: f64) -> Self {
        let largest = mu.iter().cloned().fold(0.0, f64::max);
        let mut refined = mu;
        for (i, slot) in refined.iter_mut().enumerate() {
            let others = Self::others(&mu, i);
            if mu[i] <= SMALL_FACTOR_RATIO * largest && others > 0.0 {
                *slot = product / others;
            }
        }
        RootFactors { mu: refined }
    }

    fn others(mu: &[f64; 3], i: usize) -> f64 {
        mu.iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, m)| m)
            .product()
    }

    fn is_small(&self, i: usize) -> bool {
        let largest = self.mu.iter().cloned().fold(0.0, f64::max);
        self.mu[i] <= SMALL_FACTOR_RATIO * largest
    }

    /// `b / √μi`, where `b² = product / C`.
    ///
    /// For a small factor this is `sign(b) √(Π_{j≠i} μj / C)`, finite at `b = 0`.
    fn ratio(&self, b: f64, c: f64, i: usize) -> f64 {
        if !self.is_small(i) || c == 0.0 {
            return b / self.mu[i].sqrt();
        }
        (Self::others(&self.mu, i) / c).sqrt().copysign(b)
    }
}

/// Build `Q` from the form coefficients and validated roots.
///
/// Arguments
/// ---------
/// * `form` – quadratic-form coefficients, with `C > 0`.
/// * `roots` – roots returned by [`CharacteristicRoots::solve`] (ordered, separated and
///   satisfying the sign contract).
///
/// Return
/// ------
/// * `Q`, with column `i` associated with root `λi` and rows matching the homogeneous
///   coordinates `(1, sin E, cos E)`.
pub fn rotation_matrix(form: &QuadraticForm, roots: &CharacteristicRoots) -> Matrix3<f64> {
    let CharacteristicRoots { l0, l1, l2 } = *roots;
    let c = form.c;

    let d = [
        (l0 - l1) * (l0 - l2),
        (l0 - l1) * (l1 - l2),
        (l0 - l2) * (l1 - l2),
    ];
    let magnitudes = RootFactors::new([l0, l1, -l2], c * form.b_sin * form.b_sin);
    let shifted = RootFactors::new([l0 + c, l1 + c, l2 + c], c * form.b_cos * form.b_cos);

    let row_sign = [1.0, 1.0, -1.0];
    Matrix3::from_fn(|row, i| {
        let abs_l = magnitudes.mu[i];
        let l_c = shifted.mu[i];
        match row {
            0 => (abs_l * l_c / d[i]).sqrt(),
            1 => row_sign[i] * magnitudes.ratio(form.b_sin, c, i) * (l_c / d[i]).sqrt(),
            _ => shifted.ratio(form.b_cos, c, i) * (abs_l / d[i]).sqrt(),
        }
    })
}
