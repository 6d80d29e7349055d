//! Roots of the characteristic cubic.
//!
//! The quadratic form of [`QuadraticForm`] is diagonalised by the three real roots of
//!
//! ```text
//! λ³ + (C − A) λ² + (B² − AC) λ + C·Bsin² = 0
//! ```
//!
//! which satisfy `λ0 ≥ λ1 ≥ 0 ≥ λ2 ≥ −C` (the constant term is non-negative, so exactly
//! one root is non-positive). They are obtained with the trigonometric solution of the
//! depressed cubic:
//!
//! ```text
//! Q = (C−A)²/9 − (B²−AC)/3
//! R = (C−A)³/27 − (C−A)(B²−AC)/6 + C·Bsin²/2
//! θ = arccos(R / Q^{3/2})
//! λ0 = −2√Q cos((θ + 2π)/3) − (C−A)/3
//! λ1 = −2√Q cos((θ − 2π)/3) − (C−A)/3
//! λ2 = −2√Q cos(θ/3)         − (C−A)/3
//! ```
//!
//! For `θ ∈ [0, π]` the three cosine arguments fall in `[2π/3, π]`, `[−2π/3, −π/3]` and
//! `[0, π/3]`, which yields the decreasing order above.
//!
//! Only `λ0` is kept from the trigonometric solution. The two small roots lose all relative
//! accuracy there when `|λ1|, |λ2| ≪ λ0` (near-circular orbits, points on the axis of the
//! ring), so they are deflated from the refined `λ0` instead:
//!
//! ```text
//! λ1 λ2     = −C·Bsin² / λ0
//! λ1 + λ2   = (B² − AC − λ1 λ2) / λ0
//! ```
//!
//! and the quadratic is solved in the form that avoids cancellation, which makes
//! `λ1 ≥ 0 ≥ λ2` hold by construction.

use itertools::Itertools;
use log::{debug, trace};
use roots::{find_root_newton_raphson, SimpleConvergency};

use crate::analytic_average::quadratic_form::QuadraticForm;
use crate::analytic_average::AverageParams;
use crate::constants::DPI;
use crate::rings_errors::RingsError;

/// Ordered roots `λ0 ≥ λ1 ≥ λ2` of the characteristic cubic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacteristicRoots {
    pub l0: f64,
    pub l1: f64,
    pub l2: f64,
}

impl CharacteristicRoots {
    /// Raw trigonometric (Viète) roots, without refinement or validation.
    ///
    /// The argument of `arccos` is clamped to `[−1, 1]`: round-off pushes it slightly
    /// outside near repeated roots. `Q ≤ 0` only happens for a triple root, in which case
    /// the three roots collapse onto `−(C−A)/3`.
    pub fn trigonometric(form: &QuadraticForm) -> Self {
        let (c_m_a, b2_m_ac, _) = form.characteristic_coefficients();
        let shift = -c_m_a / 3.0;

        let q = c_m_a * c_m_a / 9.0 - b2_m_ac / 3.0;
        let r = c_m_a.powi(3) / 27.0 - c_m_a * b2_m_ac / 6.0 + 0.5 * form.c * form.b_sin * form.b_sin;

        if q <= 0.0 {
            debug!("characteristic cubic has a triple root (Q = {q:e})");
            return CharacteristicRoots {
                l0: shift,
                l1: shift,
                l2: shift,
            };
        }

        let sqrt_q = q.sqrt();
        let cos_arg = r / (q * sqrt_q);
        if cos_arg.abs() > 1.0 {
            debug!("clamping arccos argument {cos_arg:e} into [-1, 1]");
        }
        let theta = cos_arg.clamp(-1.0, 1.0).acos();

        CharacteristicRoots {
            l0: -2.0 * sqrt_q * ((theta + DPI) / 3.0).cos() + shift,
            l1: -2.0 * sqrt_q * ((theta - DPI) / 3.0).cos() + shift,
            l2: -2.0 * sqrt_q * (theta / 3.0).cos() + shift,
        }
    }

    /// Solve, refine and validate the roots.
    ///
    /// Steps
    /// -----
    /// 1. [`CharacteristicRoots::trigonometric`] solution.
    /// 2. Newton refinement of `λ0` (at most `params.newton_polish_iter` iterations), then
    ///    deflation of `λ1` and `λ2` from the product and pairwise-sum identities.
    /// 3. Ordering check; a violated order is restored by sorting.
    /// 4. Separation check on `λ0 − λ1` and `λ1 − λ2`.
    /// 5. Sign contract `λ1 ≥ 0 ≥ λ2 ≥ −C`, with round-off inside `params.root_sign_tol`
    ///    clamped to the boundary.
    ///
    /// Non-finite roots (from non-finite inputs) skip steps 2–5 and are returned as is,
    /// so that NaN reaches the caller's force vector.
    ///
    /// Errors
    /// ------
    /// * [`RingsError::DegenerateRoots`] if `λ0 − λ1` falls within
    ///   `params.root_separation_tol` of the span, or `λ1 = λ2`.
    /// * [`RingsError::RootSignViolation`] if the sign contract fails beyond tolerance.
    /// * [`RingsError::RootFinding`] if the refinement of `λ0` fails away from a repeated
    ///   root.
    pub fn solve(form: &QuadraticForm, params: &AverageParams) -> Result<Self, RingsError> {
        let raw = Self::trigonometric(form);
        trace!("trigonometric roots {raw:?} for {form:?}");

        if !raw.is_finite() {
            return Ok(raw);
        }

        let mut roots = if raw.l0 > 0.0 {
            let l0 = match refine_dominant(form, raw.l0, params.newton_polish_iter) {
                Ok(l0) => l0,
                Err(err) => {
                    raw.check_separation(params.root_separation_tol)?;
                    return Err(err.into());
                }
            };
            Self::deflate(form, l0)
        } else {
            raw
        };
        trace!("characteristic roots {roots:?}");

        if !roots.is_finite() {
            return Ok(roots);
        }

        if !roots.is_ordered() {
            debug!("restoring root order after deflation: {roots:?}");
            let mut sorted = roots.as_array();
            sorted.sort_by(|a, b| b.total_cmp(a));
            roots = CharacteristicRoots::from_array(sorted);
        }

        roots.check_separation(params.root_separation_tol)?;
        roots.enforce_sign_contract(form.c, params.root_sign_tol)?;
        Ok(roots)
    }

    /// Recover `λ1 ≥ 0 ≥ λ2` from `λ0 > 0`.
    ///
    /// With `p = λ1 λ2 ≤ 0` and `s = λ1 + λ2`, the root of `x² − s x + p` with the larger
    /// magnitude is `(s ± √(s² − 4p))/2` (sign of `s`) and the other one is `p` divided by
    /// it. Neither step subtracts nearly equal numbers.
    fn deflate(form: &QuadraticForm, l0: f64) -> Self {
        let (_, b2_m_ac, c_bsin2) = form.characteristic_coefficients();
        let product = -c_bsin2 / l0;
        let sum = (b2_m_ac - product) / l0;
        let root_disc = (sum * sum - 4.0 * product).sqrt();

        let (l1, l2) = if sum >= 0.0 {
            let big = 0.5 * (sum + root_disc);
            let small = if big == 0.0 { 0.0 } else { product / big };
            (big, small)
        } else {
            let big = 0.5 * (sum - root_disc);
            (product / big, big)
        };
        CharacteristicRoots { l0, l1, l2 }
    }

    /// Whether `λ0 ≥ λ1 ≥ λ2`.
    pub fn is_ordered(&self) -> bool {
        self.as_array().iter().tuple_windows().all(|(a, b)| a >= b)
    }

    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|l| l.is_finite())
    }

    /// `λ0 + λ1 + λ2`, equal to `A − C` by Vieta.
    pub fn sum(&self) -> f64 {
        self.l0 + self.l1 + self.l2
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.l0, self.l1, self.l2]
    }

    pub fn from_array(l: [f64; 3]) -> Self {
        CharacteristicRoots {
            l0: l[0],
            l1: l[1],
            l2: l[2],
        }
    }

    /// Reject repeated roots.
    ///
    /// The upper gap `λ0 − λ1` is compared with `tol · (λ0 − λ2)`: the averaged force
    /// divides by it. The lower gap only cancels against the elliptic integrals, so
    /// `λ1 − λ2` is rejected only when it vanishes.
    pub fn check_separation(&self, tol: f64) -> Result<(), RingsError> {
        let span = self.l0 - self.l2;
        let upper_gap = self.l0 - self.l1;
        let lower_gap = self.l1 - self.l2;

        if span <= 0.0 || upper_gap <= tol * span || lower_gap <= 0.0 {
            return Err(RingsError::DegenerateRoots {
                l0: self.l0,
                l1: self.l1,
                l2: self.l2,
            });
        }
        Ok(())
    }

    /// Enforce `λ1 ≥ 0 ≥ λ2 ≥ −C` with a slack of `tol · max(|λ0|, |λ2|)`.
    fn enforce_sign_contract(&mut self, c: f64, tol: f64) -> Result<(), RingsError> {
        let slack = tol * self.l0.abs().max(self.l2.abs());
        let violation = || RingsError::RootSignViolation {
            l0: self.l0,
            l1: self.l1,
            l2: self.l2,
            c,
        };

        if self.l1 < -slack || self.l2 > slack || self.l2 + c < -slack {
            return Err(violation());
        }

        if self.l1 < 0.0 {
            self.l1 = 0.0;
        }
        if self.l2 > 0.0 {
            self.l2 = 0.0;
        }
        if self.l2 + c < 0.0 {
            self.l2 = -c;
        }
        Ok(())
    }

    /// Elliptic parameter `k² = (λ1 − λ2)/(λ0 − λ2)`.
    ///
    /// Values within `tol` of `[0, 1]` are clamped into the interval; NaN is passed
    /// through.
    ///
    /// Errors
    /// ------
    /// * [`RingsError::EllipticParameterOutOfRange`] for a larger excursion.
    pub fn elliptic_parameter(&self, tol: f64) -> Result<f64, RingsError> {
        let k2 = (self.l1 - self.l2) / (self.l0 - self.l2);
        if k2 < -tol || k2 > 1.0 + tol {
            return Err(RingsError::EllipticParameterOutOfRange(k2));
        }
        if !(0.0..=1.0).contains(&k2) && !k2.is_nan() {
            debug!("clamping elliptic parameter k² = {k2:e}");
        }
        Ok(k2.clamp(0.0, 1.0))
    }
}

/// Newton refinement of the largest root from its trigonometric estimate.
///
/// The iteration runs on `t = λ / λ0` with the cubic divided by the sum of the magnitudes
/// of its terms, so that both stopping criteria of [`SimpleConvergency`] are relative.
fn refine_dominant(
    form: &QuadraticForm,
    scale: f64,
    max_iter: usize,
) -> Result<f64, roots::SearchError> {
    let (c_m_a, b2_m_ac, c_bsin2) = form.characteristic_coefficients();
    let norm = scale.powi(3).abs()
        + c_m_a.abs() * scale * scale
        + b2_m_ac.abs() * scale.abs()
        + c_bsin2.abs();

    let f = |t: f64| form.characteristic(scale * t) / norm;
    let df = |t: f64| form.characteristic_derivative(scale * t) * scale / norm;

    let mut tol = SimpleConvergency {
        eps: f64::EPSILON * 1e2,
        max_iter,
    };
    Ok(find_root_newton_raphson(1.0, &f, &df, &mut tol)? * scale)
}
