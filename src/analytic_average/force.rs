//! # Orbit-averaged force
//!
//! Entry point of the analytic averaging pipeline. Two force laws are available:
//!
//! * [`ForceLaw::Eccentric`] – the general reduction to complete elliptic integrals
//!   (quadratic form → characteristic roots → rotation → projection → assembly):
//!
//!   ```text
//!   k² = (λ1 − λ2) / (λ0 − λ2)
//!   f  = (2m/π) · (F_U E(k²) + F_V B(k²)) / ((λ0 − λ1) √(λ0 − λ2))
//!   ```
//!
//!   with `B = (E − (1 − k²) K) / k²` the associate integral. Written this way the force
//!   stays finite and accurate when `λ1 − λ2 → 0`, which is where near-circular orbits
//!   and points on the axis of the orbit put it.
//!
//! * [`ForceLaw::CircularRing`] – the field of a uniform circular ring of radius `a`,
//!   used when the eccentricity is below [`AverageParams::circular_eccentricity`]. The
//!   general reduction has two coincident characteristic roots in that limit.
//!
//! Both are pure functions of their inputs and can be evaluated concurrently.

use nalgebra::Vector3;

use log::{debug, trace};

use crate::analytic_average::characteristic::CharacteristicRoots;
use crate::analytic_average::projection::{project, uv_from_rotation, ForceBasis};
use crate::analytic_average::quadratic_form::QuadraticForm;
use crate::analytic_average::rotation::rotation_matrix;
use crate::analytic_average::AverageParams;
use crate::body::Body;
use crate::constants::RING_SERIES_THRESHOLD;
use crate::elliptic::complete_elliptic;
use crate::rings_errors::RingsError;
use crate::vectors::orthogonal_project;
use std::f64::consts::PI;

/// Closed form used for one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceLaw {
    CircularRing,
    Eccentric,
}

impl ForceLaw {
    /// Circular ring below `params.circular_eccentricity` (and always for `e = 0`, where
    /// the eccentric reduction has `C = 0`); eccentric otherwise.
    pub fn select(body: &Body, params: &AverageParams) -> Self {
        let e = body.ecc();
        if e < params.circular_eccentricity || e == 0.0 {
            ForceLaw::CircularRing
        } else {
            ForceLaw::Eccentric
        }
    }
}

/// Orbit-averaged acceleration exerted by `body` at the field point `rp`.
///
/// Arguments
/// ---------
/// * `eps` – softening length, `≥ 0`.
/// * `rp` – field point.
/// * `body` – the orbiting body; the result scales linearly with `body.mass`.
/// * `params` – branch threshold and root tolerances.
///
/// Return
/// ------
/// * The averaged acceleration. Non-finite inputs give a non-finite result rather than
///   an error.
///
/// Errors
/// ------
/// * [`RingsError::DegenerateRoots`] – two characteristic roots coincide (the field point
///   sits on a symmetry set of an eccentric orbit where the general formula is singular).
/// * [`RingsError::RootSignViolation`] – the roots break `λ1 ≥ 0 ≥ λ2 ≥ −C`.
/// * [`RingsError::RootFinding`] – Newton refinement of the largest root failed.
/// * [`RingsError::EllipticParameterOutOfRange`] – `k²` left `[0, 1]` beyond
///   `params.modulus_clamp_tol`.
pub fn force_averaged(
    eps: f64,
    rp: &Vector3<f64>,
    body: &Body,
    params: &AverageParams,
) -> Result<Vector3<f64>, RingsError> {
    match ForceLaw::select(body, params) {
        ForceLaw::CircularRing => {
            debug!("circular ring law for e = {:e}", body.ecc());
            Ok(ring_force(eps, rp, body))
        }
        ForceLaw::Eccentric => eccentric_force(eps, rp, body, params),
    }
}

/// General elliptic-integral reduction, valid for `e > 0`.
pub fn eccentric_force(
    eps: f64,
    rp: &Vector3<f64>,
    body: &Body,
    params: &AverageParams,
) -> Result<Vector3<f64>, RingsError> {
    let form = QuadraticForm::new(eps, rp, body);
    trace!("quadratic form {form:?}");

    let roots = CharacteristicRoots::solve(&form, params)?;
    let CharacteristicRoots { l0, l1, l2 } = roots;

    let q = rotation_matrix(&form, &roots);
    let (u, v) = uv_from_rotation(&q, body.ecc());
    let (fu, fv) = project(&u, &v, &ForceBasis::new(rp, body));

    let k2 = roots.elliptic_parameter(params.modulus_clamp_tol)?;
    let integrals = complete_elliptic(k2);
    trace!("k² = {k2}, E = {}, B = {}", integrals.e, integrals.b);

    let prefactor = 2.0 * body.mass / PI / ((l0 - l1) * (l0 - l2).sqrt());
    Ok((fu * integrals.e + fv * integrals.b) * prefactor)
}

/// Field of a uniform circular ring of radius `a` and mass `m`, softened by `eps`.
///
/// With `z` the height above the orbital plane, `R` the in-plane distance from the
/// centre, `p = R² + a² + z² + eps²` and `q = 2aR`:
///
/// ```text
/// J3 = 4 E(m_k) / ((p − q) √(p + q)),                 m_k = 2q / (p + q)
/// Jc = (p J3 − 4 K(m_k) / √(p + q)) / q
/// f  = m / (2π) · [ (a Jc − R J3) R̂ − z J3 n̂ ]
/// ```
///
/// `Jc` loses all its digits to cancellation when `q ≪ p`; below `q/p = 10⁻³` its series
/// `π p^{-3/2} (3x/2 + 105x³/64)` is used instead. On the axis (`R = 0`) this is
/// `−m z n̂ / (z² + a² + eps²)^{3/2}`.
pub fn ring_force(eps: f64, rp: &Vector3<f64>, body: &Body) -> Vector3<f64> {
    let frame = body.coordinate_system();
    let a = body.semi_major_axis;

    let z = rp.dot(&frame.normal);
    let in_plane = orthogonal_project(rp, &frame.normal);
    let r = in_plane.norm();

    let p = r * r + a * a + z * z + eps * eps;
    let (j3, jc) = ring_integrals(p, 2.0 * a * r, RING_SERIES_THRESHOLD);

    let radial = if r > 0.0 {
        in_plane / r
    } else {
        Vector3::zeros()
    };

    (radial * (a * jc - r * j3) - frame.normal * (z * j3)) * (body.mass / (2.0 * PI))
}

/// `(J3, Jc)` with `J3 = ∫ dφ / (p − q cos φ)^{3/2}` and
/// `Jc = ∫ cos φ dφ / (p − q cos φ)^{3/2}` over one turn.
///
/// `Jc` switches to its series for `q/p < series_threshold`.
fn ring_integrals(p: f64, q: f64, series_threshold: f64) -> (f64, f64) {
    let integrals = complete_elliptic(2.0 * q / (p + q));
    let sqrt_pq = (p + q).sqrt();

    let j3 = 4.0 * integrals.e / ((p - q) * sqrt_pq);
    let x = q / p;
    let jc = if x < series_threshold {
        PI * p.powf(-1.5) * (1.5 * x + 105.0 / 64.0 * x.powi(3))
    } else {
        (p * j3 - 4.0 * integrals.k / sqrt_pq) / q
    };
    (j3, jc)
}
