//! # Numerical orbit averages
//!
//! Reference implementation of the orbit-averaged force by direct quadrature over the
//! eccentric anomaly. Time averages over a Keplerian orbit become
//!
//! ```text
//! ⟨g⟩ = (1/2π) ∮ g(E) (1 − e cos E) dE
//! ```
//!
//! and the integrand is smooth and periodic, so the plain trapezoid rule converges
//! geometrically. [`periodic_average`] doubles the number of nodes until two successive
//! estimates agree, reusing every previous node (only the odd nodes of the refined grid
//! are evaluated). Agreement is relative to the estimate, with a floor at the round-off
//! level of the mean integrand magnitude so that vanishing averages terminate.
//!
//! The analytic path in [`crate::analytic_average`] is checked against this module.

use log::debug;
use nalgebra::{SVector, Vector3};

use crate::analytic_average::AverageParams;
use crate::body::Body;
use crate::constants::{DPI, QUADRATURE_ROUND_OFF};
use crate::rings_errors::RingsError;
use crate::vectors::softened_specific_acceleration;

/// Mean of a periodic vector function over `[0, 2π)` by the refined trapezoid rule.
///
/// Arguments
/// ---------
/// * `n_min` – nodes of the first estimate (`≥ 1`).
/// * `n_max` – largest node count allowed.
/// * `rel_tol` – accept when `|I_2n − I_n| ≤ rel_tol · |I_2n|`, or when the change is
///   below [`QUADRATURE_ROUND_OFF`] times the mean of `|f|` over the nodes.
/// * `f` – integrand; its errors are propagated unchanged.
///
/// Return
/// ------
/// * The mean `(1/2π) ∫ f`.
///
/// Errors
/// ------
/// * [`RingsError::QuadratureNotConverged`] if doubling past `n_max` would be needed.
/// * Any error returned by `f`.
pub fn periodic_average<const D: usize, F>(
    n_min: usize,
    n_max: usize,
    rel_tol: f64,
    mut f: F,
) -> Result<SVector<f64, D>, RingsError>
where
    F: FnMut(f64) -> Result<SVector<f64, D>, RingsError>,
{
    let mut n = n_min.max(1);
    let mut sum = SVector::<f64, D>::zeros();
    let mut magnitude = 0.0;
    for i in 0..n {
        let value = f(DPI * i as f64 / n as f64)?;
        magnitude += value.norm();
        sum += value;
    }
    let mut estimate = sum / n as f64;
    let mut relative_change = f64::INFINITY;

    while 2 * n <= n_max {
        let step = DPI / (2 * n) as f64;
        for i in 0..n {
            let value = f(step * (2 * i + 1) as f64)?;
            magnitude += value.norm();
            sum += value;
        }
        n *= 2;

        let refined = sum / n as f64;
        let change = (refined - estimate).norm();
        let scale = refined.norm();
        let floor = QUADRATURE_ROUND_OFF * magnitude / n as f64;
        estimate = refined;
        relative_change = if scale > 0.0 { change / scale } else { change };

        if change <= rel_tol * scale || change <= floor {
            debug!("periodic average converged with {n} nodes (change {relative_change:e})");
            return Ok(estimate);
        }
    }

    Err(RingsError::QuadratureNotConverged {
        points: n,
        relative_change,
    })
}

/// Orbit-averaged acceleration exerted by `body` at `rp`, by quadrature.
///
/// Same quantity as [`crate::analytic_average::force::force_averaged`]; node counts and
/// tolerance come from the `quadrature_*` fields of `params`. Convergence slows down as
/// the field point approaches the orbit with a small softening.
pub fn raw_average_force(
    eps: f64,
    rp: &Vector3<f64>,
    body: &Body,
    params: &AverageParams,
) -> Result<Vector3<f64>, RingsError> {
    let e = body.ecc();
    let mass = body.mass;

    periodic_average(
        params.quadrature_min_points,
        params.quadrature_max_points,
        params.quadrature_rel_tol,
        |ecc_anomaly| {
            let (r, _) = body.position_velocity(ecc_anomaly);
            let weight = mass * (1.0 - e * ecc_anomaly.cos());
            Ok(softened_specific_acceleration(eps, rp, &r) * weight)
        },
    )
}
