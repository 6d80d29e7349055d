//! # Secular rates of change
//!
//! Rates of change of the vectorial elements `(L, A)` of a body `b1` perturbed by a body
//! `b2`, instantaneous or averaged over both orbits.
//!
//! With `G·M = 1`, the specific angular momentum is `h = √a L` and the eccentricity
//! vector is `A = v × h − r̂`. For a perturbing acceleration `f` acting at `(r, v)`:
//!
//! ```text
//! dL/dt = (r × f) / √a
//! dA/dt = f × h + v × (r × f)
//! ```
//!
//! The semi-major axis and the mass are constant in the secular approximation. The
//! averaged rates conserve `L·A` and `|L|² + |A|²`.
//!
//! The outer average over `b1`'s orbit is taken with
//! [`periodic_average`](crate::raw_average::periodic_average) and the time weight
//! `1 − e₁ cos E₁`; the inner average over `b2`'s orbit is either analytic
//! ([`average_rhs`]) or numerical ([`raw_average_rhs`]).

use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};

use crate::analytic_average::force::force_averaged;
use crate::analytic_average::AverageParams;
use crate::body::Body;
use crate::constants::{
    EccentricAnomaly, BODY_A_INDEX, BODY_ECC_INDEX, BODY_L_INDEX, BODY_M_INDEX,
    BODY_VECTOR_SIZE, ELEMENT_DEGENERACY_EPS,
};
use crate::raw_average::{periodic_average, raw_average_force};
use crate::rings_errors::RingsError;
use crate::vectors::{softened_specific_acceleration, vdot_to_vmagdot};

/// Time derivative of a [`Body`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDerivatives {
    pub mass: f64,
    pub semi_major_axis: f64,
    pub angular_momentum: Vector3<f64>,
    pub eccentricity: Vector3<f64>,
}

/// Time derivatives of the classical elements (radians per time unit for angles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRates {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub ascending_node_longitude: f64,
    pub periapsis_argument: f64,
}

impl BodyDerivatives {
    fn from_rates(angular_momentum: Vector3<f64>, eccentricity: Vector3<f64>) -> Self {
        BodyDerivatives {
            mass: 0.0,
            semi_major_axis: 0.0,
            angular_momentum,
            eccentricity,
        }
    }

    fn stacked(&self) -> Vector6<f64> {
        Vector6::new(
            self.angular_momentum.x,
            self.angular_momentum.y,
            self.angular_momentum.z,
            self.eccentricity.x,
            self.eccentricity.y,
            self.eccentricity.z,
        )
    }

    fn from_stacked(v: &Vector6<f64>) -> Self {
        Self::from_rates(
            v.fixed_rows::<3>(0).clone_owned(),
            v.fixed_rows::<3>(3).clone_owned(),
        )
    }

    /// Pack in the layout of [`Body::to_state_array`].
    pub fn to_array(&self) -> [f64; BODY_VECTOR_SIZE] {
        let mut v = [0.0; BODY_VECTOR_SIZE];
        v[BODY_M_INDEX] = self.mass;
        v[BODY_A_INDEX] = self.semi_major_axis;
        v[BODY_L_INDEX..BODY_L_INDEX + 3].copy_from_slice(self.angular_momentum.as_slice());
        v[BODY_ECC_INDEX..BODY_ECC_INDEX + 3].copy_from_slice(self.eccentricity.as_slice());
        v
    }

    /// Rates of the classical elements of `body` (see
    /// [`Body::elements`](crate::body::Body::elements) for the angle conventions).
    ///
    /// ```text
    /// ė  = A·Ȧ / e
    /// L̂̇  = (L̇ − L̂ (L̂·L̇)) / |L|
    /// İ  = −L̂̇_z / sin I
    /// Ω̇  = (L̂x L̂̇y − L̂y L̂̇x) / (L̂x² + L̂y²)
    /// ω̇  = (c ṡ − s ċ) / (c² + s²),   c = n·A,  s = (n × A)·L̂,  n = ẑ × L̂
    /// ```
    ///
    /// Where an angle is undefined the conventions of `Body::elements` carry over:
    /// * circular orbit: `ė = |Ȧ|` and `ω̇ = 0`;
    /// * equatorial orbit: `Ω̇ = 0`, `İ = ±|L̂̇|` (the inclination can only leave 0 or π),
    ///   and `ω` is measured from the X axis.
    pub fn to_element_rates(&self, body: &Body) -> ElementRates {
        let l = body.angular_momentum;
        let a_vec = body.eccentricity;
        let l_dot = self.angular_momentum;
        let a_dot = self.eccentricity;

        let e = a_vec.norm();
        let lhat = l.normalize();
        let lhat_dot = (l_dot - lhat * lhat.dot(&l_dot)) / l.norm();

        let sin_i = lhat.x.hypot(lhat.y);
        let equatorial = sin_i < ELEMENT_DEGENERACY_EPS;
        let circular = e < ELEMENT_DEGENERACY_EPS;

        let eccentricity = if circular {
            a_dot.norm()
        } else {
            vdot_to_vmagdot(&a_vec, &a_dot)
        };

        let (inclination, ascending_node_longitude) = if equatorial {
            (lhat_dot.norm().copysign(lhat.z), 0.0)
        } else {
            (
                -lhat_dot.z / sin_i,
                (lhat.x * lhat_dot.y - lhat.y * lhat_dot.x) / (sin_i * sin_i),
            )
        };

        let periapsis_argument = if circular {
            0.0
        } else {
            let (node, node_dot) = if equatorial {
                (Vector3::x(), Vector3::zeros())
            } else {
                (Vector3::z().cross(&lhat), Vector3::z().cross(&lhat_dot))
            };
            let c = node.dot(&a_vec);
            let s = node.cross(&a_vec).dot(&lhat);
            let c_dot = node_dot.dot(&a_vec) + node.dot(&a_dot);
            let s_dot = (node_dot.cross(&a_vec) + node.cross(&a_dot)).dot(&lhat)
                + node.cross(&a_vec).dot(&lhat_dot);
            (c * s_dot - s * c_dot) / (c * c + s * s)
        };

        ElementRates {
            semi_major_axis: self.semi_major_axis,
            eccentricity,
            inclination,
            ascending_node_longitude,
            periapsis_argument,
        }
    }
}

/// Rates of `(L, A)` of `body` under the acceleration `f` applied at `(r, v)`.
pub fn rates_from_force(
    body: &Body,
    r: &Vector3<f64>,
    v: &Vector3<f64>,
    f: &Vector3<f64>,
) -> BodyDerivatives {
    let sqrt_a = body.semi_major_axis.sqrt();
    let h = body.angular_momentum * sqrt_a;
    let torque = r.cross(f);

    BodyDerivatives::from_rates(torque / sqrt_a, f.cross(&h) + v.cross(&torque))
}

/// Rates of `b1` due to the softened pull of `b2`, both at the given eccentric anomalies.
pub fn instantaneous_rhs(
    eps: f64,
    b1: &Body,
    ecc_anomaly_1: EccentricAnomaly,
    b2: &Body,
    ecc_anomaly_2: EccentricAnomaly,
) -> BodyDerivatives {
    let (r1, v1) = b1.position_velocity(ecc_anomaly_1);
    let (r2, _) = b2.position_velocity(ecc_anomaly_2);
    let f = softened_specific_acceleration(eps, &r1, &r2) * b2.mass;
    rates_from_force(b1, &r1, &v1, &f)
}

/// Average of `rates_from_force` over `b1`'s orbit for a given averaged force field.
fn average_over_orbit<F>(
    b1: &Body,
    params: &AverageParams,
    mut force: F,
) -> Result<BodyDerivatives, RingsError>
where
    F: FnMut(&Vector3<f64>) -> Result<Vector3<f64>, RingsError>,
{
    let e1 = b1.ecc();
    let mean = periodic_average(
        params.quadrature_min_points,
        params.secular_max_points,
        params.secular_rel_tol,
        |ecc_anomaly| {
            let (r, v) = b1.position_velocity(ecc_anomaly);
            let f = force(&r)?;
            Ok(rates_from_force(b1, &r, &v, &f).stacked() * (1.0 - e1 * ecc_anomaly.cos()))
        },
    )?;
    Ok(BodyDerivatives::from_stacked(&mean))
}

/// Secular rates of `b1` due to `b2`, with the inner average done analytically.
///
/// Errors
/// ------
/// Errors of [`force_averaged`] at any node, and
/// [`RingsError::QuadratureNotConverged`] from the outer average.
pub fn average_rhs(
    eps: f64,
    b1: &Body,
    b2: &Body,
    params: &AverageParams,
) -> Result<BodyDerivatives, RingsError> {
    average_over_orbit(b1, params, |r| force_averaged(eps, r, b2, params))
}

/// Secular rates of `b1` due to `b2`, with both averages done by quadrature.
pub fn raw_average_rhs(
    eps: f64,
    b1: &Body,
    b2: &Body,
    params: &AverageParams,
) -> Result<BodyDerivatives, RingsError> {
    average_over_orbit(b1, params, |r| raw_average_force(eps, r, b2, params))
}

#[cfg(test)]
mod secular_test {
    use super::*;
    use crate::orbit_type::keplerian_element::KeplerianElements;
    use approx::assert_relative_eq;

    fn body(mass: f64, a: f64, e: f64, i: f64, node: f64, peri: f64) -> Body {
        Body::from_elements(
            mass,
            &KeplerianElements {
                semi_major_axis: a,
                eccentricity: e,
                inclination: i,
                ascending_node_longitude: node,
                periapsis_argument: peri,
            },
        )
        .unwrap()
    }

    fn conserved_rates(b: &Body, d: &BodyDerivatives) -> (f64, f64) {
        (
            d.angular_momentum.dot(&b.eccentricity) + b.angular_momentum.dot(&d.eccentricity),
            d.angular_momentum.dot(&b.angular_momentum) + d.eccentricity.dot(&b.eccentricity),
        )
    }

    #[test]
    fn test_instantaneous_rates_keep_l_orthogonal_to_a() {
        // L·A = 0 holds for any (r, v); |L|² + |A|² only on average
        let b1 = body(1e-3, 1.0, 0.2, 0.1, 0.3, 0.5);
        let b2 = body(1e-3, 1.6, 0.3, 0.3, 1.0, 2.0);
        for (e1, e2) in [(0.0, 1.0), (2.0, 4.5), (5.1, 0.2)] {
            let d = instantaneous_rhs(0.01, &b1, e1, &b2, e2);
            let (dot_rate, norm_rate) = conserved_rates(&b1, &d);
            let scale = d.angular_momentum.norm() + d.eccentricity.norm();
            assert!(dot_rate.abs() < 1e-13 * scale);
            assert!(norm_rate.abs() > 1e-3 * scale);
            assert_eq!(d.semi_major_axis, 0.0);
        }
    }

    #[test]
    fn test_rates_match_osculating_elements() {
        // a radial kick along r changes A by v × (r × f) + f × h, compared with finite
        // differences of h = r × v and A = v × h − r̂ under v → v + f dt
        let b = body(1e-3, 1.3, 0.4, 0.6, 0.2, 1.0);
        let (r, v) = b.position_velocity(1.2);
        let f = Vector3::new(0.3, -0.1, 0.2);
        let d = rates_from_force(&b, &r, &v, &f);

        let dt = 1e-7;
        let state = |v: Vector3<f64>| {
            let h = r.cross(&v);
            (h / b.semi_major_axis.sqrt(), v.cross(&h) - r / r.norm())
        };
        let (lp, ap) = state(v + f * dt);
        let (lm, am) = state(v - f * dt);
        assert_relative_eq!(d.angular_momentum, (lp - lm) / (2.0 * dt), epsilon = 1e-7);
        assert_relative_eq!(d.eccentricity, (ap - am) / (2.0 * dt), epsilon = 1e-7);
    }

    #[test]
    fn test_averaged_rates_invariants() {
        let b1 = body(1e-3, 1.0, 0.2, 0.1, 0.3, 0.5);
        let b2 = body(1e-3, 1.6, 0.3, 0.3, 1.0, 2.0);
        let d = average_rhs(0.01, &b1, &b2, &AverageParams::default()).unwrap();

        let (dot_rate, norm_rate) = conserved_rates(&b1, &d);
        let scale = d.angular_momentum.norm() + d.eccentricity.norm();
        assert!(dot_rate.abs() < 1e-12 * scale);
        assert!(norm_rate.abs() < 1e-9 * scale);
        assert_eq!(d.to_array()[BODY_A_INDEX], 0.0);
    }

    #[test]
    fn test_element_rates_match_finite_differences() {
        let b = body(1e-3, 1.0, 0.3, 0.7, 1.1, 2.2);
        let d = BodyDerivatives::from_rates(
            Vector3::new(1e-3, -2e-3, 5e-4),
            Vector3::new(-1e-3, 4e-4, 2e-3),
        );
        let rates = d.to_element_rates(&b);

        let h = 1e-4;
        let shifted = |sign: f64| {
            Body {
                angular_momentum: b.angular_momentum + d.angular_momentum * (sign * h),
                eccentricity: b.eccentricity + d.eccentricity * (sign * h),
                ..b
            }
            .elements()
        };
        let (plus, minus) = (shifted(1.0), shifted(-1.0));
        let fd = |p: f64, m: f64| (p - m) / (2.0 * h);

        assert_relative_eq!(rates.eccentricity, fd(plus.eccentricity, minus.eccentricity), epsilon = 1e-9);
        assert_relative_eq!(rates.inclination, fd(plus.inclination, minus.inclination), epsilon = 1e-9);
        assert_relative_eq!(
            rates.ascending_node_longitude,
            fd(plus.ascending_node_longitude, minus.ascending_node_longitude),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            rates.periapsis_argument,
            fd(plus.periapsis_argument, minus.periapsis_argument),
            epsilon = 1e-9
        );
        assert_eq!(rates.semi_major_axis, 0.0);
    }

    #[test]
    fn test_element_rates_for_degenerate_orbits() {
        let circular_equatorial = body(1e-3, 1.0, 0.0, 0.0, 0.0, 0.0);
        let d = BodyDerivatives::from_rates(
            Vector3::new(3e-4, -4e-4, 0.0),
            Vector3::new(0.0, 2e-3, 0.0),
        );
        let rates = d.to_element_rates(&circular_equatorial);
        assert_relative_eq!(rates.eccentricity, 2e-3);
        assert_relative_eq!(rates.inclination, 5e-4, epsilon = 1e-15);
        assert_eq!(rates.ascending_node_longitude, 0.0);
        assert_eq!(rates.periapsis_argument, 0.0);
    }
}
