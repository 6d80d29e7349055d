//! # Orbiting body
//!
//! A [`Body`] is a point mass on a fixed Keplerian ellipse about a central mass, stored
//! in the vectorial form used by secular theory:
//!
//! * `mass` – in units of the central mass,
//! * `semi_major_axis` – `a`,
//! * `angular_momentum` – `L`, along the orbit normal with `|L| = √(1 − e²)`,
//! * `eccentricity` – `A` (Laplace–Runge–Lenz direction), towards periapse with `|A| = e`.
//!
//! `L` and `A` are mutually orthogonal and together fix the orbital plane and the
//! periapse direction. With `G·M = 1`, the specific angular momentum is `√a · L`.
//!
//! See also
//! --------
//! * [`crate::orbit_type::keplerian_element::KeplerianElements`] – classical element
//!   view of the same orbit.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    EccentricAnomaly, Mass, BODY_A_INDEX, BODY_ECC_INDEX, BODY_L_INDEX, BODY_M_INDEX,
    BODY_VECTOR_SIZE, DPI,
};
use crate::rings_errors::RingsError;

/// Orthonormal frame attached to an orbit.
///
/// * `periapse` – unit vector towards periapse (x̂),
/// * `perpendicular` – in-plane unit vector 90° ahead of periapse (ŷ = ẑ × x̂),
/// * `normal` – orbit normal along the angular momentum (ẑ).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalFrame {
    pub periapse: Vector3<f64>,
    pub perpendicular: Vector3<f64>,
    pub normal: Vector3<f64>,
}

/// Point mass on a Keplerian ellipse (see the module documentation for conventions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mass: Mass,
    pub semi_major_axis: f64,
    pub angular_momentum: Vector3<f64>,
    pub eccentricity: Vector3<f64>,
}

impl Body {
    /// Build a body from its vectorial description, checking that it describes a bound
    /// ellipse.
    ///
    /// Errors
    /// ------
    /// * [`RingsError::InvalidBody`] if `a ≤ 0`, `L = 0`, or `|A| ≥ 1`.
    pub fn new(
        mass: Mass,
        semi_major_axis: f64,
        angular_momentum: Vector3<f64>,
        eccentricity: Vector3<f64>,
    ) -> Result<Self, RingsError> {
        if !(semi_major_axis > 0.0) {
            return Err(RingsError::InvalidBody(format!(
                "semi-major axis must be > 0, got {semi_major_axis}"
            )));
        }
        if !(angular_momentum.norm() > 0.0) {
            return Err(RingsError::InvalidBody(
                "angular momentum vector must be non-zero".into(),
            ));
        }
        let e = eccentricity.norm();
        if !(e < 1.0) {
            return Err(RingsError::InvalidBody(format!(
                "orbit must be bound (e < 1), got e = {e}"
            )));
        }

        Ok(Body {
            mass,
            semi_major_axis,
            angular_momentum,
            eccentricity,
        })
    }

    /// Scalar eccentricity `e = |A|`.
    #[inline]
    pub fn ecc(&self) -> f64 {
        self.eccentricity.norm()
    }

    /// Mean motion `n = a^{-3/2}` (`G·M = 1`).
    pub fn mean_motion(&self) -> f64 {
        self.semi_major_axis.powf(-1.5)
    }

    /// Orbital period `2π / n`.
    pub fn period(&self) -> f64 {
        DPI / self.mean_motion()
    }

    /// Orthonormal orbital frame (periapse, in-plane perpendicular, normal).
    ///
    /// For a circular orbit the periapse is undefined; the ascending node direction
    /// `ẑ × L̂` is used instead, or the reference X axis if the orbit is equatorial.
    pub fn coordinate_system(&self) -> OrbitalFrame {
        let normal = self.angular_momentum.normalize();

        let e = self.ecc();
        let periapse = if e > 0.0 {
            self.eccentricity / e
        } else {
            let node = Vector3::z().cross(&normal);
            let node_norm = node.norm();
            if node_norm > f64::EPSILON {
                node / node_norm
            } else {
                Vector3::x()
            }
        };

        OrbitalFrame {
            periapse,
            perpendicular: normal.cross(&periapse),
            normal,
        }
    }

    /// Position and velocity at eccentric anomaly `E`.
    ///
    /// ```text
    /// r = a (cos E − e) x̂ + a √(1−e²) sin E ŷ
    /// v = n a / (1 − e cos E) · (−sin E x̂ + √(1−e²) cos E ŷ)
    /// ```
    pub fn position_velocity(&self, ecc_anomaly: EccentricAnomaly) -> (Vector3<f64>, Vector3<f64>) {
        let frame = self.coordinate_system();
        let a = self.semi_major_axis;
        let e = self.ecc();
        let sqrt_ome2 = (1.0 - e * e).sqrt();
        let (sin_e, cos_e) = ecc_anomaly.sin_cos();

        let r = frame.periapse * (a * (cos_e - e)) + frame.perpendicular * (a * sqrt_ome2 * sin_e);

        let vfac = self.mean_motion() * a / (1.0 - e * cos_e);
        let v = (frame.periapse * (-sin_e) + frame.perpendicular * (sqrt_ome2 * cos_e)) * vfac;

        (r, v)
    }

    /// Pack into the flat layout `[m, a, Lx, Ly, Lz, Ax, Ay, Az]`.
    pub fn to_state_array(&self) -> [f64; BODY_VECTOR_SIZE] {
        let mut v = [0.0; BODY_VECTOR_SIZE];
        v[BODY_M_INDEX] = self.mass;
        v[BODY_A_INDEX] = self.semi_major_axis;
        v[BODY_L_INDEX..BODY_L_INDEX + 3].copy_from_slice(self.angular_momentum.as_slice());
        v[BODY_ECC_INDEX..BODY_ECC_INDEX + 3].copy_from_slice(self.eccentricity.as_slice());
        v
    }

    /// Inverse of [`Body::to_state_array`]; no validation is performed.
    pub fn from_state_array(v: &[f64; BODY_VECTOR_SIZE]) -> Self {
        Body {
            mass: v[BODY_M_INDEX],
            semi_major_axis: v[BODY_A_INDEX],
            angular_momentum: Vector3::from_column_slice(&v[BODY_L_INDEX..BODY_L_INDEX + 3]),
            eccentricity: Vector3::from_column_slice(&v[BODY_ECC_INDEX..BODY_ECC_INDEX + 3]),
        }
    }
}

#[cfg(test)]
mod body_test {
    use super::*;
    use approx::assert_relative_eq;

    fn tilted_body() -> Body {
        let e: f64 = 0.3;
        let normal = Vector3::new(0.0, -0.6, 0.8);
        let periapse = Vector3::new(1.0, 0.0, 0.0);
        Body::new(1e-3, 1.5, normal * (1.0 - e * e).sqrt(), periapse * e).unwrap()
    }

    #[test]
    fn test_new_rejects_unbound_or_empty() {
        let l = Vector3::z();
        assert!(matches!(
            Body::new(1.0, 1.0, l, Vector3::new(1.0, 0.0, 0.0)),
            Err(RingsError::InvalidBody(_))
        ));
        assert!(matches!(
            Body::new(1.0, -1.0, l, Vector3::zeros()),
            Err(RingsError::InvalidBody(_))
        ));
        assert!(matches!(
            Body::new(1.0, 1.0, Vector3::zeros(), Vector3::zeros()),
            Err(RingsError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_frame_is_orthonormal_and_right_handed() {
        let frame = tilted_body().coordinate_system();
        assert_relative_eq!(frame.periapse.norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(frame.perpendicular.norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(frame.normal.norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(frame.periapse.dot(&frame.normal), 0.0, epsilon = 1e-15);
        assert_relative_eq!(
            frame.periapse.cross(&frame.perpendicular),
            frame.normal,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_circular_frame_uses_node() {
        let body = Body::new(1.0, 1.0, Vector3::new(0.0, -1.0, 0.0), Vector3::zeros()).unwrap();
        let frame = body.coordinate_system();
        assert_relative_eq!(frame.periapse, Vector3::x(), epsilon = 1e-15);

        let equatorial = Body::new(1.0, 1.0, Vector3::z(), Vector3::zeros()).unwrap();
        assert_eq!(equatorial.coordinate_system().periapse, Vector3::x());
    }

    #[test]
    fn test_position_velocity_recovers_orbit_vectors() {
        let body = tilted_body();
        let a = body.semi_major_axis;

        let (r_peri, _) = body.position_velocity(0.0);
        assert_relative_eq!(r_peri.norm(), a * (1.0 - body.ecc()), epsilon = 1e-14);

        for ecc_anomaly in [0.3, 1.7, 4.0] {
            let (r, v) = body.position_velocity(ecc_anomaly);
            // h = r × v = √a L
            assert_relative_eq!(
                r.cross(&v),
                body.angular_momentum * a.sqrt(),
                epsilon = 1e-14
            );
            // A = v × h − r̂
            let h = r.cross(&v);
            assert_relative_eq!(v.cross(&h) - r / r.norm(), body.eccentricity, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_period_and_state_array() {
        let body = tilted_body();
        assert_relative_eq!(body.period(), DPI * 1.5f64.powf(1.5), epsilon = 1e-14);

        let packed = body.to_state_array();
        assert_eq!(packed[BODY_M_INDEX], 1e-3);
        assert_eq!(packed[BODY_A_INDEX], 1.5);
        assert_eq!(Body::from_state_array(&packed), body);
    }
}
