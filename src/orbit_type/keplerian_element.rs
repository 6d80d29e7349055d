//! # Keplerian orbital elements
//!
//! This module defines the [`KeplerianElements`] struct and the conversions between the
//! classical element set and the vectorial [`Body`] representation used by the
//! averaging routines.
//!
//! ## What are Keplerian elements?
//!
//! The shape and orientation of a fixed ellipse are described by:
//!
//! 1. **a** – Semi-major axis
//! 2. **e** – Eccentricity (unitless)
//! 3. **i** – Inclination (radians, `i > π/2` is retrograde)
//! 4. **Ω** – Longitude of ascending node (radians)
//! 5. **ω** – Argument of periapsis (radians)
//!
//! The phase along the orbit is irrelevant for orbit-averaged quantities and is not
//! carried.
//!
//! ## Conventions
//!
//! The orbital frame is obtained by applying `Rz(Ω)·Rx(i)·Rz(ω)` to the reference axes:
//! the rotated X axis points to periapse and the rotated Z axis along the angular
//! momentum.
//!
//! ## Degeneracies
//!
//! - **Circular orbits (`e → 0`)**: ω is undefined and is set to `0.0`.
//! - **Equatorial orbits (`i → 0` or `i → π`)**: Ω is undefined and is set to `0.0`.
//!
//! ## Example
//!
//! ```rust
//! use secular_rings::body::Body;
//! use secular_rings::orbit_type::keplerian_element::KeplerianElements;
//!
//! let kep = KeplerianElements {
//!     semi_major_axis: 1.0,
//!     eccentricity: 0.1,
//!     inclination: 0.2,
//!     ascending_node_longitude: 1.0,
//!     periapsis_argument: 2.0,
//! };
//! let body = Body::from_elements(1e-3, &kep).unwrap();
//! let back = body.elements();
//! assert!((back.periapsis_argument - 2.0).abs() < 1e-12);
//! ```

use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::constants::{Mass, Radian, DPI, ELEMENT_DEGENERACY_EPS};
use crate::rings_errors::RingsError;
use crate::vectors::{rotate_x, rotate_z};

/// Return the principal value of an angle in `[0, 2π)`.
pub fn principal_angle(a: Radian) -> Radian {
    a.rem_euclid(DPI)
}

/// Classical orbital elements of a fixed ellipse.
///
/// Units
/// -----
/// * `semi_major_axis`: length unit of the problem.
/// * `eccentricity`: unitless, `0 ≤ e < 1`.
/// * `inclination`, `ascending_node_longitude`, `periapsis_argument`: radians.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct KeplerianElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: Radian,
    pub ascending_node_longitude: Radian,
    pub periapsis_argument: Radian,
}

impl Body {
    /// Build a body from its mass and classical elements.
    ///
    /// Arguments
    /// ---------
    /// * `mass` – mass in units of the central mass.
    /// * `elements` – classical elements (radians).
    ///
    /// Return
    /// ------
    /// * A [`Body`] with `L = √(1−e²)·ẑ'` and `A = e·x̂'`, where `x̂'`, `ẑ'` are the
    ///   reference axes rotated by `Rz(Ω)·Rx(i)·Rz(ω)`.
    ///
    /// Errors
    /// ------
    /// * [`RingsError::InvalidBody`] for `a ≤ 0` or an eccentricity outside `[0, 1)`.
    pub fn from_elements(mass: Mass, elements: &KeplerianElements) -> Result<Body, RingsError> {
        let e = elements.eccentricity;
        if !(0.0..1.0).contains(&e) {
            return Err(RingsError::InvalidBody(format!(
                "eccentricity must lie in [0, 1), got {e}"
            )));
        }

        let orient = |v: Vector3<f64>| {
            let v = rotate_z(&v, elements.periapsis_argument);
            let v = rotate_x(&v, elements.inclination);
            rotate_z(&v, elements.ascending_node_longitude)
        };
        let periapse = orient(Vector3::x());
        let normal = orient(Vector3::z());

        Body::new(
            mass,
            elements.semi_major_axis,
            normal * (1.0 - e * e).sqrt(),
            periapse * e,
        )
    }

    /// Classical elements of this body.
    ///
    /// Degenerate angles (Ω for equatorial orbits, ω for circular ones) are returned as
    /// zero; all angles are normalised with [`principal_angle`].
    pub fn elements(&self) -> KeplerianElements {
        let lhat = self.angular_momentum.normalize();
        let ecc_vec = self.eccentricity;
        let e = ecc_vec.norm();

        let inclination = lhat.z.clamp(-1.0, 1.0).acos();

        let node = Vector3::z().cross(&lhat);
        let equatorial = node.norm() < ELEMENT_DEGENERACY_EPS;

        let ascending_node_longitude = if equatorial {
            0.0
        } else {
            principal_angle(lhat.x.atan2(-lhat.y))
        };

        let periapsis_argument = if e < ELEMENT_DEGENERACY_EPS {
            0.0
        } else {
            // measured from the node line, or from X when the node is undefined
            let node_dir = if equatorial { Vector3::x() } else { node };
            let sin_w = node_dir.cross(&ecc_vec).dot(&lhat);
            let cos_w = node_dir.dot(&ecc_vec);
            principal_angle(sin_w.atan2(cos_w))
        };

        KeplerianElements {
            semi_major_axis: self.semi_major_axis,
            eccentricity: e,
            inclination,
            ascending_node_longitude,
            periapsis_argument,
        }
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / std::f64::consts::PI;

        writeln!(f, "Keplerian Elements:")?;
        writeln!(
            f,
            "  a   = {:.6}        (semi-major axis)",
            self.semi_major_axis
        )?;
        writeln!(f, "  e   = {:.6}        (eccentricity)", self.eccentricity)?;
        writeln!(
            f,
            "  i   = {:.6} rad ({:.6}°)  (inclination)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   = {:.6} rad ({:.6}°)  (longitude of ascending node)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   = {:.6} rad ({:.6}°)  (argument of periapsis)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )
    }
}
