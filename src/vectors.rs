//! # Vector helpers
//!
//! Small geometric helpers on [`nalgebra::Vector3`] shared by the body, averaging and
//! secular-rate modules: softened point-mass acceleration, projections, and active
//! rotations about the coordinate axes.

use nalgebra::{Rotation3, Vector3};

/// Acceleration on a unit mass at `r1` due to a unit mass at `r2`, softened by `eps`.
///
/// Arguments
/// ---------
/// * `eps`: softening length (non-negative).
/// * `r1`: position of the attracted point.
/// * `r2`: position of the attracting point.
///
/// Return
/// ------
/// * `(r2 − r1) / (|r2 − r1|² + eps²)^{3/2}`
pub fn softened_specific_acceleration(eps: f64, r1: &Vector3<f64>, r2: &Vector3<f64>) -> Vector3<f64> {
    let d = r2 - r1;
    let d2 = d.norm_squared() + eps * eps;
    d / (d2 * d2.sqrt())
}

/// Projection of `x` onto the direction of `y`.
pub fn project(x: &Vector3<f64>, y: &Vector3<f64>) -> Vector3<f64> {
    y * (x.dot(y) / y.norm_squared())
}

/// Component of `x` orthogonal to `y`.
pub fn orthogonal_project(x: &Vector3<f64>, y: &Vector3<f64>) -> Vector3<f64> {
    x - project(x, y)
}

/// Active rotation of `x` about the X axis by `theta` radians.
pub fn rotate_x(x: &Vector3<f64>, theta: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), theta) * x
}

/// Active rotation of `x` about the Z axis by `theta` radians.
pub fn rotate_z(x: &Vector3<f64>, theta: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), theta) * x
}

/// Rate of change of `|v|` given `v` and its time derivative.
pub fn vdot_to_vmagdot(v: &Vector3<f64>, vdot: &Vector3<f64>) -> f64 {
    v.dot(vdot) / v.norm()
}
