#![allow(dead_code)]

use approx::assert_relative_eq;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::Rng;
use secular_rings::body::Body;
use secular_rings::orbit_type::keplerian_element::KeplerianElements;

/// Relative distance `|actual − expected| / |expected|` must stay below `tol`.
pub fn assert_force_close(actual: &Vector3<f64>, expected: &Vector3<f64>, tol: f64) {
    let rel = (actual - expected).norm() / expected.norm();
    assert!(
        rel < tol,
        "force mismatch: relative error {rel:e}\n  actual   = {actual:?}\n  expected = {expected:?}"
    );
}

pub fn assert_body_close(actual: &Body, expected: &Body, epsilon: f64) {
    assert_relative_eq!(actual.mass, expected.mass, epsilon = epsilon);
    assert_relative_eq!(
        actual.semi_major_axis,
        expected.semi_major_axis,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.angular_momentum,
        expected.angular_momentum,
        epsilon = epsilon
    );
    assert_relative_eq!(actual.eccentricity, expected.eccentricity, epsilon = epsilon);
}

/// Body with random orientation, `a ∈ [0.5, 2)` and the given eccentricity.
pub fn random_body(rng: &mut StdRng, mass: f64, eccentricity: f64) -> Body {
    Body::from_elements(
        mass,
        &KeplerianElements {
            semi_major_axis: rng.random_range(0.5..2.0),
            eccentricity,
            inclination: rng.random_range(0.0..std::f64::consts::PI),
            ascending_node_longitude: rng.random_range(0.0..std::f64::consts::TAU),
            periapsis_argument: rng.random_range(0.0..std::f64::consts::TAU),
        },
    )
    .unwrap()
}

/// Field point uniformly drawn in the cube `[-extent, extent]³`.
pub fn random_field_point(rng: &mut StdRng, extent: f64) -> Vector3<f64> {
    Vector3::new(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}
