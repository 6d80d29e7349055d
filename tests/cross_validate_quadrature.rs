use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use secular_rings::analytic_average::force::{force_averaged, ForceLaw};
use secular_rings::analytic_average::AverageParams;
use secular_rings::body::Body;
use secular_rings::raw_average::raw_average_force;

mod common;
use common::{assert_force_close, random_body, random_field_point};

#[test]
fn analytic_matches_quadrature_across_eccentricities() {
    let params = AverageParams::default();
    let mut rng = StdRng::seed_from_u64(0x5EC_u64);

    for _ in 0..200 {
        let e = rng.random_range(1e-3..0.9);
        let body = random_body(&mut rng, 1.0, e);
        let rp = random_field_point(&mut rng, 3.0);
        let eps = rng.random_range(0.01..0.1);

        let analytic = force_averaged(eps, &rp, &body, &params).unwrap();
        let reference = raw_average_force(eps, &rp, &body, &params).unwrap();
        assert_force_close(&analytic, &reference, 1e-6);
    }
}

#[test]
fn analytic_matches_quadrature_at_high_eccentricity() {
    let params = AverageParams::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let body = random_body(&mut rng, 1e-3, 0.9);
        let rp = random_field_point(&mut rng, 2.5);
        let eps = 0.05;

        let analytic = force_averaged(eps, &rp, &body, &params).unwrap();
        let reference = raw_average_force(eps, &rp, &body, &params).unwrap();
        assert_force_close(&analytic, &reference, 1e-6);
    }
}

#[test]
fn near_circular_orbits_on_both_branches() {
    let params = AverageParams::default();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..60 {
        let e = 10f64.powf(rng.random_range(-10.0..-3.0));
        let body = random_body(&mut rng, 0.7, e);
        let rp = random_field_point(&mut rng, 3.0);
        let eps = rng.random_range(0.01..0.1);

        let expected_law = if e < params.circular_eccentricity {
            ForceLaw::CircularRing
        } else {
            ForceLaw::Eccentric
        };
        assert_eq!(ForceLaw::select(&body, &params), expected_law);

        let analytic = force_averaged(eps, &rp, &body, &params).unwrap();
        let reference = raw_average_force(eps, &rp, &body, &params).unwrap();
        assert_force_close(&analytic, &reference, 1e-6);
    }

    // on the axis of the orbit: Bsin = 0 and λ1 − λ2 ~ e²
    for e in [1e-7_f64, 1e-6, 1e-5, 1e-4] {
        let body = Body::new(
            1.0,
            1.0,
            Vector3::new(0.0, 0.0, (1.0 - e * e).sqrt()),
            Vector3::new(e, 0.0, 0.0),
        )
        .unwrap();
        assert_eq!(ForceLaw::select(&body, &params), ForceLaw::Eccentric);

        for z in [0.05, 0.5, 2.0] {
            let rp = Vector3::new(0.0, 0.0, z);
            let analytic = force_averaged(0.02, &rp, &body, &params).unwrap();
            let reference = raw_average_force(0.02, &rp, &body, &params).unwrap();
            assert_force_close(&analytic, &reference, 1e-6);
        }
    }
}

#[test]
fn field_points_with_vanishing_small_roots() {
    // in the plane y = 0 at height z, λ1 and λ2 both vanish where (x + e)² = e² A, i.e.
    // x = −e ± √(e² + e² (z² + eps²) / (1 − e²)) for a = 1
    let params = AverageParams::default();
    let (e, eps, z) = (0.4f64, 0.02, 1.0);
    let body = Body::new(
        1.0,
        1.0,
        Vector3::new(0.0, 0.0, (1.0 - e * e).sqrt()),
        Vector3::new(e, 0.0, 0.0),
    )
    .unwrap();

    let root = (e * e + e * e * (z * z + eps * eps) / (1.0 - e * e)).sqrt();
    for x_star in [-e + root, -e - root] {
        for offset in [-1e-6, -1e-8, 1e-8, 1e-6] {
            let rp = Vector3::new(x_star + offset, 0.0, z);
            let analytic = force_averaged(eps, &rp, &body, &params).unwrap();
            let reference = raw_average_force(eps, &rp, &body, &params).unwrap();
            assert_force_close(&analytic, &reference, 1e-9);
        }
    }
}

#[test]
fn exactly_circular_orbit_uses_ring_law() {
    let params = AverageParams::default();
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..30 {
        let body = random_body(&mut rng, 1.0, 0.0);
        let rp = random_field_point(&mut rng, 3.0);

        let analytic = force_averaged(0.02, &rp, &body, &params).unwrap();
        let reference = raw_average_force(0.02, &rp, &body, &params).unwrap();
        assert_force_close(&analytic, &reference, 1e-9);
    }
}

#[test]
fn symmetric_field_points() {
    // field points with Bsin = 0 (plane of periapse and normal) or Bcos = 0 (plane
    // through the centre orthogonal to the major axis)
    let params = AverageParams::default();
    let body = Body::new(
        1.0,
        1.0,
        Vector3::new(0.0, 0.0, (1.0f64 - 0.16).sqrt()),
        Vector3::new(0.4, 0.0, 0.0),
    )
    .unwrap();

    let field_points = [
        Vector3::new(0.0, 0.0, 2.0),
        Vector3::new(0.5, 0.0, 0.3),
        Vector3::new(1.7, 0.0, 0.0),
        Vector3::new(-1.7, 0.0, 0.0),
        Vector3::new(-0.4, 0.5, 0.3),
        Vector3::new(-0.4, 0.0, 0.7),
        Vector3::new(-0.4, 1.5, 0.0),
        Vector3::new(-0.4, 0.0, 0.0),
    ];
    for rp in field_points {
        let analytic = force_averaged(0.05, &rp, &body, &params).unwrap();
        let reference = raw_average_force(0.05, &rp, &body, &params).unwrap();
        assert_force_close(&analytic, &reference, 1e-9);
    }
}

#[test]
fn field_point_close_to_the_orbit() {
    let params = AverageParams::default();
    let body = Body::new(
        1.0,
        1.0,
        Vector3::new(0.0, 0.0, (1.0f64 - 0.16).sqrt()),
        Vector3::new(0.4, 0.0, 0.0),
    )
    .unwrap();

    // periapse sits at 0.6 along x
    for rp in [Vector3::new(0.6, 0.0, 0.0), Vector3::new(0.61, 0.01, 0.002)] {
        let analytic = force_averaged(1e-2, &rp, &body, &params).unwrap();
        let reference = raw_average_force(1e-2, &rp, &body, &params).unwrap();
        assert_force_close(&analytic, &reference, 1e-6);
    }
}
