//! # Analytic orbit averaging
//!
//! This module computes the gravitational acceleration exerted by a body on a fixed
//! Keplerian ellipse, **averaged over one orbital period**, at an arbitrary field point.
//! The time average is reduced in closed form to complete elliptic integrals (the
//! softened Gauss method of Touma, Tremaine & Kazandjian 2009), replacing a quadrature
//! over the orbit.
//!
//! ## Pipeline overview
//!
//! 1. **Quadratic form** ([`quadratic_form`]) – the squared softened distance between the
//!    field point and the body at eccentric anomaly `E` is
//!    `A − 2 B cosε cos E − 2 B sinε sin E + C cos² E`; the four coefficients are extracted.
//!
//! 2. **Characteristic cubic** ([`characteristic`]) – the three real roots
//!    `λ0 ≥ λ1 ≥ 0 ≥ λ2 ≥ −C` of `λ³ + (C−A)λ² + (B²−AC)λ + C B²sin²ε` are found with the
//!    trigonometric (Viète) method; `λ0` is refined by Newton iteration and the two small
//!    roots are deflated from it, then the set is validated.
//!
//! 3. **Rotation** ([`rotation`]) – a 3×3 matrix `Q` diagonalising the quadratic form,
//!    pseudo-orthogonal in the metric `η = diag(1, −1, −1)`.
//!
//! 4. **Projection** ([`projection`]) – the unaveraged force law is expressed in the
//!    rotated basis, giving the combination vectors `U`, `V` and the projected forces
//!    `F_U`, `F_V`.
//!
//! 5. **Assembly** ([`force`]) – the elliptic parameter `k² = (λ1−λ2)/(λ0−λ2)` is formed
//!    and the averaged force is assembled from `E(k²)` and the associate integral
//!    `B(k²)`.
//!
//! Circular orbits (`e` below [`AverageParams::circular_eccentricity`]) bypass stages 1–4
//! and use the closed-form force of a uniform ring.
//!
//! ## Example
//!
//! ```rust
//! use nalgebra::Vector3;
//! use secular_rings::analytic_average::{force::force_averaged, AverageParams};
//! use secular_rings::body::Body;
//! use secular_rings::orbit_type::keplerian_element::KeplerianElements;
//!
//! let body = Body::from_elements(
//!     1e-3,
//!     &KeplerianElements {
//!         semi_major_axis: 1.0,
//!         eccentricity: 0.2,
//!         inclination: 0.1,
//!         ascending_node_longitude: 0.0,
//!         periapsis_argument: 0.0,
//!     },
//! )
//! .unwrap();
//!
//! let params = AverageParams::default();
//! let f = force_averaged(0.01, &Vector3::new(1.8, 0.2, 0.1), &body, &params).unwrap();
//! assert!(f.iter().all(|c| c.is_finite()));
//! ```
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CIRCULAR_ECCENTRICITY, MODULUS_CLAMP_TOL, ROOT_SEPARATION_TOL, ROOT_SIGN_TOL,
};
use crate::rings_errors::RingsError;

pub mod characteristic;
pub mod force;
pub mod projection;
pub mod quadratic_form;
pub mod rotation;

/// Numerical controls of the averaging routines.
///
/// Fields
/// -----------------
/// **Branch selection**
/// * `circular_eccentricity` – eccentricities strictly below this value use the
///   circular-ring force law instead of the general elliptic reduction.
///
/// **Characteristic roots**
/// * `root_separation_tol` – relative gap `(λ0 − λ1)/(λ0 − λ2)` under which the two
///   largest roots are declared repeated ([`RingsError::DegenerateRoots`]). The lower
///   pair is only rejected when `λ1 = λ2` exactly.
/// * `root_sign_tol` – relative slack (scaled by `λ0`) on the sign contract
///   `λ1 ≥ 0 ≥ λ2 ≥ −C`; roots within the slack are clamped to the boundary, beyond it
///   [`RingsError::RootSignViolation`] is returned.
/// * `newton_polish_iter` – iteration cap of the Newton refinement of the dominant root
///   `λ0`; the two other roots are deflated from it.
///
/// **Elliptic parameter**
/// * `modulus_clamp_tol` – `k²` within this distance of `[0, 1]` is clamped, farther
///   excursions raise [`RingsError::EllipticParameterOutOfRange`].
///
/// **Quadrature reference** (see [`crate::raw_average`])
/// * `quadrature_rel_tol` – relative change between successive trapezoid refinements
///   at which the estimate is accepted.
/// * `quadrature_min_points`, `quadrature_max_points` – first and last trapezoid sizes.
///
/// **Secular averages** (see [`crate::secular`])
/// * `secular_rel_tol` – acceptance threshold of the outer average over the perturbed
///   orbit.
/// * `secular_max_points` – node cap of the outer average (it starts from
///   `quadrature_min_points`).
///
/// Defaults
/// -----------------
/// See [`AverageParams::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageParams {
    pub circular_eccentricity: f64,

    pub root_separation_tol: f64,
    pub root_sign_tol: f64,
    pub newton_polish_iter: usize,

    pub modulus_clamp_tol: f64,

    pub quadrature_rel_tol: f64,
    pub quadrature_min_points: usize,
    pub quadrature_max_points: usize,

    pub secular_rel_tol: f64,
    pub secular_max_points: usize,
}

impl AverageParams {
    /// Construct a new [`AverageParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`AverageParamsBuilder`] to override the defaults step by step.
    ///
    /// # Example
    ///
    /// ```rust
    /// use secular_rings::analytic_average::AverageParams;
    ///
    /// let params = AverageParams::builder()
    ///     .circular_eccentricity(1e-10)
    ///     .quadrature_rel_tol(1e-10)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.circular_eccentricity, 1e-10);
    /// ```
    pub fn builder() -> AverageParamsBuilder {
        AverageParamsBuilder::new()
    }
}

impl Default for AverageParams {
    fn default() -> Self {
        AverageParams {
            circular_eccentricity: CIRCULAR_ECCENTRICITY,

            root_separation_tol: ROOT_SEPARATION_TOL,
            root_sign_tol: ROOT_SIGN_TOL,
            newton_polish_iter: 25,

            modulus_clamp_tol: MODULUS_CLAMP_TOL,

            quadrature_rel_tol: 1e-12,
            quadrature_min_points: 64,
            quadrature_max_points: 1 << 20,

            secular_rel_tol: 1e-10,
            secular_max_points: 1 << 14,
        }
    }
}

/// Builder for [`AverageParams`], with validation.
#[derive(Debug, Clone)]
pub struct AverageParamsBuilder {
    params: AverageParams,
}

impl Default for AverageParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AverageParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: AverageParams::default(),
        }
    }

    pub fn circular_eccentricity(mut self, v: f64) -> Self {
        self.params.circular_eccentricity = v;
        self
    }
    pub fn root_separation_tol(mut self, v: f64) -> Self {
        self.params.root_separation_tol = v;
        self
    }
    pub fn root_sign_tol(mut self, v: f64) -> Self {
        self.params.root_sign_tol = v;
        self
    }
    pub fn newton_polish_iter(mut self, v: usize) -> Self {
        self.params.newton_polish_iter = v;
        self
    }
    pub fn modulus_clamp_tol(mut self, v: f64) -> Self {
        self.params.modulus_clamp_tol = v;
        self
    }
    pub fn quadrature_rel_tol(mut self, v: f64) -> Self {
        self.params.quadrature_rel_tol = v;
        self
    }
    pub fn quadrature_min_points(mut self, v: usize) -> Self {
        self.params.quadrature_min_points = v;
        self
    }
    pub fn quadrature_max_points(mut self, v: usize) -> Self {
        self.params.quadrature_max_points = v;
        self
    }
    pub fn secular_rel_tol(mut self, v: f64) -> Self {
        self.params.secular_rel_tol = v;
        self
    }
    pub fn secular_max_points(mut self, v: usize) -> Self {
        self.params.secular_max_points = v;
        self
    }

    #[inline]
    fn ge0(x: f64) -> bool {
        x.is_finite() && x >= 0.0
    }

    #[inline]
    fn gt0(x: f64) -> bool {
        x.is_finite() && x > 0.0
    }

    /// Validate and return the parameters.
    ///
    /// Errors
    /// ------
    /// [`RingsError::InvalidAverageParameter`] when:
    /// * a tolerance is negative or non-finite,
    /// * `circular_eccentricity ≥ 1`,
    /// * `newton_polish_iter = 0`,
    /// * `quadrature_rel_tol ≤ 0` or `secular_rel_tol ≤ 0`,
    /// * `quadrature_min_points < 4`, or one of the point caps below
    ///   `quadrature_min_points`.
    pub fn build(self) -> Result<AverageParams, RingsError> {
        let p = &self.params;

        if !Self::ge0(p.circular_eccentricity) || p.circular_eccentricity >= 1.0 {
            return Err(RingsError::InvalidAverageParameter(
                "circular_eccentricity must lie in [0, 1)".into(),
            ));
        }
        if !Self::ge0(p.root_separation_tol) || !Self::ge0(p.root_sign_tol) {
            return Err(RingsError::InvalidAverageParameter(
                "root tolerances must be non-negative".into(),
            ));
        }
        if p.newton_polish_iter == 0 {
            return Err(RingsError::InvalidAverageParameter(
                "newton_polish_iter must be >= 1".into(),
            ));
        }
        if !Self::ge0(p.modulus_clamp_tol) {
            return Err(RingsError::InvalidAverageParameter(
                "modulus_clamp_tol must be non-negative".into(),
            ));
        }
        if !Self::gt0(p.quadrature_rel_tol) || !Self::gt0(p.secular_rel_tol) {
            return Err(RingsError::InvalidAverageParameter(
                "quadrature tolerances must be > 0".into(),
            ));
        }
        if p.quadrature_min_points < 4 {
            return Err(RingsError::InvalidAverageParameter(
                "quadrature_min_points must be >= 4".into(),
            ));
        }
        if p.quadrature_max_points < p.quadrature_min_points
            || p.secular_max_points < p.quadrature_min_points
        {
            return Err(RingsError::InvalidAverageParameter(
                "require quadrature_min_points <= quadrature_max_points, secular_max_points"
                    .into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for AverageParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Orbit Averaging Parameters")?;
            writeln!(f, "--------------------------")?;
            writeln!(f, "[Branch selection]")?;
            writeln!(
                f,
                "  circular_eccentricity = {:e}   # ring law below this e",
                self.circular_eccentricity
            )?;
            writeln!(f, "\n[Characteristic roots]")?;
            writeln!(
                f,
                "  root_separation_tol   = {:e}   # repeated-root detection",
                self.root_separation_tol
            )?;
            writeln!(
                f,
                "  root_sign_tol         = {:e}   # slack on λ1 ≥ 0 ≥ λ2 ≥ −C",
                self.root_sign_tol
            )?;
            writeln!(
                f,
                "  newton_polish_iter    = {}      # Newton cap on λ0",
                self.newton_polish_iter
            )?;
            writeln!(
                f,
                "  modulus_clamp_tol     = {:e}   # k² clamp window",
                self.modulus_clamp_tol
            )?;
            writeln!(f, "\n[Quadrature reference]")?;
            writeln!(
                f,
                "  quadrature_rel_tol    = {:e}   # refinement stop criterion",
                self.quadrature_rel_tol
            )?;
            writeln!(
                f,
                "  quadrature_points     = {}..{}",
                self.quadrature_min_points, self.quadrature_max_points
            )?;
            writeln!(f, "\n[Secular averages]")?;
            writeln!(
                f,
                "  secular_rel_tol       = {:e}   # outer refinement stop criterion",
                self.secular_rel_tol
            )?;
            write!(
                f,
                "  secular_points        = {}..{}",
                self.quadrature_min_points, self.secular_max_points
            )
        } else {
            write!(
                f,
                "AverageParams(circ_e={:e}, sep_tol={:e}, sign_tol={:e}, polish={}, k2_tol={:e}, quad_tol={:e}, quad_pts={}..{}, sec_tol={:e}, sec_max={})",
                self.circular_eccentricity,
                self.root_separation_tol,
                self.root_sign_tol,
                self.newton_polish_iter,
                self.modulus_clamp_tol,
                self.quadrature_rel_tol,
                self.quadrature_min_points,
                self.quadrature_max_points,
                self.secular_rel_tol,
                self.secular_max_points
            )
        }
    }
}
