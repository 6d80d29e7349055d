//! # Constants and type definitions for secular-rings
//!
//! This module centralizes the **numerical constants**, **default tolerances** and
//! **unit type aliases** used throughout the crate.
//!
//! ## Units
//!
//! All dynamical quantities are expressed in units where the product of the
//! gravitational constant and the central mass is one (`G·M = 1`). Body masses are
//! therefore fractions of the central mass, and the mean motion of an orbit of
//! semi-major axis `a` is `a^{-3/2}`.

// -------------------------------------------------------------------------------------------------
// Mathematical constants
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Number of scalar components in the packed body state `[m, a, L, A]`
pub const BODY_VECTOR_SIZE: usize = 8;

/// Index of the mass in the packed body state
pub const BODY_M_INDEX: usize = 0;

/// Index of the semi-major axis in the packed body state
pub const BODY_A_INDEX: usize = 1;

/// First index of the angular-momentum vector in the packed body state
pub const BODY_L_INDEX: usize = 2;

/// First index of the eccentricity vector in the packed body state
pub const BODY_ECC_INDEX: usize = 5;

// -------------------------------------------------------------------------------------------------
// Default numerical tolerances
// -------------------------------------------------------------------------------------------------

/// Eccentricity below which the circular-ring force law is used
pub const CIRCULAR_ECCENTRICITY: f64 = 1e-8;

/// Relative gap under which the two largest characteristic roots are considered repeated
pub const ROOT_SEPARATION_TOL: f64 = 1e-12;

/// Relative slack accepted on the sign contract `λ0 ≥ λ1 ≥ 0 ≥ λ2 ≥ −C`
pub const ROOT_SIGN_TOL: f64 = 1e-10;

/// Maximum excursion of the elliptic parameter `k²` outside `[0, 1]` that is clamped
pub const MODULUS_CLAMP_TOL: f64 = 1e-12;

/// Trapezoid refinements closer than this multiple of the mean integrand magnitude are
/// at round-off level
pub const QUADRATURE_ROUND_OFF: f64 = 64.0 * f64::EPSILON;

/// Threshold on `q/p` under which the ring law switches to its series form
pub const RING_SERIES_THRESHOLD: f64 = 1e-3;

/// Eccentricity or `sin(i)` under which an orbital angle is treated as undefined
pub const ELEMENT_DEGENERACY_EPS: f64 = 1e-12;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in radians
pub type Radian = f64;
/// Eccentric anomaly (radians)
pub type EccentricAnomaly = f64;
/// Mass in units of the central mass
pub type Mass = f64;
