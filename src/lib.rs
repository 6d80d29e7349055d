//! # secular-rings
//!
//! Orbit-averaged (secular) gravitational interaction between bodies on fixed Keplerian
//! ellipses. The core is [`analytic_average::force::force_averaged`], the softened
//! acceleration of a body averaged over its orbit in closed form with complete elliptic
//! integrals; [`raw_average`] computes the same quantity by quadrature and [`secular`]
//! turns averaged forces into rates of change of the orbital elements.
//!
//! Units have `G·M = 1` for the central mass.

pub mod analytic_average;
pub mod body;
pub mod constants;
pub mod elliptic;
pub mod orbit_type;
pub mod raw_average;
pub mod rings_errors;
pub mod secular;
pub mod vectors;
