//! # Orbital element representations
//!
//! Classical elements of a fixed ellipse and their conversion to and from the vectorial
//! [`Body`](crate::body::Body) form used by the averaging routines:
//!
//! - [`keplerian_element`](crate::orbit_type::keplerian_element): `(a, e, i, Ω, ω)`.

/// Classical Keplerian elements structure and utilities.
pub mod keplerian_element;
