//! # Complete elliptic integrals
//!
//! Complete elliptic integrals of the first and second kind, `K(m)` and `E(m)`, and the
//! associate integral `B(m)`, in the parameter convention `m = k²`:
//!
//! ```text
//! K(m) = ∫₀^{π/2} dθ / √(1 − m sin²θ)
//! E(m) = ∫₀^{π/2} √(1 − m sin²θ) dθ
//! B(m) = ∫₀^{π/2} cos²θ / √(1 − m sin²θ) dθ = (E − (1 − m) K) / m
//! ```
//!
//! All three are evaluated together by the arithmetic–geometric mean (AGM) iteration,
//! which converges quadratically and reaches full double precision in a handful of steps
//! for every `m ∈ [0, 1)`. `B` is finite on the whole of `[0, 1]` (`B(0) = π/4`,
//! `B(1) = 1`) and is obtained without the cancellation of its defining difference.
//!
//! References
//! ----------
//! * Abramowitz & Stegun, *Handbook of Mathematical Functions*, §17.6.
//! * NIST DLMF §19.2(ii) for the associate integral.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const AGM_MAX_ITER: usize = 64;

/// Values of the complete elliptic integrals at one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompleteElliptic {
    /// First kind, `K(m)`.
    pub k: f64,
    /// Second kind, `E(m)`.
    pub e: f64,
    /// Associate integral, `B(m)`.
    pub b: f64,
}

/// Evaluate `K(m)`, `E(m)` and `B(m)` together with the AGM.
///
/// The AGM differences follow `c_{n+1} = c_n² / (4 a_{n+1})` from `c_0² = m`, so that
/// `c_n` keeps full relative accuracy for small `m`. With `S = Σ_{n≥1} 2^{n−1} c_n²`:
///
/// ```text
/// K = π / (2 a_∞)
/// E = K (1 − m/2 − S)
/// B = K (1/2 − S/m)
/// ```
///
/// Arguments
/// ---------
/// * `m`: parameter `k²`, expected in `[0, 1]`.
///
/// Return
/// ------
/// * [`CompleteElliptic`] with the three integrals. At `m = 1`, `K` is `+∞` and
///   `E = B = 1`. Outside `[0, 1]` every field is NaN; callers are expected to clamp first.
pub fn complete_elliptic(m: f64) -> CompleteElliptic {
    if !(0.0..=1.0).contains(&m) {
        return CompleteElliptic {
            k: f64::NAN,
            e: f64::NAN,
            b: f64::NAN,
        };
    }
    if m == 1.0 {
        return CompleteElliptic {
            k: f64::INFINITY,
            e: 1.0,
            b: 1.0,
        };
    }

    let mut a = 1.0;
    let mut b = (1.0 - m).sqrt();
    let mut c_squared = m;
    let mut weight = 0.5;
    let mut tail = 0.0;

    for _ in 0..AGM_MAX_ITER {
        let a_next = 0.5 * (a + b);
        let c = c_squared / (4.0 * a_next);
        c_squared = c * c;
        b = (a * b).sqrt();
        a = a_next;
        weight *= 2.0;
        tail += weight * c_squared;
        if c <= f64::EPSILON * a {
            break;
        }
    }

    let k = FRAC_PI_2 / a;
    CompleteElliptic {
        k,
        e: k * (1.0 - 0.5 * m - tail),
        b: if m == 0.0 {
            FRAC_PI_4
        } else {
            k * (0.5 - tail / m)
        },
    }
}
