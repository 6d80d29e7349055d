use thiserror::Error;

#[derive(Error, Debug)]
pub enum RingsError {
    #[error("Invalid averaging parameter: {0}")]
    InvalidAverageParameter(String),

    #[error("Invalid body: {0}")]
    InvalidBody(String),

    #[error("Repeated characteristic roots (λ0 = {l0}, λ1 = {l1}, λ2 = {l2}); the general averaged force is singular here")]
    DegenerateRoots { l0: f64, l1: f64, l2: f64 },

    #[error("Characteristic roots violate λ0 ≥ λ1 ≥ 0 ≥ λ2 ≥ −C (λ = [{l0}, {l1}, {l2}], C = {c})")]
    RootSignViolation { l0: f64, l1: f64, l2: f64, c: f64 },

    #[error("Root finding error: {0}")]
    RootFinding(#[from] roots::SearchError),

    #[error("Elliptic parameter k² = {0} lies outside [0, 1]")]
    EllipticParameterOutOfRange(f64),

    #[error("Quadrature did not converge with {points} points (relative change {relative_change:e})")]
    QuadratureNotConverged { points: usize, relative_change: f64 },
}

impl PartialEq for RingsError {
    fn eq(&self, other: &Self) -> bool {
        use RingsError::*;
        match (self, other) {
            (InvalidAverageParameter(a), InvalidAverageParameter(b)) => a == b,
            (InvalidBody(a), InvalidBody(b)) => a == b,

            // Numerical payloads are diagnostics only: equality if same variant
            (DegenerateRoots { .. }, DegenerateRoots { .. }) => true,
            (RootSignViolation { .. }, RootSignViolation { .. }) => true,
            (RootFinding(a), RootFinding(b)) => {
                std::mem::discriminant(a) == std::mem::discriminant(b)
            }
            (EllipticParameterOutOfRange(_), EllipticParameterOutOfRange(_)) => true,
            (QuadratureNotConverged { points: a, .. }, QuadratureNotConverged { points: b, .. }) => {
                a == b
            }

            _ => false,
        }
    }
}
