mod denylist;
mod parser;

use crate::EvalError;

/// Tolerance used when comparing student answers against computed values
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Safely evaluate an arithmetic expression.
///
/// Pure and deterministic: the same expression always yields the same value
/// or the same error class. Input is gated against code-injection
/// signatures before it is ever tokenized, and non-finite outcomes
/// (`1/0`, `sqrt(-1)`) are reported as errors rather than returned.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(EvalError::ParseFailure {
            position: 0,
            reason: "expression is empty".to_string(),
        });
    }

    if let Some(pattern) = denylist::find_disallowed(trimmed) {
        return Err(EvalError::Disallowed { pattern: pattern.to_string() });
    }

    let value = parser::parse(trimmed)?;
    if !value.is_finite() {
        return Err(EvalError::NonFiniteResult);
    }

    Ok(value)
}

/// Approximate equality for floating point comparisons
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
