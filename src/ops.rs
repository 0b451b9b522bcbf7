//! In-process arithmetic evaluation.
//!
//! Pure functions over f64 pairs, plus a left fold for requests carrying
//! more than two operands. Division checks for exact zero — the validator
//! already rejects zero divisors, so the check here is redundant but keeps
//! the two layers consistent.

use crate::request::{ArithmeticOp, ValidationError};

pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

pub fn divide(a: f64, b: f64) -> Result<f64, ValidationError> {
    if b == 0.0 {
        return Err(ValidationError::DivisionByZero);
    }
    Ok(a / b)
}

/// Fold the operation left-to-right across the operands:
/// `fold(Addition, [a, b, c])` = `add(add(a, b), c)`.
pub fn fold(op: ArithmeticOp, inputs: &[f64]) -> Result<f64, ValidationError> {
    let (&first, rest) = inputs
        .split_first()
        .ok_or(ValidationError::InsufficientOperands)?;
    if rest.is_empty() {
        return Err(ValidationError::InsufficientOperands);
    }
    rest.iter().try_fold(first, |acc, &x| match op {
        ArithmeticOp::Addition => Ok(add(acc, x)),
        ArithmeticOp::Subtraction => Ok(subtract(acc, x)),
        ArithmeticOp::Multiplication => Ok(multiply(acc, x)),
        ArithmeticOp::Division => divide(acc, x),
    })
}
