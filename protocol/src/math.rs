//! # Scaled Multiply-Divide
//!
//! Every share/asset conversion in the vault is `x * y / denominator` with a
//! caller-chosen rounding direction. Amounts are `u128`, so the product can
//! need up to 256 bits; it is computed in [`U256`] and only narrowed back to
//! `u128` after the division. A result that does not fit is an error, never
//! a truncation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer used for intermediate products.
    pub struct U256(4);
}

/// Token amount in the smallest unit of the asset or share token.
pub type Amount = u128;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from checked amount arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// The result does not fit in an [`Amount`].
    #[error("arithmetic overflow")]
    Overflow,

    /// The result would be negative.
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Direction in which an inexact division is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Truncate toward zero (floor for unsigned values).
    Down,
    /// Round away from zero when there is a remainder (ceiling).
    Up,
}

impl std::fmt::Display for Rounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rounding::Down => write!(f, "down"),
            Rounding::Up => write!(f, "up"),
        }
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Computes `x * y / denominator` rounded in the requested direction.
///
/// # Errors
///
/// Returns [`MathError::DivisionByZero`] if `denominator` is zero and
/// [`MathError::Overflow`] if the rounded quotient exceeds `u128::MAX`.
pub fn mul_div(
    x: Amount,
    y: Amount,
    denominator: Amount,
    rounding: Rounding,
) -> Result<Amount, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }

    // u128 * u128 always fits in 256 bits.
    let product = U256::from(x) * U256::from(y);
    let (mut quotient, remainder) = product.div_mod(U256::from(denominator));

    if rounding == Rounding::Up && !remainder.is_zero() {
        quotient = quotient
            .checked_add(U256::one())
            .ok_or(MathError::Overflow)?;
    }

    narrow(quotient)
}

/// Narrows a 256-bit value back to an [`Amount`].
fn narrow(value: U256) -> Result<Amount, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}

/// Overflow-checked addition.
pub fn checked_add(a: Amount, b: Amount) -> Result<Amount, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Underflow-checked subtraction.
pub fn checked_sub(a: Amount, b: Amount) -> Result<Amount, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}
