//! Decimal token amounts and their base-unit representation.
//!
//! Wire and config amounts are [`Decimal`] in token units; ledgers want
//! integers in the token's smallest unit. Conversion works on the decimal's
//! mantissa and scale directly so no precision is lost on the way down.

use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenAmountError {
    #[error("amount must not be negative")]
    Negative,
    #[error("amount has {scale} fractional digits but the token only supports {decimals}")]
    PrecisionTooHigh { scale: u32, decimals: u8 },
    #[error("amount overflows the token's base-unit range")]
    Overflow,
}

/// Converts a token-unit amount to base units for a token with `decimals`
/// fractional digits, e.g. `1.5` USDC (6 decimals) -> `1_500_000`.
///
/// Fails on negative amounts, on more fractional digits than the token
/// supports, and on overflow. Zero converts to zero.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u128, TokenAmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TokenAmountError::Negative);
    }
    let amount = amount.normalize();
    let scale = amount.scale();
    if scale > u32::from(decimals) {
        return Err(TokenAmountError::PrecisionTooHigh { scale, decimals });
    }
    let mantissa = amount.mantissa().unsigned_abs();
    let factor = 10u128
        .checked_pow(u32::from(decimals) - scale)
        .ok_or(TokenAmountError::Overflow)?;
    mantissa
        .checked_mul(factor)
        .ok_or(TokenAmountError::Overflow)
}
