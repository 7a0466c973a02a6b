//! The `interpolation` module evaluates the unique polynomial of degree `k - 1` through `k`
//! points at `x = 0` using Lagrange interpolation.
//!
//! All computations are carried out with exact rational numbers, so there is no rounding
//! error until the result is rounded to the nearest integer.
//!

use crate::{PluralityError, PluralityResult};
use num::BigRational;
use num_bigint::BigInt;
use num_traits::{One, Zero};

/// The function returns the value at `x = 0` of the polynomial through the given points.
///
/// For each point `j`, the Lagrange basis value is
/// `l_j = prod_{m != j} (0 - x_m) / (x_j - x_m)`, and the result is `sum_j y_j * l_j`.
///
/// * `points` - The points `(x, y)`. The x-coordinates must be distinct.
pub fn interpolate(points: &[(BigInt, BigInt)]) -> PluralityResult<BigRational> {
    if points.is_empty() {
        return Err(PluralityError::MalformedInput(
            "Lagrange interpolation requires at least one point.".to_string(),
        ));
    }
    let mut secret = BigRational::zero();
    for (j, (x_j, y_j)) in points.iter().enumerate() {
        let mut numerator = BigInt::one();
        let mut denominator = BigInt::one();
        for (m, (x_m, _)) in points.iter().enumerate() {
            if m == j {
                continue;
            }
            if x_j == x_m {
                return Err(PluralityError::SingularSubset(format!(
                    "The x-coordinate {} occurs more than once.",
                    x_j
                )));
            }
            numerator *= -x_m;
            denominator *= x_j - x_m;
        }
        secret += BigRational::new(y_j * numerator, denominator);
    }
    Ok(secret)
}

/// The function rounds a rational number to the nearest integer.
///
/// Half-way cases are rounded away from zero.
///
/// * `value` - The rational number.
pub fn round_half_away_from_zero(value: &BigRational) -> BigInt {
    value.round().to_integer()
}

/// The function interpolates the given points at `x = 0` and rounds the result to the
/// nearest integer.
///
/// * `points` - The points `(x, y)`. The x-coordinates must be distinct.
pub fn interpolate_secret(points: &[(BigInt, BigInt)]) -> PluralityResult<BigInt> {
    interpolate(points).map(|secret| round_half_away_from_zero(&secret))
}

// ******************************** TESTS ********************************
