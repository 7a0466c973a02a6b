//! The `math` module provides the exact-arithmetic primitives used when decoding shares:
//! greatest common divisor, least common multiple, radix conversion, and binomial
//! coefficients.
//!

use crate::{DecodingError, PluralityError, PluralityResult};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// The smallest supported radix.
pub const MIN_BASE: u32 = 2;
/// The largest supported radix (digits `0-9` followed by `a-z`).
pub const MAX_BASE: u32 = 36;

/// The function returns the greatest common divisor of two numbers.
///
/// The iterative Euclidean algorithm is used. The result is made non-negative unless its
/// absolute value cannot be represented (`i64::MIN`), so `gcd(a, 0) = |a|`, e.g.,
/// `gcd(-5, 0) = 5`.
///
/// * `a` - The first number.
/// * `b` - The second number.
pub fn gcd(a: i64, b: i64) -> i64 {
    let mut a = a;
    let mut b = b;
    while b != 0 {
        // `wrapping_rem` only differs from `%` for `i64::MIN % -1`, which is 0 anyway.
        let remainder = a.wrapping_rem(b);
        a = b;
        b = remainder;
    }
    a.checked_abs().unwrap_or(a)
}

/// The function returns the least common multiple of two numbers.
///
/// The result is `0` if either input is `0`. Otherwise, it is `|a / gcd(a, b) * b|`, where
/// an overflow of the product or the absolute value results in an error instead of a
/// wrapped value.
///
/// * `a` - The first number.
/// * `b` - The second number.
pub fn lcm(a: i64, b: i64) -> PluralityResult<i64> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    let overflow = || PluralityError::ArithmeticOverflow(format!("lcm({}, {})", a, b));
    let divisor = gcd(a, b);
    // The divisor is negative only if it is `i64::MIN`, in which case `a` is `i64::MIN` too.
    if divisor < 0 {
        return Err(overflow());
    }
    (a / divisor)
        .checked_mul(b)
        .and_then(i64::checked_abs)
        .ok_or_else(overflow)
}

/// The function returns the value of a single digit character, if it is alphanumeric.
fn get_digit_value(character: char) -> Option<u32> {
    match character {
        '0'..='9' => Some(character as u32 - '0' as u32),
        'a'..='z' => Some(character as u32 - 'a' as u32 + 10),
        'A'..='Z' => Some(character as u32 - 'A' as u32 + 10),
        _ => None,
    }
}

/// The function verifies that the base lies within the supported range.
fn check_base(base: u32) -> PluralityResult<()> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        Ok(())
    } else {
        Err(DecodingError::InvalidBase(base).into())
    }
}

/// The function decodes a string of digits in the given base.
///
/// The digits `0` to `9` are followed by the letters `a` to `z` (or `A` to `Z`) for the
/// digit values 10 and above. Every digit must be smaller than the base. The value is
/// accumulated in arbitrary precision, so long digit strings cannot overflow.
///
/// * `digits` - The digit string.
/// * `base` - The base, between 2 and 36.
pub fn decode_radix(digits: &str, base: u32) -> PluralityResult<BigInt> {
    check_base(base)?;
    if digits.is_empty() {
        return Err(DecodingError::EmptyValue.into());
    }
    let mut result = BigInt::zero();
    for character in digits.chars() {
        let digit = match get_digit_value(character) {
            Some(digit) if digit < base => digit,
            _ => return Err(DecodingError::InvalidDigit { character, base }.into()),
        };
        result = result * base + digit;
    }
    Ok(result)
}

/// The function encodes a non-negative number in the given base using lowercase digits.
///
/// * `value` - The number to encode.
/// * `base` - The base, between 2 and 36.
pub fn encode_radix(value: &BigInt, base: u32) -> PluralityResult<String> {
    check_base(base)?;
    if value.is_negative() {
        return Err(PluralityError::InvalidParameter(
            "Negative values cannot be radix-encoded.".to_string(),
        ));
    }
    Ok(value.to_str_radix(base))
}

/// The function returns the binomial coefficient `C(n, k)`, or `None` if it does not fit
/// into a `u64`.
///
/// Each intermediate value `C(n - k + i, i)` is an integer, so the division is exact.
///
/// * `n` - The size of the set.
/// * `k` - The size of the subsets.
pub fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 1..=k {
        result = result.checked_mul((n - k + i) as u128)? / i as u128;
    }
    if result > u64::MAX as u128 {
        None
    } else {
        Some(result as u64)
    }
}

// ******************************** TESTS ********************************
