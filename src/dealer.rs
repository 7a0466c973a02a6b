//! The `dealer` module creates share records for a secret, optionally corrupting some of them.
//!
//! The records have the same format that is accepted by
//! [load_share_set](crate::share::load_share_set).
//!

use crate::math::encode_radix;
use crate::share::KEYS_ENTRY;
use crate::{PluralityError, PluralityResult};
use log::debug;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rand::Rng;
use serde_json::{json, Map, Value};

/// The maximum offset that is added to the y-coordinate of a corrupted share.
const MAX_CORRUPTION_OFFSET: u32 = 1_000_000;

/// The function returns a random non-negative coefficient.
fn get_random_coefficient<R: Rng>(rng: &mut R) -> BigInt {
    BigInt::from(rng.gen::<u32>())
}

/// This struct represents a polynomial with integer coefficients whose constant term is the
/// secret.
#[derive(Debug)]
pub struct SecretPolynomial {
    /// The coefficients, starting with the constant term.
    coefficients: Vec<BigInt>,
}

impl SecretPolynomial {
    /// The function creates a polynomial of the given degree with the secret as the constant
    /// term and random non-negative coefficients otherwise.
    ///
    /// * `secret` - The secret.
    /// * `degree` - The degree of the polynomial.
    pub fn new(secret: &BigInt, degree: usize) -> Self {
        let mut rng = rand::thread_rng();
        let mut coefficients = vec![secret.clone()];
        for _index in 0..degree {
            coefficients.push(get_random_coefficient(&mut rng));
        }
        SecretPolynomial { coefficients }
    }

    /// The function creates a polynomial with the given coefficients, starting with the
    /// constant term.
    pub fn from_coefficients(coefficients: Vec<BigInt>) -> Self {
        SecretPolynomial { coefficients }
    }

    /// The function returns the secret, i.e., the constant term.
    pub fn secret(&self) -> BigInt {
        self.coefficients.first().cloned().unwrap_or_else(BigInt::zero)
    }

    /// The function evaluates the polynomial at the given point using Horner's rule.
    ///
    /// * `x` - The point.
    pub fn evaluate(&self, x: i64) -> BigInt {
        let x = BigInt::from(x);
        self.coefficients
            .iter()
            .rev()
            .fold(BigInt::zero(), |result, coefficient| result * &x + coefficient)
    }
}

/// The function creates share records for a secret.
///
/// The shares are the evaluations of a random polynomial of degree `threshold - 1` at
/// `x = 1, ..., num_shares`, encoded in the given base. The y-coordinates of
/// `num_corrupted` randomly chosen shares are increased by a random positive offset.
///
/// * `secret` - The secret, which must be non-negative.
/// * `threshold` - The threshold.
/// * `num_shares` - The number of shares.
/// * `base` - The base used to encode the y-coordinates.
/// * `num_corrupted` - The number of corrupted shares.
pub fn create_share_records(
    secret: &BigInt,
    threshold: usize,
    num_shares: usize,
    base: u32,
    num_corrupted: usize,
) -> PluralityResult<Value> {
    if threshold < 1 || threshold > num_shares {
        return Err(PluralityError::InvalidThreshold(format!(
            "The parameters must satisfy 0 < k <= n (n = {}, k = {}).",
            num_shares, threshold
        )));
    }
    if num_corrupted > num_shares {
        return Err(PluralityError::InvalidParameter(
            "The number of corrupted shares must not exceed the number of shares.".to_string(),
        ));
    }
    if secret.is_negative() {
        return Err(PluralityError::InvalidParameter(
            "The secret must not be negative.".to_string(),
        ));
    }
    let polynomial = SecretPolynomial::new(secret, threshold - 1);
    let mut rng = rand::thread_rng();
    let corrupted = rand::seq::index::sample(&mut rng, num_shares, num_corrupted).into_vec();
    let mut records = Map::new();
    records.insert(
        KEYS_ENTRY.to_string(),
        json!({ "n": num_shares, "k": threshold }),
    );
    for index in 0..num_shares {
        let x = index as i64 + 1;
        let mut y = polynomial.evaluate(x);
        if corrupted.contains(&index) {
            y += rng.gen_range(1..=MAX_CORRUPTION_OFFSET);
            debug!("Corrupting share {}.", x);
        }
        records.insert(
            x.to_string(),
            json!({ "base": base.to_string(), "value": encode_radix(&y, base)? }),
        );
    }
    Ok(Value::Object(records))
}

// ******************************** TESTS ********************************
