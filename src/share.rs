//! The `share` module turns a set of input records into a normalized, sorted set of shares.
//!
//! Individual records are not trusted: a record that cannot be decoded is skipped with a
//! warning and remembered in [ShareSet::skipped], whereas an invalid threshold or an
//! insufficient number of shares aborts loading.
//!

use crate::expression::evaluate_expression;
use crate::math::decode_radix;
use crate::{PluralityError, PluralityResult};
use log::{debug, warn};
use num_bigint::BigInt;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// The key of the entry that holds the parameters `n` and `k`.
pub const KEYS_ENTRY: &str = "keys";

/// This struct represents a single share, i.e., a point `(x, y)` on the secret polynomial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    /// The x-coordinate.
    pub x: i64,
    /// The y-coordinate.
    pub y: BigInt,
}

impl Share {
    /// The function creates a new share.
    ///
    /// * `x` - The x-coordinate.
    /// * `y` - The y-coordinate.
    pub fn new(x: i64, y: BigInt) -> Self {
        Share { x, y }
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// This struct holds an input record that was skipped together with the reason.
#[derive(Debug)]
pub struct SkippedRecord {
    /// The key of the record.
    pub key: String,
    /// The error that caused the record to be skipped.
    pub error: PluralityError,
}

/// This struct represents the normalized collection of shares of a single input.
#[derive(Debug)]
pub struct ShareSet {
    /// The declared total number of shares.
    n: usize,
    /// The declared threshold.
    k: usize,
    /// The shares, sorted by x-coordinate.
    shares: Vec<Share>,
    /// The records that could not be turned into shares.
    skipped: Vec<SkippedRecord>,
}

impl ShareSet {
    /// The function creates a share set from parameters and shares.
    ///
    /// The shares are sorted by x-coordinate. Shares with an x-coordinate that was already
    /// seen are skipped.
    ///
    /// * `n` - The total number of shares.
    /// * `k` - The threshold.
    /// * `shares` - The shares.
    pub fn new(n: usize, k: usize, shares: Vec<Share>) -> PluralityResult<Self> {
        check_threshold(n as i64, k as i64)?;
        let mut share_set = ShareSet {
            n,
            k,
            shares: vec![],
            skipped: vec![],
        };
        let mut coordinates = HashSet::new();
        for share in shares {
            share_set.add_share(share.x.to_string(), share, &mut coordinates);
        }
        share_set.finalize()?;
        Ok(share_set)
    }

    /// The function returns the declared total number of shares.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The function returns the threshold.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The function returns the shares, sorted by x-coordinate.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// The function returns the records that were skipped.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// The function returns the number of usable shares.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// The function returns true if there are no usable shares.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    fn skip(&mut self, key: String, error: PluralityError) {
        warn!("Skipping record '{}': {}", key, error);
        self.skipped.push(SkippedRecord { key, error });
    }

    fn add_share(&mut self, key: String, share: Share, coordinates: &mut HashSet<i64>) {
        if coordinates.insert(share.x) {
            debug!("Share {}: {}", key, share);
            self.shares.push(share);
        } else {
            let x = share.x;
            self.skip(key, PluralityError::DuplicateShare(x));
        }
    }

    /// The function sorts the shares and verifies that there are enough of them.
    fn finalize(&mut self) -> PluralityResult<()> {
        self.shares.sort_by_key(|share| share.x);
        if self.shares.len() < self.k {
            return Err(PluralityError::InsufficientShares {
                found: self.shares.len(),
                required: self.k,
            });
        }
        if self.shares.len() != self.n {
            debug!(
                "Found {} usable shares while {} were declared.",
                self.shares.len(),
                self.n
            );
        }
        Ok(())
    }
}

/// The function verifies the relation between `n` and `k`.
fn check_threshold(n: i64, k: i64) -> PluralityResult<()> {
    if k <= 0 || n <= 0 || k > n {
        Err(PluralityError::InvalidThreshold(format!(
            "The parameters must satisfy 0 < k <= n (n = {}, k = {}).",
            n, k
        )))
    } else {
        Ok(())
    }
}

/// The function reads an integer that is given either as a JSON number or as a string.
fn get_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(string) => string.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// The function reads the required parameter with the given name from the `keys` entry.
fn get_parameter(keys: &Map<String, Value>, name: &str) -> PluralityResult<i64> {
    match keys.get(name) {
        Some(value) => get_integer(value).ok_or_else(|| {
            PluralityError::MalformedInput(format!(
                "The parameter '{}' must be an integer.",
                name
            ))
        }),
        None => Err(PluralityError::MalformedInput(format!(
            "The entry '{}' must contain '{}'.",
            KEYS_ENTRY, name
        ))),
    }
}

/// The function decodes the y-coordinate of a single record.
///
/// A record is either an object with the fields `base` and `value`, or a string holding a
/// legacy expression.
fn decode_value(value: &Value) -> PluralityResult<BigInt> {
    match value {
        Value::Object(fields) if fields.contains_key("base") && fields.contains_key("value") => {
            let base = get_integer(&fields["base"])
                .filter(|base| *base >= 0 && *base <= u32::MAX as i64)
                .ok_or_else(|| {
                    PluralityError::MalformedInput(format!(
                        "Invalid base {}.",
                        fields["base"]
                    ))
                })?;
            let digits = fields["value"].as_str().ok_or_else(|| {
                PluralityError::MalformedInput("The value must be a string.".to_string())
            })?;
            decode_radix(digits.trim(), base as u32)
        }
        Value::String(expression) => evaluate_expression(expression).map(BigInt::from),
        _ => Err(PluralityError::MalformedInput(
            "Invalid value format.".to_string(),
        )),
    }
}

/// The function loads a share set from a set of input records.
///
/// The records must be a JSON object with an entry `keys` containing the total number of
/// shares `n` and the threshold `k`. Every other entry is a share whose key is the
/// x-coordinate and whose value encodes the y-coordinate.
///
/// * `records` - The input records.
pub fn load_share_set(records: &Value) -> PluralityResult<ShareSet> {
    let entries = records.as_object().ok_or_else(|| {
        PluralityError::MalformedInput("The input must be a JSON object.".to_string())
    })?;
    let keys = entries
        .get(KEYS_ENTRY)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            PluralityError::MalformedInput(format!(
                "The input must contain an object '{}' with 'n' and 'k'.",
                KEYS_ENTRY
            ))
        })?;
    let n = get_parameter(keys, "n")?;
    let k = get_parameter(keys, "k")?;
    check_threshold(n, k)?;
    debug!("n = {}, k = {}", n, k);
    let mut share_set = ShareSet {
        n: n as usize,
        k: k as usize,
        shares: vec![],
        skipped: vec![],
    };
    let mut coordinates = HashSet::new();
    for (key, value) in entries.iter().filter(|(key, _)| key.as_str() != KEYS_ENTRY) {
        let x = match key.trim().parse::<i64>() {
            Ok(x) => x,
            Err(_) => {
                share_set.skip(
                    key.clone(),
                    PluralityError::MalformedInput(format!("Invalid key '{}'.", key)),
                );
                continue;
            }
        };
        match decode_value(value) {
            Ok(y) => share_set.add_share(key.clone(), Share::new(x, y), &mut coordinates),
            Err(error) => share_set.skip(key.clone(), error),
        }
    }
    share_set.finalize()?;
    Ok(share_set)
}

// ******************************** TESTS ********************************
