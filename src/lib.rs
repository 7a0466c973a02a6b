//! <h1>plurality</h1>
//!

//! The `plurality` crate reconstructs a secret-shared integer from a set of shares, some of
//! which may be corrupted.
//!
//! Every subset of `k` shares is interpolated at `x = 0`, and the candidate secret produced
//! by the most subsets wins. Correct shares always agree on the secret, whereas corrupted
//! shares rarely agree with each other, so the majority is the secret as long as the
//! subsets of correct shares outnumber the others.
//!
//! The main functions that `plurality` provides are:
//! * [reconstruct_secret](crate::reconstruct_secret): Given a
//!   [ShareSet](crate::share::ShareSet), reconstruct the secret by majority vote.
//! * [reconstruct_secret_from_file](crate::reconstruct_secret_from_file): Load the share
//!   records from a JSON file and reconstruct the secret.
//! * [create_share_records](crate::dealer::create_share_records): Create share records for
//!   a secret, optionally corrupting some of them.
//!
//! The additional functionality that is provided is documented below.
//!

/// The combinations module enumerates the subsets of shares.
pub mod combinations;

/// The dealer module creates share records.
pub mod dealer;

/// The expression module evaluates the legacy share encoding.
pub mod expression;

/// The interpolation module provides Lagrange interpolation at `x = 0`.
pub mod interpolation;

/// The math module provides the integer arithmetic and radix conversion.
pub mod math;

// The share module loads and normalizes the share records.
pub mod share;

/// The tally module counts the candidate secrets.
pub mod tally;

use combinations::enumerate;
use interpolation::interpolate_secret;
use log::{debug, info};
use math::binomial;
use num_bigint::BigInt;
use serde_json::Value;
use share::{load_share_set, Share, ShareSet};
use std::fmt::Display;
use std::path::Path;
use tally::{Tally, Vote};

/// The default maximum number of combinations that are evaluated for a single input.
pub const DEFAULT_MAX_COMBINATIONS: u64 = 10_000_000;

/// This enumeration type describes why a share value could not be decoded.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodingError {
    /// This variant is used if a character is not a valid digit in the given base.
    InvalidDigit { character: char, base: u32 },
    /// This variant is used if the base is not supported.
    InvalidBase(u32),
    /// This variant is used if the digit string is empty.
    EmptyValue,
    /// This variant is used if a legacy expression calls an unknown function.
    UnknownFunction(String),
    /// This variant is used if a legacy expression cannot be parsed.
    MalformedExpression(String),
    /// This variant is used if a function is called with the wrong number of arguments.
    ArityError(String),
    /// This variant is used if a legacy expression divides by zero.
    DivisionByZero(String),
}

impl Display for DecodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodingError::InvalidDigit { character, base } => {
                write!(f, "'{}' is not a valid digit in base {}", character, base)
            }
            DecodingError::InvalidBase(base) => write!(f, "unsupported base {}", base),
            DecodingError::EmptyValue => write!(f, "empty value"),
            DecodingError::UnknownFunction(name) => write!(f, "unknown function '{}'", name),
            DecodingError::MalformedExpression(message) => write!(f, "{}", message),
            DecodingError::ArityError(message) => write!(f, "{}", message),
            DecodingError::DivisionByZero(expression) => {
                write!(f, "division by zero in '{}'", expression)
            }
        }
    }
}

/// This enumeration type is returned by the main library functions if there is an error.
#[derive(Debug)]
pub enum PluralityError {
    /// This variant is used if the input cannot be parsed or lacks required fields.
    MalformedInput(String),
    /// This variant is used if `n` and `k` do not satisfy `0 < k <= n`.
    InvalidThreshold(String),
    /// This variant is used if there are fewer valid shares than the threshold.
    InsufficientShares { found: usize, required: usize },
    /// This variant is used if a share value cannot be decoded.
    Decoding(DecodingError),
    /// This variant is used if an integer computation overflows.
    ArithmeticOverflow(String),
    /// This variant is used if a subset of shares contains duplicate x-coordinates.
    SingularSubset(String),
    /// This variant is used if no combination of shares could be interpolated.
    NoValidCombinations,
    /// This variant is used if a share has the same x-coordinate as an earlier share.
    DuplicateShare(i64),
    /// This variant is used if the number of combinations exceeds the limit.
    TooManyCombinations {
        combinations: Option<u64>,
        limit: u64,
    },
    /// This variant is used if the error relates to a parameter.
    InvalidParameter(String),
    /// This variant is used if there is an I/O error.
    IoError(std::io::Error),
}

impl Display for PluralityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluralityError::MalformedInput(message) => write!(f, "Malformed input: {}", message),
            PluralityError::InvalidThreshold(message) => {
                write!(f, "Invalid threshold: {}", message)
            }
            PluralityError::InsufficientShares { found, required } => write!(
                f,
                "Insufficient shares: found {} valid shares, but {} are required",
                found, required
            ),
            PluralityError::Decoding(error) => write!(f, "Decoding error: {}", error),
            PluralityError::ArithmeticOverflow(expression) => {
                write!(f, "Arithmetic overflow in {}", expression)
            }
            PluralityError::SingularSubset(message) => write!(f, "Singular subset: {}", message),
            PluralityError::NoValidCombinations => write!(f, "No valid combinations found"),
            PluralityError::DuplicateShare(x) => {
                write!(f, "Duplicate share for x-coordinate {}", x)
            }
            PluralityError::TooManyCombinations {
                combinations: Some(combinations),
                limit,
            } => write!(
                f,
                "Too many combinations: {} exceeds the limit of {}",
                combinations, limit
            ),
            PluralityError::TooManyCombinations {
                combinations: None,
                limit,
            } => write!(
                f,
                "Too many combinations: the number exceeds the limit of {}",
                limit
            ),
            PluralityError::InvalidParameter(message) => {
                write!(f, "Invalid parameter error: {}", message)
            }
            PluralityError::IoError(error) => write!(f, "IO error: {}", error),
        }
    }
}

impl std::error::Error for PluralityError {}

impl From<std::io::Error> for PluralityError {
    /// The function defines how an [IO error](std::io::Error) is mapped to a
    /// [PluralityError](crate::PluralityError).
    ///
    /// * `err` - The IO error.
    fn from(err: std::io::Error) -> Self {
        PluralityError::IoError(err)
    }
}

impl From<serde_json::Error> for PluralityError {
    /// A JSON parsing error means that the input is malformed.
    ///
    /// * `err` - The JSON error.
    fn from(err: serde_json::Error) -> Self {
        PluralityError::MalformedInput(err.to_string())
    }
}

impl From<DecodingError> for PluralityError {
    fn from(err: DecodingError) -> Self {
        PluralityError::Decoding(err)
    }
}

/// A result that contains a [PluralityError](crate::PluralityError) in the `Err` case.
pub type PluralityResult<R> = Result<R, PluralityError>;

/// This struct holds the outcome of a reconstruction.
#[derive(Debug)]
pub struct Reconstruction {
    /// The secret with the most votes.
    pub secret: BigInt,
    /// The number of combinations that produced the secret.
    pub votes: usize,
    /// The number of evaluated combinations.
    pub total_combinations: usize,
    /// The number of combinations that could not be interpolated.
    pub skipped_combinations: usize,
    /// All candidate secrets, ordered from the most to the least votes.
    pub tally: Vec<Vote>,
}

impl Reconstruction {
    /// The function returns the candidate secrets other than the selected secret.
    pub fn dissent(&self) -> &[Vote] {
        if self.tally.is_empty() {
            &self.tally
        } else {
            &self.tally[1..]
        }
    }
}

/// The function reconstructs the secret by majority vote.
///
/// Every subset of `k` shares is interpolated at `x = 0` and the rounded result is counted.
/// The secret with the most votes is returned. Ties are broken in favor of the secret that
/// occurred first when enumerating the subsets in lexicographic order.
/// At most [DEFAULT_MAX_COMBINATIONS](crate::DEFAULT_MAX_COMBINATIONS) subsets are evaluated.
///
/// * `share_set` - The share set.
pub fn reconstruct_secret(share_set: &ShareSet) -> PluralityResult<Reconstruction> {
    reconstruct_secret_with_limit(share_set, DEFAULT_MAX_COMBINATIONS)
}

/// The function reconstructs the secret by majority vote.
///
/// If the number of subsets exceeds the given limit, an error is returned before any subset
/// is evaluated.
///
/// * `share_set` - The share set.
/// * `max_combinations` - The maximum number of subsets that may be evaluated.
pub fn reconstruct_secret_with_limit(
    share_set: &ShareSet,
    max_combinations: u64,
) -> PluralityResult<Reconstruction> {
    let shares = share_set.shares();
    let k = share_set.k();
    match binomial(shares.len(), k) {
        Some(combinations) if combinations <= max_combinations => {
            debug!("Processing {} combinations.", combinations)
        }
        combinations => {
            return Err(PluralityError::TooManyCombinations {
                combinations,
                limit: max_combinations,
            })
        }
    }
    tally_combinations(shares, k)
}

/// The function interpolates every `k`-subset of the given shares and selects the secret
/// with the most votes.
///
/// Subsets that cannot be interpolated are skipped. The shares are not required to have
/// distinct x-coordinates.
///
/// * `shares` - The shares, in enumeration order.
/// * `k` - The size of the subsets.
pub(crate) fn tally_combinations(shares: &[Share], k: usize) -> PluralityResult<Reconstruction> {
    let mut tally = Tally::new();
    let mut total_combinations = 0;
    let mut skipped_combinations = 0;
    for (position, combination) in enumerate(shares.len(), k).enumerate() {
        total_combinations += 1;
        let points: Vec<(BigInt, BigInt)> = combination
            .iter()
            .map(|&index| (BigInt::from(shares[index].x), shares[index].y.clone()))
            .collect();
        match interpolate_secret(&points) {
            Ok(secret) => tally.record(secret, position),
            Err(error) => {
                debug!("Skipping combination {:?}: {}", combination, error);
                skipped_combinations += 1;
            }
        }
    }
    if tally.is_empty() {
        return Err(PluralityError::NoValidCombinations);
    }
    debug!(
        "Interpolated {} of {} combinations.",
        tally.total(),
        total_combinations
    );
    let winner = tally.winner().ok_or(PluralityError::NoValidCombinations)?;
    info!(
        "Most frequent secret: {} (appears {} times in {} combinations)",
        winner.secret, winner.count, total_combinations
    );
    Ok(Reconstruction {
        secret: winner.secret,
        votes: winner.count,
        total_combinations,
        skipped_combinations,
        tally: tally.ranking(),
    })
}

/// The function loads the share records and reconstructs the secret.
///
/// * `records` - The share records.
/// * `max_combinations` - The maximum number of subsets that may be evaluated.
pub fn reconstruct_secret_from_records(
    records: &Value,
    max_combinations: u64,
) -> PluralityResult<Reconstruction> {
    let share_set = load_share_set(records)?;
    info!(
        "Loaded {} shares (n = {}, k = {}).",
        share_set.len(),
        share_set.n(),
        share_set.k()
    );
    reconstruct_secret_with_limit(&share_set, max_combinations)
}

/// The function parses the share records from a JSON string and reconstructs the secret.
///
/// * `input` - The JSON string.
/// * `max_combinations` - The maximum number of subsets that may be evaluated.
pub fn reconstruct_secret_from_str(
    input: &str,
    max_combinations: u64,
) -> PluralityResult<Reconstruction> {
    let records: Value = serde_json::from_str(input)?;
    reconstruct_secret_from_records(&records, max_combinations)
}

/// The function reads the share records from a JSON file and reconstructs the secret.
///
/// An unreadable file results in an [IoError](crate::PluralityError::IoError), whereas
/// unparsable content results in a [MalformedInput](crate::PluralityError::MalformedInput).
///
/// * `path` - The path of the JSON file.
/// * `max_combinations` - The maximum number of subsets that may be evaluated.
pub fn reconstruct_secret_from_file<P: AsRef<Path>>(
    path: P,
    max_combinations: u64,
) -> PluralityResult<Reconstruction> {
    let input = std::fs::read_to_string(path.as_ref())?;
    debug!("Read {} bytes from {}.", input.len(), path.as_ref().display());
    reconstruct_secret_from_str(&input, max_combinations)
}

// ******************************** TESTS ********************************

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dealer::{create_share_records, SecretPolynomial};
    use rand::{seq::SliceRandom, Rng};
    use serde_json::json;

    /// The number of test runs.
    const NUM_TEST_RUNS: usize = 10;

    /// The function creates the shares `x = 1, ..., n` of the given polynomial.
    fn create_shares(polynomial: &SecretPolynomial, n: usize) -> Vec<Share> {
        (1..=n as i64)
            .map(|x| Share::new(x, polynomial.evaluate(x)))
            .collect()
    }

    #[test]
    /// The function reconstructs the secret from the shares of a line, where the fourth
    /// share is corrupted.
    fn test_corrupted_line() {
        // The shares (1,3), (2,5), (3,7) lie on the line 1 + 2x, whose value at x = 6 is 13.
        let records = json!({
            "keys": { "n": 4, "k": 3 },
            "1": { "base": "10", "value": "3" },
            "2": { "base": "10", "value": "5" },
            "3": { "base": "10", "value": "7" },
            "6": { "base": "10", "value": "14" }
        });
        let reconstruction =
            reconstruct_secret_from_records(&records, DEFAULT_MAX_COMBINATIONS).unwrap();
        assert_eq!(reconstruction.secret, BigInt::from(1));
        // The subsets with the corrupted share yield 1.1, 1.2, and 1.5, respectively.
        assert_eq!(reconstruction.votes, 3);
        assert_eq!(reconstruction.total_combinations, 4);
        assert_eq!(reconstruction.skipped_combinations, 0);
        assert_eq!(reconstruction.dissent().len(), 1);
        assert_eq!(reconstruction.dissent()[0].secret, BigInt::from(2));
        assert_eq!(reconstruction.dissent()[0].count, 1);
    }

    #[test]
    /// The function verifies that the first subset wins if every subset yields a different
    /// secret.
    fn test_tie_break_by_first_subset() {
        let polynomial = SecretPolynomial::from_coefficients(vec![
            BigInt::from(1),
            BigInt::from(2),
            BigInt::from(0),
        ]);
        let mut shares = create_shares(&polynomial, 3);
        // The correct value at x = 6 is 13.
        shares.push(Share::new(6, BigInt::from(113)));
        let share_set = ShareSet::new(4, 3, shares).unwrap();
        let reconstruction = reconstruct_secret(&share_set).unwrap();
        // The subsets yield 1, 11, 21, and 51.
        assert_eq!(reconstruction.secret, BigInt::from(1));
        assert!(reconstruction.tally.iter().all(|vote| vote.count == 1));
        assert_eq!(reconstruction.tally[0].first_position, 0);
        // A correct fourth share makes the tally unanimous.
        let share_set = ShareSet::new(4, 3, create_shares(&polynomial, 4)).unwrap();
        let reconstruction = reconstruct_secret(&share_set).unwrap();
        assert_eq!(reconstruction.secret, BigInt::from(1));
        assert_eq!(reconstruction.votes, 4);
        assert!(reconstruction.dissent().is_empty());
    }

    #[test]
    /// The function verifies that the tally is unanimous if no share is corrupted.
    fn test_unanimous_tally() {
        let mut rng = rand::thread_rng();
        for _test in 0..NUM_TEST_RUNS {
            let n = rng.gen_range(1..9);
            let k = rng.gen_range(1..=n);
            let secret = BigInt::from(rng.gen::<u64>());
            let polynomial = SecretPolynomial::new(&secret, k - 1);
            let share_set = ShareSet::new(n, k, create_shares(&polynomial, n)).unwrap();
            let reconstruction = reconstruct_secret(&share_set).unwrap();
            assert_eq!(reconstruction.secret, secret);
            assert_eq!(reconstruction.votes as u64, binomial(n, k).unwrap());
            assert_eq!(reconstruction.total_combinations, reconstruction.votes);
            assert!(reconstruction.dissent().is_empty());
        }
    }

    #[test]
    /// The function verifies that the majority is correct whenever the subsets of correct
    /// shares outnumber the subsets that contain a corrupted share.
    fn test_majority_with_corrupted_shares() {
        let mut rng = rand::thread_rng();
        let mut num_checked = 0;
        while num_checked < NUM_TEST_RUNS {
            let n = rng.gen_range(2..10);
            let k = rng.gen_range(1..n);
            let f = rng.gen_range(1..n);
            let correct = binomial(n - f, k).unwrap();
            let total = binomial(n, k).unwrap();
            if correct <= total - correct {
                continue;
            }
            num_checked += 1;
            let secret = BigInt::from(rng.gen::<u32>());
            let records = create_share_records(&secret, k, n, 36, f).unwrap();
            let share_set = load_share_set(&records).unwrap();
            let reconstruction = reconstruct_secret(&share_set).unwrap();
            assert_eq!(reconstruction.secret, secret);
            assert!(reconstruction.votes as u64 >= correct);
        }
    }

    #[test]
    /// The function verifies that the result does not depend on the order of the records.
    fn test_deterministic_result() {
        let mut rng = rand::thread_rng();
        // Every pair of shares defines a different line, so all candidates are tied.
        let mut shares = vec![
            Share::new(1, BigInt::from(11)),
            Share::new(2, BigInt::from(12)),
            Share::new(3, BigInt::from(23)),
            Share::new(4, BigInt::from(24)),
        ];
        let mut secrets = vec![];
        for _test in 0..NUM_TEST_RUNS {
            shares.shuffle(&mut rng);
            let share_set = ShareSet::new(4, 2, shares.clone()).unwrap();
            secrets.push(reconstruct_secret(&share_set).unwrap().secret);
        }
        // The subset {1,2} comes first and defines the line 10 + x.
        assert!(secrets.iter().all(|secret| *secret == BigInt::from(10)));
    }

    #[test]
    /// The function verifies that subsets with duplicate x-coordinates are skipped while
    /// the remaining subsets still determine the secret.
    fn test_skipped_combinations() {
        let shares = vec![
            Share::new(1, BigInt::from(3)),
            Share::new(2, BigInt::from(5)),
            Share::new(2, BigInt::from(5)),
            Share::new(3, BigInt::from(7)),
        ];
        let reconstruction = tally_combinations(&shares, 2).unwrap();
        assert_eq!(reconstruction.secret, BigInt::from(1));
        assert_eq!(reconstruction.total_combinations, 6);
        assert_eq!(reconstruction.skipped_combinations, 1);
        assert_eq!(reconstruction.votes, 5);
        assert!(reconstruction.dissent().is_empty());
    }

    #[test]
    /// The function verifies that an error is returned if no subset can be interpolated.
    fn test_no_valid_combinations() {
        let shares = vec![
            Share::new(4, BigInt::from(3)),
            Share::new(4, BigInt::from(5)),
            Share::new(4, BigInt::from(7)),
        ];
        assert!(matches!(
            tally_combinations(&shares, 2),
            Err(PluralityError::NoValidCombinations)
        ));
        assert!(matches!(
            tally_combinations(&shares, 3),
            Err(PluralityError::NoValidCombinations)
        ));
    }

    #[test]
    /// The function verifies that the number of combinations is bounded.
    fn test_combination_limit() {
        let polynomial = SecretPolynomial::new(&BigInt::from(5), 2);
        let share_set = ShareSet::new(10, 3, create_shares(&polynomial, 10)).unwrap();
        assert!(matches!(
            reconstruct_secret_with_limit(&share_set, 119),
            Err(PluralityError::TooManyCombinations {
                combinations: Some(120),
                limit: 119
            })
        ));
        let reconstruction = reconstruct_secret_with_limit(&share_set, 120).unwrap();
        assert_eq!(reconstruction.secret, BigInt::from(5));
    }

    #[test]
    /// The function verifies that the error kinds of the input handling are distinguishable.
    fn test_input_errors() {
        assert!(matches!(
            reconstruct_secret_from_str("{ not json", DEFAULT_MAX_COMBINATIONS),
            Err(PluralityError::MalformedInput(_))
        ));
        assert!(matches!(
            reconstruct_secret_from_str(r#"{"keys": {"n": 2, "k": 3}}"#, DEFAULT_MAX_COMBINATIONS),
            Err(PluralityError::InvalidThreshold(_))
        ));
        assert!(matches!(
            reconstruct_secret_from_str(
                r#"{"keys": {"n": 2, "k": 2}, "1": "sum(1, 2)"}"#,
                DEFAULT_MAX_COMBINATIONS
            ),
            Err(PluralityError::InsufficientShares {
                found: 1,
                required: 2
            })
        ));
        assert!(matches!(
            reconstruct_secret_from_file("/nonexistent/plurality.json", DEFAULT_MAX_COMBINATIONS),
            Err(PluralityError::IoError(_))
        ));
    }

    #[test]
    /// The function reads the share records from a file.
    fn test_reconstruct_secret_from_file() {
        let records = create_share_records(&BigInt::from(123_456), 2, 4, 7, 0).unwrap();
        let path = std::env::temp_dir().join(format!(
            "plurality-test-{}.json",
            rand::thread_rng().gen::<u64>()
        ));
        std::fs::write(&path, records.to_string()).unwrap();
        let reconstruction = reconstruct_secret_from_file(&path, DEFAULT_MAX_COMBINATIONS);
        std::fs::remove_file(&path).unwrap();
        let reconstruction = reconstruction.unwrap();
        assert_eq!(reconstruction.secret, BigInt::from(123_456));
        assert_eq!(reconstruction.votes, 6);
    }
}
