//! The `tally` module counts how often each candidate secret occurs and selects the majority.
//!

use num_bigint::BigInt;
use std::collections::HashMap;
use std::fmt;

/// This struct holds the number of combinations that produced a candidate secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    /// The candidate secret.
    pub secret: BigInt,
    /// The number of combinations that produced the secret.
    pub count: usize,
    /// The enumeration position of the first combination that produced the secret.
    pub first_position: usize,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} votes)", self.secret, self.count)
    }
}

/// This struct is the tally table mapping candidate secrets to their votes.
#[derive(Debug, Default)]
pub struct Tally {
    /// The count and first enumeration position per candidate secret.
    entries: HashMap<BigInt, (usize, usize)>,
    /// The total number of recorded votes.
    total: usize,
}

impl Tally {
    /// The function creates an empty tally.
    pub fn new() -> Self {
        Tally::default()
    }

    /// The function records a vote for the given secret.
    ///
    /// * `secret` - The candidate secret.
    /// * `position` - The enumeration position of the combination that produced the secret.
    pub fn record(&mut self, secret: BigInt, position: usize) {
        let entry = self.entries.entry(secret).or_insert((0, position));
        entry.0 += 1;
        entry.1 = entry.1.min(position);
        self.total += 1;
    }

    /// The function returns the total number of recorded votes.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The function returns true if no vote has been recorded.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The function returns all candidates, ordered from the most to the least votes.
    ///
    /// Candidates with the same number of votes are ordered by their first enumeration
    /// position, which makes the order independent of the hash map iteration order.
    pub fn ranking(&self) -> Vec<Vote> {
        let mut votes: Vec<Vote> = self
            .entries
            .iter()
            .map(|(secret, &(count, first_position))| Vote {
                secret: secret.clone(),
                count,
                first_position,
            })
            .collect();
        votes.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(a.first_position.cmp(&b.first_position))
        });
        votes
    }

    /// The function returns the candidate with the most votes, if any.
    ///
    /// Ties are broken in favor of the candidate that was observed first.
    pub fn winner(&self) -> Option<Vote> {
        self.entries
            .iter()
            .min_by(|(_, a), (_, b)| b.0.cmp(&a.0).then(a.1.cmp(&b.1)))
            .map(|(secret, &(count, first_position))| Vote {
                secret: secret.clone(),
                count,
                first_position,
            })
    }
}

// ******************************** TESTS ********************************
