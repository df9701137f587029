//! Payload type carried between modules
//!
//! A [`Payload`] is an ordered, finite list of integers. It is moved into a
//! queue by value; the generator clones it once per output queue so no two
//! queues ever share the same allocation.
//!
//! # Main Types
//!
//! - [`Payload`] - The integer list with its `{a, b, c}` display form
//!
//! # Value Range
//!
//! Generated payloads draw every element independently and uniformly from
//! [`MIN_VALUE`]`..=`[`MAX_VALUE`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest value a generated element can take
pub const MIN_VALUE: i32 = 1;

/// Largest value a generated element can take
pub const MAX_VALUE: i32 = 1000;

/// Ordered list of integers moved between queues
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Vec<i32>);

impl Payload {
    /// Create a payload from existing values
    pub fn new(values: Vec<i32>) -> Self {
        Self(values)
    }

    /// Generate a payload of `len` values drawn uniformly from `[1, 1000]`
    pub fn random(len: usize) -> Self {
        Self::random_with(&mut rand::rng(), len)
    }

    /// Generate a payload using the given RNG
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        Self(
            (0..len)
                .map(|_| rng.random_range(MIN_VALUE..=MAX_VALUE))
                .collect(),
        )
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload holds no elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the elements
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    /// Reverse the element order in place
    pub fn reverse(&mut self) {
        self.0.reverse();
    }

    /// Return a reversed copy: `out[i] == self[n - 1 - i]`
    pub fn reversed(&self) -> Self {
        let mut copy = self.clone();
        copy.reverse();
        copy
    }

    /// Whether `other` holds exactly this payload's elements in reverse order
    pub fn is_reverse_of(&self, other: &Payload) -> bool {
        self.len() == other.len() && self.0.iter().eq(other.0.iter().rev())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("}")
    }
}
