//! Recognition tiers and character-capacity buckets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected character capacity of a detected line, as predicted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharCapacityBucket {
    /// Short line, first read by the 30-character tier.
    Tiny,
    /// Medium line, first read by the 50-character tier.
    Medium,
    /// Long line, read by the 100-character tier.
    Large,
}

/// A capacity tier of the recognition cascade, each bound to its own recognizer.
///
/// Tiers are ordered from the smallest to the largest capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// 30-character recognizer.
    Chars30,
    /// 50-character recognizer.
    Chars50,
    /// 100-character recognizer.
    Chars100,
}

impl Tier {
    /// All tiers in cascade order.
    pub const ALL: [Tier; 3] = [Tier::Chars30, Tier::Chars50, Tier::Chars100];

    /// The tier a line of `bucket` starts in.
    pub fn for_bucket(bucket: CharCapacityBucket) -> Self {
        match bucket {
            CharCapacityBucket::Tiny => Tier::Chars30,
            CharCapacityBucket::Medium => Tier::Chars50,
            CharCapacityBucket::Large => Tier::Chars100,
        }
    }

    /// The tier over-length results are promoted to, `None` for the last tier.
    pub fn next(self) -> Option<Self> {
        match self {
            Tier::Chars30 => Some(Tier::Chars50),
            Tier::Chars50 => Some(Tier::Chars100),
            Tier::Chars100 => None,
        }
    }

    /// Nominal character capacity of the tier's recognizer.
    pub fn capacity(self) -> usize {
        match self {
            Tier::Chars30 => 30,
            Tier::Chars50 => 50,
            Tier::Chars100 => 100,
        }
    }

    /// Position of the tier in [`Tier::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-char", self.capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_chain() {
        assert_eq!(Tier::Chars30.next(), Some(Tier::Chars50));
        assert_eq!(Tier::Chars50.next(), Some(Tier::Chars100));
        assert_eq!(Tier::Chars100.next(), None);
        assert!(Tier::Chars30 < Tier::Chars100);
        assert_eq!(Tier::Chars50.index(), 1);
    }

    #[test]
    fn test_tier_for_bucket() {
        assert_eq!(Tier::for_bucket(CharCapacityBucket::Tiny), Tier::Chars30);
        assert_eq!(Tier::for_bucket(CharCapacityBucket::Medium), Tier::Chars50);
        assert_eq!(Tier::for_bucket(CharCapacityBucket::Large), Tier::Chars100);
        assert_eq!(Tier::Chars100.to_string(), "100-char");
    }
}
