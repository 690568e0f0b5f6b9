//! Tuning: the resolved pitch structure behind a descriptor.
//!
//! A tuning is either an equal division of some interval (`19ed2`, `13ed3`)
//! or a z-limit just intonation (`7-limit`), whose ratios are enumerated
//! once, canonicalized into a single octave, and never mutated afterwards.

use num_rational::Ratio;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::XenboardError;

/// Largest accepted z-limit. Enumeration is quadratic in the limit.
pub const MAX_LIMIT: u64 = 1023;

/// Largest accepted number of equal divisions.
pub const MAX_DIVISIONS: u64 = 65_536;

/// A resolved tuning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Tuning {
    /// `divisions` equal logarithmic steps of `interval` (2.0 = octave).
    EqualDivision { divisions: u32, interval: f64 },
    /// Octave-reduced ratios whose odd prime factors are all `<= limit`,
    /// strictly increasing, starting at unison.
    JustIntonation { limit: u32, ratios: Vec<JustRatio> },
}

/// One just-intonation ratio: the exact lowest-terms fraction and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JustRatio {
    pub fraction: Ratio<u64>,
    pub value: f64,
}

impl JustRatio {
    pub fn new(fraction: Ratio<u64>) -> Self {
        JustRatio {
            fraction,
            value: *fraction.numer() as f64 / *fraction.denom() as f64,
        }
    }
}

impl fmt::Display for JustRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.fraction.numer(), self.fraction.denom())
    }
}

impl Default for Tuning {
    /// Twelve-tone equal division of the octave.
    fn default() -> Self {
        Tuning::EqualDivision {
            divisions: 12,
            interval: 2.0,
        }
    }
}

impl Tuning {
    /// Equal division of `interval` into `divisions` steps, or `None` if either
    /// is not positive or `divisions` exceeds [`MAX_DIVISIONS`].
    pub fn equal_division(divisions: u32, interval: f64) -> Option<Self> {
        (divisions > 0 && u64::from(divisions) <= MAX_DIVISIONS && interval.is_finite() && interval > 0.0)
            .then_some(Tuning::EqualDivision { divisions, interval })
    }

    /// z-limit just intonation, or `None` unless `limit` is odd, at least 3
    /// and at most [`MAX_LIMIT`].
    pub fn z_limit(limit: u32) -> Option<Self> {
        (limit >= 3 && limit % 2 == 1 && u64::from(limit) <= MAX_LIMIT).then(|| Tuning::JustIntonation {
            limit,
            ratios: generate_z_limit_ratios(limit),
        })
    }

    /// Number of distinct steps before the step table repeats.
    pub fn steps_per_period(&self) -> usize {
        match self {
            Tuning::EqualDivision { divisions, .. } => *divisions as usize,
            Tuning::JustIntonation { ratios, .. } => ratios.len(),
        }
    }

    /// Ratio of each step of one period relative to the first.
    pub fn step_ratios(&self) -> Vec<f64> {
        match self {
            Tuning::EqualDivision { divisions, interval } => equal_division_ratios(*divisions, *interval),
            Tuning::JustIntonation { ratios, .. } => ratios.iter().map(|r| r.value).collect(),
        }
    }
}

impl fmt::Display for Tuning {
    /// The canonical descriptor, which parses back to the same tuning.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tuning::EqualDivision { divisions, interval } => write!(f, "{divisions}ed{interval}"),
            Tuning::JustIntonation { limit, .. } => write!(f, "{limit}-limit"),
        }
    }
}

impl FromStr for Tuning {
    type Err = XenboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse_tuning(s)
    }
}

/// Serde adapter that stores a tuning as its descriptor string.
pub mod descriptor {
    use super::Tuning;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tuning: &Tuning, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(tuning)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tuning, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ── Number theory ───────────────────────────────────────────

/// Euclid's algorithm. `gcd(0, n) == n`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Prime factors of `n` in ascending order, with multiplicity.
pub fn prime_factors(n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }
    let mut x = n;
    let mut i = 2;
    while i * i <= x {
        while x % i == 0 {
            factors.push(i);
            x /= i;
        }
        i += 1;
    }
    if x > 1 {
        factors.push(x);
    }
    factors
}

pub fn largest_prime_factor(n: u64) -> Option<u64> {
    prime_factors(n).last().copied()
}

/// Whether `n`, ignoring factors of two, belongs to the `z`-limit.
pub fn allowed_factors(n: u64, z: u64) -> bool {
    if n == 0 {
        return false;
    }
    let odd = n >> n.trailing_zeros();
    largest_prime_factor(odd).is_none_or(|p| p <= z)
}

// ── Octave reduction ────────────────────────────────────────

/// Rescale `r` by powers of two into `[1, 2)`. `None` for non-positive or
/// non-finite input.
pub fn octave_reduce(r: f64) -> Option<f64> {
    if !r.is_finite() || r <= 0.0 {
        return None;
    }
    let mut r = r;
    while r < 1.0 {
        r *= 2.0;
    }
    while r >= 2.0 {
        r /= 2.0;
    }
    Some(r)
}

/// Exact octave reduction of a fraction into `[1, 2)`. `None` for zero.
pub fn octave_reduce_fraction(r: Ratio<u64>) -> Option<Ratio<u64>> {
    let (mut numer, mut denom) = (*r.numer(), *r.denom());
    if numer == 0 {
        return None;
    }
    while numer < denom {
        numer *= 2;
    }
    while numer >= denom * 2 {
        denom *= 2;
    }
    Some(Ratio::new(numer, denom))
}

// ── Step tables ─────────────────────────────────────────────

/// Every canonical ratio in `[1, 2)` built from odd numerators and
/// denominators in `[1, z]` within the `z`-limit, ascending and free of
/// duplicates. Unison is always present.
pub fn generate_z_limit_ratios(z: u32) -> Vec<JustRatio> {
    let z = u64::from(z);
    let candidates: Vec<u64> = (1..=z).step_by(2).filter(|&n| allowed_factors(n, z)).collect();

    let mut set: BTreeSet<Ratio<u64>> = BTreeSet::from([Ratio::from_integer(1)]);
    for &num in &candidates {
        for &den in &candidates {
            let g = gcd(num, den);
            if let Some(r) = octave_reduce_fraction(Ratio::new_raw(num / g, den / g)) {
                set.insert(r);
            }
        }
    }

    log::debug!("{z}-limit: {} ratios from {} candidates", set.len(), candidates.len());
    set.into_iter().map(JustRatio::new).collect()
}

/// `interval^(i / divisions)` for each step `i` of one period.
pub fn equal_division_ratios(divisions: u32, interval: f64) -> Vec<f64> {
    let divisions = divisions.max(1);
    (0..divisions)
        .map(|i| interval.powf(f64::from(i) / f64::from(divisions)))
        .collect()
}
