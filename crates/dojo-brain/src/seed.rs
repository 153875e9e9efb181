use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for deterministic initialization, mutation, and shuffling.
///
/// A 128-bit (16-byte) seed backing the crate's generator. Using the same
/// seed with the same reward and sensor inputs reproduces a training run
/// exactly, enabling:
///
/// - Reproducible generation outcomes for debugging
/// - Deterministic testing
/// - Sharing a run by quoting one hex string
///
/// # Example
///
/// ```
/// use dojo_brain::{Network, Seed, Topology};
/// use rand::Rng as _;
///
/// let seed: Seed = rand::rng().random();
/// let topology = Topology::new(vec![3, 5, 6]).unwrap();
///
/// // Two networks built from the same seed are identical.
/// let a = Network::random(topology.clone(), &mut seed.rng());
/// let b = Network::random(topology, &mut seed.rng());
/// assert_eq!(a.weights(), b.weights());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; 16]);

impl Seed {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates the deterministic generator this seed describes.
    #[must_use]
    pub fn rng(self) -> Pcg64Mcg {
        Pcg64Mcg::from_seed(self.0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = u128::from_be_bytes(self.0);
        write!(f, "{num:032x}")
    }
}

impl FromStr for Seed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // from_str_radix also accepts a leading `+`, which is not hex.
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseSeedError { len: s.len() });
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseSeedError { len: s.len() })?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// A seed string that is not 32 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed: expected 32 hex characters, got {len}")]
pub struct ParseSeedError {
    pub len: usize,
}

impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str
            .parse()
            .map_err(|e: ParseSeedError| serde::de::Error::custom(format!("{e}: {hex_str:?}")))
    }
}

/// Allows generating random `Seed` values with `rng.random()`.
impl Distribution<Seed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Seed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        Seed(seed)
    }
}
