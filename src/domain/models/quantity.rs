use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Arbitrary precision token amount in the chain's smallest denomination
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(BigUint);

impl Quantity {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

impl From<BigUint> for Quantity {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl FromStr for Quantity {
    type Err = num_bigint::ParseBigIntError;

    /// Parses a base-10 integer
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Quantity::from_str(&raw)
            .map_err(|e| serde::de::Error::custom(format!("invalid quantity '{}': {}", raw, e)))
    }
}
