//! Postal code normalization and geographic keys.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Shortest accepted normalized postcode.
pub const MIN_POSTCODE_LEN: usize = 5;
/// Longest accepted normalized postcode.
pub const MAX_POSTCODE_LEN: usize = 8;
/// Length of the inward part (the trailing "digit letter letter" block).
pub const INWARD_LEN: usize = 3;

const AREA_LEN: usize = 2;
const DISTRICT_LEN: usize = 4;

/// A normalized postal code.
///
/// Normalization strips every whitespace character and uppercases ASCII
/// letters. The coarser keys are positional prefixes of the normalized
/// value, derived once at construction:
///
/// | key        | rule                                             |
/// |------------|--------------------------------------------------|
/// | `area`     | first ≤2 characters                              |
/// | `district` | first ≤4 characters                              |
/// | `sector`   | district + leading digit of the inward part      |
///
/// Equality is by normalized value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Postcode {
    value: String,
    area: String,
    district: String,
    sector: String,
}

impl ValueObject for Postcode {}

impl Postcode {
    pub fn create(raw: &str) -> DomainResult<Self> {
        if raw.trim().is_empty() {
            return Err(DomainError::EmptyPostcode);
        }

        let value: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        // Prefix slicing below is byte-based; only ASCII codes are accepted.
        let len = value.chars().count();
        if !(MIN_POSTCODE_LEN..=MAX_POSTCODE_LEN).contains(&len) || !value.is_ascii() {
            return Err(DomainError::InvalidFormat(raw.to_string()));
        }

        let area = value[..AREA_LEN.min(len)].to_string();
        let district = value[..DISTRICT_LEN.min(len)].to_string();

        let mut sector = district.clone();
        match value[len - INWARD_LEN..].chars().next() {
            Some(lead) if lead.is_ascii_digit() => sector.push(lead),
            _ => {}
        }

        Ok(Self {
            value,
            area,
            district,
            sector,
        })
    }

    /// Full normalized value, e.g. `SW1A1AA`.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn district(&self) -> &str {
        &self.district
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    /// Everything before the inward part.
    pub fn outward(&self) -> &str {
        &self.value[..self.value.len() - INWARD_LEN]
    }

    /// The trailing three characters.
    pub fn inward(&self) -> &str {
        &self.value[self.value.len() - INWARD_LEN..]
    }

    pub fn same_area(&self, other: &Postcode) -> bool {
        self.area == other.area
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.outward(), self.inward())
    }
}

impl FromStr for Postcode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Postcode::create(s)
    }
}

impl TryFrom<String> for Postcode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Postcode::create(&value)
    }
}

impl From<Postcode> for String {
    fn from(postcode: Postcode) -> Self {
        postcode.value
    }
}
