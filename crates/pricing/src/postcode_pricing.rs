use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use bookwise_core::{DomainError, DomainResult, Money, Postcode, ValueObject};

/// Largest accepted price multiplier.
pub const MAX_MULTIPLIER: Decimal = dec!(3.0);

/// Location-based price adjustment, matched on postcode area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PostcodePricingRepr", into = "PostcodePricingRepr")]
pub struct PostcodePricing {
    postcode: Postcode,
    multiplier: Decimal,
    fixed_adjustment: Decimal,
}

#[derive(Serialize, Deserialize)]
struct PostcodePricingRepr {
    postcode: Postcode,
    multiplier: Decimal,
    fixed_adjustment: Decimal,
}

impl TryFrom<PostcodePricingRepr> for PostcodePricing {
    type Error = DomainError;

    fn try_from(repr: PostcodePricingRepr) -> Result<Self, Self::Error> {
        PostcodePricing::new(repr.postcode, repr.multiplier, repr.fixed_adjustment)
    }
}

impl From<PostcodePricing> for PostcodePricingRepr {
    fn from(p: PostcodePricing) -> Self {
        Self {
            postcode: p.postcode,
            multiplier: p.multiplier,
            fixed_adjustment: p.fixed_adjustment,
        }
    }
}

impl ValueObject for PostcodePricing {}

impl PostcodePricing {
    /// Fails with `InvalidMultiplier` unless `0 <= multiplier <= 3.0`.
    /// The fixed adjustment may have either sign.
    pub fn new(postcode: Postcode, multiplier: Decimal, fixed_adjustment: Decimal) -> DomainResult<Self> {
        if multiplier < Decimal::ZERO || multiplier > MAX_MULTIPLIER {
            return Err(DomainError::InvalidMultiplier(multiplier));
        }
        Ok(Self {
            postcode,
            multiplier,
            fixed_adjustment,
        })
    }

    pub fn postcode(&self) -> &Postcode {
        &self.postcode
    }

    pub fn area(&self) -> &str {
        self.postcode.area()
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    pub fn fixed_adjustment(&self) -> Decimal {
        self.fixed_adjustment
    }

    pub fn applies_to(&self, postcode: &Postcode) -> bool {
        self.postcode.same_area(postcode)
    }

    /// `base × multiplier + fixed_adjustment`, floored at zero, in the base
    /// price's currency.
    pub fn adjust(&self, base: &Money) -> DomainResult<Money> {
        let adjusted = base
            .amount()
            .checked_mul(self.multiplier)
            .and_then(|scaled| scaled.checked_add(self.fixed_adjustment))
            .ok_or_else(|| DomainError::invariant("adjusted price overflow"))?;
        Ok(Money::saturating(adjusted, base.currency()))
    }
}
