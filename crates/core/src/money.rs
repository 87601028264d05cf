//! Currency-tagged, fixed-point monetary amounts.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// ISO currency codes accepted by [`Money`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    GBP,
    USD,
    EUR,
    JPY,
    CAD,
    AUD,
    CHF,
    CNY,
    INR,
    TRY,
}

impl Currency {
    /// The allow-list, in declaration order.
    pub const ALL: [Currency; 10] = [
        Currency::GBP,
        Currency::USD,
        Currency::EUR,
        Currency::JPY,
        Currency::CAD,
        Currency::AUD,
        Currency::CHF,
        Currency::CNY,
        Currency::INR,
        Currency::TRY,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::GBP => "GBP",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::TRY => "TRY",
        }
    }

    /// Number of decimal places in the currency's minor unit.
    pub fn minor_units(self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    /// Accepts any casing and surrounding whitespace; the code itself must be
    /// exactly three ASCII letters and on the allow-list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(s.to_string()));
        }
        let code = code.to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| DomainError::InvalidCurrency(s.to_string()))
    }
}

/// Immutable monetary amount. The amount is never negative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr", into = "MoneyRepr")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

#[derive(Serialize, Deserialize)]
struct MoneyRepr {
    amount: Decimal,
    currency: String,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = DomainError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        Money::create(repr.amount, &repr.currency)
    }
}

impl From<Money> for MoneyRepr {
    fn from(money: Money) -> Self {
        Self {
            amount: money.amount,
            currency: money.currency.code().to_string(),
        }
    }
}

impl ValueObject for Money {}

impl Money {
    /// Validating factory taking a raw currency code.
    pub fn create(amount: Decimal, currency: &str) -> DomainResult<Self> {
        let currency = currency.parse::<Currency>()?;
        Self::new(amount, currency)
    }

    pub fn new(amount: Decimal, currency: Currency) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::InvalidAmount(amount));
        }
        Ok(Self { amount, currency })
    }

    /// Shorthand for the default currency.
    pub fn gbp(amount: Decimal) -> DomainResult<Self> {
        Self::new(amount, Currency::GBP)
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Builds a value from a possibly negative amount, flooring it at zero.
    pub fn saturating(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.max(Decimal::ZERO),
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::invariant("money addition overflow"))?;
        Money::new(amount, self.currency)
    }

    /// Fails with `InvalidAmount` when the result would be negative.
    pub fn subtract(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| DomainError::invariant("money subtraction overflow"))?;
        Money::new(amount, self.currency)
    }

    pub fn multiply(&self, factor: Decimal) -> DomainResult<Money> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(DomainError::InvalidFactor(factor));
        }
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| DomainError::invariant("money multiplication overflow"))?;
        Money::new(amount, self.currency)
    }

    pub fn divide(&self, divisor: Decimal) -> DomainResult<Money> {
        if divisor <= Decimal::ZERO {
            return Err(DomainError::InvalidDivisor(divisor));
        }
        let amount = self
            .amount
            .checked_div(divisor)
            .ok_or_else(|| DomainError::invariant("money division overflow"))?;
        Money::new(amount, self.currency)
    }

    /// Ordering between two amounts of the same currency.
    pub fn compare(&self, other: &Money) -> DomainResult<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    pub fn is_greater_than(&self, other: &Money) -> DomainResult<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn is_less_than(&self, other: &Money) -> DomainResult<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn is_at_least(&self, other: &Money) -> DomainResult<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    /// Rounds to the currency's minor unit, midpoints away from zero.
    pub fn round_to_minor_units(&self) -> Money {
        Money {
            amount: self.amount.round_dp_with_strategy(
                self.currency.minor_units(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }

    /// Sums amounts that must all be in `currency`. An empty input sums to zero.
    pub fn sum<I>(items: I, currency: Currency) -> DomainResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        items
            .into_iter()
            .try_fold(Money::zero(currency), |acc, item| acc.add(&item))
    }

    fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::currency_mismatch(
                self.currency.code(),
                other.currency.code(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
