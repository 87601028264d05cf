use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use bookwise_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Event, ExpectedVersion, Money,
};

bookwise_core::aggregate_id_newtype!(
    /// Promotion identifier.
    PromotionId
);

/// How a promotion reduces an order total.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percent of the order total, in `(0, 100]`.
    Percentage(Decimal),
    /// Flat amount in the order's currency, capped at the order total.
    FixedAmount(Decimal),
}

impl Discount {
    fn validate(self) -> DomainResult<Self> {
        match self {
            Discount::Percentage(p) if p <= Decimal::ZERO || p > dec!(100) => Err(
                DomainError::validation("percentage discount must be in (0, 100]"),
            ),
            Discount::FixedAmount(v) if v <= Decimal::ZERO => Err(DomainError::validation(
                "fixed discount must be positive",
            )),
            valid => Ok(valid),
        }
    }

    /// Discount for `order_total`; never larger than the total itself.
    pub fn amount_off(self, order_total: &Money) -> DomainResult<Money> {
        match self {
            Discount::Percentage(p) => order_total.multiply(p / dec!(100)),
            Discount::FixedAmount(v) => {
                Money::new(v.min(order_total.amount()), order_total.currency())
            }
        }
    }
}

/// Terms of a new promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPromotion {
    pub code: String,
    pub discount: Discount,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    /// 0 means unlimited.
    pub usage_limit: u32,
    /// A zero amount means no minimum.
    pub minimum_order: Money,
}

/// Result of pricing an order against a promotion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountQuote {
    pub discount: Money,
    pub discounted_total: Money,
    /// Usage count the promotion will have once this quote is redeemed.
    pub new_used_count: u32,
}

/// Aggregate root: Promotion.
///
/// `used_count` only grows, one step per successful redemption, and stays at
/// or below `usage_limit` when a limit is set. The aggregate `version` is the
/// optimistic-concurrency token for redemptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    id: PromotionId,
    code: String,
    discount: Discount,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    usage_limit: u32,
    used_count: u32,
    minimum_order: Money,
    is_active: bool,
    version: u64,
}

impl Promotion {
    /// Validates the terms and returns an active promotion with no uses.
    pub fn create(id: PromotionId, terms: NewPromotion) -> DomainResult<Self> {
        let code = terms.code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(DomainError::validation("promotion code cannot be empty"));
        }
        let discount = terms.discount.validate()?;
        if terms.valid_from > terms.valid_to {
            return Err(DomainError::validation(
                "promotion valid_from must not be after valid_to",
            ));
        }

        Ok(Self {
            id,
            code,
            discount,
            valid_from: terms.valid_from,
            valid_to: terms.valid_to,
            usage_limit: terms.usage_limit,
            used_count: 0,
            minimum_order: terms.minimum_order,
            is_active: true,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> PromotionId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_to(&self) -> DateTime<Utc> {
        self.valid_to
    }

    pub fn usage_limit(&self) -> u32 {
        self.usage_limit
    }

    pub fn used_count(&self) -> u32 {
        self.used_count
    }

    pub fn minimum_order(&self) -> Money {
        self.minimum_order
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Pure discount computation; checks run in the order inactive,
    /// validity window, usage limit, minimum order.
    pub fn quote(&self, order_total: &Money, now: DateTime<Utc>) -> DomainResult<DiscountQuote> {
        if !self.is_active {
            return Err(DomainError::PromotionInactive);
        }
        if now < self.valid_from {
            return Err(DomainError::PromotionNotYetValid);
        }
        if now > self.valid_to {
            return Err(DomainError::PromotionExpired);
        }
        if self.usage_limit > 0 && self.used_count >= self.usage_limit {
            return Err(DomainError::UsageLimitReached);
        }
        if !self.minimum_order.is_zero() && order_total.is_less_than(&self.minimum_order)? {
            return Err(DomainError::BelowMinimumOrder {
                minimum: self.minimum_order.amount(),
            });
        }

        let discount = self.discount.amount_off(order_total)?;
        let discounted_total = order_total.subtract(&discount)?;
        let new_used_count = self
            .used_count
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("promotion usage count overflow"))?;

        Ok(DiscountQuote {
            discount,
            discounted_total,
            new_used_count,
        })
    }

    /// Redeems the promotion against `order_total`, consuming one use.
    pub fn redeem(
        &mut self,
        order_total: &Money,
        now: DateTime<Utc>,
        expected_version: ExpectedVersion,
    ) -> DomainResult<DiscountQuote> {
        let events = self.execute(&PromotionCommand::Redeem(RedeemPromotion {
            order_total: *order_total,
            now,
            expected_version,
        }))?;
        match events.into_iter().next() {
            Some(PromotionEvent::Redeemed(e)) => Ok(DiscountQuote {
                discount: e.discount,
                discounted_total: e.discounted_total,
                new_used_count: e.new_used_count,
            }),
            _ => Err(DomainError::invariant("redemption emitted no event")),
        }
    }

    /// Discounted order total; increments `used_count` only on success.
    pub fn apply_discount(&mut self, order_total: &Money, now: DateTime<Utc>) -> DomainResult<Money> {
        self.redeem(order_total, now, ExpectedVersion::Any)
            .map(|quote| quote.discounted_total)
    }

    pub fn activate(&mut self) -> DomainResult<()> {
        self.execute(&PromotionCommand::Activate).map(drop)
    }

    pub fn deactivate(&mut self) -> DomainResult<()> {
        self.execute(&PromotionCommand::Deactivate).map(drop)
    }
}

impl AggregateRoot for Promotion {
    type Id = PromotionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RedeemPromotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemPromotion {
    pub order_total: Money,
    pub now: DateTime<Utc>,
    pub expected_version: ExpectedVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionCommand {
    Redeem(RedeemPromotion),
    Activate,
    Deactivate,
}

/// Event: PromotionRedeemed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRedeemed {
    pub promotion_id: PromotionId,
    pub order_total: Money,
    pub discount: Money,
    pub discounted_total: Money,
    pub new_used_count: u32,
    pub redeemed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionEvent {
    Redeemed(PromotionRedeemed),
    Activated { promotion_id: PromotionId },
    Deactivated { promotion_id: PromotionId },
}

impl Event for PromotionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PromotionEvent::Redeemed(_) => "promotions.promotion.redeemed",
            PromotionEvent::Activated { .. } => "promotions.promotion.activated",
            PromotionEvent::Deactivated { .. } => "promotions.promotion.deactivated",
        }
    }
}

impl Aggregate for Promotion {
    type Command = PromotionCommand;
    type Event = PromotionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PromotionEvent::Redeemed(e) => {
                self.used_count = e.new_used_count;
                tracing::info!(
                    promotion_id = %self.id,
                    code = %self.code,
                    discount = %e.discount,
                    used_count = self.used_count,
                    "promotion redeemed"
                );
            }
            PromotionEvent::Activated { .. } => self.is_active = true,
            PromotionEvent::Deactivated { .. } => self.is_active = false,
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let promotion_id = self.id;
        match command {
            PromotionCommand::Redeem(cmd) => {
                cmd.expected_version.check(self.version)?;
                let quote = self.quote(&cmd.order_total, cmd.now)?;
                Ok(vec![PromotionEvent::Redeemed(PromotionRedeemed {
                    promotion_id,
                    order_total: cmd.order_total,
                    discount: quote.discount,
                    discounted_total: quote.discounted_total,
                    new_used_count: quote.new_used_count,
                    redeemed_at: cmd.now,
                })])
            }
            PromotionCommand::Activate => {
                if self.is_active {
                    return Err(DomainError::conflict("promotion is already active"));
                }
                Ok(vec![PromotionEvent::Activated { promotion_id }])
            }
            PromotionCommand::Deactivate => {
                if !self.is_active {
                    return Err(DomainError::conflict("promotion is already inactive"));
                }
                Ok(vec![PromotionEvent::Deactivated { promotion_id }])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookwise_core::Currency;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn gbp(amount: Decimal) -> Money {
        Money::gbp(amount).unwrap()
    }

    fn terms(discount: Discount, usage_limit: u32) -> NewPromotion {
        NewPromotion {
            code: " summer10 ".to_string(),
            discount,
            valid_from: now() - Duration::days(30),
            valid_to: now() + Duration::days(30),
            usage_limit,
            minimum_order: Money::zero(Currency::GBP),
        }
    }

    fn ten_percent(usage_limit: u32) -> Promotion {
        Promotion::create(
            PromotionId::generate(),
            terms(Discount::Percentage(dec!(10)), usage_limit),
        )
        .unwrap()
    }

    #[test]
    fn create_normalizes_code() {
        assert_eq!(ten_percent(0).code(), "SUMMER10");
    }

    #[test]
    fn create_validates_terms() {
        let id = PromotionId::generate();
        let mut bad = terms(Discount::Percentage(dec!(10)), 0);
        bad.code = "   ".to_string();
        assert!(matches!(Promotion::create(id, bad), Err(DomainError::Validation(_))));

        for discount in [
            Discount::Percentage(Decimal::ZERO),
            Discount::Percentage(dec!(100.01)),
            Discount::FixedAmount(Decimal::ZERO),
        ] {
            assert!(matches!(
                Promotion::create(id, terms(discount, 0)),
                Err(DomainError::Validation(_))
            ));
        }

        let mut inverted = terms(Discount::Percentage(dec!(10)), 0);
        inverted.valid_to = inverted.valid_from - Duration::seconds(1);
        assert!(matches!(Promotion::create(id, inverted), Err(DomainError::Validation(_))));
    }

    #[test]
    fn ten_percent_off_two_hundred() {
        let mut promo = ten_percent(0);
        let total = promo.apply_discount(&gbp(dec!(200)), now()).unwrap();
        assert_eq!(total, gbp(dec!(180)));
        assert_eq!(promo.used_count(), 1);
    }

    #[test]
    fn usage_limit_is_enforced_without_counting_failures() {
        let mut promo = ten_percent(2);
        promo.apply_discount(&gbp(dec!(200)), now()).unwrap();
        promo.apply_discount(&gbp(dec!(200)), now()).unwrap();
        assert_eq!(promo.used_count(), 2);

        let err = promo.apply_discount(&gbp(dec!(200)), now()).unwrap_err();
        assert_eq!(err, DomainError::UsageLimitReached);
        assert_eq!(promo.used_count(), 2);
    }

    #[test]
    fn validity_window_is_inclusive() {
        let promo = ten_percent(0);
        assert!(promo.quote(&gbp(dec!(10)), promo.valid_from()).is_ok());
        assert!(promo.quote(&gbp(dec!(10)), promo.valid_to()).is_ok());
        assert_eq!(
            promo.quote(&gbp(dec!(10)), promo.valid_from() - Duration::seconds(1)),
            Err(DomainError::PromotionNotYetValid)
        );
        assert_eq!(
            promo.quote(&gbp(dec!(10)), promo.valid_to() + Duration::seconds(1)),
            Err(DomainError::PromotionExpired)
        );
    }

    #[test]
    fn inactive_promotion_is_rejected_first() {
        let mut promo = ten_percent(0);
        promo.deactivate().unwrap();
        let after_expiry = promo.valid_to() + Duration::days(1);
        assert_eq!(
            promo.apply_discount(&gbp(dec!(200)), after_expiry),
            Err(DomainError::PromotionInactive)
        );
        assert_eq!(promo.used_count(), 0);

        promo.activate().unwrap();
        assert!(promo.apply_discount(&gbp(dec!(200)), now()).is_ok());
    }

    #[test]
    fn minimum_order_is_enforced() {
        let mut t = terms(Discount::Percentage(dec!(10)), 0);
        t.minimum_order = gbp(dec!(50));
        let mut promo = Promotion::create(PromotionId::generate(), t).unwrap();

        assert_eq!(
            promo.apply_discount(&gbp(dec!(49.99)), now()),
            Err(DomainError::BelowMinimumOrder { minimum: dec!(50) })
        );
        assert_eq!(promo.used_count(), 0);
        assert_eq!(promo.apply_discount(&gbp(dec!(50)), now()).unwrap(), gbp(dec!(45)));

        let eur = Money::create(dec!(100), "EUR").unwrap();
        assert!(matches!(
            promo.apply_discount(&eur, now()),
            Err(DomainError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn fixed_discount_is_capped_at_order_total() {
        let mut promo = Promotion::create(
            PromotionId::generate(),
            terms(Discount::FixedAmount(dec!(25)), 0),
        )
        .unwrap();
        assert_eq!(promo.apply_discount(&gbp(dec!(100)), now()).unwrap(), gbp(dec!(75)));

        let quote = promo.quote(&gbp(dec!(20)), now()).unwrap();
        assert_eq!(quote.discount, gbp(dec!(20)));
        assert!(quote.discounted_total.is_zero());
    }

    #[test]
    fn fixed_discount_uses_order_currency() {
        let promo = Promotion::create(
            PromotionId::generate(),
            terms(Discount::FixedAmount(dec!(5)), 0),
        )
        .unwrap();
        let quote = promo.quote(&Money::create(dec!(30), "USD").unwrap(), now()).unwrap();
        assert_eq!(quote.discount.currency(), Currency::USD);
    }

    #[test]
    fn percentage_discount_is_not_rounded() {
        let promo = Promotion::create(
            PromotionId::generate(),
            terms(Discount::Percentage(dec!(15)), 0),
        )
        .unwrap();
        let quote = promo.quote(&gbp(dec!(33.33)), now()).unwrap();
        assert_eq!(quote.discount, gbp(dec!(4.9995)));
        assert_eq!(quote.discounted_total, gbp(dec!(28.3305)));

        let mut half = Promotion::create(
            PromotionId::generate(),
            terms(Discount::Percentage(dec!(50)), 0),
        )
        .unwrap();
        assert_eq!(half.apply_discount(&gbp(dec!(10.005)), now()).unwrap(), gbp(dec!(5.0025)));
    }

    #[test]
    fn full_discount_on_sub_minor_unit_total_is_zero() {
        let mut promo = Promotion::create(
            PromotionId::generate(),
            terms(Discount::Percentage(dec!(100)), 0),
        )
        .unwrap();
        let total = promo.apply_discount(&gbp(dec!(0.005)), now()).unwrap();
        assert!(total.is_zero());
        assert_eq!(promo.used_count(), 1);
    }

    #[test]
    fn quote_is_pure() {
        let promo = ten_percent(1);
        let before = promo.clone();
        let q1 = promo.quote(&gbp(dec!(200)), now()).unwrap();
        let q2 = promo.quote(&gbp(dec!(200)), now()).unwrap();
        assert_eq!(q1, q2);
        assert_eq!(q1.new_used_count, 1);
        assert_eq!(promo, before);
    }

    #[test]
    fn stale_version_is_a_conflict() {
        let mut promo = ten_percent(0);
        let seen = promo.version();
        promo.apply_discount(&gbp(dec!(100)), now()).unwrap();

        let err = promo
            .redeem(&gbp(dec!(100)), now(), ExpectedVersion::Exact(seen))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(promo.used_count(), 1);

        let quote = promo
            .redeem(&gbp(dec!(100)), now(), ExpectedVersion::Exact(promo.version()))
            .unwrap();
        assert_eq!(quote.new_used_count, 2);
    }

    #[test]
    fn redeemed_event_carries_new_count() {
        let promo = ten_percent(0);
        let events = promo
            .handle(&PromotionCommand::Redeem(RedeemPromotion {
                order_total: gbp(dec!(200)),
                now: now(),
                expected_version: ExpectedVersion::Any,
            }))
            .unwrap();
        match &events[0] {
            PromotionEvent::Redeemed(e) => {
                assert_eq!(e.new_used_count, 1);
                assert_eq!(e.discount, gbp(dec!(20)));
                assert_eq!(events[0].event_type(), "promotions.promotion.redeemed");
            }
            other => panic!("Expected Redeemed event, got {other:?}"),
        }
        // handle() alone does not consume a use.
        assert_eq!(promo.used_count(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: used_count never decreases and never passes the limit,
        /// whatever sequence of order totals and times is applied.
        #[test]
        fn used_count_is_monotonic_and_capped(
            limit in 0u32..6,
            attempts in prop::collection::vec((0i64..50_000i64, -40i64..40i64), 1..20),
        ) {
            let mut promo = ten_percent(limit);
            let mut previous = promo.used_count();

            for (cents, day_offset) in attempts {
                let total = gbp(Decimal::new(cents, 2));
                let at = now() + Duration::days(day_offset);
                let before = promo.clone();
                match promo.apply_discount(&total, at) {
                    Ok(discounted) => {
                        prop_assert_eq!(promo.used_count(), previous + 1);
                        prop_assert!(discounted.amount() <= total.amount());
                    }
                    Err(_) => prop_assert_eq!(&promo, &before),
                }
                prop_assert!(promo.used_count() >= previous);
                if limit > 0 {
                    prop_assert!(promo.used_count() <= limit);
                }
                previous = promo.used_count();
            }
        }
    }
}
