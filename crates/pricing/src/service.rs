use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bookwise_core::{Aggregate, AggregateRoot, DomainError, DomainResult, Event, Money, Postcode};

use crate::postcode_pricing::PostcodePricing;

bookwise_core::aggregate_id_newtype!(
    /// Bookable service identifier.
    ServiceId
);

/// Aggregate root: a bookable service with its base price and
/// location-based adjustments (at most one per postcode area).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    id: ServiceId,
    name: String,
    base_price: Money,
    postcode_pricing: Vec<PostcodePricing>,
    version: u64,
}

impl Service {
    pub fn new(id: ServiceId, name: impl Into<String>, base_price: Money) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("service name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            base_price,
            postcode_pricing: Vec::new(),
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ServiceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn postcode_pricing(&self) -> &[PostcodePricing] {
        &self.postcode_pricing
    }

    /// Pricing record for the postcode's area, if any.
    pub fn pricing_for(&self, postcode: &Postcode) -> Option<&PostcodePricing> {
        self.postcode_pricing.iter().find(|p| p.applies_to(postcode))
    }

    /// Adds a record for the postcode's area, or updates the existing one.
    pub fn add_postcode_pricing(
        &mut self,
        postcode: Postcode,
        multiplier: Decimal,
        fixed_adjustment: Decimal,
    ) -> DomainResult<()> {
        self.execute(&ServiceCommand::SetPostcodePricing(SetPostcodePricing {
            postcode,
            multiplier,
            fixed_adjustment,
        }))
        .map(drop)
    }

    pub fn remove_postcode_pricing(&mut self, postcode: Postcode) -> DomainResult<()> {
        self.execute(&ServiceCommand::RemovePostcodePricing { postcode })
            .map(drop)
    }

    pub fn change_base_price(&mut self, price: Money) -> DomainResult<()> {
        self.execute(&ServiceCommand::ChangeBasePrice { price }).map(drop)
    }

    /// Base price adjusted for `postcode`; unchanged when no record matches.
    pub fn adjusted_price_for_postcode(&self, postcode: &Postcode) -> DomainResult<Money> {
        match self.pricing_for(postcode) {
            Some(pricing) => {
                let adjusted = pricing.adjust(&self.base_price)?;
                tracing::debug!(
                    service_id = %self.id,
                    area = pricing.area(),
                    base = %self.base_price,
                    %adjusted,
                    "applied postcode pricing"
                );
                Ok(adjusted)
            }
            None => Ok(self.base_price),
        }
    }
}

impl AggregateRoot for Service {
    type Id = ServiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SetPostcodePricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPostcodePricing {
    pub postcode: Postcode,
    pub multiplier: Decimal,
    pub fixed_adjustment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceCommand {
    SetPostcodePricing(SetPostcodePricing),
    RemovePostcodePricing { postcode: Postcode },
    ChangeBasePrice { price: Money },
}

/// Event: PostcodePricingSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcodePricingSet {
    pub service_id: ServiceId,
    pub pricing: PostcodePricing,
    /// The record for the same area this one replaced, if any.
    pub replaced: Option<PostcodePricing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceEvent {
    PostcodePricingSet(PostcodePricingSet),
    PostcodePricingRemoved { service_id: ServiceId, area: String },
    BasePriceChanged { service_id: ServiceId, price: Money },
}

impl Event for ServiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ServiceEvent::PostcodePricingSet(_) => "pricing.service.postcode_pricing_set",
            ServiceEvent::PostcodePricingRemoved { .. } => "pricing.service.postcode_pricing_removed",
            ServiceEvent::BasePriceChanged { .. } => "pricing.service.base_price_changed",
        }
    }
}

impl Aggregate for Service {
    type Command = ServiceCommand;
    type Event = ServiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ServiceEvent::PostcodePricingSet(e) => {
                match self
                    .postcode_pricing
                    .iter_mut()
                    .find(|p| p.area() == e.pricing.area())
                {
                    Some(existing) => *existing = e.pricing.clone(),
                    None => self.postcode_pricing.push(e.pricing.clone()),
                }
            }
            ServiceEvent::PostcodePricingRemoved { area, .. } => {
                self.postcode_pricing.retain(|p| p.area() != area);
            }
            ServiceEvent::BasePriceChanged { price, .. } => {
                self.base_price = *price;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let service_id = self.id;
        match command {
            ServiceCommand::SetPostcodePricing(cmd) => {
                let pricing =
                    PostcodePricing::new(cmd.postcode.clone(), cmd.multiplier, cmd.fixed_adjustment)?;
                Ok(vec![ServiceEvent::PostcodePricingSet(PostcodePricingSet {
                    service_id,
                    replaced: self.pricing_for(&cmd.postcode).cloned(),
                    pricing,
                })])
            }
            ServiceCommand::RemovePostcodePricing { postcode } => {
                if self.pricing_for(postcode).is_none() {
                    return Err(DomainError::not_found());
                }
                Ok(vec![ServiceEvent::PostcodePricingRemoved {
                    service_id,
                    area: postcode.area().to_string(),
                }])
            }
            ServiceCommand::ChangeBasePrice { price } => Ok(vec![ServiceEvent::BasePriceChanged {
                service_id,
                price: *price,
            }]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn postcode(raw: &str) -> Postcode {
        Postcode::create(raw).unwrap()
    }

    fn cleaning() -> Service {
        Service::new(
            ServiceId::generate(),
            "Deep clean",
            Money::gbp(dec!(100)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn no_matching_area_returns_base_price() {
        let service = cleaning();
        let price = service.adjusted_price_for_postcode(&postcode("M1 1AE")).unwrap();
        assert_eq!(price, Money::gbp(dec!(100)).unwrap());
    }

    #[test]
    fn matching_area_adjusts_price() {
        let mut service = cleaning();
        service
            .add_postcode_pricing(postcode("SW1A 1AA"), dec!(1.2), dec!(10))
            .unwrap();

        // Same area, different district.
        let price = service.adjusted_price_for_postcode(&postcode("SW19 2AB")).unwrap();
        assert_eq!(price, Money::gbp(dec!(130)).unwrap());
    }

    #[test]
    fn re_adding_same_area_updates_in_place() {
        let mut service = cleaning();
        service
            .add_postcode_pricing(postcode("SW1A 1AA"), dec!(1.2), dec!(10))
            .unwrap();
        service
            .add_postcode_pricing(postcode("SW19 2AB"), dec!(2), dec!(-20))
            .unwrap();

        assert_eq!(service.postcode_pricing().len(), 1);
        let record = &service.postcode_pricing()[0];
        assert_eq!(record.multiplier(), dec!(2));
        assert_eq!(record.fixed_adjustment(), dec!(-20));
        assert_eq!(
            service.adjusted_price_for_postcode(&postcode("SW1A 1AA")).unwrap(),
            Money::gbp(dec!(180)).unwrap()
        );
    }

    #[test]
    fn replacement_is_reported_in_event() {
        let mut service = cleaning();
        service
            .add_postcode_pricing(postcode("SW1A 1AA"), dec!(1.2), dec!(10))
            .unwrap();
        let events = service
            .handle(&ServiceCommand::SetPostcodePricing(SetPostcodePricing {
                postcode: postcode("SW19 2AB"),
                multiplier: dec!(1.5),
                fixed_adjustment: Decimal::ZERO,
            }))
            .unwrap();
        match &events[0] {
            ServiceEvent::PostcodePricingSet(e) => {
                assert_eq!(e.replaced.as_ref().map(|p| p.multiplier()), Some(dec!(1.2)));
                assert_eq!(events[0].event_type(), "pricing.service.postcode_pricing_set");
            }
            other => panic!("Expected PostcodePricingSet, got {other:?}"),
        }
    }

    #[test]
    fn different_areas_are_kept_separately() {
        let mut service = cleaning();
        service
            .add_postcode_pricing(postcode("SW1A 1AA"), dec!(1.2), dec!(10))
            .unwrap();
        service
            .add_postcode_pricing(postcode("EC1A 1BB"), dec!(0.9), Decimal::ZERO)
            .unwrap();
        assert_eq!(service.postcode_pricing().len(), 2);
        assert_eq!(
            service.adjusted_price_for_postcode(&postcode("EC2V 7HH")).unwrap(),
            Money::gbp(dec!(90)).unwrap()
        );
    }

    #[test]
    fn invalid_multiplier_leaves_service_unchanged() {
        let mut service = cleaning();
        let before = service.clone();
        let err = service
            .add_postcode_pricing(postcode("SW1A 1AA"), dec!(3.5), Decimal::ZERO)
            .unwrap_err();
        assert_eq!(err, DomainError::InvalidMultiplier(dec!(3.5)));
        assert_eq!(service, before);
    }

    #[test]
    fn removing_pricing_restores_base_price() {
        let mut service = cleaning();
        service
            .add_postcode_pricing(postcode("SW1A 1AA"), dec!(1.2), dec!(10))
            .unwrap();
        service.remove_postcode_pricing(postcode("SW2 1AA")).unwrap();
        assert!(service.postcode_pricing().is_empty());
        assert_eq!(
            service.remove_postcode_pricing(postcode("SW2 1AA")),
            Err(DomainError::NotFound)
        );
    }

    #[test]
    fn base_price_change_flows_into_adjustment() {
        let mut service = cleaning();
        service
            .add_postcode_pricing(postcode("SW1A 1AA"), dec!(1.2), dec!(10))
            .unwrap();
        service.change_base_price(Money::gbp(dec!(50)).unwrap()).unwrap();
        assert_eq!(
            service.adjusted_price_for_postcode(&postcode("SW1A 1AA")).unwrap(),
            Money::gbp(dec!(70)).unwrap()
        );
        assert_eq!(service.version(), 2);
    }
}
