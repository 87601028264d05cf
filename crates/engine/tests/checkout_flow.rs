use std::collections::HashMap;

use bookwise_core::{DomainError, Money, Postcode};
use bookwise_engine::{CheckoutItem, Engine, EngineConfig};
use bookwise_invoicing::InvoiceId;
use bookwise_pricing::{Service, ServiceId};
use bookwise_promotions::{Discount, NewPromotion, Promotion, PromotionId};
use bookwise_scheduling::{DayOfWeek, Provider, ProviderId, TimeSlot, WorkingHours};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// 2024-01-15 was a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn weekday_provider(name: &str) -> Provider {
    let mut provider = Provider::new(ProviderId::generate(), name).unwrap();
    for day in 1..=5 {
        provider
            .add_working_hours(
                WorkingHours::working(DayOfWeek::from_number(day).unwrap(), time(9, 0), time(17, 0))
                    .unwrap(),
            )
            .unwrap();
    }
    provider
        .add_working_hours(WorkingHours::day_off(DayOfWeek::SUNDAY))
        .unwrap();
    provider
}

fn directory(providers: &[Provider]) -> HashMap<ProviderId, Provider> {
    providers.iter().map(|p| (p.id_typed(), p.clone())).collect()
}

#[test]
fn scan_book_price_and_invoice() {
    bookwise_observability::init();
    let engine = Engine::new(EngineConfig::default());

    let mut alex = weekday_provider("Alex");
    let mut jo = weekday_provider("Jo");
    jo.mark_as_unavailable(
        TimeSlot::create(monday().and_time(time(9, 0)), monday().and_time(time(12, 0))).unwrap(),
    )
    .unwrap();

    let ids = [alex.id_typed(), jo.id_typed()];
    let dir = directory(&[alex.clone(), jo.clone()]);

    // 19 candidates for one hour over the default window, two providers each.
    let rows = engine.scan_day(&dir, &ids, monday(), Duration::hours(1)).unwrap();
    assert_eq!(rows.len(), 38);

    let free = engine
        .available_slots(&dir, &ids, monday(), Duration::hours(1))
        .unwrap();
    assert!(free.iter().all(|r| r.start.time() >= time(9, 0) && r.end.time() <= time(17, 0)));
    assert!(
        free.iter()
            .filter(|r| r.provider_id == jo.id_typed())
            .all(|r| r.start.time() >= time(12, 0))
    );

    // Book Alex's first free slot and rescan.
    let first = free
        .iter()
        .find(|r| r.provider_id == alex.id_typed())
        .unwrap();
    let booked = TimeSlot::create(first.start, first.end).unwrap();
    alex.mark_as_unavailable(booked).unwrap();
    let dir = directory(&[alex.clone(), jo.clone()]);
    let free_after = engine
        .available_slots(&dir, &ids, monday(), Duration::hours(1))
        .unwrap();
    assert!(
        !free_after
            .iter()
            .any(|r| r.provider_id == alex.id_typed() && r.start == booked.start())
    );
    assert_eq!(free_after.len(), free.len() - 2);

    // Price and invoice the booking in Westminster with a launch promotion.
    let mut clean = Service::new(ServiceId::generate(), "Deep clean", Money::gbp(dec!(100)).unwrap()).unwrap();
    clean
        .add_postcode_pricing(Postcode::create("SW1A 1AA").unwrap(), dec!(1.2), dec!(10))
        .unwrap();
    let oven = Service::new(ServiceId::generate(), "Oven clean", Money::gbp(dec!(35)).unwrap()).unwrap();

    let now = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
    let mut promo = Promotion::create(
        PromotionId::generate(),
        NewPromotion {
            code: "launch".to_string(),
            discount: Discount::Percentage(dec!(10)),
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(30),
            usage_limit: 1,
            minimum_order: Money::gbp(dec!(100)).unwrap(),
        },
    )
    .unwrap();

    let postcode = Postcode::create("sw1a2aa").unwrap();
    let invoice = engine
        .checkout(
            InvoiceId::generate(),
            &postcode,
            &[CheckoutItem::new(&clean, 1), CheckoutItem::new(&oven, 2)],
            Some(&mut promo),
            now,
        )
        .unwrap();

    assert_eq!(invoice.subtotal(), Money::gbp(dec!(200)).unwrap());
    assert_eq!(invoice.discount_amount(), Money::gbp(dec!(20)).unwrap());
    assert_eq!(invoice.total_amount(), Money::gbp(dec!(180)).unwrap());
    assert_eq!(invoice.promotion_id(), Some(promo.id_typed()));
    assert_eq!(promo.used_count(), 1);

    // Single-use code: the next checkout fails and leaves the count alone.
    let err = engine
        .checkout(
            InvoiceId::generate(),
            &postcode,
            &[CheckoutItem::new(&clean, 1)],
            Some(&mut promo),
            now,
        )
        .unwrap_err();
    assert_eq!(err, DomainError::UsageLimitReached);
    assert_eq!(promo.used_count(), 1);

    let json = serde_json::to_value(invoice.lines()).unwrap();
    assert_eq!(json[0]["unit_price"]["currency"], "GBP");
    assert_eq!(json.as_array().map(Vec::len), Some(2));
}

#[test]
fn independent_snapshots_both_see_the_same_free_slot() {
    let engine = Engine::default();
    let provider = weekday_provider("Alex");
    let ids = [provider.id_typed()];

    let snapshot_a = directory(std::slice::from_ref(&provider));
    let snapshot_b = directory(std::slice::from_ref(&provider));
    let a = engine
        .available_slots(&snapshot_a, &ids, monday(), Duration::hours(1))
        .unwrap();
    let b = engine
        .available_slots(&snapshot_b, &ids, monday(), Duration::hours(1))
        .unwrap();

    // Check-then-act: nothing reserves the slot between scan and booking.
    assert_eq!(a.first().map(|r| r.start), b.first().map(|r| r.start));
}

#[test]
fn sunday_is_day_off_and_unknown_providers_fail_fast() {
    let engine = Engine::default();
    let provider = weekday_provider("Alex");
    let dir = directory(std::slice::from_ref(&provider));
    let sunday = monday() + Duration::days(6);

    let rows = engine
        .scan_day(&dir, &[provider.id_typed()], sunday, Duration::minutes(30))
        .unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| !r.available));

    let missing = ProviderId::generate();
    let err = engine
        .scan_day(&dir, &[provider.id_typed(), missing], sunday, Duration::minutes(30))
        .unwrap_err();
    assert_eq!(err, DomainError::ProviderNotFound(missing.to_string()));

    let err = engine.scan_day(&dir, &[], sunday, Duration::minutes(30)).unwrap_err();
    assert_eq!(err, DomainError::NoProvidersSpecified);
}

#[test]
fn checkout_without_items_is_rejected() {
    let engine = Engine::default();
    let err = engine
        .checkout(
            InvoiceId::generate(),
            &Postcode::create("M1 1AE").unwrap(),
            &[],
            None,
            Utc::now(),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(Decimal::ZERO, engine.open_invoice(InvoiceId::generate()).total_amount().amount());
}
