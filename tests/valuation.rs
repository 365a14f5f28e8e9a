//! Valuation properties exercised through the public API.
//!
//! Rates and items here mirror what a storefront sees: a table merged from live
//! and stored sources, and seller-entered attributes.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use testresult::TestResult;

use aurum::prelude::*;

fn bangle() -> ItemAttributes {
    ItemAttributes {
        metal: Metal::Gold,
        hallmarked: false,
        purity: dec!(91.6),
        net_weight: dec!(10),
        extra_weight: dec!(0),
        extra_value: dec!(0),
        gross_weight: dec!(10),
        item_type: ItemType::Normal,
        wastage_percent: dec!(8),
        making_charge_per_gram: dec!(500),
        stored_metal_price: Some(dec!(590)),
    }
}

fn table(entries: &[(Metal, Decimal, RateOrigin)]) -> RateTable {
    entries
        .iter()
        .map(|&(metal, price_per_gram, origin)| RateEntry {
            metal,
            price_per_gram,
            origin,
            fetched_at: Timestamp::UNIX_EPOCH,
        })
        .collect()
}

#[test]
fn same_rate_and_item_always_price_identically() -> TestResult {
    let item = bangle();
    item.validate(WeightPolicy::Enforce)?;

    let rates = table(&[(Metal::Gold, dec!(6123.4567), RateOrigin::Live)]);

    let quoted = price_for(&item, &rates)?;
    let charged = price_for(&item, &rates)?;

    assert_eq!(quoted, charged);
    assert_eq!(quoted.total().scale(), 2);

    Ok(())
}

#[test]
fn rounded_total_stays_within_a_cent_of_component_sum() -> TestResult {
    let item = bangle();

    for rate in [dec!(5999.999), dec!(6000.005), dec!(6123.4567), dec!(0.333)] {
        let breakdown = price_for(&item, &table(&[(Metal::Gold, rate, RateOrigin::Live)]))?.breakdown;
        let drift = (breakdown.unrounded_total() - breakdown.total_price).abs();

        assert!(drift <= dec!(0.005), "rate {rate} drifted by {drift}");
        assert!(breakdown.total_price.scale() <= 2, "rate {rate} not rounded");
    }

    Ok(())
}

#[test]
fn platinum_item_uses_stored_rate_alongside_live_gold() -> TestResult {
    let mut pendant = bangle();
    pendant.metal = Metal::Platinum;
    pendant.stored_metal_price = None;

    let rates = table(&[
        (Metal::Gold, dec!(600), RateOrigin::Live),
        (Metal::Platinum, dec!(300), RateOrigin::Stored),
    ]);

    let valuation = price_for(&pendant, &rates)?;

    assert_eq!(valuation.applied, AppliedRate::Table(RateOrigin::Stored));
    assert_eq!(valuation.rate, dec!(300));

    Ok(())
}

#[test]
fn empty_table_falls_back_to_item_price() -> TestResult {
    let valuation = price_for(&bangle(), &RateTable::new())?;

    assert_eq!(valuation.applied, AppliedRate::ItemStored);
    assert_eq!(valuation.rate, dec!(590));

    Ok(())
}

#[test]
fn breakdown_components_match_reference() -> TestResult {
    let breakdown = compute_price(
        dec!(600),
        &PriceInputs {
            purity: dec!(91.6),
            net_weight: dec!(10),
            wastage_percent: dec!(8),
            making_charge_per_gram: dec!(500),
            extra_value: dec!(0),
        },
    )?
    .rounded();

    assert_eq!(breakdown.metal_value, dec!(5496.00));
    assert_eq!(breakdown.wastage_amount, dec!(439.68));
    assert_eq!(breakdown.making_charge, dec!(5000.00));
    assert_eq!(breakdown.total_price, dec!(10935.68));

    Ok(())
}
