//! Fare breakdown computation and promo discount application.
//!
//! All monetary components are rounded to two decimal places as they are
//! produced; the total is never negative.

use bigdecimal::{BigDecimal, FromPrimitive};
use chrono::{DateTime, Utc};

use crate::config::{FareConfig, PlatformFee};
use crate::domain::{DiscountType, FareBreakdown, PromoCode, VehicleClass};
use crate::error::CoreError;

fn decimal_from_f64(value: f64, what: &str) -> Result<BigDecimal, CoreError> {
    BigDecimal::from_f64(value)
        .ok_or_else(|| CoreError::Validation(format!("{} is not a finite number", what)))
}

/// Compute the itemized fare for a vehicle class, distance and duration under
/// the given surge multiplier.
pub fn compute_fare(
    class: VehicleClass,
    distance_km: f64,
    duration_min: f64,
    surge_multiplier: f64,
    config: &FareConfig,
) -> Result<FareBreakdown, CoreError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(CoreError::Validation(format!(
            "distance must be a non-negative number, got {}",
            distance_km
        )));
    }
    if !duration_min.is_finite() || duration_min < 0.0 {
        return Err(CoreError::Validation(format!(
            "duration must be a non-negative number, got {}",
            duration_min
        )));
    }
    if !surge_multiplier.is_finite() || surge_multiplier <= 0.0 {
        return Err(CoreError::Validation(format!(
            "surge multiplier must be positive, got {}",
            surge_multiplier
        )));
    }

    let card = config.rate_card(class);
    let distance = decimal_from_f64(distance_km, "distance")?;
    let duration = decimal_from_f64(duration_min, "duration")?;
    let hundred = BigDecimal::from(100);

    let base_fare = card.base_fare.clone();
    let distance_charge = (&card.per_km * &distance).round(2);
    let time_charge = (&card.per_min * &duration).round(2);
    let pre_surge = &base_fare + &distance_charge + &time_charge;

    // Surge applies only to the portion above 1.0x.
    let surge_pricing = if surge_multiplier > 1.0 {
        let factor = decimal_from_f64(surge_multiplier - 1.0, "surge multiplier")?;
        (&pre_surge * &factor).round(2)
    } else {
        BigDecimal::from(0)
    };

    let subtotal = &pre_surge + &surge_pricing;
    let platform_fee = match &config.platform_fee {
        PlatformFee::Flat(fee) => fee.clone(),
        PlatformFee::Percent(percent) => ((&subtotal * percent) / &hundred).round(2),
    };

    let taxable = &subtotal + &platform_fee;
    let gst = ((&taxable * &config.gst_percent) / &hundred).round(2);
    let total_fare = (&taxable + &gst).round(2);

    Ok(FareBreakdown {
        base_fare,
        distance_charge,
        time_charge,
        surge_multiplier,
        surge_pricing,
        platform_fee,
        gst,
        discount: BigDecimal::from(0),
        total_fare,
    })
}

/// Apply a promo code to a quoted fare, producing a new breakdown with the
/// discount filled in. The input breakdown is returned untouched on error.
///
/// The discount never exceeds the pre-discount total, and a percentage promo
/// with `max_discount` set never exceeds that cap.
pub fn apply_promo(
    fare: &FareBreakdown,
    promo: &PromoCode,
    now: DateTime<Utc>,
) -> Result<FareBreakdown, CoreError> {
    if promo.value < BigDecimal::from(0) {
        return Err(CoreError::Validation(format!(
            "promo {} has a negative discount value",
            promo.code
        )));
    }
    if !promo.is_usable_at(now) {
        return Err(CoreError::PromoExpiredOrInactive);
    }

    let pre_discount = fare.pre_discount_total();
    if promo.min_amount > pre_discount {
        return Err(CoreError::PromoMinimumNotMet {
            required: promo.min_amount.clone(),
        });
    }

    let mut discount = match promo.discount_type {
        DiscountType::Percentage => {
            let raw = ((&pre_discount * &promo.value) / BigDecimal::from(100)).round(2);
            match &promo.max_discount {
                Some(cap) if &raw > cap => cap.clone(),
                _ => raw,
            }
        }
        DiscountType::Fixed => promo.value.clone(),
    };
    if discount > pre_discount {
        discount = pre_discount.clone();
    }

    let total_fare = (&pre_discount - &discount).round(2);

    Ok(FareBreakdown {
        discount,
        total_fare,
        ..fare.clone()
    })
}
