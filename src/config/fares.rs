//! Vehicle-class rate card and fee configuration for fare computation.

use bigdecimal::BigDecimal;

use crate::domain::VehicleClass;

#[derive(Debug, Clone)]
pub struct RateCard {
    pub base_fare: BigDecimal,
    pub per_km: BigDecimal,
    pub per_min: BigDecimal,
}

impl RateCard {
    fn new(base_fare: i64, per_km: i64, per_min: i64) -> Self {
        Self {
            base_fare: BigDecimal::from(base_fare),
            per_km: BigDecimal::from(per_km),
            per_min: BigDecimal::from(per_min),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PlatformFee {
    Flat(BigDecimal),
    /// Percentage of (base + distance + time + surge).
    Percent(BigDecimal),
}

#[derive(Debug, Clone)]
pub struct FareConfig {
    pub bike: RateCard,
    pub auto: RateCard,
    pub car: RateCard,
    pub suv: RateCard,
    pub platform_fee: PlatformFee,
    /// GST percentage applied on top of all charges and fees.
    pub gst_percent: BigDecimal,
}

impl FareConfig {
    pub fn rate_card(&self, class: VehicleClass) -> &RateCard {
        match class {
            VehicleClass::Bike => &self.bike,
            VehicleClass::Auto => &self.auto,
            VehicleClass::Car => &self.car,
            VehicleClass::Suv => &self.suv,
        }
    }
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            bike: RateCard::new(20, 8, 1),
            auto: RateCard::new(30, 10, 1),
            car: RateCard::new(40, 12, 2),
            suv: RateCard::new(60, 15, 3),
            platform_fee: PlatformFee::Flat(BigDecimal::from(10)),
            gst_percent: BigDecimal::from(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_card_lookup_is_class_specific() {
        let config = FareConfig::default();
        assert_eq!(config.rate_card(VehicleClass::Car).base_fare, BigDecimal::from(40));
        assert_eq!(config.rate_card(VehicleClass::Bike).per_km, BigDecimal::from(8));
        assert!(config.rate_card(VehicleClass::Suv).per_min > config.rate_card(VehicleClass::Auto).per_min);
    }
}
