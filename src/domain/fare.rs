use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// The itemized result of a fare computation. Immutable once quoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: BigDecimal,
    pub distance_charge: BigDecimal,
    pub time_charge: BigDecimal,
    pub surge_multiplier: f64,
    pub surge_pricing: BigDecimal,
    pub platform_fee: BigDecimal,
    pub gst: BigDecimal,
    pub discount: BigDecimal,
    pub total_fare: BigDecimal,
}

impl FareBreakdown {
    /// The total before any promo discount was taken off.
    pub fn pre_discount_total(&self) -> BigDecimal {
        &self.total_fare + &self.discount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_discount_total_adds_discount_back() {
        let breakdown = FareBreakdown {
            base_fare: BigDecimal::from(40),
            distance_charge: BigDecimal::from(120),
            time_charge: BigDecimal::from(40),
            surge_multiplier: 1.0,
            surge_pricing: BigDecimal::from(0),
            platform_fee: BigDecimal::from(10),
            gst: BigDecimal::from(10),
            discount: BigDecimal::from(50),
            total_fare: BigDecimal::from(170),
        };
        assert_eq!(breakdown.pre_discount_total(), BigDecimal::from(220));
    }
}
