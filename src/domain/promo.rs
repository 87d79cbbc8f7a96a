use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// A promotional discount code.
///
/// `max_discount` caps percentage discounts only; fixed discounts are taken
/// at face value (and still never exceed the fare they apply to).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: BigDecimal,
    pub max_discount: Option<BigDecimal>,
    pub min_amount: BigDecimal,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: i32,
    pub used_count: i32,
    pub active: bool,
}

impl PromoCode {
    /// Active, inside the validity window, and not usage-exhausted.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.active
            && now >= self.valid_from
            && now <= self.valid_until
            && self.used_count < self.usage_limit
    }
}
