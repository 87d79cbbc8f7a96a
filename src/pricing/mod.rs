//! Fare computation: rate-card pricing, surge and promo discounts.

pub mod fare;
pub mod surge;

pub use fare::{apply_promo, compute_fare};
pub use surge::{demand_from_zone_stats, demand_level, surge_multiplier, DemandLevel};
