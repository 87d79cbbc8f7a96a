//! Demand-to-surge mapping.
//!
//! Surge never applies below Medium demand, and the multiplier is strictly
//! increasing with demand level.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DemandLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Fixed time-of-day demand table. Morning and evening commute windows are
/// peak; the 18:00-20:00 window is the busiest.
pub fn demand_level(hour: u32) -> DemandLevel {
    match hour % 24 {
        18 | 19 => DemandLevel::VeryHigh,
        7..=9 | 17 | 20 => DemandLevel::High,
        23 | 0..=5 => DemandLevel::Low,
        _ => DemandLevel::Medium,
    }
}

/// Demand derived from live zone counters instead of the clock: the ratio of
/// waiting requests to available drivers.
pub fn demand_from_zone_stats(waiting_requests: u32, available_drivers: u32) -> DemandLevel {
    let ratio = f64::from(waiting_requests) / f64::from(available_drivers.max(1));
    if ratio >= 3.0 {
        DemandLevel::VeryHigh
    } else if ratio >= 2.0 {
        DemandLevel::High
    } else if ratio >= 1.0 {
        DemandLevel::Medium
    } else {
        DemandLevel::Low
    }
}

pub fn surge_multiplier(level: DemandLevel) -> f64 {
    match level {
        DemandLevel::Low => 1.0,
        DemandLevel::Medium => 1.2,
        DemandLevel::High => 1.5,
        DemandLevel::VeryHigh => 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_is_strictly_increasing_with_demand() {
        let levels = [
            DemandLevel::Low,
            DemandLevel::Medium,
            DemandLevel::High,
            DemandLevel::VeryHigh,
        ];
        for pair in levels.windows(2) {
            assert!(surge_multiplier(pair[0]) < surge_multiplier(pair[1]));
        }
    }

    #[test]
    fn no_surge_below_medium() {
        assert_eq!(surge_multiplier(DemandLevel::Low), 1.0);
    }

    #[test]
    fn commute_hours_are_peak() {
        assert_eq!(demand_level(8), DemandLevel::High);
        assert_eq!(demand_level(18), DemandLevel::VeryHigh);
        assert_eq!(demand_level(19), DemandLevel::VeryHigh);
        assert_eq!(demand_level(3), DemandLevel::Low);
        assert_eq!(demand_level(13), DemandLevel::Medium);
    }

    #[test]
    fn zone_stats_ratio_maps_to_demand() {
        assert_eq!(demand_from_zone_stats(0, 10), DemandLevel::Low);
        assert_eq!(demand_from_zone_stats(10, 10), DemandLevel::Medium);
        assert_eq!(demand_from_zone_stats(20, 10), DemandLevel::High);
        assert_eq!(demand_from_zone_stats(30, 10), DemandLevel::VeryHigh);
        // No drivers at all counts as a one-driver zone to avoid divide-by-zero.
        assert_eq!(demand_from_zone_stats(5, 0), DemandLevel::VeryHigh);
    }
}
