pub mod fares;

use bigdecimal::BigDecimal;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub use fares::{FareConfig, PlatformFee, RateCard};

/// Spend domains covered by the per-category auto-pay switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendDomain {
    Ride,
    Food,
    Shopping,
}

impl SpendDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendDomain::Ride => "ride",
            SpendDomain::Food => "food",
            SpendDomain::Shopping => "shopping",
        }
    }
}

/// Auto-debit eligibility: a global switch, per-category switches and
/// optional rolling spend limits. All gates must pass before a debit is
/// attempted during settlement.
#[derive(Debug, Clone)]
pub struct AutoPayConfig {
    pub enabled: bool,
    pub ride: bool,
    pub food: bool,
    pub shopping: bool,
    pub daily_limit: Option<BigDecimal>,
    pub weekly_limit: Option<BigDecimal>,
    pub monthly_limit: Option<BigDecimal>,
}

impl AutoPayConfig {
    pub fn allows(&self, domain: SpendDomain) -> bool {
        if !self.enabled {
            return false;
        }
        match domain {
            SpendDomain::Ride => self.ride,
            SpendDomain::Food => self.food,
            SpendDomain::Shopping => self.shopping,
        }
    }
}

impl Default for AutoPayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ride: true,
            food: false,
            shopping: false,
            daily_limit: None,
            weekly_limit: None,
            monthly_limit: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// When unset the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// When set, notifications are POSTed here instead of logged.
    pub notify_webhook_url: Option<String>,
    pub arrival_threshold_km: f64,
    pub fallback_speed_kmh: f64,
    pub avg_speed_kmh: f64,
    pub search_radius_km: f64,
    pub match_timeout_secs: u64,
    pub autopay: AutoPayConfig,
}

pub struct ConfigInfo {
    pub config: Config,
    pub overrides: Vec<String>,
}

fn env_parse<T: FromStr>(key: &str, default: T, overrides: &mut Vec<String>) -> T {
    match env::var(key) {
        Ok(v) => match v.parse() {
            Ok(parsed) => {
                overrides.push(key.to_string());
                parsed
            }
            Err(_) => default,
        },
        Err(_) => default,
    }
}

fn env_opt(key: &str, overrides: &mut Vec<String>) -> Option<String> {
    env::var(key).ok().map(|v| {
        overrides.push(key.to_string());
        v
    })
}

fn env_decimal(key: &str, overrides: &mut Vec<String>) -> Option<BigDecimal> {
    env_opt(key, overrides).and_then(|v| BigDecimal::from_str(&v).ok())
}

impl Config {
    pub fn from_env() -> anyhow::Result<ConfigInfo> {
        dotenv().ok();

        let mut overrides = Vec::new();

        let autopay_defaults = AutoPayConfig::default();
        let autopay = AutoPayConfig {
            enabled: env_parse("AUTOPAY_ENABLED", autopay_defaults.enabled, &mut overrides),
            ride: env_parse("AUTOPAY_RIDE", autopay_defaults.ride, &mut overrides),
            food: env_parse("AUTOPAY_FOOD", autopay_defaults.food, &mut overrides),
            shopping: env_parse(
                "AUTOPAY_SHOPPING",
                autopay_defaults.shopping,
                &mut overrides,
            ),
            daily_limit: env_decimal("AUTOPAY_DAILY_LIMIT", &mut overrides),
            weekly_limit: env_decimal("AUTOPAY_WEEKLY_LIMIT", &mut overrides),
            monthly_limit: env_decimal("AUTOPAY_MONTHLY_LIMIT", &mut overrides),
        };

        let config = Config {
            server_port: env_parse("SERVER_PORT", 8080, &mut overrides),
            database_url: env_opt("DATABASE_URL", &mut overrides),
            notify_webhook_url: env_opt("NOTIFY_WEBHOOK_URL", &mut overrides),
            arrival_threshold_km: env_parse("ARRIVAL_THRESHOLD_KM", 0.1, &mut overrides),
            fallback_speed_kmh: env_parse("FALLBACK_SPEED_KMH", 20.0, &mut overrides),
            avg_speed_kmh: env_parse("AVG_SPEED_KMH", 30.0, &mut overrides),
            search_radius_km: env_parse("SEARCH_RADIUS_KM", 5.0, &mut overrides),
            match_timeout_secs: env_parse("MATCH_TIMEOUT_SECS", 300, &mut overrides),
            autopay,
        };

        if config.arrival_threshold_km <= 0.0 {
            anyhow::bail!("ARRIVAL_THRESHOLD_KM must be positive");
        }
        if config.fallback_speed_kmh <= 0.0 {
            anyhow::bail!("FALLBACK_SPEED_KMH must be positive");
        }

        Ok(ConfigInfo { config, overrides })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autopay_gate_respects_global_switch() {
        let autopay = AutoPayConfig {
            enabled: false,
            ..AutoPayConfig::default()
        };
        assert!(!autopay.allows(SpendDomain::Ride));
    }

    #[test]
    fn autopay_defaults_enable_rides_only() {
        let autopay = AutoPayConfig::default();
        assert!(autopay.allows(SpendDomain::Ride));
        assert!(!autopay.allows(SpendDomain::Food));
        assert!(!autopay.allows(SpendDomain::Shopping));
    }
}
