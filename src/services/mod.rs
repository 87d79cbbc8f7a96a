//! Application services: matching, settlement, geofencing, wallet ledger and
//! outbound notifications.

pub mod geofence;
pub mod ledger;
pub mod matcher;
pub mod notify;
pub mod retry;
pub mod settlement;

pub use geofence::{GeofenceConfig, GeofenceEvent, GeofenceMonitor, LocationFeed, TripProgress};
pub use ledger::WalletLedger;
pub use matcher::{RideRequestInput, RideRequestMatcher};
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use retry::RetryPolicy;
pub use settlement::{SettlementEngine, SettlementReport};
