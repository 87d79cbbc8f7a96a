pub mod config;
pub mod domain;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod pricing;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::services::{
    GeofenceMonitor, LocationFeed, Notifier, RideRequestMatcher, SettlementEngine, WalletLedger,
};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub notifier: Arc<dyn Notifier>,
    pub ledger: Arc<WalletLedger>,
    pub matcher: Arc<RideRequestMatcher>,
    pub settlement: Arc<SettlementEngine>,
    pub geofence: Arc<GeofenceMonitor>,
    pub feed: Arc<LocationFeed>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire the full service graph on top of a store and notifier.
    pub fn build(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        config: &config::Config,
    ) -> Self {
        let ledger = Arc::new(WalletLedger::new(store.clone()));
        let matcher = Arc::new(RideRequestMatcher::new(
            store.clone(),
            notifier.clone(),
            config::FareConfig::default(),
            config.search_radius_km,
            config.match_timeout_secs,
            config.avg_speed_kmh,
        ));
        let settlement = Arc::new(SettlementEngine::new(
            store.clone(),
            ledger.clone(),
            config.autopay.clone(),
            notifier.clone(),
        ));
        let feed = Arc::new(LocationFeed::new());
        let geofence = Arc::new(GeofenceMonitor::new(
            store.clone(),
            settlement.clone(),
            notifier.clone(),
            feed.clone(),
            services::GeofenceConfig {
                arrival_threshold_km: config.arrival_threshold_km,
                fallback_speed_kmh: config.fallback_speed_kmh,
            },
        ));

        Self {
            store,
            notifier,
            ledger,
            matcher,
            settlement,
            geofence,
            feed,
            start_time: std::time::Instant::now(),
        }
    }
}

pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/rides", post(handlers::rides::create_ride))
        .route("/rides/:id", get(handlers::rides::get_ride))
        .route("/rides/:id/match", post(handlers::rides::match_ride))
        .route("/rides/:id/accept", post(handlers::rides::accept_ride))
        .route("/rides/:id/cancel", post(handlers::rides::cancel_ride))
        .route("/trips/:id", get(handlers::trips::get_trip))
        .route("/trips/:id/location", post(handlers::trips::post_location))
        .route("/trips/:id/settle", post(handlers::trips::settle_trip))
        .route("/wallets/:user_id", get(handlers::wallets::get_wallet))
        .route(
            "/wallets/:user_id/credit",
            post(handlers::wallets::credit_wallet),
        )
        .route(
            "/wallets/:user_id/transactions",
            get(handlers::wallets::list_transactions),
        )
        .route("/promos", post(handlers::promos::upsert_promo))
        .route("/promos/apply", post(handlers::promos::apply))
        .route("/drivers", post(handlers::drivers::register))
        .route(
            "/drivers/:id/availability",
            post(handlers::drivers::set_availability),
        )
        .with_state(app_state)
}
