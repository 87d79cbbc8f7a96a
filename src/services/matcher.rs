//! Ride request lifecycle: quoting, driver matching, acceptance, cancellation.
//!
//! Matching races are resolved by the store's conditional updates. The
//! acceptance path in particular goes through the compound
//! `accept_ride_request` call so that two drivers accepting the same request
//! can never both win.

use std::sync::Arc;

use chrono::{Duration, Timelike, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::FareConfig;
use crate::domain::{
    Booking, Driver, RideRequest, RideRequestStatus, Trip, VehicleClass,
};
use crate::error::CoreError;
use crate::geo::{self, Coordinates};
use crate::pricing::{apply_promo, compute_fare, demand_level, surge_multiplier};
use crate::store::RecordStore;

use super::notify::Notifier;

/// Everything a passenger supplies when asking for a ride. Distance and
/// duration may come from an external routing service; when absent they are
/// estimated from the straight-line distance and the configured average speed.
#[derive(Debug, Clone, Deserialize)]
pub struct RideRequestInput {
    pub passenger_id: Uuid,
    pub pickup: Coordinates,
    #[serde(default)]
    pub pickup_label: String,
    pub drop: Coordinates,
    #[serde(default)]
    pub drop_label: String,
    pub vehicle_class: VehicleClass,
    pub distance_km: Option<f64>,
    pub duration_min: Option<f64>,
    pub promo_code: Option<String>,
    #[serde(default)]
    pub org_restricted: bool,
    pub organization_id: Option<Uuid>,
}

pub struct RideRequestMatcher {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    fare_config: FareConfig,
    search_radius_km: f64,
    match_timeout: Duration,
    avg_speed_kmh: f64,
}

impl RideRequestMatcher {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        fare_config: FareConfig,
        search_radius_km: f64,
        match_timeout_secs: u64,
        avg_speed_kmh: f64,
    ) -> Self {
        Self {
            store,
            notifier,
            fare_config,
            search_radius_km,
            match_timeout: Duration::seconds(match_timeout_secs as i64),
            avg_speed_kmh,
        }
    }

    /// Quote a fare and persist a PENDING request.
    pub async fn create_ride_request(
        &self,
        input: RideRequestInput,
    ) -> Result<RideRequest, CoreError> {
        if !input.pickup.is_valid() {
            return Err(CoreError::Validation("pickup coordinates out of range".into()));
        }
        if !input.drop.is_valid() {
            return Err(CoreError::Validation("drop coordinates out of range".into()));
        }
        if input.org_restricted && input.organization_id.is_none() {
            return Err(CoreError::Validation(
                "org-restricted request needs an organization id".into(),
            ));
        }

        let distance_km = match input.distance_km {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            Some(d) => {
                return Err(CoreError::Validation(format!(
                    "distance must be a non-negative number, got {}",
                    d
                )))
            }
            None => geo::distance_km(input.pickup, input.drop),
        };
        let duration_min = match input.duration_min {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            Some(d) => {
                return Err(CoreError::Validation(format!(
                    "duration must be a non-negative number, got {}",
                    d
                )))
            }
            None => distance_km / self.avg_speed_kmh * 60.0,
        };

        let now = Utc::now();
        let surge = surge_multiplier(demand_level(now.hour()));
        let mut fare = compute_fare(
            input.vehicle_class,
            distance_km,
            duration_min,
            surge,
            &self.fare_config,
        )?;

        let mut promo_code = None;
        if let Some(code) = &input.promo_code {
            let promo = self
                .store
                .get_promo(code)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("promo code {}", code)))?;
            fare = apply_promo(&fare, &promo, now)?;
            self.store.increment_promo_usage(code).await?;
            promo_code = Some(code.clone());
        }

        let request = RideRequest {
            id: Uuid::new_v4(),
            passenger_id: input.passenger_id,
            pickup: input.pickup,
            pickup_label: input.pickup_label,
            drop: input.drop,
            drop_label: input.drop_label,
            vehicle_class: input.vehicle_class,
            quoted_fare: fare,
            distance_km,
            duration_min,
            status: RideRequestStatus::Pending,
            driver_id: None,
            trip_id: None,
            promo_code,
            surge_multiplier: surge,
            org_restricted: input.org_restricted,
            organization_id: input.organization_id,
            created_at: now,
            matched_at: None,
            accepted_at: None,
            cancelled_at: None,
        };
        self.store.insert_ride_request(&request).await?;
        info!(request_id = %request.id, passenger_id = %request.passenger_id, "ride request created");
        Ok(request)
    }

    /// Run one matching pass: move the request to SEARCHING, pick the nearest
    /// eligible driver and propose the match.
    ///
    /// Idempotent on already-matched and terminal requests, which come back
    /// unchanged. A request past its match timeout with no driver found is
    /// expired.
    pub async fn auto_match(&self, request_id: Uuid) -> Result<RideRequest, CoreError> {
        let mut request = self.get_ride_request(request_id).await?;

        loop {
            match request.status {
                RideRequestStatus::Matched | RideRequestStatus::Accepted => return Ok(request),
                RideRequestStatus::Searching => break,
                RideRequestStatus::Pending => {
                    let mut searching = request.clone();
                    searching.status = RideRequestStatus::Searching;
                    if self
                        .store
                        .update_ride_request_if_status(&searching, &[RideRequestStatus::Pending])
                        .await?
                    {
                        request = searching;
                        break;
                    }
                    // Lost a race with a cancel or another matching pass.
                    request = self.get_ride_request(request_id).await?;
                }
                RideRequestStatus::Completed
                | RideRequestStatus::Expired
                | RideRequestStatus::Cancelled => return Ok(request),
            }
        }

        match self.nearest_eligible_driver(&request).await? {
            Some((driver, distance)) => {
                request.status = RideRequestStatus::Matched;
                request.driver_id = Some(driver.id);
                request.matched_at = Some(Utc::now());
                if !self
                    .store
                    .update_ride_request_if_status(&request, &[RideRequestStatus::Searching])
                    .await?
                {
                    return self.get_ride_request(request_id).await;
                }
                info!(
                    request_id = %request.id,
                    driver_id = %driver.id,
                    distance_km = distance,
                    "driver matched"
                );
                self.notifier
                    .notify(
                        driver.id,
                        "New ride request",
                        &format!("Pickup near {}", request.pickup_label),
                        json!({ "request_id": request.id }),
                    )
                    .await;
                Ok(request)
            }
            None => {
                if Utc::now() - request.created_at >= self.match_timeout {
                    request.status = RideRequestStatus::Expired;
                    self.store
                        .update_ride_request_if_status(&request, &[RideRequestStatus::Searching])
                        .await?;
                    warn!(request_id = %request.id, "no driver found, request expired");
                    return Err(CoreError::MatchTimeout);
                }
                Ok(request)
            }
        }
    }

    /// A driver takes the request. Creates the trip and the passenger's
    /// confirmed booking atomically; exactly one of several racing drivers
    /// succeeds, the rest get [`CoreError::AlreadyMatched`].
    pub async fn accept_request(
        &self,
        request_id: Uuid,
        driver_id: Uuid,
    ) -> Result<(RideRequest, Trip, Booking), CoreError> {
        let mut request = self.get_ride_request(request_id).await?;
        match request.status {
            RideRequestStatus::Accepted => return Err(CoreError::AlreadyMatched),
            RideRequestStatus::Pending
            | RideRequestStatus::Searching
            | RideRequestStatus::Matched => {}
            status => {
                return Err(CoreError::Validation(format!(
                    "cannot accept a request in status {}",
                    status.as_str()
                )))
            }
        }

        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("driver {}", driver_id)))?;

        let total = request.quoted_fare.total_fare.clone();
        let trip = Trip::new(
            driver.id,
            request.pickup,
            request.drop,
            request.distance_km,
            request.duration_min,
            total.clone(),
            driver.vehicle_class.seat_capacity(),
            1,
        );
        let booking = Booking::confirmed(trip.id, request.passenger_id, 1, total);

        request.status = RideRequestStatus::Accepted;
        request.driver_id = Some(driver.id);
        request.trip_id = Some(trip.id);
        request.accepted_at = Some(Utc::now());

        let won = self
            .store
            .accept_ride_request(
                &request,
                &trip,
                &booking,
                &[
                    RideRequestStatus::Pending,
                    RideRequestStatus::Searching,
                    RideRequestStatus::Matched,
                ],
            )
            .await?;
        if !won {
            return Err(CoreError::AlreadyMatched);
        }

        let mut busy = driver.clone();
        busy.available = false;
        busy.updated_at = Utc::now();
        self.store.upsert_driver(&busy).await?;

        info!(request_id = %request.id, driver_id = %driver.id, trip_id = %trip.id, "request accepted");
        self.notifier
            .notify(
                request.passenger_id,
                "Driver on the way",
                &format!("{} accepted your ride", driver.name),
                json!({ "request_id": request.id, "trip_id": trip.id }),
            )
            .await;

        Ok((request, trip, booking))
    }

    /// Passenger-side cancellation, allowed until a driver has accepted.
    pub async fn cancel_ride_request(&self, request_id: Uuid) -> Result<RideRequest, CoreError> {
        let mut request = self.get_ride_request(request_id).await?;
        if request.status == RideRequestStatus::Cancelled {
            return Ok(request);
        }

        request.status = RideRequestStatus::Cancelled;
        request.cancelled_at = Some(Utc::now());
        let cancelled = self
            .store
            .update_ride_request_if_status(
                &request,
                &[
                    RideRequestStatus::Pending,
                    RideRequestStatus::Searching,
                    RideRequestStatus::Matched,
                ],
            )
            .await?;
        if !cancelled {
            let current = self.get_ride_request(request_id).await?;
            return Err(CoreError::Validation(format!(
                "cannot cancel a request in status {}",
                current.status.as_str()
            )));
        }
        info!(request_id = %request.id, "ride request cancelled");
        Ok(request)
    }

    pub async fn get_ride_request(&self, request_id: Uuid) -> Result<RideRequest, CoreError> {
        self.store
            .get_ride_request(request_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("ride request {}", request_id)))
    }

    async fn nearest_eligible_driver(
        &self,
        request: &RideRequest,
    ) -> Result<Option<(Driver, f64)>, CoreError> {
        let candidates = self
            .store
            .list_available_drivers(request.vehicle_class)
            .await?;
        let mut best: Option<(Driver, f64)> = None;
        for driver in candidates {
            if request.org_restricted && driver.organization_id != request.organization_id {
                continue;
            }
            let distance = geo::distance_km(driver.location, request.pickup);
            if distance > self.search_radius_km {
                continue;
            }
            if best.as_ref().map_or(true, |(_, d)| distance < *d) {
                best = Some((driver, distance));
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notify::LogNotifier;
    use crate::store::MemoryStore;

    fn matcher(store: Arc<dyn RecordStore>) -> RideRequestMatcher {
        RideRequestMatcher::new(
            store,
            Arc::new(LogNotifier),
            FareConfig::default(),
            5.0,
            300,
            30.0,
        )
    }

    fn input() -> RideRequestInput {
        RideRequestInput {
            passenger_id: Uuid::new_v4(),
            pickup: Coordinates::new(12.9716, 77.5946),
            pickup_label: "MG Road".into(),
            drop: Coordinates::new(12.9352, 77.6245),
            drop_label: "Koramangala".into(),
            vehicle_class: VehicleClass::Car,
            distance_km: Some(8.0),
            duration_min: Some(25.0),
            promo_code: None,
            org_restricted: false,
            organization_id: None,
        }
    }

    fn nearby_driver(class: VehicleClass) -> Driver {
        Driver::new(
            "Ravi".into(),
            class,
            Coordinates::new(12.9750, 77.5990),
            None,
        )
    }

    #[tokio::test]
    async fn create_quotes_a_fare_and_starts_pending() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let matcher = matcher(store);
        let request = matcher.create_ride_request(input()).await.unwrap();
        assert_eq!(request.status, RideRequestStatus::Pending);
        assert!(request.quoted_fare.total_fare > bigdecimal::BigDecimal::from(0));
        assert!(request.driver_id.is_none());
    }

    #[tokio::test]
    async fn rejects_invalid_pickup() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let matcher = matcher(store);
        let mut bad = input();
        bad.pickup = Coordinates::new(95.0, 77.59);
        assert!(matches!(
            matcher.create_ride_request(bad).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn matches_nearest_driver_of_requested_class() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let far = Driver::new(
            "Far".into(),
            VehicleClass::Car,
            Coordinates::new(13.10, 77.70),
            None,
        );
        let near = nearby_driver(VehicleClass::Car);
        let wrong_class = nearby_driver(VehicleClass::Bike);
        store.upsert_driver(&far).await.unwrap();
        store.upsert_driver(&near).await.unwrap();
        store.upsert_driver(&wrong_class).await.unwrap();

        let matcher = matcher(store);
        let request = matcher.create_ride_request(input()).await.unwrap();
        let matched = matcher.auto_match(request.id).await.unwrap();
        assert_eq!(matched.status, RideRequestStatus::Matched);
        assert_eq!(matched.driver_id, Some(near.id));
    }

    #[tokio::test]
    async fn no_driver_in_radius_keeps_searching() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let matcher = matcher(store);
        let request = matcher.create_ride_request(input()).await.unwrap();
        let after = matcher.auto_match(request.id).await.unwrap();
        assert_eq!(after.status, RideRequestStatus::Searching);
    }

    #[tokio::test]
    async fn org_restricted_request_skips_foreign_drivers() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let org = Uuid::new_v4();
        let outside = nearby_driver(VehicleClass::Car);
        store.upsert_driver(&outside).await.unwrap();
        let mut inside = nearby_driver(VehicleClass::Car);
        inside.organization_id = Some(org);
        store.upsert_driver(&inside).await.unwrap();

        let matcher = matcher(store);
        let mut restricted = input();
        restricted.org_restricted = true;
        restricted.organization_id = Some(org);
        let request = matcher.create_ride_request(restricted).await.unwrap();
        let matched = matcher.auto_match(request.id).await.unwrap();
        assert_eq!(matched.driver_id, Some(inside.id));
    }

    #[tokio::test]
    async fn accept_creates_trip_and_booking_and_marks_driver_busy() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let driver = nearby_driver(VehicleClass::Car);
        store.upsert_driver(&driver).await.unwrap();

        let matcher = matcher(store.clone());
        let request = matcher.create_ride_request(input()).await.unwrap();
        matcher.auto_match(request.id).await.unwrap();
        let (accepted, trip, booking) = matcher.accept_request(request.id, driver.id).await.unwrap();

        assert_eq!(accepted.status, RideRequestStatus::Accepted);
        assert_eq!(accepted.trip_id, Some(trip.id));
        assert_eq!(trip.driver_id, driver.id);
        assert_eq!(trip.price_per_seat, request.quoted_fare.total_fare);
        assert_eq!(booking.total_amount, request.quoted_fare.total_fare);
        assert_eq!(
            trip.seats_available,
            VehicleClass::Car.seat_capacity() - 1
        );
        assert!(!store.get_driver(driver.id).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn second_accept_loses_with_conflict() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let first = nearby_driver(VehicleClass::Car);
        let second = nearby_driver(VehicleClass::Car);
        store.upsert_driver(&first).await.unwrap();
        store.upsert_driver(&second).await.unwrap();

        let matcher = matcher(store);
        let request = matcher.create_ride_request(input()).await.unwrap();
        matcher.accept_request(request.id, first.id).await.unwrap();
        assert!(matches!(
            matcher.accept_request(request.id, second.id).await,
            Err(CoreError::AlreadyMatched)
        ));
    }

    #[tokio::test]
    async fn cancel_before_accept_and_not_after() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let driver = nearby_driver(VehicleClass::Car);
        store.upsert_driver(&driver).await.unwrap();

        let matcher = matcher(store);
        let request = matcher.create_ride_request(input()).await.unwrap();
        let cancelled = matcher.cancel_ride_request(request.id).await.unwrap();
        assert_eq!(cancelled.status, RideRequestStatus::Cancelled);
        // Cancelling again is a no-op.
        matcher.cancel_ride_request(request.id).await.unwrap();

        let request = matcher.create_ride_request(input()).await.unwrap();
        matcher.accept_request(request.id, driver.id).await.unwrap();
        assert!(matches!(
            matcher.cancel_ride_request(request.id).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn promo_is_applied_and_usage_counted() {
        use crate::domain::{DiscountType, PromoCode};
        use bigdecimal::BigDecimal;
        use chrono::Duration;

        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let promo = PromoCode {
            code: "FLAT50".into(),
            discount_type: DiscountType::Fixed,
            value: BigDecimal::from(50),
            max_discount: None,
            min_amount: BigDecimal::from(0),
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            usage_limit: 10,
            used_count: 0,
            active: true,
        };
        store.upsert_promo(&promo).await.unwrap();

        let matcher = matcher(store.clone());
        let mut with_promo = input();
        with_promo.promo_code = Some("FLAT50".into());
        let request = matcher.create_ride_request(with_promo).await.unwrap();
        assert_eq!(request.quoted_fare.discount, BigDecimal::from(50));
        assert_eq!(
            store.get_promo("FLAT50").await.unwrap().unwrap().used_count,
            1
        );
    }
}
