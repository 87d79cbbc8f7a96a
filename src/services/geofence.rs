//! Live trip tracking and proximity detection.
//!
//! Each tracked trip gets its own task consuming a location channel. The task
//! owns the one-shot arrival and completion flags, so the pickup and drop
//! transitions fire exactly once per trip no matter how many samples cross
//! the threshold. Completion triggers settlement.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{LiveLocationSample, Trip, TripStatus};
use crate::error::CoreError;
use crate::geo::{self, Coordinates};
use crate::store::RecordStore;

use super::notify::Notifier;
use super::settlement::SettlementEngine;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct GeofenceConfig {
    /// Distance to pickup or drop below which the driver counts as there.
    pub arrival_threshold_km: f64,
    /// Speed assumed for ETA when the reported speed is zero or tiny.
    pub fallback_speed_kmh: f64,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            arrival_threshold_km: 0.1,
            fallback_speed_kmh: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeofenceEvent {
    ArrivedAtPickup,
    TripCompleted,
}

/// Latest derived tracking state for a trip.
#[derive(Debug, Clone, Serialize)]
pub struct TripProgress {
    pub trip_id: Uuid,
    pub position: Coordinates,
    pub distance_to_pickup_km: f64,
    pub distance_to_drop_km: f64,
    pub eta_min: f64,
    pub arrived_at_pickup: bool,
    pub completed: bool,
}

/// Pure per-trip proximity state machine. Feeding it samples yields progress
/// snapshots plus the at-most-once arrival and completion events.
pub struct TripTracker {
    trip_id: Uuid,
    pickup: Coordinates,
    drop: Coordinates,
    config: GeofenceConfig,
    arrived: bool,
    completed: bool,
}

impl TripTracker {
    pub fn new(trip: &Trip, config: GeofenceConfig) -> Self {
        Self {
            trip_id: trip.id,
            pickup: trip.pickup,
            drop: trip.drop,
            config,
            arrived: trip.status != TripStatus::Upcoming,
            completed: trip.status.is_terminal(),
        }
    }

    pub fn observe(&mut self, sample: &LiveLocationSample) -> (TripProgress, Vec<GeofenceEvent>) {
        let distance_to_pickup_km = geo::distance_km(sample.position, self.pickup);
        let distance_to_drop_km = geo::distance_km(sample.position, self.drop);

        let mut events = Vec::new();
        if !self.arrived && distance_to_pickup_km < self.config.arrival_threshold_km {
            self.arrived = true;
            events.push(GeofenceEvent::ArrivedAtPickup);
        }
        if !self.completed && distance_to_drop_km < self.config.arrival_threshold_km {
            self.completed = true;
            events.push(GeofenceEvent::TripCompleted);
        }

        let speed = sample.speed_kmh.max(self.config.fallback_speed_kmh);
        let eta_min = (distance_to_drop_km / speed * 60.0 * 10.0).round() / 10.0;

        let progress = TripProgress {
            trip_id: self.trip_id,
            position: sample.position,
            distance_to_pickup_km,
            distance_to_drop_km,
            eta_min,
            arrived_at_pickup: self.arrived,
            completed: self.completed,
        };
        (progress, events)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Registry of open per-trip location channels.
#[derive(Default)]
pub struct LocationFeed {
    senders: Mutex<HashMap<Uuid, mpsc::Sender<LiveLocationSample>>>,
}

impl LocationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel for a trip, replacing any previous one.
    pub async fn open(&self, trip_id: Uuid) -> mpsc::Receiver<LiveLocationSample> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.senders.lock().await.insert(trip_id, tx);
        rx
    }

    /// Deliver a sample to the trip's channel. Returns false when the trip is
    /// not being tracked or its task has gone away.
    pub async fn publish(&self, sample: LiveLocationSample) -> bool {
        let sender = {
            let senders = self.senders.lock().await;
            senders.get(&sample.trip_id).cloned()
        };
        match sender {
            Some(tx) => tx.send(sample).await.is_ok(),
            None => false,
        }
    }

    pub async fn close(&self, trip_id: Uuid) {
        self.senders.lock().await.remove(&trip_id);
    }

    pub async fn is_open(&self, trip_id: Uuid) -> bool {
        self.senders.lock().await.contains_key(&trip_id)
    }
}

pub struct GeofenceMonitor {
    store: Arc<dyn RecordStore>,
    settlement: Arc<SettlementEngine>,
    notifier: Arc<dyn Notifier>,
    feed: Arc<LocationFeed>,
    config: GeofenceConfig,
    progress: Mutex<HashMap<Uuid, watch::Receiver<Option<TripProgress>>>>,
    tasks: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl GeofenceMonitor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        settlement: Arc<SettlementEngine>,
        notifier: Arc<dyn Notifier>,
        feed: Arc<LocationFeed>,
        config: GeofenceConfig,
    ) -> Self {
        Self {
            store,
            settlement,
            notifier,
            feed,
            config,
            progress: Mutex::new(HashMap::new()),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Begin tracking a trip. Idempotent while the trip's channel is open.
    pub async fn start_tracking(self: &Arc<Self>, trip_id: Uuid) -> Result<(), CoreError> {
        if self.feed.is_open(trip_id).await {
            return Ok(());
        }

        let trip = self
            .store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("trip {}", trip_id)))?;
        if trip.status.is_terminal() {
            return Err(CoreError::Validation(format!(
                "trip {} is already {}",
                trip_id,
                trip.status.as_str()
            )));
        }

        let rx = self.feed.open(trip_id).await;
        let (progress_tx, progress_rx) = watch::channel(None);
        self.progress.lock().await.insert(trip_id, progress_rx);

        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            monitor.track(trip, rx, progress_tx).await;
        });
        self.tasks.lock().await.insert(trip_id, handle);
        info!(%trip_id, "trip tracking started");
        Ok(())
    }

    /// Stop tracking a trip. Aborts the per-trip task, so samples still
    /// buffered in its channel are discarded and can no longer produce
    /// arrival or completion transitions.
    pub async fn stop_tracking(&self, trip_id: Uuid) {
        self.feed.close(trip_id).await;
        if let Some(handle) = self.tasks.lock().await.remove(&trip_id) {
            handle.abort();
        }
        self.progress.lock().await.remove(&trip_id);
    }

    /// Latest progress snapshot, if the trip is or was being tracked.
    pub async fn progress(&self, trip_id: Uuid) -> Option<TripProgress> {
        let progress = self.progress.lock().await;
        progress.get(&trip_id).and_then(|rx| rx.borrow().clone())
    }

    async fn track(
        &self,
        trip: Trip,
        mut rx: mpsc::Receiver<LiveLocationSample>,
        progress_tx: watch::Sender<Option<TripProgress>>,
    ) {
        let trip_id = trip.id;
        let mut tracker = TripTracker::new(&trip, self.config.clone());

        while let Some(sample) = rx.recv().await {
            if sample.trip_id != trip_id || !sample.is_well_formed() {
                warn!(%trip_id, "dropping malformed location sample");
                continue;
            }

            let (progress, events) = tracker.observe(&sample);
            let _ = progress_tx.send(Some(progress));

            for event in events {
                if let Err(e) = self.handle_event(&trip, event).await {
                    error!(%trip_id, error = %e, "geofence transition failed");
                }
            }

            if tracker.is_completed() {
                break;
            }
        }

        self.feed.close(trip_id).await;
        self.tasks.lock().await.remove(&trip_id);
        info!(%trip_id, "trip tracking stopped");
    }

    async fn handle_event(&self, trip: &Trip, event: GeofenceEvent) -> Result<(), CoreError> {
        match event {
            GeofenceEvent::ArrivedAtPickup => {
                let mut ongoing = trip.clone();
                ongoing.status = TripStatus::Ongoing;
                ongoing.updated_at = chrono::Utc::now();
                // A trip already moved on by another path is left alone.
                if self
                    .store
                    .update_trip_if_status(&ongoing, &[TripStatus::Upcoming])
                    .await?
                {
                    info!(trip_id = %trip.id, "driver arrived at pickup, trip ongoing");
                    self.notify_passengers(
                        trip,
                        "Driver arrived",
                        "Your driver has reached the pickup point",
                    )
                    .await?;
                }
            }
            GeofenceEvent::TripCompleted => {
                let mut completed = trip.clone();
                completed.status = TripStatus::Completed;
                completed.updated_at = chrono::Utc::now();
                if self
                    .store
                    .update_trip_if_status(
                        &completed,
                        &[TripStatus::Upcoming, TripStatus::Ongoing],
                    )
                    .await?
                {
                    info!(trip_id = %trip.id, "trip completed at drop point");
                    if let Err(e) = self.settlement.settle_trip(trip.id).await {
                        error!(trip_id = %trip.id, error = %e, "settlement after completion failed");
                    }
                    self.notify_passengers(trip, "Trip completed", "You have arrived")
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn notify_passengers(
        &self,
        trip: &Trip,
        title: &str,
        message: &str,
    ) -> Result<(), CoreError> {
        let bookings = self.store.list_bookings_for_trip(trip.id, None).await?;
        for booking in bookings {
            self.notifier
                .notify(
                    booking.passenger_id,
                    title,
                    message,
                    json!({ "trip_id": trip.id, "booking_id": booking.id }),
                )
                .await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    fn trip() -> Trip {
        Trip::new(
            Uuid::new_v4(),
            Coordinates::new(12.9716, 77.5946),
            Coordinates::new(12.9352, 77.6245),
            8.0,
            25.0,
            BigDecimal::from(250),
            4,
            1,
        )
    }

    fn sample(trip: &Trip, position: Coordinates, speed_kmh: f64) -> LiveLocationSample {
        LiveLocationSample {
            trip_id: trip.id,
            driver_id: trip.driver_id,
            position,
            heading: 0.0,
            speed_kmh,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn arrival_fires_exactly_once() {
        let trip = trip();
        let mut tracker = TripTracker::new(&trip, GeofenceConfig::default());

        // Approaching, still outside the threshold.
        let (progress, events) =
            tracker.observe(&sample(&trip, Coordinates::new(12.9800, 77.5900), 30.0));
        assert!(events.is_empty());
        assert!(!progress.arrived_at_pickup);

        // At the pickup point.
        let (progress, events) = tracker.observe(&sample(&trip, trip.pickup, 5.0));
        assert_eq!(events, vec![GeofenceEvent::ArrivedAtPickup]);
        assert!(progress.arrived_at_pickup);

        // Hovering at the pickup must not fire again.
        let (_, events) = tracker.observe(&sample(&trip, trip.pickup, 0.0));
        assert!(events.is_empty());
    }

    #[test]
    fn five_sample_approach_emits_one_arrival_on_the_fourth() {
        let trip = trip();
        let mut tracker = TripTracker::new(&trip, GeofenceConfig::default());

        // Roughly 1.1 km, 0.55 km and 0.22 km out, then two inside 0.1 km.
        let approach = [
            Coordinates::new(12.9816, 77.5946),
            Coordinates::new(12.9766, 77.5946),
            Coordinates::new(12.9736, 77.5946),
            Coordinates::new(12.9718, 77.5946),
            Coordinates::new(12.9716, 77.5946),
        ];
        let mut arrivals = Vec::new();
        for (i, position) in approach.iter().enumerate() {
            let (_, events) = tracker.observe(&sample(&trip, *position, 20.0));
            if events.contains(&GeofenceEvent::ArrivedAtPickup) {
                arrivals.push(i);
            }
        }
        assert_eq!(arrivals, vec![3]);
    }

    #[test]
    fn completion_fires_once_after_arrival() {
        let trip = trip();
        let mut tracker = TripTracker::new(&trip, GeofenceConfig::default());

        let (_, events) = tracker.observe(&sample(&trip, trip.pickup, 20.0));
        assert_eq!(events, vec![GeofenceEvent::ArrivedAtPickup]);

        let (progress, events) = tracker.observe(&sample(&trip, trip.drop, 20.0));
        assert_eq!(events, vec![GeofenceEvent::TripCompleted]);
        assert!(progress.completed);
        assert!(tracker.is_completed());

        // Hovering at the drop must not fire again.
        let (_, events) = tracker.observe(&sample(&trip, trip.drop, 0.0));
        assert!(events.is_empty());
    }

    #[test]
    fn completion_does_not_wait_for_a_pickup_arrival() {
        // The pickup sample can be lost (offline driver, dropped channel);
        // the drop geofence still has to close the trip out.
        let trip = trip();
        let mut tracker = TripTracker::new(&trip, GeofenceConfig::default());

        let (progress, events) = tracker.observe(&sample(&trip, trip.drop, 20.0));
        assert_eq!(events, vec![GeofenceEvent::TripCompleted]);
        assert!(progress.completed);
        assert!(!progress.arrived_at_pickup);
    }

    #[test]
    fn eta_uses_fallback_speed_when_crawling() {
        let trip = trip();
        let mut tracker = TripTracker::new(&trip, GeofenceConfig::default());
        let away = Coordinates::new(12.9000, 77.6000);

        let (crawling, _) = tracker.observe(&sample(&trip, away, 0.0));
        let (moving, _) = tracker.observe(&sample(&trip, away, 40.0));
        // Fallback speed is 20 km/h, so the crawling ETA is exactly twice the
        // 40 km/h one.
        assert!((crawling.eta_min - moving.eta_min * 2.0).abs() < 0.2);
        assert!(crawling.eta_min > 0.0);
    }

    #[tokio::test]
    async fn publish_to_unknown_trip_is_rejected() {
        let feed = LocationFeed::new();
        let trip = trip();
        assert!(!feed.publish(sample(&trip, trip.pickup, 10.0)).await);

        let mut rx = feed.open(trip.id).await;
        assert!(feed.publish(sample(&trip, trip.pickup, 10.0)).await);
        assert!(rx.recv().await.is_some());

        feed.close(trip.id).await;
        assert!(!feed.publish(sample(&trip, trip.pickup, 10.0)).await);
    }
}
