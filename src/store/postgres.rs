//! Postgres-backed record store.
//!
//! Conditional updates are expressed as `UPDATE ... WHERE status = ANY(...)`
//! guards; the wallet debit and the acceptance compound run inside a single
//! database transaction.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, Driver, FareBreakdown, PaymentStatus, PromoCode, DiscountType,
    RideRequest, RideRequestStatus, Trip, TripStatus, TransactionCategory, TransactionStatus,
    TransactionType, Wallet, WalletTransaction, VehicleClass,
};
use crate::geo::Coordinates;

use super::{DebitOutcome, RecordStore, StoreError};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_enum<T>(raw: &str, parse: fn(&str) -> Option<T>, what: &str) -> Result<T, StoreError> {
    parse(raw).ok_or_else(|| StoreError::Internal(format!("unknown {} value: {}", what, raw)))
}

fn statuses_text(expected: &[RideRequestStatus]) -> Vec<String> {
    expected.iter().map(|s| s.as_str().to_string()).collect()
}

fn map_ride_request(row: &PgRow) -> Result<RideRequest, StoreError> {
    let status: String = row.try_get("status")?;
    let vehicle_class: String = row.try_get("vehicle_class")?;
    let fare: Json<FareBreakdown> = row.try_get("fare")?;
    Ok(RideRequest {
        id: row.try_get("id")?,
        passenger_id: row.try_get("passenger_id")?,
        pickup: Coordinates::new(row.try_get("pickup_lat")?, row.try_get("pickup_lng")?),
        pickup_label: row.try_get("pickup_label")?,
        drop: Coordinates::new(row.try_get("drop_lat")?, row.try_get("drop_lng")?),
        drop_label: row.try_get("drop_label")?,
        vehicle_class: parse_enum(&vehicle_class, VehicleClass::parse, "vehicle class")?,
        quoted_fare: fare.0,
        distance_km: row.try_get("distance_km")?,
        duration_min: row.try_get("duration_min")?,
        status: parse_enum(&status, RideRequestStatus::parse, "ride request status")?,
        driver_id: row.try_get("driver_id")?,
        trip_id: row.try_get("trip_id")?,
        promo_code: row.try_get("promo_code")?,
        surge_multiplier: row.try_get("surge_multiplier")?,
        org_restricted: row.try_get("org_restricted")?,
        organization_id: row.try_get("organization_id")?,
        created_at: row.try_get("created_at")?,
        matched_at: row.try_get("matched_at")?,
        accepted_at: row.try_get("accepted_at")?,
        cancelled_at: row.try_get("cancelled_at")?,
    })
}

fn map_trip(row: &PgRow) -> Result<Trip, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(Trip {
        id: row.try_get("id")?,
        driver_id: row.try_get("driver_id")?,
        pickup: Coordinates::new(row.try_get("pickup_lat")?, row.try_get("pickup_lng")?),
        drop: Coordinates::new(row.try_get("drop_lat")?, row.try_get("drop_lng")?),
        distance_km: row.try_get("distance_km")?,
        duration_min: row.try_get("duration_min")?,
        price_per_seat: row.try_get("price_per_seat")?,
        total_seats: row.try_get("total_seats")?,
        seats_available: row.try_get("seats_available")?,
        status: parse_enum(&status, TripStatus::parse, "trip status")?,
        route_polyline: row.try_get("route_polyline")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_booking(row: &PgRow) -> Result<Booking, StoreError> {
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;
    Ok(Booking {
        id: row.try_get("id")?,
        trip_id: row.try_get("trip_id")?,
        passenger_id: row.try_get("passenger_id")?,
        seats: row.try_get("seats")?,
        total_amount: row.try_get("total_amount")?,
        status: parse_enum(&status, BookingStatus::parse, "booking status")?,
        payment_status: parse_enum(&payment_status, PaymentStatus::parse, "payment status")?,
        wallet_transaction_id: row.try_get("wallet_transaction_id")?,
        pickup_note: row.try_get("pickup_note")?,
        drop_note: row.try_get("drop_note")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_wallet(row: &PgRow) -> Result<Wallet, StoreError> {
    Ok(Wallet {
        user_id: row.try_get("user_id")?,
        balance: row.try_get("balance")?,
        blocked: row.try_get("blocked")?,
        total_added: row.try_get("total_added")?,
        total_spent: row.try_get("total_spent")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_transaction(row: &PgRow) -> Result<WalletTransaction, StoreError> {
    let txn_type: String = row.try_get("txn_type")?;
    let category: String = row.try_get("category")?;
    let status: String = row.try_get("status")?;
    Ok(WalletTransaction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        txn_type: parse_enum(&txn_type, TransactionType::parse, "transaction type")?,
        amount: row.try_get("amount")?,
        balance_after: row.try_get("balance_after")?,
        category: parse_enum(&category, TransactionCategory::parse, "transaction category")?,
        reference_id: row.try_get("reference_id")?,
        status: parse_enum(&status, TransactionStatus::parse, "transaction status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_promo(row: &PgRow) -> Result<PromoCode, StoreError> {
    let discount_type: String = row.try_get("discount_type")?;
    Ok(PromoCode {
        code: row.try_get("code")?,
        discount_type: parse_enum(&discount_type, DiscountType::parse, "discount type")?,
        value: row.try_get("value")?,
        max_discount: row.try_get("max_discount")?,
        min_amount: row.try_get("min_amount")?,
        valid_from: row.try_get("valid_from")?,
        valid_until: row.try_get("valid_until")?,
        usage_limit: row.try_get("usage_limit")?,
        used_count: row.try_get("used_count")?,
        active: row.try_get("active")?,
    })
}

fn map_driver(row: &PgRow) -> Result<Driver, StoreError> {
    let vehicle_class: String = row.try_get("vehicle_class")?;
    Ok(Driver {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        vehicle_class: parse_enum(&vehicle_class, VehicleClass::parse, "vehicle class")?,
        available: row.try_get("available")?,
        organization_id: row.try_get("organization_id")?,
        location: Coordinates::new(row.try_get("lat")?, row.try_get("lng")?),
        updated_at: row.try_get("updated_at")?,
    })
}

const UPDATE_RIDE_REQUEST_GUARDED: &str = r#"
    UPDATE ride_requests SET
        status = $2, driver_id = $3, trip_id = $4, promo_code = $5, fare = $6,
        matched_at = $7, accepted_at = $8, cancelled_at = $9
    WHERE id = $1 AND status = ANY($10)
"#;

const INSERT_TRIP: &str = r#"
    INSERT INTO trips (
        id, driver_id, pickup_lat, pickup_lng, drop_lat, drop_lng,
        distance_km, duration_min, price_per_seat, total_seats, seats_available,
        status, route_polyline, created_at, updated_at
    ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
"#;

const INSERT_BOOKING: &str = r#"
    INSERT INTO bookings (
        id, trip_id, passenger_id, seats, total_amount, status, payment_status,
        wallet_transaction_id, pickup_note, drop_note, created_at, updated_at
    ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
"#;

const INSERT_WALLET_TRANSACTION: &str = r#"
    INSERT INTO wallet_transactions (
        id, user_id, txn_type, amount, balance_after, category, reference_id,
        status, created_at
    ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
"#;

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_ride_request(&self, request: &RideRequest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ride_requests (
                id, passenger_id, pickup_lat, pickup_lng, pickup_label,
                drop_lat, drop_lng, drop_label, vehicle_class, fare,
                distance_km, duration_min, status, driver_id, trip_id,
                promo_code, surge_multiplier, org_restricted, organization_id,
                created_at, matched_at, accepted_at, cancelled_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,$22,$23)
            "#,
        )
        .bind(request.id)
        .bind(request.passenger_id)
        .bind(request.pickup.lat)
        .bind(request.pickup.lng)
        .bind(&request.pickup_label)
        .bind(request.drop.lat)
        .bind(request.drop.lng)
        .bind(&request.drop_label)
        .bind(request.vehicle_class.as_str())
        .bind(Json(&request.quoted_fare))
        .bind(request.distance_km)
        .bind(request.duration_min)
        .bind(request.status.as_str())
        .bind(request.driver_id)
        .bind(request.trip_id)
        .bind(&request.promo_code)
        .bind(request.surge_multiplier)
        .bind(request.org_restricted)
        .bind(request.organization_id)
        .bind(request.created_at)
        .bind(request.matched_at)
        .bind(request.accepted_at)
        .bind(request.cancelled_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_ride_request(&self, id: Uuid) -> Result<Option<RideRequest>, StoreError> {
        let row = sqlx::query("SELECT * FROM ride_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| map_ride_request(&r)).transpose()
    }

    async fn update_ride_request_if_status(
        &self,
        request: &RideRequest,
        expected: &[RideRequestStatus],
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(UPDATE_RIDE_REQUEST_GUARDED)
            .bind(request.id)
            .bind(request.status.as_str())
            .bind(request.driver_id)
            .bind(request.trip_id)
            .bind(&request.promo_code)
            .bind(Json(&request.quoted_fare))
            .bind(request.matched_at)
            .bind(request.accepted_at)
            .bind(request.cancelled_at)
            .bind(statuses_text(expected))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn accept_ride_request(
        &self,
        request: &RideRequest,
        trip: &Trip,
        booking: &Booking,
        expected: &[RideRequestStatus],
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let guarded = sqlx::query(UPDATE_RIDE_REQUEST_GUARDED)
            .bind(request.id)
            .bind(request.status.as_str())
            .bind(request.driver_id)
            .bind(request.trip_id)
            .bind(&request.promo_code)
            .bind(Json(&request.quoted_fare))
            .bind(request.matched_at)
            .bind(request.accepted_at)
            .bind(request.cancelled_at)
            .bind(statuses_text(expected))
            .execute(&mut *tx)
            .await?;
        if guarded.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(INSERT_TRIP)
            .bind(trip.id)
            .bind(trip.driver_id)
            .bind(trip.pickup.lat)
            .bind(trip.pickup.lng)
            .bind(trip.drop.lat)
            .bind(trip.drop.lng)
            .bind(trip.distance_km)
            .bind(trip.duration_min)
            .bind(&trip.price_per_seat)
            .bind(trip.total_seats)
            .bind(trip.seats_available)
            .bind(trip.status.as_str())
            .bind(&trip.route_polyline)
            .bind(trip.created_at)
            .bind(trip.updated_at)
            .execute(&mut *tx)
            .await?;

        sqlx::query(INSERT_BOOKING)
            .bind(booking.id)
            .bind(booking.trip_id)
            .bind(booking.passenger_id)
            .bind(booking.seats)
            .bind(&booking.total_amount)
            .bind(booking.status.as_str())
            .bind(booking.payment_status.as_str())
            .bind(booking.wallet_transaction_id)
            .bind(&booking.pickup_note)
            .bind(&booking.drop_note)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StoreError> {
        let row = sqlx::query("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| map_trip(&r)).transpose()
    }

    async fn update_trip_if_status(
        &self,
        trip: &Trip,
        expected: &[TripStatus],
    ) -> Result<bool, StoreError> {
        let expected: Vec<String> = expected.iter().map(|s| s.as_str().to_string()).collect();
        let result = sqlx::query(
            r#"
            UPDATE trips SET
                status = $2, seats_available = $3, route_polyline = $4, updated_at = $5
            WHERE id = $1 AND status = ANY($6)
            "#,
        )
        .bind(trip.id)
        .bind(trip.status.as_str())
        .bind(trip.seats_available)
        .bind(&trip.route_polyline)
        .bind(trip.updated_at)
        .bind(expected)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| map_booking(&r)).transpose()
    }

    async fn upsert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, trip_id, passenger_id, seats, total_amount, status, payment_status,
                wallet_transaction_id, pickup_note, drop_note, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            ON CONFLICT (id) DO UPDATE SET
                status = $6, payment_status = $7, wallet_transaction_id = $8,
                pickup_note = $9, drop_note = $10, updated_at = $12
            "#,
        )
        .bind(booking.id)
        .bind(booking.trip_id)
        .bind(booking.passenger_id)
        .bind(booking.seats)
        .bind(&booking.total_amount)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.wallet_transaction_id)
        .bind(&booking.pickup_note)
        .bind(&booking.drop_note)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_bookings_for_trip(
        &self,
        trip_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM bookings WHERE trip_id = $1 AND status = $2 ORDER BY created_at ASC",
                )
                .bind(trip_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM bookings WHERE trip_id = $1 ORDER BY created_at ASC")
                    .bind(trip_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(map_booking).collect()
    }

    async fn get_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, StoreError> {
        let row = sqlx::query("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| map_wallet(&r)).transpose()
    }

    async fn create_wallet_if_absent(&self, user_id: Uuid) -> Result<Wallet, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balance, blocked, total_added, total_spent, created_at, updated_at)
            VALUES ($1, 0, 0, 0, 0, NOW(), NOW())
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        let row = sqlx::query("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        map_wallet(&row)
    }

    async fn credit_wallet(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<(Wallet, WalletTransaction), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balance, blocked, total_added, total_spent, created_at, updated_at)
            VALUES ($1, 0, 0, 0, 0, NOW(), NOW())
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            r#"
            UPDATE wallets SET
                balance = balance + $2, total_added = total_added + $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;
        let wallet = map_wallet(&row)?;

        let transaction = WalletTransaction::completed(
            user_id,
            TransactionType::Credit,
            amount.clone(),
            wallet.balance.clone(),
            category,
            reference_id,
        );
        sqlx::query(INSERT_WALLET_TRANSACTION)
            .bind(transaction.id)
            .bind(transaction.user_id)
            .bind(transaction.txn_type.as_str())
            .bind(&transaction.amount)
            .bind(&transaction.balance_after)
            .bind(transaction.category.as_str())
            .bind(transaction.reference_id)
            .bind(transaction.status.as_str())
            .bind(transaction.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((wallet, transaction))
    }

    async fn debit_wallet(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<DebitOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The balance guard in the WHERE clause is the compare-and-set: a
        // concurrent debit that would overdraw matches zero rows.
        let row = sqlx::query(
            r#"
            UPDATE wallets SET
                balance = balance - $2, total_spent = total_spent + $2, updated_at = NOW()
            WHERE user_id = $1 AND balance >= $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            let available = sqlx::query_scalar::<_, BigDecimal>(
                "SELECT balance FROM wallets WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or_else(|| BigDecimal::from(0));
            return Ok(DebitOutcome::InsufficientBalance { available });
        };
        let wallet = map_wallet(&row)?;

        let transaction = WalletTransaction::completed(
            user_id,
            TransactionType::Debit,
            amount.clone(),
            wallet.balance.clone(),
            category,
            reference_id,
        );
        sqlx::query(INSERT_WALLET_TRANSACTION)
            .bind(transaction.id)
            .bind(transaction.user_id)
            .bind(transaction.txn_type.as_str())
            .bind(&transaction.amount)
            .bind(&transaction.balance_after)
            .bind(transaction.category.as_str())
            .bind(transaction.reference_id)
            .bind(transaction.status.as_str())
            .bind(transaction.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DebitOutcome::Applied {
            wallet,
            transaction,
        })
    }

    async fn list_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM wallet_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_transaction).collect()
    }

    async fn sum_debits_since(
        &self,
        user_id: Uuid,
        category: TransactionCategory,
        since: DateTime<Utc>,
    ) -> Result<BigDecimal, StoreError> {
        let total = sqlx::query_scalar::<_, BigDecimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM wallet_transactions
            WHERE user_id = $1 AND txn_type = 'debit' AND category = $2
              AND status = 'completed' AND created_at >= $3
            "#,
        )
        .bind(user_id)
        .bind(category.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn get_promo(&self, code: &str) -> Result<Option<PromoCode>, StoreError> {
        let row = sqlx::query("SELECT * FROM promo_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| map_promo(&r)).transpose()
    }

    async fn upsert_promo(&self, promo: &PromoCode) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO promo_codes (
                code, discount_type, value, max_discount, min_amount,
                valid_from, valid_until, usage_limit, used_count, active
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            ON CONFLICT (code) DO UPDATE SET
                discount_type = $2, value = $3, max_discount = $4, min_amount = $5,
                valid_from = $6, valid_until = $7, usage_limit = $8,
                used_count = $9, active = $10
            "#,
        )
        .bind(&promo.code)
        .bind(promo.discount_type.as_str())
        .bind(&promo.value)
        .bind(&promo.max_discount)
        .bind(&promo.min_amount)
        .bind(promo.valid_from)
        .bind(promo.valid_until)
        .bind(promo.usage_limit)
        .bind(promo.used_count)
        .bind(promo.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn increment_promo_usage(&self, code: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE promo_codes SET used_count = used_count + 1 WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_driver(&self, driver: &Driver) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO drivers (id, name, vehicle_class, available, organization_id, lat, lng, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            ON CONFLICT (id) DO UPDATE SET
                name = $2, vehicle_class = $3, available = $4,
                organization_id = $5, lat = $6, lng = $7, updated_at = $8
            "#,
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(driver.vehicle_class.as_str())
        .bind(driver.available)
        .bind(driver.organization_id)
        .bind(driver.location.lat)
        .bind(driver.location.lng)
        .bind(driver.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        let row = sqlx::query("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| map_driver(&r)).transpose()
    }

    async fn list_available_drivers(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<Driver>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM drivers WHERE available = TRUE AND vehicle_class = $1",
        )
        .bind(vehicle_class.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_driver).collect()
    }
}
