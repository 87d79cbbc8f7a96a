//! Domain entities: framework-agnostic records for ride coordination.

pub mod booking;
pub mod driver;
pub mod fare;
pub mod location;
pub mod promo;
pub mod ride_request;
pub mod trip;
pub mod wallet;

pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use driver::Driver;
pub use fare::FareBreakdown;
pub use location::LiveLocationSample;
pub use promo::{DiscountType, PromoCode};
pub use ride_request::{RideRequest, RideRequestStatus, VehicleClass};
pub use trip::{Trip, TripStatus};
pub use wallet::{
    TransactionCategory, TransactionStatus, TransactionType, Wallet, WalletTransaction,
};
