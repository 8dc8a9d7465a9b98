//! Barber discovery, account eligibility, and the HTTP surface of the BarberGo marketplace.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
