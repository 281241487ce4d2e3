#![doc(test(attr(deny(warnings))))]

//! Fiscal Core computes, per calendar month, the VAT and URSSAF a French freelancer owes, the
//! cash left after provisioning for both, forward treasury projections and deadline alerts.
//!
//! ```
//! use chrono::NaiveDate;
//! use fiscal_core::fiscal::{compute_vat, DeadlineSchedule, Operation, Period, Rate};
//!
//! let invoiced = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
//! let paid = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
//! let sale = Operation::sale("ACME", 100_000, Rate::from_percent(20.0), invoiced).paid_on(paid);
//!
//! let march: Period = "2025-03".parse().unwrap();
//! let vat = compute_vat(&[sale], march, &DeadlineSchedule::default());
//! assert_eq!(vat.collected_cents, 20_000);
//! assert_eq!(vat.payment_date.to_string(), "2025-04-20");
//! ```

pub mod config;
pub mod currency;
pub mod errors;
pub mod fiscal;
pub mod services;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fiscal Core tracing initialized.");
    });
}
