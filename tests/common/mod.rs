#![allow(dead_code)]

use chrono::NaiveDate;
use fiscal_core::fiscal::{Operation, Period, Rate};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn period(key: &str) -> Period {
    key.parse().expect("valid period key")
}

pub fn twenty() -> Rate {
    Rate::from_percent(20.0)
}

/// A quarter of freelance activity: service sales on payments, one goods sale, purchases.
pub fn first_quarter() -> Vec<Operation> {
    vec![
        Operation::sale("ACME", 300_000, twenty(), date(2025, 1, 10))
            .with_label("January retainer")
            .paid_on(date(2025, 1, 25)),
        Operation::sale("Globex", 150_000, twenty(), date(2025, 1, 28))
            .with_label("Audit")
            .paid_on(date(2025, 2, 12)),
        Operation::sale("Initech", 80_000, Rate::from_percent(5.5), date(2025, 2, 3))
            .with_label("Printed manuals")
            .as_goods()
            .delivered_on(date(2025, 2, 10))
            .paid_on(date(2025, 3, 30)),
        Operation::sale("Umbrella", 120_000, twenty(), date(2025, 3, 15)).with_label("Workshop"),
        Operation::purchase("Cloud Host", 20_000, twenty(), date(2025, 1, 2)),
        Operation::purchase("Laptop Store", 180_000, twenty(), date(2025, 2, 14)),
        Operation::purchase("Bistro", 6_000, Rate::from_percent(10.0), date(2025, 3, 3))
            .non_deductible(),
    ]
}
