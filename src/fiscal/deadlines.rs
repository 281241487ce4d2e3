use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Period;

/// Fixed day-of-month rules for statutory dates. No holiday or banking-day shifting is applied:
/// a deadline landing on a weekend stays on that weekend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeadlineSchedule {
    pub vat_declaration_day: u32,
    pub vat_payment_day: u32,
    pub urssaf_payment_day: u32,
}

impl Default for DeadlineSchedule {
    fn default() -> Self {
        Self {
            vat_declaration_day: 12,
            vat_payment_day: 20,
            urssaf_payment_day: 5,
        }
    }
}

impl DeadlineSchedule {
    pub fn vat_declaration_date(&self, period: Period) -> NaiveDate {
        period.day_in_next_month(self.vat_declaration_day)
    }

    pub fn vat_payment_date(&self, period: Period) -> NaiveDate {
        period.day_in_next_month(self.vat_payment_day)
    }

    pub fn urssaf_payment_date(&self, period: Period) -> NaiveDate {
        period.day_in_next_month(self.urssaf_payment_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn december_deadlines_land_in_january() {
        let schedule = DeadlineSchedule::default();
        let december: Period = "2025-12".parse().unwrap();
        assert_eq!(schedule.vat_declaration_date(december).to_string(), "2026-01-12");
        assert_eq!(schedule.vat_payment_date(december).to_string(), "2026-01-20");
        assert_eq!(schedule.urssaf_payment_date(december).to_string(), "2026-01-05");
    }

    #[test]
    fn weekend_deadlines_are_not_shifted() {
        // 2025-10-12 is a Sunday
        let september: Period = "2025-09".parse().unwrap();
        let date = DeadlineSchedule::default().vat_declaration_date(september);
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 10, 12).unwrap());
    }
}
