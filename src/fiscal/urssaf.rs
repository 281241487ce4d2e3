//! URSSAF social contribution on recognized revenue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    is_recognized_in, validate_operations, DeadlineSchedule, Operation, Period, Rate,
    ValidationIssue,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrssafCalculation {
    pub period: Period,
    /// Revenue excluding VAT from sales recognized in the period.
    pub revenue_ht_cents: i64,
    pub rate: Rate,
    pub due_cents: i64,
    pub payment_date: NaiveDate,
    pub operations_included: Vec<Uuid>,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

/// `rate` is already normalized by the settings layer; no unit is inferred here.
pub fn compute_urssaf(
    operations: &[Operation],
    period: Period,
    rate: Rate,
    schedule: &DeadlineSchedule,
) -> UrssafCalculation {
    let mut revenue_ht_cents = 0i64;
    let mut operations_included = Vec::new();
    for op in operations.iter().filter(|op| op.is_sale()) {
        if is_recognized_in(op, period).included {
            revenue_ht_cents += op.amount_ht_cents;
            operations_included.push(op.id);
        }
    }

    let due_cents = rate.apply(revenue_ht_cents);
    tracing::debug!(period = %period, revenue_ht_cents, rate = %rate, due_cents, "URSSAF computed");

    UrssafCalculation {
        period,
        revenue_ht_cents,
        rate,
        due_cents,
        payment_date: schedule.urssaf_payment_date(period),
        operations_included,
        issues: validate_operations(operations.iter().filter(|op| op.is_sale())),
    }
}
