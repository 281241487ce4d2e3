//! VAT (TVA) per period: collected on sales, deductible on purchases.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    is_recognized_in, validate_operations, DeadlineSchedule, Operation, OperationType, Period,
    Rate, RecognitionBasis, ValidationIssue,
};

/// Audit line for one operation considered by the VAT engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VatBreakdownLine {
    pub operation_id: Uuid,
    pub operation_type: OperationType,
    pub counterpart_label: String,
    pub amount_ht_cents: i64,
    pub vat_rate: Rate,
    pub vat_cents: i64,
    pub reference_date: NaiveDate,
    pub basis: RecognitionBasis,
    /// Whether the line contributes to `collected_cents` or `deductible_cents`.
    pub included: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VatCalculation {
    pub period: Period,
    pub collected_cents: i64,
    pub deductible_cents: i64,
    /// `max(0, collected - deductible)`; a credit is never carried as negative due.
    pub due_cents: i64,
    pub declaration_date: NaiveDate,
    pub payment_date: NaiveDate,
    pub breakdown: Vec<VatBreakdownLine>,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

impl VatCalculation {
    /// Deductible VAT exceeding collected VAT for the period.
    pub fn credit_cents(&self) -> i64 {
        (self.deductible_cents - self.collected_cents).max(0)
    }
}

pub fn compute_vat(
    operations: &[Operation],
    period: Period,
    schedule: &DeadlineSchedule,
) -> VatCalculation {
    let mut collected_cents = 0i64;
    let mut deductible_cents = 0i64;
    let mut breakdown = Vec::with_capacity(operations.len());

    for op in operations {
        let recognition = is_recognized_in(op, period);
        let vat_cents = op.vat_cents();
        let counts = recognition.included && (op.is_sale() || op.is_deductible);
        if counts {
            match op.operation_type {
                OperationType::Sale => collected_cents += vat_cents,
                OperationType::Purchase => deductible_cents += vat_cents,
            }
        }
        let reason = if counts {
            None
        } else if recognition.basis == RecognitionBasis::AwaitingPayment {
            Some("payment date missing, VAT on payments not yet due".to_string())
        } else if recognition.included {
            Some("purchase not deductible".to_string())
        } else {
            Some(match Period::from_date(recognition.reference_date) {
                Ok(other) => format!("recognized in {other}"),
                Err(_) => format!("recognized on {}", recognition.reference_date),
            })
        };
        breakdown.push(VatBreakdownLine {
            operation_id: op.id,
            operation_type: op.operation_type,
            counterpart_label: op.counterpart.clone(),
            amount_ht_cents: op.amount_ht_cents,
            vat_rate: op.vat_rate,
            vat_cents,
            reference_date: recognition.reference_date,
            basis: recognition.basis,
            included: counts,
            reason,
        });
    }

    let issues = validate_operations(operations);
    if !issues.is_empty() {
        tracing::warn!(period = %period, count = issues.len(), "VAT calculated with validation issues");
    }
    let due_cents = (collected_cents - deductible_cents).max(0);
    tracing::debug!(
        period = %period,
        collected_cents,
        deductible_cents,
        due_cents,
        "VAT computed"
    );

    VatCalculation {
        period,
        collected_cents,
        deductible_cents,
        due_cents,
        declaration_date: schedule.vat_declaration_date(period),
        payment_date: schedule.vat_payment_date(period),
        breakdown,
        issues,
    }
}
