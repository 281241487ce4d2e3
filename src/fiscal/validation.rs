//! Non-fatal data checks reported next to otherwise valid calculations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Operation, OperationType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    MissingPaymentDate,
    UnusualVatRate,
    NegativeAmount,
    ZeroAmount,
    PaymentBeforeInvoice,
    MissingDeliveryDate,
    DeductibleWithoutVat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub operation_id: Uuid,
    pub code: ValidationCode,
    pub severity: IssueSeverity,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(
        operation: &Operation,
        code: ValidationCode,
        severity: IssueSeverity,
        field: &str,
        message: String,
    ) -> Self {
        Self {
            operation_id: operation.id,
            code,
            severity,
            field: field.to_string(),
            message,
        }
    }
}

/// Checks every operation, in input order. Never fails and never alters an operation.
pub fn validate_operations<'a, I>(operations: I) -> Vec<ValidationIssue>
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut issues = Vec::new();
    for operation in operations {
        validate_operation(operation, &mut issues);
    }
    issues
}

fn validate_operation(op: &Operation, issues: &mut Vec<ValidationIssue>) {
    let label = op.display_label();

    if op.is_sale() && op.is_service && op.vat_on_payments && op.payment_date.is_none() {
        issues.push(ValidationIssue::new(
            op,
            ValidationCode::MissingPaymentDate,
            IssueSeverity::Warning,
            "payment_date",
            format!("sale \"{label}\": payment date missing, VAT on payments cannot be recognized"),
        ));
    }

    if !op.vat_rate.is_within_bounds() {
        issues.push(ValidationIssue::new(
            op,
            ValidationCode::UnusualVatRate,
            IssueSeverity::Warning,
            "vat_rate",
            format!("operation \"{label}\": unusual VAT rate {}", op.vat_rate),
        ));
    }

    if op.amount_ht_cents < 0 {
        issues.push(ValidationIssue::new(
            op,
            ValidationCode::NegativeAmount,
            IssueSeverity::Error,
            "amount_ht_cents",
            format!("operation \"{label}\": negative amount {}", op.amount_ht_cents),
        ));
    } else if op.amount_ht_cents == 0 {
        issues.push(ValidationIssue::new(
            op,
            ValidationCode::ZeroAmount,
            IssueSeverity::Warning,
            "amount_ht_cents",
            format!("operation \"{label}\": zero amount"),
        ));
    }

    if let Some(paid) = op.payment_date {
        if paid < op.invoice_date {
            issues.push(ValidationIssue::new(
                op,
                ValidationCode::PaymentBeforeInvoice,
                IssueSeverity::Warning,
                "payment_date",
                format!("operation \"{label}\": paid on {paid}, before invoice {}", op.invoice_date),
            ));
        }
    }

    match op.operation_type {
        OperationType::Sale if !op.is_service && op.delivery_date.is_none() => {
            issues.push(ValidationIssue::new(
                op,
                ValidationCode::MissingDeliveryDate,
                IssueSeverity::Warning,
                "delivery_date",
                format!("goods sale \"{label}\": no delivery date, invoice date used"),
            ));
        }
        OperationType::Purchase if op.is_deductible && op.vat_rate.basis_points() == 0 => {
            issues.push(ValidationIssue::new(
                op,
                ValidationCode::DeductibleWithoutVat,
                IssueSeverity::Warning,
                "vat_rate",
                format!("purchase \"{label}\": deductible but carries no VAT"),
            ));
        }
        _ => {}
    }
}
