//! Fiscal recognition: which month an operation counts in.
//!
//! Both the VAT and the URSSAF engines go through [`is_recognized_in`]; neither re-implements
//! the date rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Operation, OperationType, Period};

/// Which date carried the fiscal event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionBasis {
    /// Purchases, on their invoice date.
    InvoiceDate,
    /// Service sales with VAT on payments, on cash receipt.
    PaymentDate,
    /// Goods sales (or VAT on debits), on delivery.
    DeliveryDate,
    /// Goods sales without a delivery date, on the invoice date.
    InvoiceDateFallback,
    /// Service sale with VAT on payments and no payment yet: recognized nowhere.
    AwaitingPayment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recognition {
    pub included: bool,
    /// The date the rule looked at; the invoice date while a payment is still awaited.
    pub reference_date: NaiveDate,
    pub basis: RecognitionBasis,
}

/// The single fiscal event date of an operation, with the rule that produced it.
pub fn recognition_event(operation: &Operation) -> (Option<NaiveDate>, RecognitionBasis) {
    match operation.operation_type {
        OperationType::Purchase => (Some(operation.invoice_date), RecognitionBasis::InvoiceDate),
        OperationType::Sale if operation.is_service && operation.vat_on_payments => {
            match operation.payment_date {
                Some(paid) => (Some(paid), RecognitionBasis::PaymentDate),
                None => (None, RecognitionBasis::AwaitingPayment),
            }
        }
        OperationType::Sale => match operation.delivery_date {
            Some(delivered) => (Some(delivered), RecognitionBasis::DeliveryDate),
            None => (
                Some(operation.invoice_date),
                RecognitionBasis::InvoiceDateFallback,
            ),
        },
    }
}

/// Date the operation is recognized on, or `None` when it is not recognized yet.
pub fn recognition_date(operation: &Operation) -> Option<NaiveDate> {
    recognition_event(operation).0
}

pub fn is_recognized_in(operation: &Operation, period: Period) -> Recognition {
    let (event, basis) = recognition_event(operation);
    Recognition {
        included: event.is_some_and(|date| period.contains(date)),
        reference_date: event.unwrap_or(operation.invoice_date),
        basis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::Rate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn p(key: &str) -> Period {
        key.parse().unwrap()
    }

    #[test]
    fn service_sale_counts_in_payment_month() {
        let op = Operation::sale("ACME", 100_000, Rate::from_percent(20.0), date(2025, 2, 20))
            .paid_on(date(2025, 3, 5));
        let march = is_recognized_in(&op, p("2025-03"));
        assert!(march.included);
        assert_eq!(march.reference_date, date(2025, 3, 5));
        assert_eq!(march.basis, RecognitionBasis::PaymentDate);
        assert!(!is_recognized_in(&op, p("2025-02")).included);
    }

    #[test]
    fn unpaid_service_sale_is_in_no_period() {
        let op = Operation::sale("ACME", 50_000, Rate::from_percent(20.0), date(2025, 2, 20));
        let recognized = p("2024-01")
            .through(p("2026-12"))
            .filter(|period| is_recognized_in(&op, *period).included)
            .count();
        assert_eq!(recognized, 0);
        let feb = is_recognized_in(&op, p("2025-02"));
        assert_eq!(feb.basis, RecognitionBasis::AwaitingPayment);
        assert_eq!(feb.reference_date, date(2025, 2, 20));
        assert_eq!(recognition_date(&op), None);
    }

    #[test]
    fn goods_sale_uses_delivery_never_payment() {
        let op = Operation::sale("Shop", 10_000, Rate::from_percent(20.0), date(2025, 2, 20))
            .as_goods()
            .delivered_on(date(2025, 3, 10))
            .paid_on(date(2025, 4, 1));
        assert!(is_recognized_in(&op, p("2025-03")).included);
        assert!(!is_recognized_in(&op, p("2025-04")).included);
        assert!(!is_recognized_in(&op, p("2025-02")).included);
    }

    #[test]
    fn goods_sale_falls_back_to_invoice_date() {
        let op = Operation::sale("Shop", 10_000, Rate::from_percent(20.0), date(2025, 2, 20))
            .as_goods();
        let feb = is_recognized_in(&op, p("2025-02"));
        assert!(feb.included);
        assert_eq!(feb.basis, RecognitionBasis::InvoiceDateFallback);
    }

    #[test]
    fn service_sale_on_debits_uses_delivery_rule() {
        let mut op = Operation::sale("ACME", 10_000, Rate::from_percent(20.0), date(2025, 6, 30))
            .paid_on(date(2025, 8, 1));
        op.vat_on_payments = false;
        assert!(is_recognized_in(&op, p("2025-06")).included);
        assert!(!is_recognized_in(&op, p("2025-08")).included);
    }

    #[test]
    fn purchase_uses_invoice_date_regardless_of_deductibility() {
        let op = Operation::purchase("Supplier", 4_000, Rate::from_percent(20.0), date(2025, 1, 31))
            .paid_on(date(2025, 2, 3))
            .non_deductible();
        assert!(is_recognized_in(&op, p("2025-01")).included);
        assert!(!is_recognized_in(&op, p("2025-02")).included);
    }
}
