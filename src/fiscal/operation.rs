use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Rate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Sale,
    Purchase,
}

/// Workflow status owned by the operation store; recognition never looks at it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

/// A single sale or purchase as supplied by the operation store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    pub id: Uuid,
    pub operation_type: OperationType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub counterpart: String,
    /// Service (prestation) vs goods (bien); only meaningful for sales.
    #[serde(default)]
    pub is_service: bool,
    /// VAT recognized on cash receipt rather than invoicing.
    #[serde(default)]
    pub vat_on_payments: bool,
    pub amount_ht_cents: i64,
    pub vat_rate: Rate,
    pub invoice_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    /// Purchases only.
    #[serde(default)]
    pub is_deductible: bool,
    #[serde(default)]
    pub status: OperationStatus,
}

impl Operation {
    /// A service sale with VAT on payments, the usual freelance invoice.
    pub fn sale(
        counterpart: impl Into<String>,
        amount_ht_cents: i64,
        vat_rate: Rate,
        invoice_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation_type: OperationType::Sale,
            label: String::new(),
            counterpart: counterpart.into(),
            is_service: true,
            vat_on_payments: true,
            amount_ht_cents,
            vat_rate,
            invoice_date,
            payment_date: None,
            delivery_date: None,
            is_deductible: false,
            status: OperationStatus::Sent,
        }
    }

    /// A deductible purchase.
    pub fn purchase(
        counterpart: impl Into<String>,
        amount_ht_cents: i64,
        vat_rate: Rate,
        invoice_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation_type: OperationType::Purchase,
            label: String::new(),
            counterpart: counterpart.into(),
            is_service: false,
            vat_on_payments: false,
            amount_ht_cents,
            vat_rate,
            invoice_date,
            payment_date: None,
            delivery_date: None,
            is_deductible: true,
            status: OperationStatus::Paid,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn paid_on(mut self, date: NaiveDate) -> Self {
        self.payment_date = Some(date);
        self
    }

    pub fn delivered_on(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    /// Switches a sale to goods, recognized on delivery.
    pub fn as_goods(mut self) -> Self {
        self.is_service = false;
        self.vat_on_payments = false;
        self
    }

    pub fn non_deductible(mut self) -> Self {
        self.is_deductible = false;
        self
    }

    pub fn with_status(mut self, status: OperationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_sale(&self) -> bool {
        self.operation_type == OperationType::Sale
    }

    pub fn is_purchase(&self) -> bool {
        self.operation_type == OperationType::Purchase
    }

    /// VAT of this line, rounded to the cent on the line itself.
    pub fn vat_cents(&self) -> i64 {
        self.vat_rate.apply(self.amount_ht_cents)
    }

    pub fn amount_ttc_cents(&self) -> i64 {
        self.amount_ht_cents + self.vat_cents()
    }

    pub fn display_label(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if !self.counterpart.is_empty() {
            &self.counterpart
        } else {
            "(unnamed)"
        }
    }
}
