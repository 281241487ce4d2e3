//! Deadline, cash and data-completeness alerts.
//!
//! Generation is a pure function of its inputs and the reference date carried by
//! [`AlertContext`]. Every alert id is derived from the condition it reports, so evaluating the
//! same inputs twice yields the same list in the same order.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    validate_operations, DashboardData, Operation, OperationStatus, Period, UrssafCalculation,
    ValidationCode, VatCalculation,
};
use crate::currency::format_eur;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Deadline,
    CashFlow,
    Validation,
}

/// Declared from most to least urgent; the derived ordering is the sort rank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Ladder applied to upcoming deadlines.
    pub fn for_days_remaining(days: i64) -> Self {
        match days {
            d if d <= 3 => Severity::Critical,
            d if d <= 7 => Severity::High,
            _ => Severity::Medium,
        }
    }

    /// UI tone vocabulary.
    pub fn tone(&self) -> &'static str {
        match self {
            Severity::Critical => "error",
            Severity::High => "warning",
            Severity::Medium => "info",
            Severity::Low => "success",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    pub action_required: bool,
    /// What the user is expected to do, when something is expected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.action_required { '!' } else { '-' };
        write!(
            f,
            "{marker} [{:<8}] {}: {}",
            format!("{:?}", self.severity).to_lowercase(),
            self.id,
            self.message
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    VatDeclaration,
    VatPayment,
    UrssafPayment,
}

impl ObligationKind {
    fn slug(&self) -> &'static str {
        match self {
            ObligationKind::VatDeclaration => "vat-declaration",
            ObligationKind::VatPayment => "vat-payment",
            ObligationKind::UrssafPayment => "urssaf-payment",
        }
    }
}

/// One statutory obligation of one period; its id doubles as the alert id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObligationKey {
    pub kind: ObligationKind,
    pub period: Period,
}

impl ObligationKey {
    pub fn new(kind: ObligationKind, period: Period) -> Self {
        Self { kind, period }
    }

    /// Every obligation a period gives rise to.
    pub fn all_for(period: Period) -> [ObligationKey; 3] {
        [
            Self::new(ObligationKind::VatDeclaration, period),
            Self::new(ObligationKind::VatPayment, period),
            Self::new(ObligationKind::UrssafPayment, period),
        ]
    }

    pub fn id(&self) -> String {
        format!("{}-{}", self.kind.slug(), self.period)
    }
}

/// Cash left after provisioning for one period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CashPosition {
    pub period: Period,
    pub available_cents: i64,
    pub vat_due_cents: i64,
    pub urssaf_due_cents: i64,
}

impl From<&DashboardData> for CashPosition {
    fn from(data: &DashboardData) -> Self {
        Self {
            period: data.period,
            available_cents: data.available_cents,
            vat_due_cents: data.vat_due_cents,
            urssaf_due_cents: data.urssaf_due_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertContext {
    pub today: NaiveDate,
    pub alert_days_before_deadline: u32,
    /// Obligations the closing workflow already marked as done.
    #[serde(default)]
    pub settled: BTreeSet<ObligationKey>,
    #[serde(default)]
    pub cash: Vec<CashPosition>,
}

impl AlertContext {
    pub fn new(today: NaiveDate, alert_days_before_deadline: u32) -> Self {
        Self {
            today,
            alert_days_before_deadline,
            settled: BTreeSet::new(),
            cash: Vec::new(),
        }
    }

    pub fn with_settled(mut self, settled: impl IntoIterator<Item = ObligationKey>) -> Self {
        self.settled.extend(settled);
        self
    }

    pub fn with_cash(mut self, cash: impl IntoIterator<Item = CashPosition>) -> Self {
        self.cash.extend(cash);
        self
    }

    fn is_settled(&self, key: &ObligationKey) -> bool {
        self.settled.contains(key)
    }
}

/// Builds the deduplicated alert list, most pressing first.
pub fn generate_alerts(
    vat: &[VatCalculation],
    urssaf: &[UrssafCalculation],
    operations: &[Operation],
    context: &AlertContext,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for calc in vat {
        let declaration = ObligationKey::new(ObligationKind::VatDeclaration, calc.period);
        alerts.extend(deadline_alert(
            context,
            declaration,
            calc.declaration_date,
            None,
        ));
        if calc.due_cents > 0 {
            let payment = ObligationKey::new(ObligationKind::VatPayment, calc.period);
            alerts.extend(deadline_alert(
                context,
                payment,
                calc.payment_date,
                Some(calc.due_cents),
            ));
        }
    }

    for calc in urssaf {
        if calc.due_cents > 0 {
            let payment = ObligationKey::new(ObligationKind::UrssafPayment, calc.period);
            alerts.extend(deadline_alert(
                context,
                payment,
                calc.payment_date,
                Some(calc.due_cents),
            ));
        }
    }

    for op in operations
        .iter()
        .filter(|op| op.is_sale() && op.status == OperationStatus::Overdue)
    {
        alerts.push(overdue_invoice_alert(op));
    }

    for position in &context.cash {
        alerts.extend(cash_alert(position));
    }

    for issue in validate_operations(operations)
        .into_iter()
        .filter(|issue| issue.code == ValidationCode::MissingPaymentDate)
    {
        alerts.push(Alert {
            id: format!("missing-payment-date-{}", issue.operation_id),
            kind: AlertKind::Validation,
            severity: Severity::Medium,
            title: "Payment date missing".to_string(),
            message: issue.message,
            due_date: None,
            amount_cents: None,
            action_required: false,
            suggested_action: Some("Record the payment date".to_string()),
            period: None,
        });
    }

    let mut seen = HashSet::new();
    alerts.retain(|alert| seen.insert(alert.id.clone()));
    alerts.sort_by_key(|alert| (!alert.action_required, alert.severity));

    tracing::debug!(count = alerts.len(), today = %context.today, "alerts generated");
    alerts
}

fn deadline_alert(
    context: &AlertContext,
    key: ObligationKey,
    due_date: NaiveDate,
    amount_cents: Option<i64>,
) -> Option<Alert> {
    if context.is_settled(&key) {
        return None;
    }
    let days_remaining = (due_date - context.today).num_days();
    if days_remaining > i64::from(context.alert_days_before_deadline) {
        return None;
    }

    let (what, action) = match key.kind {
        ObligationKind::VatDeclaration => ("VAT declaration", "File the VAT declaration"),
        ObligationKind::VatPayment => ("VAT payment", "Pay the VAT due"),
        ObligationKind::UrssafPayment => ("URSSAF payment", "Pay the URSSAF contribution"),
    };
    let amount = amount_cents
        .map(|cents| format!(" of {}", format_eur(cents)))
        .unwrap_or_default();

    let (severity, title, message) = if days_remaining < 0 {
        (
            Severity::Critical,
            format!("{what} overdue"),
            format!(
                "{what}{amount} for {} was due on {due_date} ({} late)",
                key.period,
                days(-days_remaining)
            ),
        )
    } else {
        (
            Severity::for_days_remaining(days_remaining),
            format!("{what} due soon"),
            format!(
                "{what}{amount} for {} is due on {due_date} (in {})",
                key.period,
                days(days_remaining)
            ),
        )
    };

    Some(Alert {
        id: key.id(),
        kind: AlertKind::Deadline,
        severity,
        title,
        message,
        due_date: Some(due_date),
        amount_cents,
        action_required: severity == Severity::Critical,
        suggested_action: Some(action.to_string()),
        period: Some(key.period),
    })
}

fn days(count: i64) -> String {
    if count == 1 {
        "1 day".to_string()
    } else {
        format!("{count} days")
    }
}

fn overdue_invoice_alert(op: &Operation) -> Alert {
    let amount = op.amount_ttc_cents();
    Alert {
        id: format!("overdue-invoice-{}", op.id),
        kind: AlertKind::CashFlow,
        severity: Severity::High,
        title: "Invoice overdue".to_string(),
        message: format!(
            "Invoice to {} of {} issued on {} is overdue",
            op.display_label(),
            format_eur(amount),
            op.invoice_date
        ),
        due_date: None,
        amount_cents: Some(amount),
        action_required: false,
        suggested_action: Some("Send a payment reminder".to_string()),
        period: Period::from_date(op.invoice_date).ok(),
    }
}

fn cash_alert(position: &CashPosition) -> Option<Alert> {
    let provisions = position.vat_due_cents + position.urssaf_due_cents;
    if position.available_cents < 0 {
        Some(Alert {
            id: format!("cash-negative-{}", position.period),
            kind: AlertKind::CashFlow,
            severity: Severity::Critical,
            title: "Negative available cash".to_string(),
            message: format!(
                "Available cash for {} is {} after provisions",
                position.period,
                format_eur(position.available_cents)
            ),
            due_date: None,
            amount_cents: Some(position.available_cents),
            action_required: true,
            suggested_action: Some("Review upcoming expenses".to_string()),
            period: Some(position.period),
        })
    } else if position.available_cents < provisions {
        Some(Alert {
            id: format!("cash-provisions-{}", position.period),
            kind: AlertKind::CashFlow,
            severity: Severity::High,
            title: "Provisions not covered".to_string(),
            message: format!(
                "Available cash for {} ({}) is below the {} owed in VAT and URSSAF",
                position.period,
                format_eur(position.available_cents),
                format_eur(provisions)
            ),
            due_date: None,
            amount_cents: Some(provisions - position.available_cents),
            action_required: false,
            suggested_action: None,
            period: Some(position.period),
        })
    } else {
        None
    }
}
