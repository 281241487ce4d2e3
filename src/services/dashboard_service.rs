use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::errors::{FiscalError, Result};
use crate::fiscal::{
    aggregate, generate_alerts, project_with, Alert, AlertContext, CashPosition,
    MultiPeriodSummary, ObligationKey, Operation, Period, PeriodStatus, ProjectionOptions,
    TreasuryProjection, UrssafCalculation, VatCalculation,
};

use super::{Clock, OperationSource, PeriodReport, PeriodService};

/// What to build a dashboard for. Statuses and settled obligations come from the closing
/// workflow; periods without a status are treated as open. A closed period has been declared
/// and paid, so all of its obligations count as settled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardRequest {
    pub periods: Vec<Period>,
    #[serde(default)]
    pub statuses: BTreeMap<Period, PeriodStatus>,
    #[serde(default)]
    pub settled: BTreeSet<ObligationKey>,
    /// `0` skips the projection.
    #[serde(default)]
    pub horizon_months: u32,
    #[serde(default)]
    pub starting_cash_cents: i64,
    #[serde(default)]
    pub projection: ProjectionOptions,
}

impl DashboardRequest {
    pub fn new(periods: impl IntoIterator<Item = Period>) -> Self {
        Self {
            periods: periods.into_iter().collect(),
            statuses: BTreeMap::new(),
            settled: BTreeSet::new(),
            horizon_months: 0,
            starting_cash_cents: 0,
            projection: ProjectionOptions::default(),
        }
    }

    pub fn with_status(mut self, period: Period, status: PeriodStatus) -> Self {
        self.statuses.insert(period, status);
        self
    }

    pub fn with_settled(mut self, keys: impl IntoIterator<Item = ObligationKey>) -> Self {
        self.settled.extend(keys);
        self
    }

    pub fn with_projection(mut self, horizon_months: u32, starting_cash_cents: i64) -> Self {
        self.horizon_months = horizon_months;
        self.starting_cash_cents = starting_cash_cents;
        self
    }

    fn status_of(&self, period: Period) -> PeriodStatus {
        self.statuses.get(&period).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub reports: Vec<PeriodReport>,
    pub summary: MultiPeriodSummary,
    pub alerts: Vec<Alert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<TreasuryProjection>,
}

pub struct DashboardService;

impl DashboardService {
    pub fn build(
        source: &dyn OperationSource,
        clock: &dyn Clock,
        settings: &Settings,
        request: &DashboardRequest,
    ) -> Result<Dashboard> {
        if request.periods.is_empty() {
            return Err(FiscalError::InvalidInput(
                "dashboard needs at least one period".into(),
            ));
        }
        let mut periods = request.periods.clone();
        periods.sort();
        periods.dedup();

        let mut reports = Vec::with_capacity(periods.len());
        let mut operations: Vec<Operation> = Vec::new();
        let mut seen = HashSet::new();
        for &period in &periods {
            let period_operations = source.operations_for(&[period])?;
            reports.push(PeriodService::compute(
                &period_operations,
                period,
                request.status_of(period),
                settings,
            ));
            operations.extend(
                period_operations
                    .into_iter()
                    .filter(|op| seen.insert(op.id)),
            );
        }

        let results = reports
            .iter()
            .map(|report| (report.period, report.dashboard))
            .collect();
        let summary = aggregate(&periods, &results)?;

        let vat: Vec<VatCalculation> = reports.iter().map(|r| r.vat.clone()).collect();
        let urssaf: Vec<UrssafCalculation> = reports.iter().map(|r| r.urssaf.clone()).collect();
        let closed = periods
            .iter()
            .copied()
            .filter(|&period| request.status_of(period) == PeriodStatus::Closed)
            .flat_map(ObligationKey::all_for);
        let context = AlertContext::new(clock.today(), settings.alert_days_before_deadline)
            .with_settled(request.settled.iter().copied().chain(closed))
            .with_cash(reports.iter().map(|r| CashPosition::from(&r.dashboard)));
        let alerts = generate_alerts(&vat, &urssaf, &operations, &context);

        let projection = if request.horizon_months == 0 {
            None
        } else {
            let options = ProjectionOptions {
                last_observed: request.projection.last_observed.or(periods.last().copied()),
                ..request.projection
            };
            Some(project_with(
                &summary.closed_history(),
                request.horizon_months,
                request.starting_cash_cents,
                &options,
            )?)
        };

        tracing::info!(
            periods = periods.len(),
            operations = operations.len(),
            alerts = alerts.len(),
            closed = summary.yearly_summary.completed_periods.len(),
            "dashboard built"
        );

        Ok(Dashboard {
            reports,
            summary,
            alerts,
            projection,
        })
    }
}
