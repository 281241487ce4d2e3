//! Per-period dashboard figures and multi-period rollups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    is_recognized_in, Operation, OperationType, Period, PeriodAggregate, UrssafCalculation,
    VatCalculation,
};
use crate::errors::FiscalError;

/// Workflow state of a period, owned by the external closing workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardData {
    pub period: Period,
    pub status: PeriodStatus,
    /// Recognized sales, excluding VAT.
    pub revenue_cents: i64,
    /// Recognized purchases, VAT included.
    pub expenses_cents: i64,
    pub vat_due_cents: i64,
    pub urssaf_due_cents: i64,
    /// `revenue - vat_due - urssaf_due - expenses - treasury_buffer`.
    pub available_cents: i64,
    pub sales_count: usize,
    pub purchases_count: usize,
}

impl DashboardData {
    pub fn is_closed(&self) -> bool {
        self.status == PeriodStatus::Closed
    }

    pub fn aggregate(&self) -> PeriodAggregate {
        PeriodAggregate {
            period: self.period,
            revenue_cents: self.revenue_cents,
            expenses_cents: self.expenses_cents,
            vat_due_cents: self.vat_due_cents,
            urssaf_due_cents: self.urssaf_due_cents,
        }
    }
}

/// Builds the dashboard line of one period from the engines' results.
///
/// The treasury buffer is subtracted on purpose: the figure is what can be spent while keeping
/// the safety margin untouched.
pub fn period_dashboard(
    operations: &[Operation],
    vat: &VatCalculation,
    urssaf: &UrssafCalculation,
    status: PeriodStatus,
    treasury_buffer_cents: i64,
) -> DashboardData {
    let period = vat.period;
    let mut expenses_cents = 0i64;
    let mut sales_count = 0usize;
    let mut purchases_count = 0usize;
    for op in operations {
        if !is_recognized_in(op, period).included {
            continue;
        }
        match op.operation_type {
            OperationType::Sale => sales_count += 1,
            OperationType::Purchase => {
                purchases_count += 1;
                expenses_cents += op.amount_ttc_cents();
            }
        }
    }
    let revenue_cents = urssaf.revenue_ht_cents;
    let available_cents = revenue_cents
        - vat.due_cents
        - urssaf.due_cents
        - expenses_cents
        - treasury_buffer_cents;

    DashboardData {
        period,
        status,
        revenue_cents,
        expenses_cents,
        vat_due_cents: vat.due_cents,
        urssaf_due_cents: urssaf.due_cents,
        available_cents,
        sales_count,
        purchases_count,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlySummary {
    /// Closed periods the totals are computed over, in order.
    pub completed_periods: Vec<Period>,
    pub total_revenue_cents: i64,
    pub total_expenses_cents: i64,
    pub total_vat_cents: i64,
    pub total_urssaf_cents: i64,
    pub total_available_cents: i64,
    pub average_monthly_revenue_cents: i64,
    /// Percent change between the first and last completed period.
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiPeriodSummary {
    pub periods: Vec<DashboardData>,
    pub yearly_summary: YearlySummary,
}

impl MultiPeriodSummary {
    /// Closed periods as treasury history.
    pub fn closed_history(&self) -> Vec<PeriodAggregate> {
        self.periods
            .iter()
            .filter(|d| d.is_closed())
            .map(DashboardData::aggregate)
            .collect()
    }
}

/// Orders the per-period results by `period_keys` and totals the closed ones.
pub fn aggregate(
    period_keys: &[Period],
    results: &BTreeMap<Period, DashboardData>,
) -> Result<MultiPeriodSummary, FiscalError> {
    let mut ordered: Vec<Period> = period_keys.to_vec();
    ordered.sort();
    ordered.dedup();

    let periods = ordered
        .iter()
        .map(|period| {
            results
                .get(period)
                .copied()
                .ok_or(FiscalError::MissingPeriodResult(*period))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let yearly_summary = yearly_summary(&periods);
    Ok(MultiPeriodSummary {
        periods,
        yearly_summary,
    })
}

fn yearly_summary(periods: &[DashboardData]) -> YearlySummary {
    let closed: Vec<&DashboardData> = periods.iter().filter(|d| d.is_closed()).collect();
    let sum = |pick: fn(&DashboardData) -> i64| -> i64 { closed.iter().map(|d| pick(d)).sum() };
    let total_revenue_cents = sum(|d| d.revenue_cents);
    let average_monthly_revenue_cents = if closed.is_empty() {
        0
    } else {
        total_revenue_cents / closed.len() as i64
    };

    YearlySummary {
        completed_periods: closed.iter().map(|d| d.period).collect(),
        total_revenue_cents,
        total_expenses_cents: sum(|d| d.expenses_cents),
        total_vat_cents: sum(|d| d.vat_due_cents),
        total_urssaf_cents: sum(|d| d.urssaf_due_cents),
        total_available_cents: sum(|d| d.available_cents),
        average_monthly_revenue_cents,
        growth_rate: growth_rate(&closed),
    }
}

fn growth_rate(ordered: &[&DashboardData]) -> f64 {
    match (ordered.first(), ordered.last()) {
        (Some(first), Some(last)) if ordered.len() >= 2 && first.revenue_cents != 0 => {
            (last.revenue_cents - first.revenue_cents) as f64 / first.revenue_cents as f64 * 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::{compute_urssaf, compute_vat, DeadlineSchedule, Rate};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn p(key: &str) -> Period {
        key.parse().unwrap()
    }

    fn line(key: &str, revenue: i64, status: PeriodStatus) -> DashboardData {
        DashboardData {
            period: p(key),
            status,
            revenue_cents: revenue,
            expenses_cents: 10_000,
            vat_due_cents: 2_000,
            urssaf_due_cents: 3_000,
            available_cents: revenue - 15_000,
            sales_count: 1,
            purchases_count: 1,
        }
    }

    #[test]
    fn available_subtracts_taxes_expenses_and_buffer() {
        let twenty = Rate::from_percent(20.0);
        let ops = vec![
            Operation::sale("ACME", 100_000, twenty, date(2025, 3, 1)).paid_on(date(2025, 3, 15)),
            Operation::purchase("Host", 10_000, twenty, date(2025, 3, 2)),
        ];
        let schedule = DeadlineSchedule::default();
        let vat = compute_vat(&ops, p("2025-03"), &schedule);
        let urssaf = compute_urssaf(&ops, p("2025-03"), Rate::from_percent(22.0), &schedule);
        let data = period_dashboard(&ops, &vat, &urssaf, PeriodStatus::Open, 30_000);

        assert_eq!(data.revenue_cents, 100_000);
        assert_eq!(data.expenses_cents, 12_000);
        assert_eq!(data.vat_due_cents, 18_000);
        assert_eq!(data.urssaf_due_cents, 22_000);
        assert_eq!(data.available_cents, 100_000 - 18_000 - 22_000 - 12_000 - 30_000);
        assert_eq!((data.sales_count, data.purchases_count), (1, 1));
    }

    #[test]
    fn yearly_totals_only_cover_closed_periods() {
        let results: BTreeMap<Period, DashboardData> = [
            line("2025-01", 100_000, PeriodStatus::Closed),
            line("2025-02", 150_000, PeriodStatus::Closed),
            line("2025-03", 999_999, PeriodStatus::InProgress),
        ]
        .into_iter()
        .map(|d| (d.period, d))
        .collect();
        let keys = [p("2025-03"), p("2025-01"), p("2025-02")];
        let summary = aggregate(&keys, &results).unwrap();

        assert_eq!(summary.periods.len(), 3);
        assert_eq!(summary.periods[0].period, p("2025-01"));
        let yearly = &summary.yearly_summary;
        assert_eq!(yearly.completed_periods, vec![p("2025-01"), p("2025-02")]);
        assert_eq!(yearly.total_revenue_cents, 250_000);
        assert_eq!(yearly.average_monthly_revenue_cents, 125_000);
        assert_eq!(yearly.growth_rate, 50.0);
        assert_eq!(summary.closed_history().len(), 2);
    }

    #[test]
    fn growth_rate_is_zero_without_two_periods_or_base_revenue() {
        let single: BTreeMap<Period, DashboardData> =
            [(p("2025-01"), line("2025-01", 100_000, PeriodStatus::Closed))].into();
        let summary = aggregate(&[p("2025-01")], &single).unwrap();
        assert_eq!(summary.yearly_summary.growth_rate, 0.0);

        let zero_base: BTreeMap<Period, DashboardData> = [
            (p("2025-01"), line("2025-01", 0, PeriodStatus::Closed)),
            (p("2025-02"), line("2025-02", 50_000, PeriodStatus::Closed)),
        ]
        .into();
        let summary = aggregate(&[p("2025-01"), p("2025-02")], &zero_base).unwrap();
        assert_eq!(summary.yearly_summary.growth_rate, 0.0);
    }

    #[test]
    fn missing_result_is_an_error() {
        let err = aggregate(&[p("2025-04")], &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, FiscalError::MissingPeriodResult(period) if period == p("2025-04")));
    }
}
