use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::errors::Result;
use crate::fiscal::{
    compute_urssaf, compute_vat, period_dashboard, DashboardData, Operation, Period,
    PeriodStatus, UrssafCalculation, ValidationIssue, VatCalculation,
};

use super::OperationSource;

/// Everything computed for one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodReport {
    pub period: Period,
    pub vat: VatCalculation,
    pub urssaf: UrssafCalculation,
    pub dashboard: DashboardData,
    /// Data problems found in the period's operations; the figures above are still valid.
    pub issues: Vec<ValidationIssue>,
}

impl PeriodReport {
    pub fn has_warnings(&self) -> bool {
        !self.issues.is_empty()
    }
}

pub struct PeriodService;

impl PeriodService {
    pub fn compute(
        operations: &[Operation],
        period: Period,
        status: PeriodStatus,
        settings: &Settings,
    ) -> PeriodReport {
        let vat = compute_vat(operations, period, &settings.schedule);
        let urssaf = compute_urssaf(operations, period, settings.urssaf_rate, &settings.schedule);
        let dashboard = period_dashboard(
            operations,
            &vat,
            &urssaf,
            status,
            settings.treasury_buffer_cents,
        );
        let issues = vat.issues.clone();
        PeriodReport {
            period,
            vat,
            urssaf,
            dashboard,
            issues,
        }
    }

    pub fn report(
        source: &dyn OperationSource,
        period: Period,
        status: PeriodStatus,
        settings: &Settings,
    ) -> Result<PeriodReport> {
        let operations = source.operations_for(&[period])?;
        Ok(Self::compute(&operations, period, status, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FiscalError;
    use crate::fiscal::Rate;
    use crate::services::InMemoryOperations;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct FailingSource;

    impl OperationSource for FailingSource {
        fn operations_for(&self, _periods: &[Period]) -> Result<Vec<Operation>> {
            Err(FiscalError::Source("store offline".into()))
        }
    }

    #[test]
    fn report_combines_engines_for_one_period() {
        let twenty = Rate::from_percent(20.0);
        let source = InMemoryOperations::new(vec![
            Operation::sale("ACME", 100_000, twenty, date(2025, 2, 20)).paid_on(date(2025, 3, 5)),
            Operation::sale("Pending", 20_000, twenty, date(2025, 3, 8)),
        ]);
        let period: Period = "2025-03".parse().unwrap();
        let report =
            PeriodService::report(&source, period, PeriodStatus::Open, &Settings::default())
                .unwrap();

        assert_eq!(report.vat.collected_cents, 20_000);
        assert_eq!(report.urssaf.due_cents, 22_000);
        assert_eq!(report.dashboard.sales_count, 1);
        assert!(report.has_warnings());
        assert_eq!(report.vat.breakdown.len(), 2);
    }

    #[test]
    fn source_failures_propagate() {
        let period: Period = "2025-03".parse().unwrap();
        let err = PeriodService::report(&FailingSource, period, PeriodStatus::Open, &Settings::default())
            .unwrap_err();
        assert!(matches!(err, FiscalError::Source(_)));
    }
}
