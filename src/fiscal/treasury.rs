//! Forward cash projection from historical monthly aggregates.
//!
//! Each projected month repeats the trailing arithmetic mean of the supplied history, scaled by
//! an optional seasonal factor. Seasonality itself is not modelled; the factor is a plain
//! multiplier applied to every month.

use serde::{Deserialize, Serialize};

use super::Period;
use crate::errors::FiscalError;

const MONTHS_PER_YEAR: u32 = 12;
/// Longest projection accepted: ten years.
pub const MAX_HORIZON_MONTHS: u32 = 120;

/// Per-period figures the projector learns from. Built from dashboard results, never from raw
/// operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodAggregate {
    pub period: Period,
    pub revenue_cents: i64,
    pub expenses_cents: i64,
    pub vat_due_cents: i64,
    pub urssaf_due_cents: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Step function of the number of historical periods only.
    pub fn from_sample_count(count: usize) -> Self {
        match count {
            0..=2 => Confidence::Low,
            3..=5 => Confidence::Medium,
            _ => Confidence::High,
        }
    }
}

/// How the yearly rollup is produced when the horizon is shorter than a year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum YearlyRollup {
    /// Linearly scale the horizon totals to twelve months; labeled as an estimate.
    #[default]
    ScaleHorizon,
    /// Project twelve months regardless of the displayed horizon.
    ProjectFullYear,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YearlyBasis {
    Projected,
    ScaledEstimate { horizon_months: u32 },
}

impl YearlyBasis {
    pub fn is_estimate(&self) -> bool {
        matches!(self, YearlyBasis::ScaledEstimate { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectionOptions {
    pub seasonal_factor: f64,
    pub yearly_rollup: YearlyRollup,
    /// Last observed period; defaults to the latest historical period.
    pub last_observed: Option<Period>,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            seasonal_factor: 1.0,
            yearly_rollup: YearlyRollup::default(),
            last_observed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectedPeriod {
    pub period: Period,
    pub revenue_cents: i64,
    pub expenses_cents: i64,
    pub vat_cents: i64,
    pub urssaf_cents: i64,
    pub net_cents: i64,
    pub cumulative_cash_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlyProjection {
    pub basis: YearlyBasis,
    pub revenue_cents: i64,
    pub expenses_cents: i64,
    pub vat_cents: i64,
    pub urssaf_cents: i64,
    pub net_cents: i64,
    /// `(vat + urssaf) / revenue * 100`, two decimals.
    pub effective_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreasuryProjection {
    pub starting_cash_cents: i64,
    pub periods: Vec<ProjectedPeriod>,
    pub yearly: YearlyProjection,
    pub confidence: Confidence,
    pub sample_count: usize,
    pub assumptions: Vec<String>,
}

impl TreasuryProjection {
    pub fn ending_cash_cents(&self) -> i64 {
        self.periods
            .last()
            .map(|p| p.cumulative_cash_cents)
            .unwrap_or(self.starting_cash_cents)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthlyFigures {
    revenue: i64,
    expenses: i64,
    vat: i64,
    urssaf: i64,
}

impl MonthlyFigures {
    fn net(&self) -> i64 {
        self.revenue - self.expenses - self.vat - self.urssaf
    }
}

pub fn project(
    history: &[PeriodAggregate],
    horizon_months: u32,
    starting_cash_cents: i64,
) -> Result<TreasuryProjection, FiscalError> {
    project_with(
        history,
        horizon_months,
        starting_cash_cents,
        &ProjectionOptions::default(),
    )
}

pub fn project_with(
    history: &[PeriodAggregate],
    horizon_months: u32,
    starting_cash_cents: i64,
    options: &ProjectionOptions,
) -> Result<TreasuryProjection, FiscalError> {
    if !(1..=MAX_HORIZON_MONTHS).contains(&horizon_months) {
        return Err(FiscalError::InvalidInput(format!(
            "projection horizon of {horizon_months} months is outside 1..={MAX_HORIZON_MONTHS}"
        )));
    }
    if !options.seasonal_factor.is_finite() || options.seasonal_factor < 0.0 {
        return Err(FiscalError::InvalidInput(format!(
            "seasonal factor {} must be a non-negative number",
            options.seasonal_factor
        )));
    }
    let last_observed = options
        .last_observed
        .or_else(|| history.iter().map(|h| h.period).max())
        .ok_or_else(|| {
            FiscalError::InvalidInput(
                "no historical period and no anchor to start the projection from".into(),
            )
        })?;

    let monthly = monthly_means(history, options.seasonal_factor);
    let mut cumulative = starting_cash_cents;
    let mut periods = Vec::with_capacity(horizon_months as usize);
    let mut period = last_observed;
    for _ in 0..horizon_months {
        period = period.next()?;
        cumulative += monthly.net();
        periods.push(ProjectedPeriod {
            period,
            revenue_cents: monthly.revenue,
            expenses_cents: monthly.expenses,
            vat_cents: monthly.vat,
            urssaf_cents: monthly.urssaf,
            net_cents: monthly.net(),
            cumulative_cash_cents: cumulative,
        });
    }

    let yearly = yearly_rollup(&periods, &monthly, horizon_months, options.yearly_rollup);
    let confidence = Confidence::from_sample_count(history.len());
    let assumptions = describe_assumptions(history.len(), options.seasonal_factor, &yearly.basis);
    tracing::debug!(
        samples = history.len(),
        horizon_months,
        ?confidence,
        "treasury projection built"
    );

    Ok(TreasuryProjection {
        starting_cash_cents,
        periods,
        yearly,
        confidence,
        sample_count: history.len(),
        assumptions,
    })
}

fn monthly_means(history: &[PeriodAggregate], factor: f64) -> MonthlyFigures {
    let count = history.len() as i128;
    let mean = |pick: fn(&PeriodAggregate) -> i64| -> i64 {
        let total: i128 = history.iter().map(|h| pick(h) as i128).sum();
        scale(round_div(total, count.max(1)), factor)
    };
    MonthlyFigures {
        revenue: mean(|h| h.revenue_cents),
        expenses: mean(|h| h.expenses_cents),
        vat: mean(|h| h.vat_due_cents),
        urssaf: mean(|h| h.urssaf_due_cents),
    }
}

fn yearly_rollup(
    periods: &[ProjectedPeriod],
    monthly: &MonthlyFigures,
    horizon_months: u32,
    mode: YearlyRollup,
) -> YearlyProjection {
    if let Some(year) = periods.get(..MONTHS_PER_YEAR as usize) {
        return yearly_from_totals(YearlyBasis::Projected, totals(year), 1, 1);
    }
    match mode {
        YearlyRollup::ScaleHorizon => yearly_from_totals(
            YearlyBasis::ScaledEstimate { horizon_months },
            totals(periods),
            MONTHS_PER_YEAR as i128,
            horizon_months as i128,
        ),
        YearlyRollup::ProjectFullYear => yearly_from_totals(
            YearlyBasis::Projected,
            *monthly,
            MONTHS_PER_YEAR as i128,
            1,
        ),
    }
}

fn totals(periods: &[ProjectedPeriod]) -> MonthlyFigures {
    periods.iter().fold(MonthlyFigures::default(), |acc, p| MonthlyFigures {
        revenue: acc.revenue + p.revenue_cents,
        expenses: acc.expenses + p.expenses_cents,
        vat: acc.vat + p.vat_cents,
        urssaf: acc.urssaf + p.urssaf_cents,
    })
}

fn yearly_from_totals(
    basis: YearlyBasis,
    figures: MonthlyFigures,
    numerator: i128,
    denominator: i128,
) -> YearlyProjection {
    let scaled = |value: i64| round_div(value as i128 * numerator, denominator);
    let revenue_cents = scaled(figures.revenue);
    let vat_cents = scaled(figures.vat);
    let urssaf_cents = scaled(figures.urssaf);
    let expenses_cents = scaled(figures.expenses);
    let effective_rate = if revenue_cents > 0 {
        let ratio = (vat_cents + urssaf_cents) as f64 / revenue_cents as f64 * 100.0;
        (ratio * 100.0).round() / 100.0
    } else {
        0.0
    };
    YearlyProjection {
        basis,
        revenue_cents,
        expenses_cents,
        vat_cents,
        urssaf_cents,
        net_cents: revenue_cents - expenses_cents - vat_cents - urssaf_cents,
        effective_rate,
    }
}

fn describe_assumptions(samples: usize, factor: f64, basis: &YearlyBasis) -> Vec<String> {
    let mut assumptions = vec![
        format!("monthly figures repeat the mean of {samples} historical period(s)"),
        format!("seasonal factor {factor:.2} applied to every month"),
        "VAT and URSSAF due follow their historical averages".to_string(),
    ];
    if let YearlyBasis::ScaledEstimate { horizon_months } = basis {
        assumptions.push(format!(
            "yearly totals are an estimate scaled from a {horizon_months}-month horizon"
        ));
    }
    assumptions
}

fn round_div(numerator: i128, denominator: i128) -> i64 {
    let half = denominator / 2;
    let rounded = if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    };
    rounded as i64
}

fn scale(value: i64, factor: f64) -> i64 {
    if factor == 1.0 {
        value
    } else {
        (value as f64 * factor).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(key: &str) -> Period {
        key.parse().unwrap()
    }

    fn history(count: usize) -> Vec<PeriodAggregate> {
        p("2025-01")
            .through(p("2030-12"))
            .take(count)
            .enumerate()
            .map(|(idx, period)| PeriodAggregate {
                period,
                revenue_cents: 300_000 + idx as i64 * 10_000,
                expenses_cents: 50_000,
                vat_due_cents: 40_000,
                urssaf_due_cents: 66_000,
            })
            .collect()
    }

    #[test]
    fn confidence_is_a_step_of_sample_count() {
        assert_eq!(Confidence::from_sample_count(0), Confidence::Low);
        assert_eq!(Confidence::from_sample_count(2), Confidence::Low);
        assert_eq!(Confidence::from_sample_count(3), Confidence::Medium);
        assert_eq!(Confidence::from_sample_count(4), Confidence::Medium);
        assert_eq!(Confidence::from_sample_count(6), Confidence::High);
        assert_eq!(Confidence::from_sample_count(8), Confidence::High);
    }

    #[test]
    fn projects_means_in_chronological_order_with_running_cash() {
        let projection = project(&history(4), 3, 1_000_000).unwrap();
        // revenue mean of 300k, 310k, 320k, 330k
        let keys: Vec<String> = projection.periods.iter().map(|p| p.period.key()).collect();
        assert_eq!(keys, vec!["2025-05", "2025-06", "2025-07"]);
        let first = projection.periods[0];
        assert_eq!(first.revenue_cents, 315_000);
        assert_eq!(first.net_cents, 315_000 - 50_000 - 40_000 - 66_000);
        assert_eq!(first.cumulative_cash_cents, 1_000_000 + 159_000);
        assert_eq!(projection.periods[2].cumulative_cash_cents, 1_000_000 + 3 * 159_000);
        assert_eq!(projection.ending_cash_cents(), 1_477_000);
        assert_eq!(projection.confidence, Confidence::Medium);
    }

    #[test]
    fn short_horizon_yearly_is_a_labeled_scaled_estimate() {
        let projection = project(&history(2), 6, 0).unwrap();
        assert_eq!(
            projection.yearly.basis,
            YearlyBasis::ScaledEstimate { horizon_months: 6 }
        );
        assert!(projection.yearly.basis.is_estimate());
        let six_month_revenue: i64 = projection.periods.iter().map(|p| p.revenue_cents).sum();
        assert_eq!(projection.yearly.revenue_cents, six_month_revenue * 2);
        assert!(projection
            .assumptions
            .iter()
            .any(|a| a.contains("scaled from a 6-month horizon")));
    }

    #[test]
    fn full_year_modes_are_not_labeled_estimates() {
        let twelve = project(&history(8), 12, 0).unwrap();
        assert_eq!(twelve.yearly.basis, YearlyBasis::Projected);

        let options = ProjectionOptions {
            yearly_rollup: YearlyRollup::ProjectFullYear,
            ..ProjectionOptions::default()
        };
        let three = project_with(&history(8), 3, 0, &options).unwrap();
        assert_eq!(three.yearly.basis, YearlyBasis::Projected);
        assert_eq!(three.yearly.revenue_cents, twelve.yearly.revenue_cents);
        assert_eq!(three.confidence, Confidence::High);
    }

    #[test]
    fn seasonal_factor_scales_every_month() {
        let options = ProjectionOptions {
            seasonal_factor: 1.5,
            ..ProjectionOptions::default()
        };
        let projection = project_with(&history(1), 2, 0, &options).unwrap();
        assert_eq!(projection.periods[0].revenue_cents, 450_000);
        assert_eq!(projection.periods[1].expenses_cents, 75_000);
    }

    #[test]
    fn effective_rate_is_rounded_to_two_decimals() {
        let projection = project(&history(1), 12, 0).unwrap();
        // (40 000 + 66 000) / 300 000
        assert_eq!(projection.yearly.effective_rate, 35.33);
    }

    #[test]
    fn rejects_horizons_beyond_ten_years() {
        let err = project(&history(1), 3_000_000_000, 0).unwrap_err();
        assert!(matches!(err, FiscalError::InvalidInput(_)));
        assert!(project(&history(1), MAX_HORIZON_MONTHS + 1, 0).is_err());

        let longest = project(&history(1), MAX_HORIZON_MONTHS, 0).unwrap();
        assert_eq!(longest.periods.len(), 120);
        assert_eq!(longest.yearly.basis, YearlyBasis::Projected);
    }

    #[test]
    fn projection_past_the_last_supported_month_fails() {
        let options = ProjectionOptions {
            last_observed: Some(p("9999-11")),
            ..ProjectionOptions::default()
        };
        assert!(project_with(&history(1), 1, 0, &options).is_ok());
        let err = project_with(&history(1), 2, 0, &options).unwrap_err();
        assert!(matches!(err, FiscalError::InvalidPeriod(_)));
    }

    #[test]
    fn rejects_zero_horizon_and_missing_anchor() {
        assert!(project(&history(3), 0, 0).is_err());
        assert!(project(&[], 3, 0).is_err());

        let options = ProjectionOptions {
            last_observed: Some(p("2025-12")),
            ..ProjectionOptions::default()
        };
        let empty = project_with(&[], 2, 500, &options).unwrap();
        assert_eq!(empty.periods[0].period, p("2026-01"));
        assert_eq!(empty.ending_cash_cents(), 500);
        assert_eq!(empty.confidence, Confidence::Low);
    }
}
