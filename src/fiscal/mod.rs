//! Fiscal domain: periods, operations, recognition rules and the per-period engines.

pub mod alerts;
pub mod dashboard;
pub mod deadlines;
pub mod operation;
pub mod period;
pub mod rate;
pub mod recognition;
pub mod treasury;
pub mod urssaf;
pub mod validation;
pub mod vat;

pub use alerts::{
    generate_alerts, Alert, AlertContext, AlertKind, CashPosition, ObligationKey, ObligationKind,
    Severity,
};
pub use dashboard::{
    aggregate, period_dashboard, DashboardData, MultiPeriodSummary, PeriodStatus, YearlySummary,
};
pub use deadlines::DeadlineSchedule;
pub use operation::{Operation, OperationStatus, OperationType};
pub use period::Period;
pub use rate::Rate;
pub use recognition::{
    is_recognized_in, recognition_date, recognition_event, Recognition, RecognitionBasis,
};
pub use treasury::{
    project, project_with, Confidence, PeriodAggregate, ProjectedPeriod, ProjectionOptions,
    TreasuryProjection, YearlyBasis, YearlyProjection, YearlyRollup, MAX_HORIZON_MONTHS,
};
pub use urssaf::{compute_urssaf, UrssafCalculation};
pub use validation::{validate_operations, IssueSeverity, ValidationCode, ValidationIssue};
pub use vat::{compute_vat, VatBreakdownLine, VatCalculation};
