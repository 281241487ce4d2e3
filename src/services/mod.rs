pub mod clock;
pub mod dashboard_service;
pub mod operation_source;
pub mod period_service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard_service::{Dashboard, DashboardRequest, DashboardService};
pub use operation_source::{DeadlineSource, InMemoryOperations, OperationSource};
pub use period_service::{PeriodReport, PeriodService};
