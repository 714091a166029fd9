pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod export;
pub mod payments;
pub mod plan;
pub mod types;

// re-export key types
pub use calendar::month_label;
pub use config::{InputLimits, LoanTerms, PlanConfig};
pub use decimal::{Money, Rate};
pub use errors::{AmortizationError, Result};
pub use export::{ScheduleRow, ScheduleView};
pub use payments::{
    compute, AmortizationCalculator, AmortizationResult, ExtraPaymentSchedule, PlanSummary,
    ScheduleEntry,
};
pub use plan::{BatchUpdate, Plan};
pub use types::{PlanId, StartMonth, YearConvention};

// re-export external dependencies that users will need
pub use chrono::Month;
pub use rust_decimal::Decimal;
