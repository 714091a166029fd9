pub mod amortization;
pub mod extra;
pub mod summary;

pub use amortization::{
    calculate_base_payment, compute, AmortizationCalculator, AmortizationResult, ScheduleEntry,
    SETTLEMENT_TOLERANCE,
};
pub use extra::ExtraPaymentSchedule;
pub use summary::PlanSummary;
