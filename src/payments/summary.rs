use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Money;

use super::AmortizationResult;

/// totals of a schedule next to the same loan without extra payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub interest_paid: Money,
    pub total_paid: Money,
    pub months: u32,
    pub interest_paid_no_extra: Money,
    pub total_paid_no_extra: Money,
    pub months_no_extra: u32,
}

impl PlanSummary {
    pub fn compare(with_extra: &AmortizationResult, baseline: &AmortizationResult) -> Self {
        Self {
            interest_paid: with_extra.total_interest,
            total_paid: with_extra.total_paid(),
            months: with_extra.months(),
            interest_paid_no_extra: baseline.total_interest,
            total_paid_no_extra: baseline.total_paid(),
            months_no_extra: baseline.months(),
        }
    }

    /// interest avoided by the extra payments
    pub fn interest_saved(&self) -> Money {
        self.interest_paid_no_extra - self.interest_paid
    }

    /// payments avoided by the extra payments
    pub fn months_saved(&self) -> u32 {
        self.months_no_extra.saturating_sub(self.months)
    }

    /// label/value pairs as shown in the totals panel and csv summary block
    pub fn lines(&self) -> [(&'static str, String); 4] {
        [
            ("Interest Paid", format!("${}", self.interest_paid.to_currency_string())),
            ("Total Paid", format!("${}", self.total_paid.to_currency_string())),
            ("Interest Paid (No Extra)", format!("${}", self.interest_paid_no_extra.to_currency_string())),
            ("Total Paid (No Extra)", format!("${}", self.total_paid_no_extra.to_currency_string())),
        ]
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.lines() {
            writeln!(f, "{}: {}", label, value)?;
        }
        write!(
            f,
            "Payoff: {} months ({} fewer than without extra payments)",
            self.months,
            self.months_saved()
        )
    }
}
