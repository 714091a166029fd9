use log::debug;
use uuid::Uuid;

use crate::calendar::month_label;
use crate::config::{LoanTerms, PlanConfig};
use crate::decimal::Money;
use crate::errors::Result;
use crate::export::ScheduleRow;
use crate::payments::{compute, AmortizationResult, ExtraPaymentSchedule, PlanSummary};
use crate::types::{PlanId, StartMonth, YearConvention};

/// one amortization plan: terms, user-edited extra payments and the latest schedule
#[derive(Debug, Clone)]
pub struct Plan {
    pub id: PlanId,
    config: PlanConfig,
    extra_payments: ExtraPaymentSchedule,
    result: Option<AmortizationResult>,
    baseline: Option<AmortizationResult>,
    recalculation_suppressed: bool,
    calculations: u64,
}

impl Plan {
    /// plan with the default terms
    pub fn new() -> Self {
        Self::with_config(PlanConfig::default())
    }

    pub fn with_config(config: PlanConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            extra_payments: ExtraPaymentSchedule::empty(),
            result: None,
            baseline: None,
            recalculation_suppressed: false,
            calculations: 0,
        }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.config.terms
    }

    pub fn extra_payments(&self) -> &ExtraPaymentSchedule {
        &self.extra_payments
    }

    /// schedule from the last successful calculation
    pub fn result(&self) -> Option<&AmortizationResult> {
        self.result.as_ref()
    }

    /// same terms without extra payments, from the last successful calculation
    pub fn baseline(&self) -> Option<&AmortizationResult> {
        self.baseline.as_ref()
    }

    pub fn summary(&self) -> Option<PlanSummary> {
        match (&self.result, &self.baseline) {
            (Some(result), Some(baseline)) => Some(PlanSummary::compare(result, baseline)),
            _ => None,
        }
    }

    /// replace the loan terms and recalculate
    ///
    /// the terms are only adopted once their schedule computes.
    pub fn set_terms(&mut self, terms: LoanTerms) -> Result<PlanSummary> {
        let (result, baseline) = schedule_pair(&terms, &self.extra_payments)?;
        self.config.terms = terms;
        Ok(self.install(result, baseline))
    }

    /// change how rows are labelled; the schedule itself is unaffected
    pub fn set_labeling(&mut self, start_month: StartMonth, year_convention: YearConvention) {
        self.config.start_month = start_month;
        self.config.year_convention = year_convention;
    }

    /// recompute the schedule and the no-extra baseline
    ///
    /// on error the previous results are kept untouched.
    pub fn calculate(&mut self) -> Result<PlanSummary> {
        let (result, baseline) = schedule_pair(&self.config.terms, &self.extra_payments)?;
        Ok(self.install(result, baseline))
    }

    /// edit one month's extra payment, recalculating unless a batch is open
    pub fn set_extra_payment(&mut self, month: u32, amount: Money) -> Result<()> {
        self.extra_payments.set(month, amount)?;
        self.recalculate_if_live()
    }

    /// set every row of the current schedule to the same extra payment
    pub fn apply_extra_to_all(&mut self, amount: Money) -> Result<()> {
        let months = self.result.as_ref().map(|r| r.months()).unwrap_or(0);
        let mut batch = self.begin_batch();
        for month in 1..=months {
            batch.set_extra_payment(month, amount)?;
        }
        batch.commit()
    }

    /// suppress recalculation until the returned guard is committed or dropped
    pub fn begin_batch(&mut self) -> BatchUpdate<'_> {
        let was_suppressed = self.recalculation_suppressed;
        self.recalculation_suppressed = true;
        BatchUpdate {
            plan: self,
            was_suppressed,
        }
    }

    /// number of successful calculations so far
    pub fn calculation_count(&self) -> u64 {
        self.calculations
    }

    pub fn is_batch_open(&self) -> bool {
        self.recalculation_suppressed
    }

    /// restore default terms, clear extra payments and recalculate
    pub fn reset(&mut self) -> Result<PlanSummary> {
        self.config = PlanConfig::default();
        self.extra_payments = ExtraPaymentSchedule::empty();
        self.result = None;
        self.baseline = None;
        self.calculate()
    }

    /// labelled rows of the current schedule
    pub fn rows(&self) -> Vec<ScheduleRow> {
        let Some(result) = &self.result else {
            return Vec::new();
        };
        result
            .entries
            .iter()
            .map(|entry| {
                let label = month_label(entry.month, self.config.start_month, self.config.year_convention);
                ScheduleRow::new(label, entry)
            })
            .collect()
    }

    fn install(&mut self, result: AmortizationResult, baseline: AmortizationResult) -> PlanSummary {
        // rows past the payoff month no longer exist
        self.extra_payments.truncate(result.entries.len());

        let summary = PlanSummary::compare(&result, &baseline);
        debug!(
            "plan {} recalculated: {} months, interest {}",
            self.id, summary.months, summary.interest_paid
        );

        self.result = Some(result);
        self.baseline = Some(baseline);
        self.calculations += 1;
        summary
    }

    fn recalculate_if_live(&mut self) -> Result<()> {
        if self.recalculation_suppressed {
            return Ok(());
        }
        self.calculate().map(|_| ())
    }
}

/// schedule with the plan's extras and the same terms without them
fn schedule_pair(
    terms: &LoanTerms,
    extra_payments: &ExtraPaymentSchedule,
) -> Result<(AmortizationResult, AmortizationResult)> {
    let result = compute(terms, Some(extra_payments))?;
    let baseline = compute(terms, None)?;
    Ok((result, baseline))
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

/// scoped bulk edit of a plan's extra payments
///
/// recalculation is suppressed while the guard lives. `commit` releases
/// and recalculates once; dropping without commit only releases.
pub struct BatchUpdate<'a> {
    plan: &'a mut Plan,
    was_suppressed: bool,
}

impl<'a> BatchUpdate<'a> {
    pub fn set_extra_payment(&mut self, month: u32, amount: Money) -> Result<()> {
        self.plan.set_extra_payment(month, amount)
    }

    pub fn extra_payments(&self) -> &ExtraPaymentSchedule {
        &self.plan.extra_payments
    }

    /// end the batch and recalculate if no outer batch is open
    pub fn commit(self) -> Result<()> {
        self.plan.recalculation_suppressed = self.was_suppressed;
        self.plan.recalculate_if_live()
    }
}

impl Drop for BatchUpdate<'_> {
    fn drop(&mut self) {
        self.plan.recalculation_suppressed = self.was_suppressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn small_plan() -> Plan {
        let terms = LoanTerms::new(dec!(10000), dec!(6), 10).unwrap();
        let mut plan = Plan::with_config(PlanConfig::new(terms));
        plan.calculate().unwrap();
        plan
    }

    #[test]
    fn test_new_plan_uses_defaults() {
        let mut plan = Plan::new();
        assert!(plan.result().is_none());
        assert!(plan.rows().is_empty());

        let summary = plan.calculate().unwrap();
        assert_eq!(summary.months, 360);
        assert_eq!(summary.months_no_extra, 360);
        assert_eq!(plan.rows().len(), 360);
        assert_eq!(plan.rows()[0].month, "1");
    }

    #[test]
    fn test_single_edit_recalculates() {
        let mut plan = small_plan();
        assert_eq!(plan.calculation_count(), 1);

        plan.set_extra_payment(1, Money::from_major(1_000)).unwrap();
        assert_eq!(plan.calculation_count(), 2);

        let summary = plan.summary().unwrap();
        assert!(summary.months < summary.months_no_extra);
        assert_eq!(plan.result().unwrap().entries[0].extra_payment, Money::from_major(1_000));
    }

    #[test]
    fn test_apply_extra_to_all_recalculates_once() {
        let mut plan = small_plan();
        plan.apply_extra_to_all(Money::from_major(100)).unwrap();

        assert_eq!(plan.calculation_count(), 2);
        assert!(!plan.is_batch_open());

        let result = plan.result().unwrap();
        assert!(result.entries.len() < 120);
        assert!(result.entries.iter().all(|e| e.extra_payment == Money::from_major(100)));
        // extra rows beyond payoff are dropped with the schedule
        assert_eq!(plan.extra_payments().len(), result.entries.len());
    }

    #[test]
    fn test_batch_suppresses_until_commit() {
        let mut plan = small_plan();
        {
            let mut batch = plan.begin_batch();
            batch.set_extra_payment(1, Money::from_major(50)).unwrap();
            batch.set_extra_payment(2, Money::from_major(75)).unwrap();
            assert_eq!(batch.extra_payments().get(2), Money::from_major(75));
            batch.commit().unwrap();
        }
        assert_eq!(plan.calculation_count(), 2);
        assert_eq!(plan.result().unwrap().entries[1].extra_payment, Money::from_major(75));
    }

    #[test]
    fn test_dropped_batch_releases_without_recalculating() {
        let mut plan = small_plan();
        {
            let mut batch = plan.begin_batch();
            batch.set_extra_payment(3, Money::from_major(10)).unwrap();
            assert!(batch.set_extra_payment(4, Money::from_major(-10)).is_err());
        }
        assert!(!plan.is_batch_open());
        assert_eq!(plan.calculation_count(), 1);

        // next live edit picks up the pending change
        plan.set_extra_payment(5, Money::ZERO).unwrap();
        assert_eq!(plan.result().unwrap().entries[2].extra_payment, Money::from_major(10));
    }

    #[test]
    fn test_nested_batches() {
        let mut plan = small_plan();
        let mut outer = plan.begin_batch();
        {
            let inner = outer.plan.begin_batch();
            inner.commit().unwrap();
        }
        outer.set_extra_payment(1, Money::from_major(5)).unwrap();
        assert_eq!(outer.plan.calculation_count(), 1);
        outer.commit().unwrap();
        assert_eq!(plan.calculation_count(), 2);
    }

    #[test]
    fn test_failed_calculation_keeps_previous_result() {
        let mut plan = small_plan();
        let before = plan.result().cloned();

        let mut bad = *plan.terms();
        bad.term_years = 0;
        assert!(plan.set_terms(bad).unwrap_err().is_invalid_input());

        assert_eq!(plan.result().cloned(), before);
        assert_eq!(plan.terms().term_years, 10);
    }

    #[test]
    fn test_uncomputable_terms_are_not_adopted() {
        let mut plan = small_plan();
        let before = *plan.terms();

        // passes validation but the payment cannot be represented
        let huge = LoanTerms::new(Decimal::MAX, dec!(50), 1).unwrap();
        assert!(plan.set_terms(huge).unwrap_err().is_invalid_input());

        assert_eq!(plan.terms(), &before);
        assert_eq!(plan.calculation_count(), 1);
        assert_eq!(plan.summary().unwrap().months, 120);

        let csv = crate::export::to_csv_string(&plan).unwrap();
        assert!(csv.contains("Principal,\"$10,000.00\""));
        assert!(csv.contains("Loan Term,10 years"));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut plan = small_plan();
        plan.set_extra_payment(1, Money::from_major(500)).unwrap();
        plan.set_labeling(StartMonth::Month(Month::March), YearConvention::CalendarYear);

        let summary = plan.reset().unwrap();
        assert_eq!(plan.config(), &PlanConfig::default());
        assert!(plan.extra_payments().is_all_zero());
        assert_eq!(summary.interest_saved(), Money::ZERO);
    }

    #[test]
    fn test_rows_use_labeling() {
        let mut plan = small_plan();
        plan.set_labeling(StartMonth::Month(Month::March), YearConvention::CalendarYear);

        let rows = plan.rows();
        assert_eq!(rows[0].month, "Mar Y1");
        assert_eq!(rows[10].month, "Jan Y2");
        assert_eq!(rows[119].month, "Feb Y11");
    }
}
