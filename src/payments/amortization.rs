use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::errors::{AmortizationError, Result};

use super::ExtraPaymentSchedule;

/// residual balance below this is treated as paid off
pub const SETTLEMENT_TOLERANCE: Decimal = dec!(0.000001);

/// one month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    pub total_payment: Money,
    pub principal_payment: Money,
    pub extra_payment: Money,
    pub interest_payment: Money,
    pub remaining_balance: Money,
}

/// full schedule produced by one calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub base_payment: Money,
    pub entries: Vec<ScheduleEntry>,
    pub total_interest: Money,
}

impl AmortizationResult {
    /// get entry for a 1-based month
    pub fn get_entry(&self, month: u32) -> Option<&ScheduleEntry> {
        month
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx as usize))
    }

    /// number of payments until payoff
    pub fn months(&self) -> u32 {
        self.entries.len() as u32
    }

    /// sum of every month's total payment
    pub fn total_paid(&self) -> Money {
        self.entries.iter().map(|e| e.total_payment).sum()
    }

    pub fn total_extra(&self) -> Money {
        self.entries.iter().map(|e| e.extra_payment).sum()
    }

    pub fn last(&self) -> Option<&ScheduleEntry> {
        self.entries.last()
    }
}

/// amortization calculator
///
/// stateless; the same instance may be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationCalculator;

impl AmortizationCalculator {
    pub fn new() -> Self {
        Self
    }

    /// calculate the schedule for `terms` with optional extra payments
    ///
    /// each month charges interest on the opening balance and applies the
    /// base payment plus that month's extra. the balance is evaluated as the
    /// scheduled annuity balance less the extras carried forward at the loan
    /// rate, which keeps long high-rate loans inside decimal range and lands
    /// exactly on zero at the final scheduled month.
    pub fn calculate(&self, terms: &LoanTerms, extra_payments: Option<&ExtraPaymentSchedule>) -> Result<AmortizationResult> {
        terms.validate()?;

        let monthly_rate = terms.monthly_rate();
        let term_months = terms.term_months();
        let annuity = Annuity::new(terms.principal, monthly_rate, term_months)?;
        let base_payment = annuity.payment;

        debug!(
            "calculating schedule: principal {}, rate {}, {} months, base payment {}",
            terms.principal, terms.annual_rate, term_months, base_payment
        );

        let mut entries = Vec::with_capacity(term_months as usize);
        let mut balance = terms.principal;
        let mut extras_carried = Decimal::ZERO;
        let mut total_interest = Money::ZERO;

        for month in 1..=term_months {
            let interest = balance * monthly_rate;
            let extra_payment = extra_payments.map(|e| e.get(month)).unwrap_or(Money::ZERO);
            let mut principal_payment = base_payment - interest;
            let mut total_payment;

            // final month: pay exactly what is owed
            if extra_payment > balance + interest - base_payment {
                total_payment = balance + interest;
                principal_payment = balance;
                balance = Money::ZERO;
            } else {
                total_payment = base_payment + extra_payment;
                extras_carried = extras_carried
                    .checked_mul(annuity.growth)
                    .and_then(|carried| carried.checked_add(extra_payment.as_decimal()))
                    .ok_or_else(|| AmortizationError::Calculation {
                        message: format!("extra payments through month {} exceed decimal range", month),
                    })?;
                balance = annuity.balance_after(month) - Money::from_decimal(extras_carried);

                if balance.is_positive() && balance.as_decimal() < SETTLEMENT_TOLERANCE {
                    principal_payment += balance;
                    total_payment += balance;
                    balance = Money::ZERO;
                }
            }

            total_interest += interest;

            trace!(
                "month {}: payment {}, principal {}, extra {}, interest {}, balance {}",
                month, total_payment, principal_payment, extra_payment, interest, balance
            );

            entries.push(ScheduleEntry {
                month,
                total_payment,
                principal_payment,
                extra_payment,
                interest_payment: interest,
                remaining_balance: balance.max(Money::ZERO),
            });

            if !balance.is_positive() {
                break;
            }
        }

        debug!(
            "schedule complete: {} months, total interest {}",
            entries.len(),
            total_interest
        );

        Ok(AmortizationResult {
            base_payment,
            entries,
            total_interest,
        })
    }
}

/// calculate the schedule for `terms` with optional extra payments
pub fn compute(terms: &LoanTerms, extra_payments: Option<&ExtraPaymentSchedule>) -> Result<AmortizationResult> {
    AmortizationCalculator::new().calculate(terms, extra_payments)
}

/// fixed monthly payment that amortizes `principal` over `months`
///
/// P * r / (1 - (1 + r)^-n)
pub fn calculate_base_payment(principal: Money, monthly_rate: Decimal, months: u32) -> Result<Money> {
    Annuity::new(principal, monthly_rate, months).map(|annuity| annuity.payment)
}

/// level-payment loan without extras
struct Annuity {
    principal: Decimal,
    /// 1 + r
    growth: Decimal,
    /// (1 + r)^-k for k in 0..=n; shrinks toward zero instead of overflowing
    discounts: Vec<Decimal>,
    /// 1 - (1 + r)^-n
    denominator: Decimal,
    payment: Money,
}

impl Annuity {
    fn new(principal: Money, rate: Decimal, months: u32) -> Result<Self> {
        if rate <= Decimal::ZERO || months == 0 {
            return Err(AmortizationError::invalid_input(
                "terms",
                "rate and term must be positive",
            ));
        }

        let out_of_range = || {
            AmortizationError::invalid_input(
                "terms",
                format!("payment for rate {} over {} months exceeds decimal range", rate, months),
            )
        };

        let growth = Decimal::ONE.checked_add(rate).ok_or_else(out_of_range)?;
        let discount = Decimal::ONE.checked_div(growth).ok_or_else(out_of_range)?;

        let mut discounts = Vec::with_capacity(months as usize + 1);
        let mut factor = Decimal::ONE;
        discounts.push(factor);
        for _ in 0..months {
            factor *= discount;
            discounts.push(factor);
        }

        let denominator = Decimal::ONE - factor;
        if denominator <= Decimal::ZERO {
            return Err(AmortizationError::invalid_input(
                "terms",
                format!("rate {} is too small to amortize over {} months", rate, months),
            ));
        }

        // opening balance plus one month of interest must stay representable
        let principal = principal.as_decimal();
        let payment = principal
            .checked_mul(rate)
            .filter(|interest| principal.checked_add(*interest).is_some())
            .and_then(|interest| interest.checked_div(denominator))
            .map(Money::from_decimal)
            .ok_or_else(out_of_range)?;

        Ok(Self {
            principal,
            growth,
            discounts,
            denominator,
            payment,
        })
    }

    /// scheduled balance after `month` payments: P * (1 - (1 + r)^-(n - k)) / (1 - (1 + r)^-n)
    fn balance_after(&self, month: u32) -> Money {
        let months = self.discounts.len() - 1;
        let remaining = months.saturating_sub(month as usize);
        let outstanding = Decimal::ONE - self.discounts[remaining];
        Money::from_decimal(self.principal * outstanding / self.denominator)
    }
}
