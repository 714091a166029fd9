use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::decimal::Money;
use crate::errors::{AmortizationError, Result};

/// per-month extra principal payments, month 1 at index 0
///
/// months past the end of the sequence have no extra payment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtraPaymentSchedule {
    amounts: Vec<Money>,
}

impl ExtraPaymentSchedule {
    pub fn new(amounts: Vec<Money>) -> Result<Self> {
        if let Some(pos) = amounts.iter().position(|a| a.is_negative()) {
            return Err(negative_amount(pos as u32 + 1, amounts[pos]));
        }
        Ok(Self { amounts })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// the same extra amount for each of the first `months` months
    pub fn uniform(amount: Money, months: u32) -> Result<Self> {
        Self::new(vec![amount; months as usize])
    }

    /// parse table cells; blank or unparseable cells count as zero
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Result<Self> {
        let mut amounts = Vec::with_capacity(cells.len());
        for (idx, cell) in cells.iter().enumerate() {
            let text = cell.as_ref().trim().replace(',', "");
            let amount = if text.is_empty() {
                Money::ZERO
            } else {
                match Decimal::from_str(&text) {
                    Ok(d) => Money::from_decimal(d),
                    Err(_) => {
                        warn!("ignoring extra payment '{}' for month {}", text, idx + 1);
                        Money::ZERO
                    }
                }
            };
            amounts.push(amount);
        }
        Self::new(amounts)
    }

    /// extra payment for the 1-based `month`
    pub fn get(&self, month: u32) -> Money {
        month
            .checked_sub(1)
            .and_then(|idx| self.amounts.get(idx as usize))
            .copied()
            .unwrap_or(Money::ZERO)
    }

    /// set the extra payment for the 1-based `month`, padding earlier months with zero
    pub fn set(&mut self, month: u32, amount: Money) -> Result<()> {
        if month == 0 {
            return Err(AmortizationError::invalid_input("month", "months are numbered from 1"));
        }
        if amount.is_negative() {
            return Err(negative_amount(month, amount));
        }
        let idx = (month - 1) as usize;
        if idx >= self.amounts.len() {
            self.amounts.resize(idx + 1, Money::ZERO);
        }
        self.amounts[idx] = amount;
        Ok(())
    }

    /// set every existing month to `amount`
    pub fn fill(&mut self, amount: Money) -> Result<()> {
        if amount.is_negative() {
            return Err(negative_amount(1, amount));
        }
        self.amounts.iter_mut().for_each(|a| *a = amount);
        Ok(())
    }

    pub fn truncate(&mut self, months: usize) {
        self.amounts.truncate(months);
    }

    pub fn resize(&mut self, months: usize) {
        self.amounts.resize(months, Money::ZERO);
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// true when no month carries an extra payment
    pub fn is_all_zero(&self) -> bool {
        self.amounts.iter().all(|a| a.is_zero())
    }

    pub fn total(&self) -> Money {
        self.amounts.iter().sum()
    }

    pub fn as_slice(&self) -> &[Money] {
        &self.amounts
    }
}

fn negative_amount(month: u32, amount: Money) -> AmortizationError {
    AmortizationError::invalid_input(
        "extra payment",
        format!("month {} has negative amount {}", month, amount),
    )
}
