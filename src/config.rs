use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::types::{StartMonth, YearConvention};

pub const DEFAULT_PRINCIPAL: Decimal = dec!(348300);
pub const DEFAULT_ANNUAL_RATE: Decimal = dec!(6.75);
pub const DEFAULT_TERM_YEARS: u32 = 30;

/// loan terms, immutable input to a calculation
///
/// serialized with the rate as a percentage under `annual_rate_pct`,
/// matching every text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    #[serde(rename = "annual_rate_pct", with = "percentage")]
    pub annual_rate: Rate,
    pub term_years: u32,
}

impl LoanTerms {
    /// create validated terms; `annual_rate_pct` is a percentage (6.75 for 6.75%)
    pub fn new(principal: Decimal, annual_rate_pct: Decimal, term_years: u32) -> Result<Self> {
        let terms = Self {
            principal: Money::from_decimal(principal),
            annual_rate: Rate::from_percentage(annual_rate_pct),
            term_years,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// parse raw text fields, as typed by a user
    pub fn parse(principal: &str, annual_rate: &str, term_years: &str, limits: &InputLimits) -> Result<Self> {
        let principal = parse_decimal("principal", &principal.replace(',', ""))?;
        let annual_rate = parse_decimal("annual rate", annual_rate)?;
        let term_years = parse_years(term_years)?;

        let terms = Self::new(principal, annual_rate, term_years)?;
        limits.check(&terms)?;
        Ok(terms)
    }

    /// principal, rate and term must all be positive
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(AmortizationError::invalid_input(
                "principal",
                format!("must be a positive number, got {}", self.principal),
            ));
        }
        if !self.annual_rate.is_positive() {
            return Err(AmortizationError::invalid_input(
                "annual rate",
                format!("must be a positive number, got {}", self.annual_rate),
            ));
        }
        if self.term_years == 0 {
            return Err(AmortizationError::invalid_input("term", "must be a positive integer"));
        }
        if self.term_years.checked_mul(12).is_none() {
            return Err(AmortizationError::invalid_input(
                "term",
                format!("{} years has too many monthly payments", self.term_years),
            ));
        }
        Ok(())
    }

    /// nominal number of monthly payments, saturating for terms `validate` rejects
    pub fn term_months(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }

    pub fn monthly_rate(&self) -> Decimal {
        self.annual_rate.monthly_rate().as_decimal()
    }
}

impl Default for LoanTerms {
    fn default() -> Self {
        Self {
            principal: Money::from_decimal(DEFAULT_PRINCIPAL),
            annual_rate: Rate::from_percentage(DEFAULT_ANNUAL_RATE),
            term_years: DEFAULT_TERM_YEARS,
        }
    }
}

mod percentage {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::decimal::Rate;

    pub fn serialize<S: Serializer>(rate: &Rate, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&rate.as_percentage().normalize(), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rate, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Rate::from_percentage)
    }
}

fn parse_decimal(field: &str, text: &str) -> Result<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmortizationError::invalid_input(field, "is required"));
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| AmortizationError::invalid_input(field, format!("'{}' is not a valid number", text)))
}

fn parse_years(text: &str) -> Result<u32> {
    let text = text.trim();
    let years = text
        .parse::<i64>()
        .map_err(|_| AmortizationError::invalid_input("term", format!("'{}' is not a valid integer", text)))?;
    if years <= 0 {
        return Err(AmortizationError::invalid_input("term", "must be a positive integer"));
    }
    u32::try_from(years).map_err(|_| AmortizationError::invalid_input("term", format!("{} years is too long", years)))
}

/// accepted ranges for user-entered terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimits {
    pub min_principal: Money,
    pub max_principal: Money,
    pub min_annual_rate_pct: Decimal,
    pub max_annual_rate_pct: Decimal,
    pub min_term_years: u32,
    pub max_term_years: u32,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_principal: Money::from_decimal(dec!(0.01)),
            max_principal: Money::from_decimal(dec!(999999999.99)),
            min_annual_rate_pct: dec!(0.01),
            max_annual_rate_pct: dec!(99.99),
            min_term_years: 1,
            max_term_years: 100,
        }
    }
}

impl InputLimits {
    /// accept anything positive
    pub fn unbounded() -> Self {
        Self {
            min_principal: Money::ZERO,
            max_principal: Money::from_decimal(Decimal::MAX),
            min_annual_rate_pct: Decimal::ZERO,
            max_annual_rate_pct: Decimal::MAX,
            min_term_years: 1,
            max_term_years: u32::MAX / 12,
        }
    }

    pub fn check(&self, terms: &LoanTerms) -> Result<()> {
        if terms.principal < self.min_principal || terms.principal > self.max_principal {
            return Err(AmortizationError::invalid_input(
                "principal",
                format!("must be between {} and {}", self.min_principal, self.max_principal),
            ));
        }

        let rate = terms.annual_rate.as_percentage();
        if rate < self.min_annual_rate_pct || rate > self.max_annual_rate_pct {
            return Err(AmortizationError::invalid_input(
                "annual rate",
                format!("must be between {}% and {}%", self.min_annual_rate_pct, self.max_annual_rate_pct),
            ));
        }

        if terms.term_years < self.min_term_years || terms.term_years > self.max_term_years {
            return Err(AmortizationError::invalid_input(
                "term",
                format!("must be between {} and {} years", self.min_term_years, self.max_term_years),
            ));
        }

        Ok(())
    }
}

/// everything needed to reproduce a plan's schedule and labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlanConfig {
    pub terms: LoanTerms,
    #[serde(default)]
    pub start_month: StartMonth,
    #[serde(default)]
    pub year_convention: YearConvention,
}

impl PlanConfig {
    pub fn new(terms: LoanTerms) -> Self {
        Self {
            terms,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlanConfig = serde_json::from_str(json)
            .map_err(|e| AmortizationError::invalid_input("config", e.to_string()))?;
        config.terms.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AmortizationError::invalid_input("config", format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
