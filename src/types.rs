use chrono::Month;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AmortizationError;

/// unique identifier for a plan
pub type PlanId = Uuid;

/// first month of the schedule, or plain numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum StartMonth {
    /// rows labelled 1, 2, 3, ...
    #[default]
    Numbered,
    /// rows labelled by calendar month starting here
    Month(Month),
}

impl StartMonth {
    /// 1..=12 for a calendar start, None when numbered
    pub fn month_number(&self) -> Option<u32> {
        match self {
            StartMonth::Numbered => None,
            StartMonth::Month(m) => Some(m.number_from_month()),
        }
    }

    pub fn from_number(number: u32) -> Option<Self> {
        u8::try_from(number)
            .ok()
            .and_then(|n| Month::try_from(n).ok())
            .map(StartMonth::Month)
    }
}

impl fmt::Display for StartMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartMonth::Numbered => write!(f, "numbered"),
            StartMonth::Month(m) => write!(f, "{}", &m.name()[..3]),
        }
    }
}

impl FromStr for StartMonth {
    type Err = AmortizationError;

    /// accepts "numbered", "1 (numbered)", 1-12, or an english month name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("numbered") || text.eq_ignore_ascii_case("1 (numbered)") {
            return Ok(StartMonth::Numbered);
        }

        if let Ok(number) = text.parse::<u32>() {
            return StartMonth::from_number(number).ok_or_else(|| {
                AmortizationError::invalid_input("start month", format!("{} is not a month number", number))
            });
        }

        text.parse::<Month>()
            .map(StartMonth::Month)
            .map_err(|_| AmortizationError::invalid_input("start month", format!("unrecognized month '{}'", text)))
    }
}

impl TryFrom<String> for StartMonth {
    type Error = AmortizationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StartMonth> for String {
    fn from(value: StartMonth) -> Self {
        value.to_string()
    }
}

/// where displayed year boundaries fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum YearConvention {
    /// Y2 begins twelve payments after the first
    #[default]
    LoanStart,
    /// Y2 begins at the first January after the start month
    CalendarYear,
}

impl fmt::Display for YearConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearConvention::LoanStart => write!(f, "loan-start"),
            YearConvention::CalendarYear => write!(f, "calendar-year"),
        }
    }
}

impl FromStr for YearConvention {
    type Err = AmortizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "loan-start" => Ok(YearConvention::LoanStart),
            "calendar-year" => Ok(YearConvention::CalendarYear),
            other => Err(AmortizationError::invalid_input(
                "year convention",
                format!("unrecognized convention '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_month_parsing() {
        assert_eq!("numbered".parse::<StartMonth>().unwrap(), StartMonth::Numbered);
        assert_eq!("1 (numbered)".parse::<StartMonth>().unwrap(), StartMonth::Numbered);
        assert_eq!("Mar".parse::<StartMonth>().unwrap(), StartMonth::Month(Month::March));
        assert_eq!("september".parse::<StartMonth>().unwrap(), StartMonth::Month(Month::September));
        assert_eq!("12".parse::<StartMonth>().unwrap(), StartMonth::Month(Month::December));

        assert!("13".parse::<StartMonth>().unwrap_err().is_invalid_input());
        assert!("0".parse::<StartMonth>().is_err());
        assert!("smarch".parse::<StartMonth>().is_err());
    }

    #[test]
    fn test_start_month_number_and_display() {
        assert_eq!(StartMonth::Numbered.month_number(), None);
        assert_eq!(StartMonth::Month(Month::March).month_number(), Some(3));
        assert_eq!(StartMonth::Month(Month::March).to_string(), "Mar");
        assert_eq!(StartMonth::from_number(1), Some(StartMonth::Month(Month::January)));
        assert_eq!(StartMonth::from_number(13), None);
    }

    #[test]
    fn test_year_convention_parsing() {
        assert_eq!("loan-start".parse::<YearConvention>().unwrap(), YearConvention::LoanStart);
        assert_eq!("Calendar Year".parse::<YearConvention>().unwrap(), YearConvention::CalendarYear);
        assert_eq!("calendar_year".parse::<YearConvention>().unwrap(), YearConvention::CalendarYear);
        assert!("fiscal".parse::<YearConvention>().is_err());
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&StartMonth::Month(Month::March)).unwrap();
        assert_eq!(json, "\"Mar\"");
        let back: StartMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StartMonth::Month(Month::March));

        let json = serde_json::to_string(&YearConvention::CalendarYear).unwrap();
        assert_eq!(json, "\"calendar-year\"");
    }
}
