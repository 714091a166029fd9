//! month labels for schedule rows

use crate::types::{StartMonth, YearConvention};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// label for the 1-based `month_index` of a schedule
///
/// numbered schedules use the index itself; calendar schedules use
/// `<abbr> Y<n>` with the year counted per `convention`.
///
/// # Panics
///
/// if `month_index` is zero.
pub fn month_label(month_index: u32, start_month: StartMonth, convention: YearConvention) -> String {
    assert!(month_index >= 1, "schedule months are 1-based");

    let start = match start_month.month_number() {
        None => return month_index.to_string(),
        Some(start) => start,
    };

    // months elapsed since the january on or before the start month
    let calendar_position = month_index + start - 2;
    let month_name = MONTH_ABBREVIATIONS[(calendar_position % 12) as usize];
    let year_offset = match convention {
        YearConvention::LoanStart => (month_index - 1) / 12,
        YearConvention::CalendarYear => calendar_position / 12,
    };

    format!("{} Y{}", month_name, year_offset + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;

    const MARCH: StartMonth = StartMonth::Month(Month::March);

    #[test]
    fn test_numbered_labels() {
        assert_eq!(month_label(1, StartMonth::Numbered, YearConvention::LoanStart), "1");
        assert_eq!(month_label(360, StartMonth::Numbered, YearConvention::CalendarYear), "360");
    }

    #[test]
    fn test_loan_start_years() {
        assert_eq!(month_label(1, MARCH, YearConvention::LoanStart), "Mar Y1");
        assert_eq!(month_label(10, MARCH, YearConvention::LoanStart), "Dec Y1");
        assert_eq!(month_label(11, MARCH, YearConvention::LoanStart), "Jan Y1");
        assert_eq!(month_label(12, MARCH, YearConvention::LoanStart), "Feb Y1");
        assert_eq!(month_label(13, MARCH, YearConvention::LoanStart), "Mar Y2");
    }

    #[test]
    fn test_calendar_years() {
        assert_eq!(month_label(1, MARCH, YearConvention::CalendarYear), "Mar Y1");
        assert_eq!(month_label(10, MARCH, YearConvention::CalendarYear), "Dec Y1");
        assert_eq!(month_label(11, MARCH, YearConvention::CalendarYear), "Jan Y2");
        assert_eq!(month_label(23, MARCH, YearConvention::CalendarYear), "Jan Y3");
    }

    #[test]
    fn test_january_start_conventions_agree() {
        let january = StartMonth::Month(Month::January);
        for month in 1..=36 {
            assert_eq!(
                month_label(month, january, YearConvention::LoanStart),
                month_label(month, january, YearConvention::CalendarYear),
            );
        }
        assert_eq!(month_label(12, january, YearConvention::LoanStart), "Dec Y1");
        assert_eq!(month_label(13, january, YearConvention::LoanStart), "Jan Y2");
    }

    #[test]
    #[should_panic(expected = "1-based")]
    fn test_zero_month_panics() {
        month_label(0, MARCH, YearConvention::LoanStart);
    }
}
