//! csv and json views of a plan
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::errors::{AmortizationError, Result};
use crate::payments::{PlanSummary, ScheduleEntry};
use crate::plan::Plan;

pub const SCHEDULE_HEADERS: [&str; 6] = [
    "Month",
    "Total Payment",
    "Principal Payment",
    "Extra Payment",
    "Interest Payment",
    "Remaining Balance",
];

/// one displayed schedule row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: String,
    pub total_payment: Money,
    pub principal_payment: Money,
    pub extra_payment: Money,
    pub interest_payment: Money,
    pub remaining_balance: Money,
}

impl ScheduleRow {
    pub fn new(month: String, entry: &ScheduleEntry) -> Self {
        Self {
            month,
            total_payment: entry.total_payment,
            principal_payment: entry.principal_payment,
            extra_payment: entry.extra_payment,
            interest_payment: entry.interest_payment,
            remaining_balance: entry.remaining_balance,
        }
    }

    /// cells formatted for display, in `SCHEDULE_HEADERS` order
    pub fn cells(&self) -> [String; 6] {
        [
            self.month.clone(),
            self.total_payment.to_currency_string(),
            self.principal_payment.to_currency_string(),
            self.extra_payment.to_currency_string(),
            self.interest_payment.to_currency_string(),
            self.remaining_balance.to_currency_string(),
        ]
    }
}

/// serializable view of a calculated plan
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleView {
    pub terms: TermsView,
    pub summary: PlanSummary,
    pub base_payment: Money,
    pub rows: Vec<ScheduleRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TermsView {
    pub principal: Money,
    pub annual_rate_pct: rust_decimal::Decimal,
    pub term_years: u32,
    pub start_month: String,
    pub year_convention: String,
}

impl ScheduleView {
    pub fn from_plan(plan: &Plan) -> Result<Self> {
        let (result, summary) = match (plan.result(), plan.summary()) {
            (Some(result), Some(summary)) => (result, summary),
            _ => return Err(nothing_to_export()),
        };
        let config = plan.config();

        Ok(ScheduleView {
            terms: TermsView {
                principal: config.terms.principal,
                annual_rate_pct: config.terms.annual_rate.as_percentage().normalize(),
                term_years: config.terms.term_years,
                start_month: config.start_month.to_string(),
                year_convention: config.year_convention.to_string(),
            },
            summary,
            base_payment: result.base_payment,
            rows: plan.rows(),
        })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// write the plan as csv: loan details, summary, then the schedule table
pub fn write_csv<W: Write>(plan: &Plan, mut writer: W) -> Result<()> {
    let summary = plan.summary().ok_or_else(nothing_to_export)?;
    let rows = plan.rows();

    write_block(&mut writer, |wtr| write_loan_details(wtr, plan.terms()))?;
    writer.write_all(b"\n")?;

    write_block(&mut writer, |wtr| {
        wtr.write_record(["Summary"])?;
        for (label, value) in summary.lines() {
            wtr.write_record([label, value.as_str()])?;
        }
        Ok(())
    })?;
    writer.write_all(b"\n")?;

    write_block(&mut writer, |wtr| {
        wtr.write_record(SCHEDULE_HEADERS)?;
        for row in &rows {
            wtr.write_record(row.cells())?;
        }
        Ok(())
    })?;

    writer.flush()?;
    Ok(())
}

/// csv export as a string
pub fn to_csv_string(plan: &Plan) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(plan, &mut buf)?;
    String::from_utf8(buf).map_err(|e| AmortizationError::Export {
        message: e.to_string(),
    })
}

/// export to `path`, adding a `.csv` extension when missing; returns the written path
pub fn export_csv_file(plan: &Plan, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = csv_path(path.as_ref());
    let file = File::create(&path)?;
    write_csv(plan, file)?;
    log::info!("exported plan {} to {}", plan.id, path.display());
    Ok(path)
}

fn csv_path(path: &Path) -> PathBuf {
    let has_csv_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if has_csv_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".csv");
        PathBuf::from(name)
    }
}

fn write_loan_details<W: Write>(wtr: &mut csv::Writer<W>, terms: &LoanTerms) -> Result<()> {
    wtr.write_record(["Loan Details"])?;
    wtr.write_record(["Principal".to_string(), format!("${}", terms.principal.to_currency_string())])?;
    wtr.write_record([
        "Annual Interest Rate".to_string(),
        format!("{}%", terms.annual_rate.as_percentage().normalize()),
    ])?;
    wtr.write_record(["Loan Term".to_string(), format!("{} years", terms.term_years)])?;
    Ok(())
}

// csv::Writer quotes an empty record, so each block gets its own writer
// and the blank separator lines go straight to the sink
fn write_block<W, F>(sink: &mut W, write: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut csv::Writer<&mut W>) -> Result<()>,
{
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(sink);
    write(&mut wtr)?;
    wtr.flush()?;
    Ok(())
}

fn nothing_to_export() -> AmortizationError {
    AmortizationError::Export {
        message: "no schedule to export, calculate the plan first".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use chrono::Month;
    use crate::types::{StartMonth, YearConvention};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn one_year_plan() -> Plan {
        let terms = LoanTerms::new(dec!(1000), dec!(12), 1).unwrap();
        let mut plan = Plan::with_config(PlanConfig::new(terms));
        plan.calculate().unwrap();
        plan
    }

    #[test]
    fn test_csv_layout() {
        let plan = one_year_plan();
        let csv = to_csv_string(&plan).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            &lines[..11],
            &[
                "Loan Details",
                "Principal,\"$1,000.00\"",
                "Annual Interest Rate,12%",
                "Loan Term,1 years",
                "",
                "Summary",
                "Interest Paid,$66.19",
                "Total Paid,\"$1,066.19\"",
                "Interest Paid (No Extra),$66.19",
                "Total Paid (No Extra),\"$1,066.19\"",
                "",
            ]
        );
        assert_eq!(
            lines[11],
            "Month,Total Payment,Principal Payment,Extra Payment,Interest Payment,Remaining Balance"
        );
        assert_eq!(lines[12], "1,88.85,78.85,0.00,10.00,921.15");
        assert_eq!(lines.len(), 12 + 12);
        assert!(lines[23].ends_with(",0.00"));
    }

    #[test]
    fn test_csv_uses_month_labels() {
        let mut plan = one_year_plan();
        plan.set_labeling(StartMonth::Month(Month::November), YearConvention::CalendarYear);
        let csv = to_csv_string(&plan).unwrap();

        assert!(csv.contains("\nNov Y1,88.85,"));
        assert!(csv.contains("\nJan Y2,88.85,"));
    }

    #[test]
    fn test_export_requires_calculation() {
        let plan = Plan::new();
        let err = to_csv_string(&plan).unwrap_err();
        assert!(matches!(err, AmortizationError::Export { .. }));
        assert!(ScheduleView::from_plan(&plan).is_err());
    }

    #[test]
    fn test_csv_path_extension() {
        assert_eq!(csv_path(Path::new("plan")), PathBuf::from("plan.csv"));
        assert_eq!(csv_path(Path::new("plan.CSV")), PathBuf::from("plan.CSV"));
        assert_eq!(csv_path(Path::new("plan.txt")), PathBuf::from("plan.txt.csv"));
    }

    #[test]
    fn test_export_file() {
        let plan = one_year_plan();
        let target = std::env::temp_dir().join(format!("amortization-{}", plan.id));
        let written = export_csv_file(&plan, &target).unwrap();

        assert_eq!(written.extension().unwrap(), "csv");
        let contents = std::fs::read_to_string(&written).unwrap();
        assert!(contents.starts_with("Loan Details\n"));
        std::fs::remove_file(written).unwrap();
    }

    #[test]
    fn test_json_view() {
        let plan = one_year_plan();
        let view = ScheduleView::from_plan(&plan).unwrap();
        assert_eq!(view.rows.len(), 12);
        assert_eq!(view.terms.start_month, "numbered");

        let json = view.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["terms"]["annual_rate_pct"], "12");
        assert_eq!(value["terms"]["term_years"], 1);
        assert_eq!(value["rows"][0]["month"], "1");
        assert_eq!(value["summary"]["months"], 12);
    }
}
