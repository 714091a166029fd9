//! Print an amortization schedule, with optional extra payments
//!
//! Terms come from flags, a JSON plan config, or the built-in defaults.

use clap::{Parser, ValueEnum};
use loan_amortization_rs::config::{InputLimits, LoanTerms, PlanConfig};
use loan_amortization_rs::export::{export_csv_file, to_csv_string, ScheduleView, SCHEDULE_HEADERS};
use loan_amortization_rs::{AmortizationError, Decimal, Money, Plan, StartMonth, YearConvention};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

/// Loan amortization calculator
#[derive(Parser)]
#[command(name = "amortize", version, about = "Loan amortization schedules with extra payments")]
struct Cli {
    /// Loan principal, e.g. 348,300
    #[arg(long)]
    principal: Option<String>,

    /// Annual interest rate in percent, e.g. 6.75
    #[arg(long)]
    rate: Option<String>,

    /// Loan term in years
    #[arg(long)]
    years: Option<String>,

    /// JSON plan config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra payment applied to every month
    #[arg(long)]
    extra: Option<String>,

    /// Extra payment for one month, as MONTH=AMOUNT (repeatable)
    #[arg(long = "extra-at", value_parser = parse_month_amount)]
    extra_at: Vec<(u32, Money)>,

    /// Start month: "numbered", 1-12, or a month name
    #[arg(long)]
    start_month: Option<String>,

    /// Where year boundaries fall when a start month is given
    #[arg(long, value_enum)]
    year_start: Option<YearStartArg>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Also write the schedule to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum YearStartArg {
    LoanStart,
    CalendarYear,
}

impl From<YearStartArg> for YearConvention {
    fn from(arg: YearStartArg) -> Self {
        match arg {
            YearStartArg::LoanStart => YearConvention::LoanStart,
            YearStartArg::CalendarYear => YearConvention::CalendarYear,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn parse_month_amount(s: &str) -> Result<(u32, Money), String> {
    let (month, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected MONTH=AMOUNT, got '{}'", s))?;
    let month = month
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a month number", month))?;
    let amount = parse_amount(amount).map_err(|e| e.to_string())?;
    Ok((month, amount))
}

fn parse_amount(text: &str) -> Result<Money, AmortizationError> {
    let cleaned = text.trim().replace(',', "");
    Decimal::from_str(&cleaned)
        .map(Money::from_decimal)
        .map_err(|_| AmortizationError::invalid_input("extra payment", format!("'{}' is not a valid amount", text)))
}

fn build_plan(cli: &Cli) -> Result<Plan, AmortizationError> {
    let mut config = match &cli.config {
        Some(path) => PlanConfig::from_json_file(path)?,
        None => PlanConfig::default(),
    };

    if cli.principal.is_some() || cli.rate.is_some() || cli.years.is_some() {
        let current = config.terms;
        let principal = cli.principal.clone().unwrap_or_else(|| current.principal.to_string());
        let rate = cli
            .rate
            .clone()
            .unwrap_or_else(|| current.annual_rate.as_percentage().normalize().to_string());
        let years = cli.years.clone().unwrap_or_else(|| current.term_years.to_string());
        config.terms = LoanTerms::parse(&principal, &rate, &years, &InputLimits::default())?;
    }

    if let Some(text) = &cli.start_month {
        config.start_month = StartMonth::from_str(text)?;
    }
    if let Some(year_start) = cli.year_start {
        config.year_convention = year_start.into();
    }

    let mut plan = Plan::with_config(config);
    plan.calculate()?;

    if let Some(text) = &cli.extra {
        plan.apply_extra_to_all(parse_amount(text)?)?;
    }
    if !cli.extra_at.is_empty() {
        let mut batch = plan.begin_batch();
        for (month, amount) in &cli.extra_at {
            batch.set_extra_payment(*month, *amount)?;
        }
        batch.commit()?;
    }

    Ok(plan)
}

fn print_table(plan: &Plan) {
    let rows = plan.rows();
    let width = rows.iter().map(|r| r.month.len()).max().unwrap_or(5).max(5);

    println!(
        "{:>width$} | {:>14} | {:>17} | {:>13} | {:>16} | {:>17}",
        SCHEDULE_HEADERS[0],
        SCHEDULE_HEADERS[1],
        SCHEDULE_HEADERS[2],
        SCHEDULE_HEADERS[3],
        SCHEDULE_HEADERS[4],
        SCHEDULE_HEADERS[5],
        width = width,
    );
    for row in &rows {
        let cells = row.cells();
        println!(
            "{:>width$} | {:>14} | {:>17} | {:>13} | {:>16} | {:>17}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            cells[4],
            cells[5],
            width = width,
        );
    }

    if let Some(summary) = plan.summary() {
        println!();
        println!("{}", summary);
    }
}

fn run(cli: &Cli) -> Result<(), AmortizationError> {
    let plan = build_plan(cli)?;

    match cli.output {
        OutputFormat::Table => print_table(&plan),
        OutputFormat::Json => println!("{}", ScheduleView::from_plan(&plan)?.to_json_pretty()?),
        OutputFormat::Csv => print!("{}", to_csv_string(&plan)?),
    }

    if let Some(path) = &cli.export {
        let written = export_csv_file(&plan, path)?;
        eprintln!("Amortization schedule exported to {}", written.display());
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
