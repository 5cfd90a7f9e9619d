use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::{FilingStatus, Period, registry};

use super::{
    ComputePayload, Outcome, api_request_from_payload, build_compute_response, compute_or_fallback,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliPeriod {
    Annual,
    Monthly,
}

impl From<CliPeriod> for Period {
    fn from(value: CliPeriod) -> Self {
        match value {
            CliPeriod::Annual => Period::Annual,
            CliPeriod::Monthly => Period::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliFilingStatus {
    Single,
    Married,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::Married => FilingStatus::Married,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "takehome",
    about = "Progressive income tax and take-home pay calculator"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Enable debug logging (RUST_LOG overrides)")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP JSON API
    Serve(ServeArgs),
    /// Compute tax and net pay for one salary
    Compute(ComputeArgs),
    /// List supported regimes and their defaults
    Regimes,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct ComputeArgs {
    #[arg(long, help = "Regime id, e.g. uk, us, ca, au; unknown ids fall back to uk")]
    regime: Option<String>,
    #[arg(long, help = "Gross salary for the chosen --period")]
    gross: Option<f64>,
    #[arg(long, value_enum, help = "Period the gross amount is expressed in")]
    period: Option<CliPeriod>,
    #[arg(long, value_enum, help = "Period used for the summary; defaults to --period")]
    display_period: Option<CliPeriod>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Annual standard deduction; defaults to the regime's value"
    )]
    standard_deduction: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Other annual deductions")]
    other_deductions: Option<f64>,
    #[arg(long, help = "Personal allowance (uk)")]
    personal_allowance: Option<f64>,
    #[arg(long, value_enum, help = "Filing status (us)")]
    filing_status: Option<CliFilingStatus>,
    #[arg(long, help = "Shared state blob to start from; ignored when malformed")]
    share: Option<String>,
    #[arg(long, help = "Print the full response as JSON")]
    json: bool,
}

impl From<ComputeArgs> for ComputePayload {
    fn from(args: ComputeArgs) -> Self {
        ComputePayload {
            regime: args.regime,
            gross: args.gross,
            period: args.period.map(Into::into),
            display_period: args.display_period.map(Into::into),
            standard_deduction: args.standard_deduction,
            other_deductions: args.other_deductions,
            personal_allowance: args.personal_allowance,
            filing_status: args.filing_status.map(Into::into),
            share: args.share,
        }
    }
}

pub fn run_compute(args: ComputeArgs) -> Result<(), String> {
    let json = args.json;
    let request = api_request_from_payload(args.into())?;
    let outcome = compute_or_fallback(request.input).map_err(|e| e.to_string())?;

    if json {
        let response = build_compute_response(outcome, request.display_period);
        let body = serde_json::to_string_pretty(&response).map_err(|e| e.to_string())?;
        println!("{body}");
    } else {
        print_breakdown(&outcome, request.display_period);
    }
    Ok(())
}

fn print_breakdown(outcome: &Outcome, display_period: Period) {
    let result = &outcome.result;
    let symbol = crate::core::resolve(result.regime_id).map_or("", |c| c.currency_symbol);
    let money = |amount: f64| format_money(symbol, amount);

    if let Some(requested) = &outcome.fallback_from {
        println!("Unknown regime {requested:?}; showing {} instead", result.regime_id);
    }

    println!();
    println!("TAKE-HOME ({}, annual)", result.regime_id.to_uppercase());
    println!("  Gross:      {}", money(result.gross_annual));
    println!("  Deductions: {}", money(result.deductions));
    println!("  Taxable:    {}", money(result.taxable_base));
    println!();

    println!("INCOME TAX BANDS");
    if result.slices.is_empty() {
        println!("  (no taxable income)");
    }
    for slice in &result.slices {
        let upper = slice.upper.map_or("and above".to_string(), money);
        println!(
            "  {} - {} @ {:.1}%: {} taxed {}",
            money(slice.lower),
            upper,
            slice.rate * 100.0,
            money(slice.amount),
            money(slice.tax)
        );
    }
    println!("  Band tax: {}", money(result.band_tax));
    println!();

    if !result.extras.is_empty() {
        println!("CONTRIBUTIONS");
        for extra in &result.extras {
            println!("  {}: {}", extra.label, money(extra.amount));
        }
        println!();
    }

    let summary = result.in_period(display_period);
    let period_label = match display_period {
        Period::Annual => "per year",
        Period::Monthly => "per month",
    };
    println!("TOTAL TAX: {} {period_label}", money(summary.total_tax));
    println!("NET PAY:   {} {period_label}", money(summary.net));
    println!(
        "Effective rate {:.2}% | Marginal rate {:.1}%",
        result.effective_rate * 100.0,
        result.marginal_rate * 100.0
    );
    println!();
    println!("Share: {}", crate::share::encode(&outcome.input));
}

pub fn print_regimes() {
    for config in registry() {
        let defaults = config.default_deductions;
        println!(
            "{:<4} {:<26} {:<3} standard deduction {}",
            config.id,
            config.label,
            config.currency_symbol,
            format_money(config.currency_symbol, defaults.standard)
        );
        if let Some(allowance) = config.default_params.personal_allowance {
            println!(
                "     personal allowance {}",
                format_money(config.currency_symbol, allowance)
            );
        }
        if let Some(status) = config.default_params.filing_status {
            println!("     filing status {status:?}");
        }
        if let Some(notes) = config.notes {
            println!("     {notes}");
        }
    }
}

/// Two decimal places with thousands separators, e.g. `£12,570.00`.
fn format_money(symbol: &str, amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{symbol}{grouped}.{:02}", cents % 100)
}
