use tracing::debug;

use super::error::Result;
use super::regimes::{RegimeConfig, resolve, validate_bands};
use super::types::{
    Band, ComputationInput, ComputationResult, ExtraItem, ProgressiveTax, Slice, non_negative,
};

/// Slices `income` across `bands` in order. Bands above the income level produce no slice.
pub fn compute_progressive_tax(income: f64, bands: &[Band]) -> ProgressiveTax {
    let mut remaining = non_negative(income);
    let mut last_cap = 0.0;
    let mut tax = 0.0;
    let mut slices = Vec::new();

    for band in bands {
        if remaining <= 0.0 {
            break;
        }
        let current_cap = band.up_to.unwrap_or(f64::MAX);
        let amount = non_negative(remaining.min(current_cap - last_cap));
        if amount > 0.0 {
            let slice_tax = amount * band.rate;
            slices.push(Slice {
                lower: last_cap,
                upper: band.up_to,
                amount,
                rate: band.rate,
                tax: slice_tax,
            });
            tax += slice_tax;
            remaining -= amount;
            last_cap = current_cap;
        }
    }

    ProgressiveTax { tax, slices }
}

/// Runs one full computation: annualise, deduct, slice, levy extras and aggregate.
pub fn compute(input: &ComputationInput) -> Result<ComputationResult> {
    let config = resolve(&input.regime_id)?;
    compute_with(config, input)
}

pub fn compute_with(
    config: &'static RegimeConfig,
    input: &ComputationInput,
) -> Result<ComputationResult> {
    let gross_annual = input
        .period
        .to_annual(non_negative(input.gross_amount))
        .min(f64::MAX);
    let deductions = non_negative(input.standard_deduction + input.other_deductions).min(f64::MAX);
    let taxable_base = non_negative(gross_annual - deductions);

    let bands = config.bands_for(&input.regime_params);
    validate_bands(config.id, &bands)?;

    let progressive = compute_progressive_tax(taxable_base, &bands);
    let extras = config.extras_for(taxable_base, gross_annual, &input.regime_params);

    let result = aggregate(
        config.id,
        gross_annual,
        deductions,
        taxable_base,
        progressive,
        extras,
    );
    debug!(
        regime = result.regime_id,
        gross = result.gross_annual,
        taxable = result.taxable_base,
        total_tax = result.total_tax,
        slices = result.slices.len(),
        "computed take-home pay"
    );
    Ok(result)
}

fn aggregate(
    regime_id: &'static str,
    gross_annual: f64,
    deductions: f64,
    taxable_base: f64,
    progressive: ProgressiveTax,
    extras: Vec<ExtraItem>,
) -> ComputationResult {
    let extras_total: f64 = extras.iter().map(|extra| extra.amount).sum();
    let total_tax = progressive.tax + extras_total;
    let effective_rate = if gross_annual > 0.0 {
        total_tax / gross_annual
    } else {
        0.0
    };
    let marginal_rate = progressive.slices.last().map_or(0.0, |slice| slice.rate);

    ComputationResult {
        regime_id,
        gross_annual,
        deductions,
        taxable_base,
        band_tax: progressive.tax,
        slices: progressive.slices,
        extras,
        total_tax,
        net_annual: non_negative(gross_annual - total_tax),
        effective_rate,
        marginal_rate,
    }
}
