use serde::{Deserialize, Serialize};

/// One progressive bracket. `up_to: None` marks the terminal band with no upper limit.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub up_to: Option<f64>,
    pub rate: f64,
}

impl Band {
    pub const fn up_to(limit: f64, rate: f64) -> Self {
        Self {
            up_to: Some(limit),
            rate,
        }
    }

    pub const fn above(rate: f64) -> Self {
        Self { up_to: None, rate }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    pub lower: f64,
    pub upper: Option<f64>,
    pub amount: f64,
    pub rate: f64,
    pub tax: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraItem {
    pub label: &'static str,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressiveTax {
    pub tax: f64,
    pub slices: Vec<Slice>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Annual,
    Monthly,
}

impl Period {
    pub fn periods_per_year(self) -> f64 {
        match self {
            Period::Annual => 1.0,
            Period::Monthly => 12.0,
        }
    }

    pub fn to_annual(self, amount: f64) -> f64 {
        amount * self.periods_per_year()
    }

    pub fn to_period(self, annual_amount: f64) -> f64 {
        annual_amount / self.periods_per_year()
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    #[default]
    Single,
    #[serde(alias = "joint", alias = "married-joint")]
    Married,
}

/// Regime-specific knobs. Regimes read only the fields they understand and fall back to
/// their own defaults for anything left unset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegimeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_allowance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing_status: Option<FilingStatus>,
}

impl RegimeParams {
    pub fn or(self, defaults: RegimeParams) -> RegimeParams {
        RegimeParams {
            personal_allowance: self.personal_allowance.or(defaults.personal_allowance),
            filing_status: self.filing_status.or(defaults.filing_status),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    pub standard: f64,
    pub other: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationInput {
    pub regime_id: String,
    pub gross_amount: f64,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub standard_deduction: f64,
    #[serde(default)]
    pub other_deductions: f64,
    #[serde(default)]
    pub regime_params: RegimeParams,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationResult {
    pub regime_id: &'static str,
    pub gross_annual: f64,
    pub deductions: f64,
    pub taxable_base: f64,
    pub band_tax: f64,
    pub slices: Vec<Slice>,
    pub extras: Vec<ExtraItem>,
    pub total_tax: f64,
    pub net_annual: f64,
    pub effective_rate: f64,
    pub marginal_rate: f64,
}

impl ComputationResult {
    pub fn extras_total(&self) -> f64 {
        self.extras.iter().map(|extra| extra.amount).sum()
    }

    pub fn in_period(&self, period: Period) -> PeriodSummary {
        PeriodSummary {
            period,
            gross: period.to_period(self.gross_annual),
            band_tax: period.to_period(self.band_tax),
            extras: period.to_period(self.extras_total()),
            total_tax: period.to_period(self.total_tax),
            net: period.to_period(self.net_annual),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub period: Period,
    pub gross: f64,
    pub band_tax: f64,
    pub extras: f64,
    pub total_tax: f64,
    pub net: f64,
}

/// Clamps negative and NaN amounts to zero.
pub(crate) fn non_negative(amount: f64) -> f64 {
    if amount > 0.0 { amount } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_period_divides_by_twelve() {
        assert_eq!(Period::Monthly.to_period(60_000.0), 5_000.0);
        assert_eq!(Period::Monthly.to_annual(5_000.0), 60_000.0);
        assert_eq!(Period::Annual.to_period(60_000.0), 60_000.0);
    }

    #[test]
    fn params_fall_back_to_defaults_field_by_field() {
        let defaults = RegimeParams {
            personal_allowance: Some(12_570.0),
            filing_status: Some(FilingStatus::Single),
        };
        let merged = RegimeParams {
            filing_status: Some(FilingStatus::Married),
            ..RegimeParams::default()
        }
        .or(defaults);
        assert_eq!(merged.personal_allowance, Some(12_570.0));
        assert_eq!(merged.filing_status, Some(FilingStatus::Married));
    }

    #[test]
    fn unbounded_band_serializes_as_null() {
        let json = serde_json::to_string(&Band::above(0.45)).expect("band serializes");
        assert_eq!(json, r#"{"upTo":null,"rate":0.45}"#);
    }

    #[test]
    fn non_negative_clamps_nan_and_negatives() {
        assert_eq!(non_negative(-1.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(3.5), 3.5);
    }
}
