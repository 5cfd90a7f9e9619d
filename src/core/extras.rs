use super::types::{ExtraItem, non_negative};

/// Payroll-style levies applied on top of the progressive bands.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Contribution {
    Capped {
        label: &'static str,
        rate: f64,
        cap: f64,
    },
    Uncapped {
        label: &'static str,
        rate: f64,
    },
    TwoTier {
        label: &'static str,
        lower_threshold: f64,
        upper_limit: f64,
        rate_low: f64,
        rate_high: f64,
    },
}

impl Contribution {
    pub fn label(&self) -> &'static str {
        match *self {
            Contribution::Capped { label, .. }
            | Contribution::Uncapped { label, .. }
            | Contribution::TwoTier { label, .. } => label,
        }
    }

    pub fn amount(&self, income: f64) -> f64 {
        let income = non_negative(income);
        match *self {
            Contribution::Capped { rate, cap, .. } => rate * income.min(cap),
            Contribution::Uncapped { rate, .. } => rate * income,
            Contribution::TwoTier {
                lower_threshold,
                upper_limit,
                rate_low,
                rate_high,
                ..
            } => {
                rate_low * non_negative(income.min(upper_limit) - lower_threshold)
                    + rate_high * non_negative(income - upper_limit)
            }
        }
    }

    pub fn item(&self, income: f64) -> ExtraItem {
        ExtraItem {
            label: self.label(),
            amount: self.amount(income),
        }
    }
}

/// Evaluates contributions in declaration order against the same income figure.
pub fn levy(contributions: &[Contribution], income: f64) -> Vec<ExtraItem> {
    contributions.iter().map(|c| c.item(income)).collect()
}
