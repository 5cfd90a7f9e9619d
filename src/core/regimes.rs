use super::error::{Error, Result};
use super::extras::{Contribution, levy};
use super::types::{Band, Deductions, ExtraItem, FilingStatus, RegimeParams};

pub const DEFAULT_REGIME: &str = "uk";

pub type BandsFn = fn(&RegimeParams) -> Vec<Band>;
pub type ExtrasFn = fn(f64, f64, &RegimeParams) -> Vec<ExtraItem>;

/// Everything the engine needs to know about one tax regime. Band and extras functions are
/// pure so a regime can be evaluated on every input change.
#[derive(Debug)]
pub struct RegimeConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub currency_symbol: &'static str,
    pub notes: Option<&'static str>,
    pub default_deductions: Deductions,
    pub default_params: RegimeParams,
    pub bands: BandsFn,
    pub extras: ExtrasFn,
}

impl RegimeConfig {
    pub fn bands_for(&self, params: &RegimeParams) -> Vec<Band> {
        (self.bands)(&params.or(self.default_params))
    }

    pub fn extras_for(&self, taxable: f64, gross: f64, params: &RegimeParams) -> Vec<ExtraItem> {
        (self.extras)(taxable, gross, &params.or(self.default_params))
    }
}

static REGISTRY: [RegimeConfig; 4] = [
    RegimeConfig {
        id: "uk",
        label: "United Kingdom",
        currency_symbol: "£",
        notes: Some("England, Wales and Northern Ireland rates; personal allowance taper not applied"),
        default_deductions: Deductions {
            standard: 0.0,
            other: 0.0,
        },
        default_params: RegimeParams {
            personal_allowance: Some(UK_PERSONAL_ALLOWANCE),
            filing_status: None,
        },
        bands: uk_bands,
        extras: uk_extras,
    },
    RegimeConfig {
        id: "us",
        label: "United States (federal)",
        currency_symbol: "$",
        notes: Some("Federal income tax and FICA only; state and local taxes not included"),
        default_deductions: Deductions {
            standard: 14_600.0,
            other: 0.0,
        },
        default_params: RegimeParams {
            personal_allowance: None,
            filing_status: Some(FilingStatus::Single),
        },
        bands: us_bands,
        extras: us_extras,
    },
    RegimeConfig {
        id: "ca",
        label: "Canada (federal)",
        currency_symbol: "C$",
        notes: Some("Federal brackets only; provincial tax not included"),
        default_deductions: Deductions {
            standard: 15_705.0,
            other: 0.0,
        },
        default_params: RegimeParams {
            personal_allowance: None,
            filing_status: None,
        },
        bands: ca_bands,
        extras: ca_extras,
    },
    RegimeConfig {
        id: "au",
        label: "Australia",
        currency_symbol: "A$",
        notes: None,
        default_deductions: Deductions {
            standard: 0.0,
            other: 0.0,
        },
        default_params: RegimeParams {
            personal_allowance: None,
            filing_status: None,
        },
        bands: au_bands,
        extras: au_extras,
    },
];

pub fn registry() -> &'static [RegimeConfig] {
    &REGISTRY
}

pub fn resolve(regime_id: &str) -> Result<&'static RegimeConfig> {
    let wanted = regime_id.trim();
    REGISTRY
        .iter()
        .find(|config| config.id.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| Error::UnknownRegime(regime_id.to_string()))
}

/// Checks that `bands` partitions `[0, inf)`: rates within `[0, 1]`, finite bounds strictly
/// increasing, and a single unbounded band in last position.
pub fn validate_bands(regime: &'static str, bands: &[Band]) -> Result<()> {
    let invalid = |reason: String| Error::InvalidBands { regime, reason };

    let Some((last, bounded)) = bands.split_last() else {
        return Err(invalid("no bands".to_string()));
    };

    for (idx, band) in bands.iter().enumerate() {
        if !band.rate.is_finite() || !(0.0..=1.0).contains(&band.rate) {
            return Err(invalid(format!("band {idx} has rate {} outside [0, 1]", band.rate)));
        }
    }

    if last.up_to.is_some() {
        return Err(invalid("last band must be unbounded".to_string()));
    }

    let mut previous: Option<f64> = None;
    for (idx, band) in bounded.iter().enumerate() {
        let Some(limit) = band.up_to else {
            return Err(invalid(format!("band {idx} is unbounded but not last")));
        };
        if !limit.is_finite() || limit < 0.0 {
            return Err(invalid(format!("band {idx} has invalid upper bound {limit}")));
        }
        if let Some(prev) = previous {
            if limit <= prev {
                return Err(invalid(format!(
                    "band {idx} upper bound {limit} does not exceed previous bound {prev}"
                )));
            }
        }
        previous = Some(limit);
    }

    Ok(())
}

const UK_PERSONAL_ALLOWANCE: f64 = 12_570.0;
const UK_BASIC_RATE_LIMIT: f64 = 50_270.0;
const UK_HIGHER_RATE_LIMIT: f64 = 125_140.0;

fn uk_bands(params: &RegimeParams) -> Vec<Band> {
    let allowance = params
        .personal_allowance
        .filter(|v| v.is_finite())
        .unwrap_or(UK_PERSONAL_ALLOWANCE)
        .clamp(0.0, UK_BASIC_RATE_LIMIT - 1.0);
    vec![
        Band::up_to(allowance, 0.0),
        Band::up_to(UK_BASIC_RATE_LIMIT, 0.20),
        Band::up_to(UK_HIGHER_RATE_LIMIT, 0.40),
        Band::above(0.45),
    ]
}

const UK_NATIONAL_INSURANCE: [Contribution; 1] = [Contribution::TwoTier {
    label: "National Insurance",
    lower_threshold: UK_PERSONAL_ALLOWANCE,
    upper_limit: UK_BASIC_RATE_LIMIT,
    rate_low: 0.08,
    rate_high: 0.02,
}];

fn uk_extras(_taxable: f64, gross: f64, _params: &RegimeParams) -> Vec<ExtraItem> {
    levy(&UK_NATIONAL_INSURANCE, gross)
}

const US_RATES: [f64; 7] = [0.10, 0.12, 0.22, 0.24, 0.32, 0.35, 0.37];
const US_SINGLE_LIMITS: [f64; 6] = [
    11_600.0, 47_150.0, 100_525.0, 191_950.0, 243_725.0, 609_350.0,
];
const US_MARRIED_LIMITS: [f64; 6] = [
    23_200.0, 94_300.0, 201_050.0, 383_900.0, 487_450.0, 731_200.0,
];

fn us_bands(params: &RegimeParams) -> Vec<Band> {
    let limits = match params.filing_status.unwrap_or_default() {
        FilingStatus::Single => &US_SINGLE_LIMITS,
        FilingStatus::Married => &US_MARRIED_LIMITS,
    };
    bracket_table(limits, &US_RATES)
}

const US_FICA: [Contribution; 2] = [
    Contribution::Capped {
        label: "Social Security",
        rate: 0.062,
        cap: 168_600.0,
    },
    Contribution::Uncapped {
        label: "Medicare",
        rate: 0.0145,
    },
];

fn us_extras(_taxable: f64, gross: f64, _params: &RegimeParams) -> Vec<ExtraItem> {
    levy(&US_FICA, gross)
}

const CA_RATES: [f64; 5] = [0.15, 0.205, 0.26, 0.29, 0.33];
const CA_LIMITS: [f64; 4] = [55_867.0, 111_733.0, 173_205.0, 246_752.0];

fn ca_bands(_params: &RegimeParams) -> Vec<Band> {
    bracket_table(&CA_LIMITS, &CA_RATES)
}

const CA_PAYROLL: [Contribution; 2] = [
    Contribution::Capped {
        label: "CPP",
        rate: 0.0595,
        cap: 68_500.0,
    },
    Contribution::Capped {
        label: "EI",
        rate: 0.0166,
        cap: 63_200.0,
    },
];

fn ca_extras(_taxable: f64, gross: f64, _params: &RegimeParams) -> Vec<ExtraItem> {
    levy(&CA_PAYROLL, gross)
}

const AU_RATES: [f64; 5] = [0.0, 0.16, 0.30, 0.37, 0.45];
const AU_LIMITS: [f64; 4] = [18_200.0, 45_000.0, 135_000.0, 190_000.0];

fn au_bands(_params: &RegimeParams) -> Vec<Band> {
    bracket_table(&AU_LIMITS, &AU_RATES)
}

const AU_MEDICARE: [Contribution; 1] = [Contribution::Uncapped {
    label: "Medicare levy",
    rate: 0.02,
}];

fn au_extras(_taxable: f64, gross: f64, _params: &RegimeParams) -> Vec<ExtraItem> {
    levy(&AU_MEDICARE, gross)
}

/// Pairs `limits` with the leading rates; the one extra rate becomes the unbounded top band.
fn bracket_table(limits: &[f64], rates: &[f64]) -> Vec<Band> {
    debug_assert_eq!(limits.len() + 1, rates.len());
    let mut bands: Vec<Band> = limits
        .iter()
        .zip(rates)
        .map(|(&limit, &rate)| Band::up_to(limit, rate))
        .collect();
    if let Some(&top) = rates.last() {
        bands.push(Band::above(top));
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    #[test]
    fn resolve_is_case_insensitive_and_trims() {
        assert_eq!(resolve("UK").map(|c| c.id), Ok("uk"));
        assert_eq!(resolve(" us ").map(|c| c.id), Ok("us"));
    }

    #[test]
    fn resolve_rejects_unknown_regime() {
        let err = resolve("atlantis").expect_err("must reject unknown regime");
        assert_eq!(err, Error::UnknownRegime("atlantis".to_string()));
    }

    #[test]
    fn registry_ids_are_unique() {
        let mut ids: Vec<_> = registry().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), registry().len());
        assert!(resolve(DEFAULT_REGIME).is_ok());
    }

    #[test]
    fn every_regime_produces_valid_default_bands() {
        for config in registry() {
            let bands = config.bands_for(&RegimeParams::default());
            validate_bands(config.id, &bands)
                .unwrap_or_else(|e| panic!("{} default bands invalid: {e}", config.id));
        }
    }

    #[test]
    fn us_filing_status_selects_bracket_set() {
        let us = resolve("us").expect("us regime");
        let single = us.bands_for(&RegimeParams {
            filing_status: Some(FilingStatus::Single),
            ..RegimeParams::default()
        });
        let married = us.bands_for(&RegimeParams {
            filing_status: Some(FilingStatus::Married),
            ..RegimeParams::default()
        });
        assert_eq!(single[0].up_to, Some(11_600.0));
        assert_eq!(married[0].up_to, Some(23_200.0));
        assert_eq!(single.len(), married.len());
        validate_bands("us", &married).expect("married bands valid");
    }

    #[test]
    fn uk_allowance_only_moves_first_band() {
        let uk = resolve("uk").expect("uk regime");
        let base = uk.bands_for(&RegimeParams::default());
        let shifted = uk.bands_for(&RegimeParams {
            personal_allowance: Some(15_000.0),
            ..RegimeParams::default()
        });
        assert_eq!(base[0].up_to, Some(12_570.0));
        assert_eq!(shifted[0].up_to, Some(15_000.0));
        assert_eq!(base[1..], shifted[1..]);
    }

    #[test]
    fn extras_keep_stable_order() {
        let us = resolve("us").expect("us regime");
        let labels: Vec<_> = us
            .extras_for(50_000.0, 60_000.0, &RegimeParams::default())
            .into_iter()
            .map(|item| item.label)
            .collect();
        assert_eq!(labels, vec!["Social Security", "Medicare"]);
    }

    #[test]
    fn validate_rejects_missing_terminal_band() {
        let err = validate_bands("test", &[Band::up_to(100.0, 0.1), Band::up_to(200.0, 0.2)])
            .expect_err("must reject bounded tail");
        assert!(matches!(err, Error::InvalidBands { .. }));
    }

    #[test]
    fn validate_rejects_out_of_order_bounds() {
        let bands = [
            Band::up_to(200.0, 0.1),
            Band::up_to(100.0, 0.2),
            Band::above(0.3),
        ];
        assert!(validate_bands("test", &bands).is_err());
    }

    #[test]
    fn validate_rejects_unbounded_band_before_last() {
        let bands = [Band::above(0.1), Band::above(0.2)];
        assert!(validate_bands("test", &bands).is_err());
    }

    #[test]
    fn validate_rejects_bad_rates_and_empty_bands() {
        assert!(validate_bands("test", &[]).is_err());
        assert!(validate_bands("test", &[Band::above(1.5)]).is_err());
        assert!(validate_bands("test", &[Band::up_to(10.0, -0.1), Band::above(0.2)]).is_err());
    }

    proptest! {
        #[test]
        fn prop_uk_bands_stay_valid_for_any_allowance(allowance in -1.0e7f64..1.0e7) {
            let uk = resolve("uk").expect("uk regime");
            let bands = uk.bands_for(&RegimeParams {
                personal_allowance: Some(allowance),
                ..RegimeParams::default()
            });
            prop_assert!(validate_bands("uk", &bands).is_ok());
        }
    }
}
