mod engine;
mod error;
mod extras;
mod regimes;
mod types;

pub use engine::{compute, compute_progressive_tax, compute_with};
pub use error::{Error, Result};
pub use extras::{Contribution, levy};
pub use regimes::{DEFAULT_REGIME, RegimeConfig, registry, resolve, validate_bands};
pub use types::{
    Band, ComputationInput, ComputationResult, Deductions, ExtraItem, FilingStatus, Period,
    PeriodSummary, ProgressiveTax, RegimeParams, Slice,
};
