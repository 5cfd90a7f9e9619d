//! Shareable link state: a `ComputationInput` packed into an opaque URL-safe string.
//!
//! The encoding is hex over compact JSON. It is not a stable format and carries no version
//! marker; anything that fails to decode is treated as absent state.

use tracing::warn;

use crate::core::{ComputationInput, Error, Result};

pub fn encode(input: &ComputationInput) -> String {
    // ComputationInput only holds strings, floats and unit enums, so serialisation is total.
    let json = serde_json::to_vec(input).unwrap_or_default();
    hex::encode(json)
}

pub fn decode(encoded: &str) -> Result<ComputationInput> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| Error::MalformedPersistedState(format!("not hex: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::MalformedPersistedState(format!("unexpected shape: {e}")))
}

/// Replaces `current` with the decoded state. Malformed input leaves `current` untouched.
pub fn restore(current: &mut ComputationInput, encoded: &str) -> bool {
    match decode(encoded) {
        Ok(input) => {
            *current = input;
            true
        }
        Err(e) => {
            warn!("ignoring shared state: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FilingStatus, Period, RegimeParams, compute};

    fn sample_input() -> ComputationInput {
        ComputationInput {
            regime_id: "us".to_string(),
            gross_amount: 9_250.5,
            period: Period::Monthly,
            standard_deduction: 29_200.0,
            other_deductions: 1_234.56,
            regime_params: RegimeParams {
                personal_allowance: None,
                filing_status: Some(FilingStatus::Married),
            },
        }
    }

    #[test]
    fn decoded_input_computes_identically() {
        let input = sample_input();
        let decoded = decode(&encode(&input)).expect("round trip decodes");
        assert_eq!(decoded, input);
        assert_eq!(
            compute(&decoded).expect("decoded computes"),
            compute(&input).expect("original computes")
        );
    }

    #[test]
    fn encoding_is_url_safe() {
        let encoded = encode(&sample_input());
        assert!(encoded.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn decode_rejects_non_hex() {
        let err = decode("zz-not-hex").expect_err("must reject garbage");
        assert!(matches!(err, Error::MalformedPersistedState(_)));
    }

    #[test]
    fn decode_rejects_foreign_json() {
        let foreign = hex::encode(br#"{"currentAge": 31}"#);
        assert!(matches!(
            decode(&foreign),
            Err(Error::MalformedPersistedState(_))
        ));
    }

    #[test]
    fn decode_fills_optional_fields_with_defaults() {
        let minimal = hex::encode(br#"{"regimeId": "uk", "grossAmount": 42000}"#);
        let input = decode(&minimal).expect("minimal state decodes");
        assert_eq!(input.period, Period::Annual);
        assert_eq!(input.regime_params, RegimeParams::default());
    }

    #[test]
    fn restore_keeps_current_state_on_failure() {
        let mut current = sample_input();
        assert!(!restore(&mut current, "%%%"));
        assert_eq!(current, sample_input());

        let other = ComputationInput {
            regime_id: "au".to_string(),
            ..sample_input()
        };
        assert!(restore(&mut current, &encode(&other)));
        assert_eq!(current, other);
    }
}
