use axum::{
    Router,
    extract::{Json, Path, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    Band, ComputationInput, ComputationResult, DEFAULT_REGIME, Deductions, Error, FilingStatus,
    Period, PeriodSummary, RegimeConfig, RegimeParams, compute, registry, resolve,
};
use crate::share;

mod cli;

pub use cli::{Cli, Command, ComputeArgs, ServeArgs, print_regimes, run_compute};

const DEFAULT_GROSS: f64 = 50_000.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComputePayload {
    #[serde(alias = "regimeId")]
    regime: Option<String>,
    #[serde(alias = "grossAmount")]
    gross: Option<f64>,
    period: Option<Period>,
    display_period: Option<Period>,
    standard_deduction: Option<f64>,
    other_deductions: Option<f64>,
    personal_allowance: Option<f64>,
    filing_status: Option<FilingStatus>,
    share: Option<String>,
}

#[derive(Debug)]
struct ApiRequest {
    input: ComputationInput,
    display_period: Period,
}

#[derive(Debug)]
struct Outcome {
    input: ComputationInput,
    result: ComputationResult,
    fallback_from: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeResponse {
    regime_id: &'static str,
    label: &'static str,
    currency_symbol: &'static str,
    notes: Option<&'static str>,
    fallback_from: Option<String>,
    input: ComputationInput,
    result: ComputationResult,
    display: PeriodSummary,
    share: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegimeSummary {
    id: &'static str,
    label: &'static str,
    currency_symbol: &'static str,
    notes: Option<&'static str>,
    default_deductions: Deductions,
    default_params: RegimeParams,
    default_bands: Vec<Band>,
}

impl From<&'static RegimeConfig> for RegimeSummary {
    fn from(config: &'static RegimeConfig) -> Self {
        RegimeSummary {
            id: config.id,
            label: config.label,
            currency_symbol: config.currency_symbol,
            notes: config.notes,
            default_deductions: config.default_deductions,
            default_params: config.default_params,
            default_bands: config.bands_for(&config.default_params),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/regimes", get(regimes_handler))
        .route(
            "/api/compute",
            get(compute_get_handler).post(compute_post_handler),
        )
        .route("/api/share/:blob", get(share_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("takehome HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/regimes");

    axum::serve(listener, app).await
}

async fn regimes_handler() -> Response {
    let regimes: Vec<RegimeSummary> = registry().iter().map(RegimeSummary::from).collect();
    json_response(StatusCode::OK, regimes)
}

async fn compute_get_handler(Query(payload): Query<ComputePayload>) -> Response {
    compute_handler_impl(payload)
}

async fn compute_post_handler(Json(payload): Json<ComputePayload>) -> Response {
    compute_handler_impl(payload)
}

async fn share_handler(Path(blob): Path<String>) -> Response {
    match share::decode(&blob) {
        Ok(input) => respond_with(ApiRequest {
            display_period: input.period,
            input,
        }),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn compute_handler_impl(payload: ComputePayload) -> Response {
    match api_request_from_payload(payload) {
        Ok(request) => respond_with(request),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn respond_with(request: ApiRequest) -> Response {
    match compute_or_fallback(request.input) {
        Ok(outcome) => {
            info!(
                regime = outcome.result.regime_id,
                fallback = outcome.fallback_from.is_some(),
                "computation served"
            );
            json_response(
                StatusCode::OK,
                build_compute_response(outcome, request.display_period),
            )
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

/// Fresh input for `regime_id` carrying that regime's default deductions. Unknown ids keep
/// zero deductions so the fallback path decides what to do with them.
fn default_input(regime_id: &str) -> ComputationInput {
    let deductions = resolve(regime_id)
        .map(|config| config.default_deductions)
        .unwrap_or_default();
    ComputationInput {
        regime_id: regime_id.trim().to_lowercase(),
        gross_amount: DEFAULT_GROSS,
        period: Period::Annual,
        standard_deduction: deductions.standard,
        other_deductions: deductions.other,
        regime_params: RegimeParams::default(),
    }
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ComputePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ComputePayload) -> Result<ApiRequest, String> {
    let mut input = default_input(payload.regime.as_deref().unwrap_or(DEFAULT_REGIME));

    if let Some(blob) = payload.share.as_deref() {
        share::restore(&mut input, blob);
    }
    // An explicit regime wins over the shared one. Deductions and params from a different
    // regime's blob do not carry over; amounts and period do.
    if let Some(regime) = payload.regime.as_deref() {
        let requested = default_input(regime);
        if !input.regime_id.trim().eq_ignore_ascii_case(&requested.regime_id) {
            input = ComputationInput {
                gross_amount: input.gross_amount,
                period: input.period,
                other_deductions: input.other_deductions,
                ..requested
            };
        }
    }

    if let Some(v) = payload.gross {
        input.gross_amount = v;
    }
    if let Some(v) = payload.period {
        input.period = v;
    }
    if let Some(v) = payload.standard_deduction {
        input.standard_deduction = v;
    }
    if let Some(v) = payload.other_deductions {
        input.other_deductions = v;
    }
    if let Some(v) = payload.personal_allowance {
        input.regime_params.personal_allowance = Some(v);
    }
    if let Some(v) = payload.filing_status {
        input.regime_params.filing_status = Some(v);
    }

    if !input.period.to_annual(input.gross_amount).is_finite() {
        return Err("grossAmount must be a finite number".to_string());
    }
    if !input.standard_deduction.is_finite() || !input.other_deductions.is_finite() {
        return Err("deductions must be finite numbers".to_string());
    }
    if let Some(allowance) = input.regime_params.personal_allowance {
        if !allowance.is_finite() || allowance < 0.0 {
            return Err("personalAllowance must be >= 0".to_string());
        }
    }

    let display_period = payload.display_period.unwrap_or(input.period);
    Ok(ApiRequest {
        input,
        display_period,
    })
}

/// Computes `input`, retrying against the default regime when its regime id is unknown.
fn compute_or_fallback(input: ComputationInput) -> Result<Outcome, Error> {
    match compute(&input) {
        Ok(result) => Ok(Outcome {
            input,
            result,
            fallback_from: None,
        }),
        Err(Error::UnknownRegime(requested)) => {
            warn!("unknown regime {requested:?}, falling back to {DEFAULT_REGIME}");
            let input = ComputationInput {
                regime_id: DEFAULT_REGIME.to_string(),
                ..input
            };
            let result = compute(&input)?;
            Ok(Outcome {
                input,
                result,
                fallback_from: Some(requested),
            })
        }
        Err(e) => Err(e),
    }
}

fn build_compute_response(outcome: Outcome, display_period: Period) -> ComputeResponse {
    let config = resolve(outcome.result.regime_id).ok();
    ComputeResponse {
        regime_id: outcome.result.regime_id,
        label: config.map_or("", |c| c.label),
        currency_symbol: config.map_or("", |c| c.currency_symbol),
        notes: config.and_then(|c| c.notes),
        fallback_from: outcome.fallback_from,
        share: share::encode(&outcome.input),
        display: outcome.result.in_period(display_period),
        input: outcome.input,
        result: outcome.result,
    }
}
