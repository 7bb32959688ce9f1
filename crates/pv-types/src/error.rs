// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PvError {
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Curve is empty")]
    EmptyCurve,

    #[error("Length mismatch: voltage={voltage}, current={current}")]
    LengthMismatch { voltage: usize, current: usize },

    #[error("Non-finite sample at index {index}")]
    NonFiniteData { index: usize },

    #[error("Invalid measurement conditions: {0}")]
    InvalidConditions(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PvResult<T> = Result<T, PvError>;
