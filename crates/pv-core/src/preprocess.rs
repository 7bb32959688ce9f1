// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Curve Preprocessor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pairs raw samples, sorts them by voltage and derives power.

use pv_types::curve::IVCurve;
use pv_types::error::{PvError, PvResult};

/// Fewest samples the preprocessor accepts.
pub const MIN_PREPROCESS_POINTS: usize = 2;

/// Voltage-ascending arrays of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCurve {
    pub voltage: Vec<f64>,
    pub current: Vec<f64>,
    pub power: Vec<f64>,
}

impl PreparedCurve {
    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }

    pub fn max_current(&self) -> f64 {
        self.current.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Sort (V, I) pairs ascending by voltage; ties keep insertion order.
pub fn preprocess(voltage: &[f64], current: &[f64]) -> PvResult<PreparedCurve> {
    if voltage.len() != current.len() {
        return Err(PvError::LengthMismatch {
            voltage: voltage.len(),
            current: current.len(),
        });
    }
    if voltage.len() < MIN_PREPROCESS_POINTS {
        return Err(PvError::InsufficientData {
            required: MIN_PREPROCESS_POINTS,
            actual: voltage.len(),
        });
    }

    let mut pairs: Vec<(f64, f64)> = voltage
        .iter()
        .copied()
        .zip(current.iter().copied())
        .collect();
    // Stable sort: equal voltages stay in acquisition order.
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (voltage, current): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let power = voltage
        .iter()
        .zip(current.iter())
        .map(|(v, i)| v * i)
        .collect();

    Ok(PreparedCurve {
        voltage,
        current,
        power,
    })
}

pub fn preprocess_curve(curve: &IVCurve) -> PvResult<PreparedCurve> {
    preprocess(&curve.voltages(), &curve.currents())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_reverse_sweep() {
        let prepared = preprocess(&[0.6, 0.4, 0.2, 0.0], &[0.0, 6.8, 7.9, 8.5]).unwrap();
        assert_eq!(prepared.voltage, vec![0.0, 0.2, 0.4, 0.6]);
        assert_eq!(prepared.current, vec![8.5, 7.9, 6.8, 0.0]);
        assert!((prepared.power[2] - 2.72).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let prepared = preprocess(&[0.2, 0.1, 0.2], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(prepared.voltage, vec![0.1, 0.2, 0.2]);
        assert_eq!(prepared.current, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_rejects_single_point() {
        match preprocess(&[0.1], &[1.0]).unwrap_err() {
            PvError::InsufficientData { required, actual } => {
                assert_eq!((required, actual), (2, 1));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
        assert!(matches!(
            preprocess(&[], &[]),
            Err(PvError::InsufficientData { actual: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(matches!(
            preprocess(&[0.0, 0.1], &[1.0]),
            Err(PvError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_max_current() {
        let prepared = preprocess(&[0.0, 0.5], &[8.0, 3.0]).unwrap();
        assert_eq!(prepared.max_current(), 8.0);
        assert_eq!(prepared.len(), 2);
    }
}
