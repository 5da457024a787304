//! Threshold records: `{"p0.5": <f64>, "p40": <f64>}`.
use crate::error::{EvalError, EvalResult};
use crate::store::io::{read_json_file, write_json_file};
use crate::types::ThresholdPair;
use std::path::Path;

pub fn load_thresholds(path: &Path) -> EvalResult<ThresholdPair> {
    let pair: ThresholdPair = read_json_file(path)?;
    check_finite(&pair)?;
    Ok(pair)
}

/// Writes the record atomically; an interrupted write leaves any previous
/// record untouched.
pub fn save_thresholds(path: &Path, pair: &ThresholdPair) -> EvalResult<()> {
    check_finite(pair)?;
    write_json_file(path, pair)
}

fn check_finite(pair: &ThresholdPair) -> EvalResult<()> {
    if pair.similar.is_finite() && pair.dissimilar.is_finite() {
        Ok(())
    } else {
        Err(EvalError::InvalidThresholds(format!(
            "non-finite threshold values ({}, {})",
            pair.similar, pair.dissimilar
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_record_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds").join("skeleton.json");
        let pair = ThresholdPair::new(0.0123, 4.5);
        save_thresholds(&path, &pair).unwrap();
        assert_eq!(load_thresholds(&path).unwrap(), pair);
    }

    #[test]
    fn missing_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"p0.5": 1.0}"#).unwrap();
        assert!(matches!(load_thresholds(&path), Err(EvalError::Json(_))));
    }

    #[test]
    fn non_finite_values_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.json");
        let err = save_thresholds(&path, &ThresholdPair::new(f64::NAN, 1.0)).unwrap_err();
        assert!(matches!(err, EvalError::InvalidThresholds(_)));
        assert!(!path.exists());
    }
}
