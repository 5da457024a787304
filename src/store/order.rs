//! Checks that two object stores list their objects in the same order.
use super::io::open_text;
use super::reader::marker_id;
use crate::error::{EvalError, EvalResult};
use crate::types::{canonical_id, MotionObject};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;

/// Collects the ids of all `#objectKey` markers without parsing payloads.
pub fn scan_object_keys(path: &Path) -> EvalResult<Vec<String>> {
    let mut keys = Vec::new();
    for line in open_text(path)?.lines() {
        let line = line.map_err(|e| EvalError::io(path, e))?;
        if let Some(id) = marker_id(&line) {
            keys.push(id.unwrap_or_default().to_string());
        }
    }
    Ok(keys)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDifference {
    pub position: usize,
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyOrderReport {
    pub left_count: usize,
    pub right_count: usize,
    pub first_difference: Option<KeyDifference>,
}

impl KeyOrderReport {
    pub fn same_order(&self) -> bool {
        self.first_difference.is_none()
    }
}

/// Compares two key lists position by position.
pub fn compare_key_order(left: &[String], right: &[String]) -> KeyOrderReport {
    let first_difference = (0..left.len().max(right.len()))
        .find(|&i| left.get(i) != right.get(i))
        .map(|position| KeyDifference {
            position,
            left: left.get(position).cloned(),
            right: right.get(position).cloned(),
        });
    KeyOrderReport {
        left_count: left.len(),
        right_count: right.len(),
        first_difference,
    }
}

/// Positions where two index-aligned collections disagree on the canonical
/// id (the id without its trailing component).
pub fn canonical_mismatches(left: &[MotionObject], right: &[MotionObject]) -> Vec<usize> {
    left.iter()
        .zip(right)
        .enumerate()
        .filter(|(_, (a, b))| canonical_id(&a.id) != canonical_id(&b.id))
        .map(|(i, _)| i)
        .collect()
}
