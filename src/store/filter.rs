//! Restricting an object universe to a list of valid ids (e.g. a train split).
use super::io::open_text;
use crate::error::{EvalError, EvalResult};
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

/// Set of accepted ids.
///
/// An object id matches when it equals a listed id or when any of its
/// underscore-delimited prefixes is listed, so `3136_113` accepts the
/// segment `3136_113_1072_97` and `3136_113_1072_97` accepts its frame
/// `3136_113_1072_97_4`.
#[derive(Clone, Debug, Default)]
pub struct IdFilter {
    ids: HashSet<String>,
}

impl IdFilter {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(Into::into)
                .filter(|id: &String| !id.is_empty())
                .collect(),
        }
    }

    /// Reads one id per line; blank lines are ignored.
    pub fn load(path: &Path) -> EvalResult<Self> {
        let mut ids = HashSet::new();
        for line in open_text(path)?.lines() {
            let line = line.map_err(|e| EvalError::io(path, e))?;
            let id = line.trim();
            if !id.is_empty() {
                ids.insert(id.to_string());
            }
        }
        Ok(Self { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// An empty filter accepts everything.
    pub fn matches(&self, id: &str) -> bool {
        if self.ids.is_empty() || self.ids.contains(id) {
            return true;
        }
        id.match_indices('_')
            .any(|(pos, _)| self.ids.contains(&id[..pos]))
    }
}
