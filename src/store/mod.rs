//! Object store: parsing, writing and filtering of the line-oriented
//! `#objectKey` format.
//!
//! - [`reader`] streams records out of any `BufRead`.
//! - [`writer`] produces the same format with fixed decimal precision.
//! - [`io`] handles transparent gzip transport and atomic writes.
//! - [`filter`] restricts the universe to a list of valid ids.
//! - [`order`] checks that two stores enumerate the same objects in order.
//!
//! [`ObjectStore::load`] applies the error policy: recoverable record errors
//! are logged and skipped, structural errors abort.

pub mod filter;
pub mod io;
pub mod order;
pub mod reader;
pub mod writer;

pub use filter::IdFilter;
pub use order::{canonical_mismatches, compare_key_order, scan_object_keys, KeyOrderReport};
pub use reader::{ObjectReader, ReaderOptions, SkeletonDialect};
pub use writer::{save_objects, write_objects, WriterOptions};

use crate::diagnostics::ReadStats;
use crate::error::EvalResult;
use crate::types::{MotionObject, PayloadKind};
use log::{debug, warn};
use std::io::BufRead;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Drives `reader`, handing every accepted object to `visit`.
///
/// Non-fatal parse errors drop the record with a warning; the first fatal
/// error is returned. Objects rejected by `filter` are counted but not
/// visited. `visit` may stop the scan early.
pub fn for_each_object<R, F>(
    reader: &mut ObjectReader<R>,
    filter: Option<&IdFilter>,
    mut visit: F,
) -> EvalResult<ReadStats>
where
    R: BufRead,
    F: FnMut(MotionObject) -> ControlFlow<()>,
{
    let mut filtered_out = 0usize;
    for item in reader.by_ref() {
        match item {
            Ok(object) => {
                if filter.is_some_and(|f| !f.matches(&object.id)) {
                    filtered_out += 1;
                    continue;
                }
                if visit(object).is_break() {
                    break;
                }
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => warn!("skipping record: {e}"),
        }
    }
    let mut stats = reader.stats().clone();
    stats.filtered_out = filtered_out;
    Ok(stats)
}

/// A store file plus the options needed to parse it; can be re-opened for
/// every streaming pass.
#[derive(Clone, Debug)]
pub struct ObjectSource {
    pub path: PathBuf,
    pub options: ReaderOptions,
}

impl ObjectSource {
    pub fn new(path: impl Into<PathBuf>, options: ReaderOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn open(&self) -> EvalResult<ObjectReader<Box<dyn BufRead + Send>>> {
        Ok(ObjectReader::new(io::open_text(&self.path)?, &self.options))
    }

    /// Payload kind of the first object accepted by `filter`; reads only up
    /// to that object. `None` for a store with no accepted objects.
    pub fn first_kind(&self, filter: Option<&IdFilter>) -> EvalResult<Option<PayloadKind>> {
        let mut kind = None;
        for_each_object(&mut self.open()?, filter, |object| {
            kind = Some(object.payload.kind());
            ControlFlow::Break(())
        })?;
        Ok(kind)
    }
}

/// Fully materialized, read-only object collection in file order.
#[derive(Clone, Debug, Default)]
pub struct ObjectStore {
    pub objects: Vec<MotionObject>,
    pub stats: ReadStats,
}

impl ObjectStore {
    pub fn load(path: &Path, options: &ReaderOptions, filter: Option<&IdFilter>) -> EvalResult<Self> {
        let source = ObjectSource::new(path, options.clone());
        let store = Self::from_reader(source.open()?, options, filter)?;
        debug!(
            "loaded {} objects from {} ({} records, {} skipped)",
            store.len(),
            path.display(),
            store.stats.records,
            store.stats.skipped_records
        );
        Ok(store)
    }

    pub fn from_reader<R: BufRead>(
        mut reader: ObjectReader<R>,
        options: &ReaderOptions,
        filter: Option<&IdFilter>,
    ) -> EvalResult<Self> {
        let mut objects = Vec::new();
        let stats = for_each_object(&mut reader, filter, |object| {
            objects.push(object);
            match options.max_objects {
                Some(max) if objects.len() >= max => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        })?;
        Ok(Self { objects, stats })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|o| o.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use std::io::Cursor;

    fn reader(text: &str) -> ObjectReader<Cursor<String>> {
        ObjectReader::new(Cursor::new(text.to_string()), &ReaderOptions::default())
    }

    const EMBEDDINGS: &str = "\
#objectKey t 1_1_0_8_0
1,0,0
#objectKey t 2_1_0_8_0
oops
#objectKey t 3_1_0_8_0
0,1,0
#objectKey t 4_1_0_8_0
0,0,1
";

    #[test]
    fn skips_recoverable_records_and_applies_filter() {
        let filter = IdFilter::from_ids(["1_1_0_8", "4_1_0_8"]);
        let store =
            ObjectStore::from_reader(reader(EMBEDDINGS), &ReaderOptions::default(), Some(&filter))
                .unwrap();
        let ids: Vec<&str> = store.ids().collect();
        assert_eq!(ids, vec!["1_1_0_8_0", "4_1_0_8_0"]);
        assert_eq!(store.stats.skipped_records, 1);
        assert_eq!(store.stats.filtered_out, 1);
    }

    #[test]
    fn max_objects_stops_early() {
        let options = ReaderOptions {
            max_objects: Some(2),
            ..Default::default()
        };
        let store = ObjectStore::from_reader(reader(EMBEDDINGS), &options, None).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn first_kind_stops_at_first_accepted_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emb.data");
        std::fs::write(&path, EMBEDDINGS).unwrap();
        let source = ObjectSource::new(&path, ReaderOptions::default());
        assert_eq!(source.first_kind(None).unwrap(), Some(PayloadKind::Embedding));
        let nothing = IdFilter::from_ids(["9_9_9_9"]);
        assert_eq!(source.first_kind(Some(&nothing)).unwrap(), None);
    }

    #[test]
    fn fatal_error_aborts_load() {
        let text = "#objectKey t a\n1,2,3\n#objectKey t b\n1,2\n";
        let err = ObjectStore::from_reader(reader(text), &ReaderOptions::default(), None)
            .unwrap_err();
        assert!(matches!(err, EvalError::Parse(ref e) if e.is_fatal()), "{err}");
    }
}
