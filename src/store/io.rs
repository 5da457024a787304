//! File transport helpers for object stores and JSON records.
//!
//! - `open_text`: buffered reader, gzip-decoded when the path ends in `.gz`.
//! - `write_atomic`: write through a temp file in the target directory, then rename.
//! - `write_json_file`: pretty-print a serializable value atomically.
//! - `read_json_file`: deserialize a JSON file.
use crate::error::{EvalError, EvalResult};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Compression is selected by filename suffix only.
pub fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Opens `path` for line-oriented reading.
pub fn open_text(path: &Path) -> EvalResult<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
    if is_compressed(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Runs `write` against a temp file next to `path` and renames it into place
/// only when `write` succeeds, so readers never observe a half-written file.
pub fn write_atomic<F>(path: &Path, write: F) -> EvalResult<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let parent = ensure_parent_dir(path)?;
    let tmp = NamedTempFile::new_in(parent).map_err(|e| EvalError::io(parent, e))?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        if is_compressed(path) {
            let mut gz = GzEncoder::new(&mut out, Compression::default());
            write(&mut gz).map_err(|e| EvalError::io(path, e))?;
            gz.finish().map_err(|e| EvalError::io(path, e))?;
        } else {
            write(&mut out).map_err(|e| EvalError::io(path, e))?;
        }
        out.flush().map_err(|e| EvalError::io(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| EvalError::io(path, e.error))?;
    Ok(())
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> EvalResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, |w| {
        w.write_all(json.as_bytes())?;
        w.write_all(b"\n")
    })
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> EvalResult<T> {
    let data = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    Ok(serde_json::from_str(&data)?)
}

fn ensure_parent_dir(path: &Path) -> EvalResult<&Path> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
            Ok(parent)
        }
        _ => Ok(Path::new(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn gzip_suffix_round_trips_transparently() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("objects.data.gz");
        write_atomic(&path, |w| w.write_all(b"#objectKey x 1_2_3_4\n1,2,3\n")).unwrap();

        let mut raw = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut raw).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b], "expected gzip magic bytes");

        let lines: Vec<String> = open_text(&path).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["#objectKey x 1_2_3_4", "1,2,3"]);
    }

    #[test]
    fn failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let err = write_atomic(&path, |_| Err(io::Error::other("boom")));
        assert!(err.is_err());
        assert!(!path.exists());
    }
}
