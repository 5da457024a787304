//! Serializes objects back into the line-oriented store format.
use super::io::write_atomic;
use super::reader::OBJECT_KEY_MARKER;
use crate::error::EvalResult;
use crate::types::{MotionObject, Payload};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Digits after the decimal point.
    pub precision: usize,
    /// Type tag written between the marker and the id.
    pub key_tag: String,
    /// Type tag of the `<count>;<tag>` skeleton header.
    pub pose_tag: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            key_tag: "messif.objects.keys.AbstractObjectKey".to_string(),
            pose_tag: "mcdr.objects.ObjectMocapPose".to_string(),
        }
    }
}

pub fn write_objects<W: Write + ?Sized>(
    out: &mut W,
    objects: &[MotionObject],
    options: &WriterOptions,
) -> io::Result<()> {
    let prec = options.precision;
    for object in objects {
        writeln!(out, "{OBJECT_KEY_MARKER} {} {}", options.key_tag, object.id)?;
        match &object.payload {
            Payload::Skeleton(skeleton) => {
                writeln!(out, "{};{}", skeleton.len(), options.pose_tag)?;
                for frame in skeleton.frames() {
                    let joints: Vec<String> = frame
                        .chunks_exact(3)
                        .map(|j| format!("{:.prec$},{:.prec$},{:.prec$}", j[0], j[1], j[2]))
                        .collect();
                    writeln!(out, "{}", joints.join(";"))?;
                }
            }
            Payload::Embedding(embedding) => {
                let values: Vec<String> = embedding
                    .values()
                    .iter()
                    .map(|v| format!("{v:.prec$}"))
                    .collect();
                writeln!(out, "{}", values.join(","))?;
            }
        }
    }
    Ok(())
}

/// Writes `objects` to `path` atomically, gzip-compressed for `.gz` paths.
pub fn save_objects(path: &Path, objects: &[MotionObject], options: &WriterOptions) -> EvalResult<()> {
    write_atomic(path, |w| write_objects(w, objects, options))
}
