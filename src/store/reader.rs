//! Line-oriented object store parser.
//!
//! A record starts with `#objectKey <type-tag> <id>`. When the next line is a
//! `<count>;<type-tag>` header the record is a skeleton sequence of `count`
//! pose lines; otherwise it is a comma-separated embedding vector taken from
//! the first payload line. Pose-line syntax depends on the [`SkeletonDialect`].
use crate::diagnostics::ReadStats;
use crate::error::{ParseError, ParseErrorKind};
use crate::types::{MotionObject, PayloadKind, Skeleton};
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::str::FromStr;

pub const OBJECT_KEY_MARKER: &str = "#objectKey";

/// Pose-line syntax of skeleton payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkeletonDialect {
    /// `;`- or whitespace-separated joint groups, each an `x,y,z` triple.
    /// Groups that are not exactly three numbers are skipped and counted.
    #[default]
    Hdm05,
    /// Flat list of numbers (`;`, `,` and whitespace all separate) chunked
    /// into consecutive triples.
    PkuMmd,
}

impl FromStr for SkeletonDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hdm05" => Ok(Self::Hdm05),
            "pku-mmd" | "pku_mmd" | "pkummd" => Ok(Self::PkuMmd),
            other => Err(format!("unknown dataset dialect {other:?} (expected hdm05 or pku-mmd)")),
        }
    }
}

/// Parser knobs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub dialect: SkeletonDialect,
    /// Pad shorter skeleton sequences to this many frames by repeating the last one.
    pub pad_to_frames: Option<usize>,
    /// Stop after this many accepted objects.
    pub max_objects: Option<usize>,
}

/// Marker line: the last whitespace-separated token is the id.
pub(crate) fn marker_id(line: &str) -> Option<Option<&str>> {
    let rest = line.trim_start().strip_prefix(OBJECT_KEY_MARKER)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.split_whitespace().last())
}

/// `<count>;<type-tag>` where the tag contains a letter.
fn count_header(line: &str) -> Option<usize> {
    let (count, tag) = line.split_once(';')?;
    if !tag.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    count.trim().parse().ok()
}

/// Streaming parser yielding one object per record.
///
/// Recoverable problems are reported as non-fatal [`ParseError`]s and the
/// iteration continues with the next record; after a fatal error the iterator
/// is exhausted.
pub struct ObjectReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    pending: Option<(usize, Option<String>)>,
    dialect: SkeletonDialect,
    pad_to_frames: Option<usize>,
    shape: [Option<usize>; 2],
    stats: ReadStats,
    done: bool,
}

struct RawRecord {
    line: usize,
    id: Option<String>,
    lines: Vec<(usize, String)>,
}

impl<R: BufRead> ObjectReader<R> {
    pub fn new(reader: R, options: &ReaderOptions) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
            dialect: options.dialect,
            pad_to_frames: options.pad_to_frames,
            shape: [None, None],
            stats: ReadStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    pub fn into_stats(self) -> ReadStats {
        self.stats
    }

    fn next_line(&mut self) -> Option<Result<String, ParseError>> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.map_err(|e| {
            ParseError::new(self.line_no, None, ParseErrorKind::Unreadable(e.to_string()))
        }))
    }

    fn next_record(&mut self) -> Option<Result<RawRecord, ParseError>> {
        let (start, id) = match self.pending.take() {
            Some(marker) => marker,
            None => loop {
                let line = match self.next_line()? {
                    Ok(line) => line,
                    Err(e) => return Some(Err(e)),
                };
                match marker_id(&line) {
                    Some(id) => break (self.line_no, id.map(str::to_string)),
                    None if line.trim().is_empty() => {}
                    None => self.stats.orphan_lines += 1,
                }
            },
        };

        let mut lines = Vec::new();
        while let Some(line) = self.next_line() {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            if let Some(next_id) = marker_id(&line) {
                self.pending = Some((self.line_no, next_id.map(str::to_string)));
                break;
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push((self.line_no, trimmed.to_string()));
            }
        }
        Some(Ok(RawRecord {
            line: start,
            id,
            lines,
        }))
    }

    fn build(&mut self, record: RawRecord) -> Result<MotionObject, ParseError> {
        let RawRecord { line, id, lines } = record;
        let Some(id) = id else {
            return Err(ParseError::new(line, None, ParseErrorKind::MissingId));
        };
        let fail = |at: usize, kind| ParseError::new(at, Some(id.clone()), kind);

        let Some((first_line, first)) = lines.first() else {
            return Err(fail(line, ParseErrorKind::EmptyPayload));
        };

        let object = match count_header(first) {
            Some(declared) => {
                let poses = &lines[1..];
                if poses.len() != declared {
                    return Err(fail(
                        *first_line,
                        ParseErrorKind::FrameCountMismatch {
                            declared,
                            read: poses.len(),
                        },
                    ));
                }
                if poses.is_empty() {
                    return Err(fail(*first_line, ParseErrorKind::EmptyPayload));
                }
                let mut joints = None;
                let mut coords = Vec::new();
                for (at, pose) in poses {
                    let frame = parse_pose_line(pose, self.dialect, &mut self.stats)
                        .map_err(|kind| fail(*at, kind))?;
                    let n = frame.len() / 3;
                    match joints {
                        None => joints = Some(n),
                        Some(j) if j != n => return Err(fail(*at, ParseErrorKind::InconsistentJoints)),
                        Some(_) => {}
                    }
                    coords.extend(frame);
                }
                let joints = joints.unwrap_or_default();
                let mut skeleton = Skeleton::from_flat(joints, coords)
                    .ok_or_else(|| fail(*first_line, ParseErrorKind::EmptyPayload))?;
                if let Some(frames) = self.pad_to_frames {
                    skeleton.pad_to(frames);
                }
                MotionObject::skeleton(id.clone(), skeleton)
            }
            None => {
                let extra = lines.len() - 1;
                if extra > 0 {
                    warn!(
                        "object {id}: ignoring {extra} vector line(s) after the first (line {})",
                        lines[1].0
                    );
                    self.stats.extra_vector_lines += extra;
                }
                let values = parse_vector_line(first).map_err(|kind| fail(*first_line, kind))?;
                MotionObject::embedding(id.clone(), values)
            }
        };

        let slot = match object.payload.kind() {
            PayloadKind::Skeleton => &mut self.shape[0],
            PayloadKind::Embedding => &mut self.shape[1],
        };
        let width = object.payload.item_width();
        match *slot {
            None => *slot = Some(width),
            Some(expected) if expected != width => {
                return Err(fail(
                    line,
                    ParseErrorKind::InconsistentShape {
                        expected,
                        found: width,
                    },
                ))
            }
            Some(_) => {}
        }
        Ok(object)
    }
}

impl<R: BufRead> Iterator for ObjectReader<R> {
    type Item = Result<MotionObject, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let record = match self.next_record()? {
            Ok(record) => record,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.stats.records += 1;
        let result = self.build(record);
        match &result {
            Ok(_) => self.stats.objects += 1,
            Err(e) if e.is_fatal() => self.done = true,
            Err(_) => self.stats.skipped_records += 1,
        }
        Some(result)
    }
}

/// Removes whitespace around commas so `1, 2, 3` stays one joint group.
fn squeeze_commas(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            let mut ws = String::new();
            ws.push(c);
            while let Some(&n) = chars.peek() {
                if !n.is_whitespace() {
                    break;
                }
                ws.push(n);
                chars.next();
            }
            let next_is_comma = chars.peek() == Some(&',');
            if !out.ends_with(',') && !next_is_comma {
                out.push_str(&ws);
            }
        } else if c == ',' {
            out.push(c);
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parses one pose line into flat coordinates.
pub(crate) fn parse_pose_line(
    line: &str,
    dialect: SkeletonDialect,
    stats: &mut ReadStats,
) -> Result<Vec<f32>, ParseErrorKind> {
    match dialect {
        SkeletonDialect::Hdm05 => {
            let squeezed = squeeze_commas(line);
            let mut coords = Vec::new();
            for group in squeezed
                .split(|c: char| c == ';' || c.is_whitespace())
                .filter(|g| !g.is_empty())
            {
                let nums: Vec<&str> = group.split(',').filter(|t| !t.is_empty()).collect();
                let parsed = if nums.len() == 3 {
                    nums.iter()
                        .map(|t| t.parse::<f32>().ok())
                        .collect::<Option<Vec<f32>>>()
                } else {
                    None
                };
                match parsed {
                    Some(xyz) => coords.extend(xyz),
                    None => stats.skipped_joint_groups += 1,
                }
            }
            if coords.is_empty() {
                return Err(ParseErrorKind::NoNumericTokens);
            }
            Ok(coords)
        }
        SkeletonDialect::PkuMmd => {
            let coords = line
                .split(|c: char| c == ';' || c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| {
                    t.parse::<f32>()
                        .map_err(|_| ParseErrorKind::InvalidNumber(t.to_string()))
                })
                .collect::<Result<Vec<f32>, _>>()?;
            if coords.is_empty() {
                return Err(ParseErrorKind::NoNumericTokens);
            }
            if coords.len() % 3 != 0 {
                return Err(ParseErrorKind::JointCountNotTriple(coords.len()));
            }
            Ok(coords)
        }
    }
}

/// Parses a comma-separated embedding vector.
pub(crate) fn parse_vector_line(line: &str) -> Result<Vec<f32>, ParseErrorKind> {
    let values = line
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f32>()
                .map_err(|_| ParseErrorKind::InvalidNumber(t.to_string()))
        })
        .collect::<Result<Vec<f32>, _>>()?;
    if values.is_empty() {
        return Err(ParseErrorKind::NoNumericTokens);
    }
    Ok(values)
}
