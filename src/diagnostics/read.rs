use serde::Serialize;

/// Counters collected while parsing an object store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStats {
    /// Records started by an `#objectKey` marker.
    pub records: usize,
    /// Records that produced an object.
    pub objects: usize,
    /// Records dropped because of a recoverable parse error.
    pub skipped_records: usize,
    /// Joint groups ignored because they were not an `x,y,z` triple.
    pub skipped_joint_groups: usize,
    /// Embedding lines ignored after the first vector of a record.
    pub extra_vector_lines: usize,
    /// Non-blank lines seen before the first marker.
    pub orphan_lines: usize,
    /// Objects rejected by an id filter.
    pub filtered_out: usize,
}
