//! Domain types shared by the lister, the remote client and the reconciler.
//!
//! A [`Snapshot`] is built fresh at the start of every pass and discarded at
//! the end of it. Nothing here is persisted between passes.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a file inside the synchronised folder; the join key between the
/// local and remote snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileName(pub String);

impl FileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Flat folders only: a usable name is non-empty and has no separators.
    pub fn is_flat(&self) -> bool {
        !self.0.is_empty() && !self.0.contains(&['/', '\\'][..])
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FileName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FileName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Kind of an observed entry. Directories never make it into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    File,
    Dir,
}

/// Immutable observation of one file on one side at the start of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: FileName,
    /// Last modification time, with the offset it was reported in.
    pub modified_at: DateTime<FixedOffset>,
    /// Where the file lives on its side: a local path or a provider path
    /// such as `disk:/backup/a.txt`. Opaque to the reconciler.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default)]
    pub kind: FileKind,
}

impl FileRecord {
    /// A plain file record with no size information.
    pub fn file(
        name: impl Into<FileName>,
        modified_at: DateTime<FixedOffset>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            modified_at,
            location: location.into(),
            size: None,
            kind: FileKind::File,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Modification time rendered as ISO-8601 with offset.
    pub fn modified_iso8601(&self) -> String {
        self.modified_at.to_rfc3339()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The files observed on one side at the start of a pass, keyed by name.
///
/// Construction enforces the snapshot invariants: only files, only flat names,
/// and no two records sharing a name (the first occurrence wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    records: Vec<FileRecord>,
}

impl Snapshot {
    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for record in records {
            if record.kind != FileKind::File {
                continue;
            }
            if !record.name.is_flat() {
                tracing::warn!(name = %record.name, "ignoring entry with a non-flat name");
                continue;
            }
            if !seen.insert(record.name.clone()) {
                tracing::warn!(name = %record.name, "duplicate name in listing, keeping the first");
                continue;
            }
            kept.push(record);
        }
        Self { records: kept }
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &FileName) -> Option<&FileRecord> {
        self.records.iter().find(|r| &r.name == name)
    }

    pub fn names(&self) -> Vec<&FileName> {
        self.records.iter().map(|r| &r.name).collect()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<FileRecord> for Snapshot {
    fn from_iter<T: IntoIterator<Item = FileRecord>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).expect("timestamp")
    }

    #[test]
    fn snapshot_keeps_first_of_duplicate_names() {
        let snapshot = Snapshot::from_records([
            FileRecord::file("a.txt", ts("2024-01-01T00:00:00+00:00"), "first"),
            FileRecord::file("a.txt", ts("2024-01-02T00:00:00+00:00"), "second"),
            FileRecord::file("b.txt", ts("2024-01-01T00:00:00+00:00"), "b"),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get(&FileName::from("a.txt")).map(|r| r.location.as_str()),
            Some("first")
        );
    }

    #[test]
    fn snapshot_drops_directories_and_nested_names() {
        let mut dir = FileRecord::file("photos", ts("2024-01-01T00:00:00+00:00"), "d");
        dir.kind = FileKind::Dir;
        let snapshot = Snapshot::from_records([
            dir,
            FileRecord::file("sub/a.txt", ts("2024-01-01T00:00:00+00:00"), "x"),
            FileRecord::file("", ts("2024-01-01T00:00:00+00:00"), "y"),
            FileRecord::file("ok.txt", ts("2024-01-01T00:00:00+00:00"), "z"),
        ]);
        let names: Vec<_> = snapshot.names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["ok.txt"]);
    }

    #[test]
    fn modified_iso8601_keeps_the_offset() {
        let record = FileRecord::file("a", ts("2014-04-22T10:32:49+04:00"), "a");
        assert_eq!(record.modified_iso8601(), "2014-04-22T10:32:49+04:00");
    }

    #[test]
    fn file_record_yaml_roundtrip_uses_lowercase_kind() {
        let record = FileRecord::file("a", ts("2024-01-01T00:00:00+00:00"), "disk:/a").with_size(3);
        let yaml = serde_yaml::to_string(&record).expect("serialize");
        assert!(yaml.contains("kind: file"), "got: {yaml}");
        let back: FileRecord = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, record);
    }
}
