//! Batch minting with a local index of minted identifiers.
//!
//! EZID has no call that lists an account's identifiers, so every minted
//! identifier is appended to a plain text index as `identifier,timestamp`.

use crate::anvl::Record;
use crate::error::Result;
use crate::ezid::EzidClient;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only index file of minted identifiers
#[derive(Debug, Clone)]
pub struct MintIndex {
    path: PathBuf,
}

impl MintIndex {
    /// Use the index at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MintIndex { path: path.into() }
    }

    /// Get the index path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an identifier minted now
    pub fn append(&self, identifier: &str) -> Result<()> {
        self.append_at(identifier, Local::now())
    }

    /// Record an identifier with an explicit timestamp
    pub fn append_at(&self, identifier: &str, at: DateTime<Local>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{},{}",
            identifier.trim(),
            at.format(TIMESTAMP_FORMAT)
        )?;
        Ok(())
    }
}

/// Mint `count` identifiers under `shoulder`, each with the same metadata.
///
/// Each identifier is written to `index` as soon as it is minted, so a failure
/// part way through leaves the earlier ones recorded.
pub fn mint_batch(
    client: &mut EzidClient,
    shoulder: &str,
    count: usize,
    record: Option<&Record>,
    index: Option<&MintIndex>,
) -> Result<Vec<String>> {
    let mut minted = Vec::with_capacity(count);
    for n in 0..count {
        let identifier = client.mint(shoulder, record)?;
        debug!(n, identifier = identifier.as_str(), "minted");
        if let Some(index) = index {
            index.append(&identifier)?;
        }
        minted.push(identifier);
    }
    Ok(minted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_index_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let index = MintIndex::new(dir.path().join("EZID.txt"));

        let at = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        index.append_at("ark:/99999/fk4abc\n", at).unwrap();
        index.append_at("ark:/99999/fk4def", at).unwrap();

        let contents = std::fs::read_to_string(index.path()).unwrap();
        assert_eq!(
            contents,
            "ark:/99999/fk4abc,2024-03-05 14:07:09\nark:/99999/fk4def,2024-03-05 14:07:09\n"
        );
    }

    #[test]
    fn test_index_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let index = MintIndex::new(dir.path().join("missing").join("EZID.txt"));
        assert!(index.append("ark:/99999/fk4abc").is_err());
    }
}
