// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-video file layout.
//!
//! ```text
//! <root>/statements/<videoId>.json
//! <root>/transcripts/<videoId>.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use votesync_core::session::VideoId;
use votesync_core::statement::Statement;

use crate::error::DataError;
use crate::statements::read_statements;
use crate::transcript::Transcript;

/// Where per-video data lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

/// Everything fetched for one video.
///
/// Failures do not abort the fetch; they are collected in `errors` and the
/// affected part is left empty.
#[derive(Debug, Default)]
pub struct VideoData {
    /// Statements, or `None` if the file was missing or malformed.
    pub statements: Option<Vec<Statement>>,
    /// Transcript, if present and readable.
    pub transcript: Option<Transcript>,
    /// Problems encountered.
    pub errors: Vec<DataError>,
}

impl DataLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Statement file for `video`.
    #[must_use]
    pub fn statements_path(&self, video: &VideoId) -> PathBuf {
        self.root
            .join("statements")
            .join(format!("{}.json", video.as_str()))
    }

    /// Transcript file for `video`.
    #[must_use]
    pub fn transcript_path(&self, video: &VideoId) -> PathBuf {
        self.root
            .join("transcripts")
            .join(format!("{}.txt", video.as_str()))
    }

    /// Reads the statements for `video`.
    pub fn load_statements(&self, video: &VideoId) -> Result<Vec<Statement>, DataError> {
        read_statements(&self.statements_path(video))
    }

    /// Reads the transcript for `video`. A missing file is `Ok(None)`.
    pub fn load_transcript(&self, video: &VideoId) -> Result<Option<Transcript>, DataError> {
        let path = self.transcript_path(video);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(Transcript::parse(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(DataError::Io { path, source }),
        }
    }

    /// Fetches everything for `video`, degrading to empty on failure.
    pub fn fetch_video_data(&self, video: &VideoId) -> VideoData {
        let mut data = VideoData::default();
        match self.load_statements(video) {
            Ok(s) => data.statements = Some(s),
            Err(e) => data.errors.push(e),
        }
        match self.load_transcript(video) {
            Ok(t) => data.transcript = t,
            Err(e) => data.errors.push(e),
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use votesync_core::statement::StatementId;

    fn scratch(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("votesync_data_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("statements")).unwrap();
        fs::create_dir_all(dir.join("transcripts")).unwrap();
        dir
    }

    #[test]
    fn paths_follow_layout() {
        let layout = DataLayout::new("/data");
        let id = VideoId::new("abc");
        assert_eq!(
            layout.statements_path(&id),
            Path::new("/data/statements/abc.json")
        );
        assert_eq!(
            layout.transcript_path(&id),
            Path::new("/data/transcripts/abc.txt")
        );
    }

    #[test]
    fn fetch_reads_both_files() {
        let root = scratch("both");
        fs::write(
            root.join("statements/vid.json"),
            r#"[{"statementId": 1, "timecode": 3, "text": "Hi"}]"#,
        )
        .unwrap();
        fs::write(root.join("transcripts/vid.txt"), "00:01 hello").unwrap();

        let data = DataLayout::new(&root).fetch_video_data(&VideoId::new("vid"));
        assert!(data.errors.is_empty(), "{:?}", data.errors);
        assert_eq!(data.statements.unwrap()[0].statement_id, StatementId(1));
        assert_eq!(data.transcript.unwrap().segments().len(), 1, "one line");
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn fetch_degrades_on_missing_and_malformed() {
        let root = scratch("degrade");
        let layout = DataLayout::new(&root);

        let missing = layout.fetch_video_data(&VideoId::new("none"));
        assert!(missing.statements.is_none(), "no file");
        assert!(missing.transcript.is_none(), "optional");
        assert_eq!(missing.errors.len(), 1, "only statements reported");
        assert!(missing.errors[0].is_not_found(), "{}", missing.errors[0]);

        fs::write(root.join("statements/bad.json"), "[{").unwrap();
        let bad = layout.fetch_video_data(&VideoId::new("bad"));
        assert!(bad.statements.is_none(), "malformed");
        assert!(
            matches!(bad.errors[0], DataError::Json { .. }),
            "{}",
            bad.errors[0]
        );
        let _ = fs::remove_dir_all(root);
    }
}
