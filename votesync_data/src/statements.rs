// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Statement files and vote records.
//!
//! A statement file is a JSON array of
//! `{"statementId": 1, "timecode": 12.5, "text": "..."}` objects. Order in the
//! file does not matter; the session sorts on load.

use std::fs;
use std::path::Path;

use votesync_core::statement::Statement;
use votesync_core::vote::Vote;

use crate::error::DataError;

/// Parses a statement array.
pub fn parse_statements(json: &str) -> Result<Vec<Statement>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serializes the full statement list, pretty-printed.
pub fn export_statements(statements: &[Statement]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(statements)
}

/// Reads and parses a statement file.
pub fn read_statements(path: &Path) -> Result<Vec<Statement>, DataError> {
    let text = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_statements(&text).map_err(|source| DataError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Writes `statements` to `path` as exported JSON.
pub fn write_statements(path: &Path, statements: &[Statement]) -> Result<(), DataError> {
    let json = export_statements(statements).map_err(|source| DataError::Json {
        path: path.to_owned(),
        source,
    })?;
    fs::write(path, json).map_err(|source| DataError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Serializes one vote record, e.g.
/// `{"vote":1,"statementId":3,"loadedTimecode":12.0,"videoTimecode":14}`.
pub fn vote_to_json(vote: &Vote) -> Result<String, serde_json::Error> {
    serde_json::to_string(vote)
}
