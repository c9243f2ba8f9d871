// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redacted previews of upcoming statements.
//!
//! Upcoming statements are shown as block glyphs so the viewer sees their
//! shape but not their content. Whitespace runs survive verbatim; each other
//! token becomes one block per two word characters, rounded up. Tokens made
//! only of punctuation pass through unchanged.

use alloc::string::String;
use alloc::vec::Vec;

use crate::statement::{Statement, StatementId};
use crate::unlock::UnlockState;

/// Glyph used for redacted characters.
pub const BLOCK: char = '\u{2588}';

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Redacts `text`.
///
/// ```
/// use votesync_core::redact::redact_text;
/// assert_eq!(redact_text("Hello, world!"), "███ ███");
/// assert_eq!(redact_text("a  --  b"), "█  --  █");
/// ```
#[must_use]
pub fn redact_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let ws = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() != ws)
            .map_or(rest.len(), |(i, _)| i);
        let (token, tail) = rest.split_at(end);
        if ws {
            out.push_str(token);
        } else {
            let letters = token.chars().filter(|&c| is_word_char(c)).count();
            if letters == 0 {
                out.push_str(token);
            } else {
                out.extend(core::iter::repeat_n(BLOCK, letters.div_ceil(2)));
            }
        }
        rest = tail;
    }
    out
}

/// One line of the upcoming-statements preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewLine {
    /// Statement identity.
    pub statement_id: StatementId,
    /// Redacted text.
    pub text: String,
    /// Whether the statement has already unlocked (it is queued behind the
    /// active one).
    pub unlocked: bool,
}

/// Returns redacted previews of up to `count` statements after the one under
/// the pointer (or from the start when nothing is active).
#[must_use]
pub fn preview(statements: &[Statement], state: &UnlockState, count: usize) -> Vec<PreviewLine> {
    let start = state.active_index().map_or(0, |i| i + 1);
    statements
        .iter()
        .enumerate()
        .skip(start)
        .take(count)
        .map(|(i, s)| PreviewLine {
            statement_id: s.statement_id,
            text: redact_text(s.display_text()),
            unlocked: state.is_unlocked(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::ActivePointer;
    use alloc::vec;

    fn blocks(n: usize) -> String {
        core::iter::repeat_n(BLOCK, n).collect()
    }

    #[test]
    fn odd_and_even_lengths_round_up() {
        assert_eq!(redact_text("abc"), blocks(2));
        assert_eq!(redact_text("abcd"), blocks(2));
        assert_eq!(redact_text("a"), blocks(1));
    }

    #[test]
    fn whitespace_runs_are_verbatim() {
        let out = redact_text("  one\ttwo \n");
        assert!(out.starts_with("  "), "leading run kept: {out:?}");
        assert!(out.contains('\t'), "tab kept: {out:?}");
        assert!(out.ends_with(" \n"), "trailing run kept: {out:?}");
    }

    #[test]
    fn punctuation_only_token_passes_through() {
        assert_eq!(redact_text("?!"), "?!");
        assert_eq!(redact_text("x ... y"), "█ ... █");
    }

    #[test]
    fn punctuation_does_not_count_as_letters() {
        assert_eq!(redact_text("don't"), blocks(2), "4 word chars");
        assert_eq!(redact_text("snake_case"), blocks(5), "underscore counts");
    }

    #[test]
    fn empty_input() {
        assert_eq!(redact_text(""), "");
    }

    #[test]
    fn preview_starts_after_active() {
        let list = vec![
            Statement::new(StatementId(1), 0.0, "alpha"),
            Statement::new(StatementId(2), 1.0, "beta"),
            Statement::new(StatementId(3), 9.0, "gamma ray"),
        ];
        let state = UnlockState {
            unlocked_index: Some(1),
            pointer: ActivePointer::Active(0),
        };
        let lines = preview(&list, &state, 5);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].statement_id, StatementId(2));
        assert!(lines[0].unlocked);
        assert_eq!(lines[1].text, "███ ██");
        assert!(!lines[1].unlocked);
    }
}
