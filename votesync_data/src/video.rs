// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Video reference parsing.

use std::sync::OnceLock;

use regex::Regex;
use votesync_core::session::VideoId;

use crate::error::InputError;

fn id_pattern() -> Result<&'static Regex, regex::Error> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:v=|youtu\.be/|embed/)([^&?/]+)"))
        .as_ref()
        .map_err(Clone::clone)
}

/// Extracts the video id from a watch, short or embed URL.
///
/// ```
/// # use votesync_data::video::parse_video_url;
/// let id = parse_video_url("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap();
/// assert_eq!(id.as_str(), "dQw4w9WgXcQ");
/// ```
pub fn parse_video_url(url: &str) -> Result<VideoId, InputError> {
    id_pattern()?
        .captures(url.trim())
        .and_then(|c| c.get(1))
        .map(|m| VideoId::new(m.as_str()))
        .ok_or_else(|| InputError::InvalidVideoUrl(url.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_shapes() {
        for (url, want) in [
            ("https://www.youtube.com/watch?v=abc123&t=10", "abc123"),
            ("https://youtu.be/xyz789", "xyz789"),
            ("https://www.youtube.com/embed/e_mb-ed?autoplay=1", "e_mb-ed"),
            ("  https://www.youtube.com/watch?feature=share&v=q1  ", "q1"),
        ] {
            assert_eq!(parse_video_url(url).unwrap().as_str(), want, "{url}");
        }
    }

    #[test]
    fn rejects_other_input() {
        for url in ["", "https://example.com/video/1", "v="] {
            assert!(
                matches!(parse_video_url(url), Err(InputError::InvalidVideoUrl(_))),
                "{url:?} should be rejected"
            );
        }
    }
}
