use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants;

lazy_static! {
    // Greedy prefix: the rightmost marker decides where the id starts.
    static ref VIDEO_LINK: Regex = Regex::new(
        r"^.*(youtu\.be/|v/|u/[A-Za-z0-9_]/|embed/|watch\?v=|&v=)([^#&?]*).*"
    )
    .expect("video link pattern is valid");
}

pub const MEDIA_ID_LEN: usize = 11;

/// Platform-specific video identifier, always exactly 11 characters.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MediaId(String);

impl MediaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("{}{}", constants::WATCH_URL_PREFIX, self.0)
    }

    pub fn thumbnail_url(&self) -> String {
        format!("{}{}/hqdefault.jpg", constants::THUMBNAIL_URL_PREFIX, self.0)
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pulls the video id out of a share, embed or watch link.
///
/// Returns `None` when no known link shape matches or the candidate is not
/// exactly [`MEDIA_ID_LEN`] characters long.
pub fn extract_media_id(source_url: &str) -> Option<MediaId> {
    let captures = VIDEO_LINK.captures(source_url)?;
    let candidate = captures.get(2)?.as_str();

    if candidate.chars().count() == MEDIA_ID_LEN {
        Some(MediaId(candidate.to_string()))
    } else {
        None
    }
}

/// What the submission form shows for a link that extracts cleanly.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SubmissionPreview {
    pub media_id: MediaId,
    pub title: String,
    pub thumbnail_url: String,
}

/// Preview of what a submission of `source_url` would add. Surrounding
/// whitespace is ignored, the same as on submit.
pub fn preview_for(source_url: &str) -> Option<SubmissionPreview> {
    extract_media_id(source_url.trim()).map(|media_id| SubmissionPreview {
        title: constants::PREVIEW_TITLE.to_string(),
        thumbnail_url: media_id.thumbnail_url(),
        media_id,
    })
}
