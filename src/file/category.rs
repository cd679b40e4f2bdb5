//! File classification by extension.
//!
//! Classification is a pure function of the extension so that it can be
//! shared by local collections and remote catalog entries alike.

use std::fmt;
use std::path::Path;

use serde::Serialize;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "m4v"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Size units for [`format_size`], 1024 apart.
const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Preview category of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Played inline with a video element.
    Video,
    /// Played inline with an audio element.
    Audio,
    /// Shown inline as an image.
    Image,
    /// Embedded PDF viewer.
    Pdf,
    /// Download only.
    Other,
}

impl Category {
    /// String representation used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Image => "image",
            Category::Pdf => "pdf",
            Category::Other => "other",
        }
    }

    /// Whether the file can be shown inline by a browser.
    pub fn is_previewable(&self) -> bool {
        !matches!(self, Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a file extension (without the dot), case-insensitively.
///
/// `ogg` is listed for both video and audio; it classifies as audio.
///
/// ```
/// use sharebox::file::{classify, Category};
///
/// assert_eq!(classify("MP4"), Category::Video);
/// assert_eq!(classify("ogg"), Category::Audio);
/// assert_eq!(classify(""), Category::Other);
/// ```
pub fn classify(extension: &str) -> Category {
    let ext = extension.to_ascii_lowercase();
    let ext = ext.as_str();

    if AUDIO_EXTENSIONS.contains(&ext) && VIDEO_EXTENSIONS.contains(&ext) {
        return Category::Audio;
    }

    if VIDEO_EXTENSIONS.contains(&ext) {
        Category::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Category::Audio
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        Category::Image
    } else if PDF_EXTENSIONS.contains(&ext) {
        Category::Pdf
    } else {
        Category::Other
    }
}

/// Lower-cased extension of a file name, or an empty string.
///
/// Dot-files such as `.bashrc` have no extension.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Human-readable size with one decimal and 1024-based binary prefixes.
///
/// ```
/// use sharebox::file::format_size;
///
/// assert_eq!(format_size(5000), "4.9 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PB")
}
