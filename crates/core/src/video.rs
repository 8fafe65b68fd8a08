//! Video URL recognition for video sections.

use regex::Regex;
use std::sync::LazyLock;

/// Regex matching the known YouTube URL shapes: watch, short link, embed,
/// `/v/`, `/u/<x>/` and shorts. Group 2 holds the candidate identifier.
static VIDEO_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=|shorts/)([^#&?]*).*").unwrap()
});

/// Length of a YouTube video identifier.
const VIDEO_ID_LEN: usize = 11;

/// Extract the video identifier from a URL.
///
/// Returns `None` when the URL has no recognizable shape or the candidate is
/// not exactly 11 characters long.
pub fn extract_video_id(url: &str) -> Option<&str> {
    let candidate = VIDEO_URL_REGEX.captures(url.trim())?.get(2)?.as_str();
    (candidate.chars().count() == VIDEO_ID_LEN).then_some(candidate)
}

/// Privacy-enhanced embed URL for a video identifier.
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube-nocookie.com/embed/{}?rel=0", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "  https://youtu.be/dQw4w9WgXcQ?si=abc  ",
        ] {
            assert_eq!(extract_video_id(url), Some("dQw4w9WgXcQ"), "{}", url);
        }
    }

    #[test]
    fn test_unrecognized_urls() {
        assert_eq!(extract_video_id("https://example.com/video"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://youtu.be/short"), None);
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            embed_url("dQw4w9WgXcQ"),
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?rel=0"
        );
    }
}
