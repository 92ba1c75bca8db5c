//! Link checks for pasted URLs

use url::Url;

/// True when the link parses and its host belongs to YouTube.
pub fn is_youtube_url(input: &str) -> bool {
    let Ok(parsed) = Url::parse(input.trim()) else {
        return false;
    };
    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    host.contains("youtube.com") || host.contains("youtu.be")
}

/// Normalised form of the link that is safe to hand to yt-dlp as a
/// positional argument. `None` for anything that is not an http(s) URL.
pub fn sanitize_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.host_str().filter(|h| !h.is_empty())?;
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_youtube_hosts() {
        assert!(is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_youtube_url("https://music.youtube.com/watch?v=abc"));
        assert!(is_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_youtube_url("  https://YOUTU.BE/xyz  "));
    }

    #[test]
    fn rejects_other_hosts_and_garbage() {
        assert!(!is_youtube_url(""));
        assert!(!is_youtube_url("not a url"));
        assert!(!is_youtube_url("youtube.com/watch?v=abc"));
        assert!(!is_youtube_url("https://vimeo.com/123"));
        // the word only appears in the path
        assert!(!is_youtube_url("https://example.com/youtube.com"));
    }

    #[test]
    fn sanitize_keeps_http_links() {
        assert_eq!(
            sanitize_url(" https://youtu.be/abc?t=10 ").as_deref(),
            Some("https://youtu.be/abc?t=10")
        );
        let cleaned = sanitize_url("https://www.youtube.com/watch?v=a b").unwrap();
        assert!(!cleaned.contains(' '));
    }

    #[test]
    fn sanitize_fails_closed() {
        assert_eq!(sanitize_url(""), None);
        assert_eq!(sanitize_url("--exec rm"), None);
        assert_eq!(sanitize_url("file:///etc/passwd"), None);
        assert_eq!(sanitize_url("javascript:alert(1)"), None);
    }
}
