/// Canonicalize a pasted watch URL: trim, default to https, lowercase the
/// host and fold the music subdomain into the main site so equality checks
/// and tool invocations see one spelling.
pub fn normalize_watch_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let (scheme, rest) = match trimmed.split_once("://") {
        Some((s, r)) => (s.to_ascii_lowercase(), r),
        None => ("https".to_string(), trimmed),
    };

    let (host, tail) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };

    let mut host = host.to_ascii_lowercase();
    if host == "music.youtube.com" {
        host = "www.youtube.com".to_string();
    }

    format!("{scheme}://{host}{tail}")
}
