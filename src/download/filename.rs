/// Make a track title safe to use as a file name: every run of
/// filesystem-hostile characters becomes one `_`, whitespace is collapsed,
/// overlong names are capped with an ellipsis and an empty result falls
/// back to a generic name.
pub fn sanitize(name: &str, max_len: usize) -> String {
    let mut replaced = String::with_capacity(name.len());
    let mut in_unsafe_run = false;
    for c in name.chars() {
        if matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            in_unsafe_run = true;
        } else {
            if in_unsafe_run {
                replaced.push('_');
                in_unsafe_run = false;
            }
            replaced.push(c);
        }
    }
    if in_unsafe_run {
        replaced.push('_');
    }

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "track".to_string();
    }

    let chars: Vec<char> = collapsed.chars().collect();
    if chars.len() > max_len {
        let mut capped: String = chars[..max_len.saturating_sub(1)].iter().collect();
        capped.push('…');
        capped
    } else {
        collapsed
    }
}
