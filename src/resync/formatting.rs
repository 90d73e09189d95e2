/// Re-wrap a single-line text onto `line_count` lines.
///
/// Words are spread as evenly as possible, earlier lines taking the extra
/// words. A text with fewer words than lines comes back trimmed and unwrapped;
/// a line count of one or less leaves the text untouched.
pub fn format_text_with_lines(text: &str, line_count: usize) -> String {
    if line_count <= 1 {
        return text.to_string();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < line_count {
        return text.trim().to_string();
    }

    let per_line = words.len() / line_count;
    let remainder = words.len() % line_count;

    let mut lines = Vec::with_capacity(line_count);
    let mut start = 0;
    for i in 0..line_count {
        let end = start + per_line + usize::from(i < remainder);
        lines.push(words[start..end].join(" "));
        start = end;
    }

    lines.join("\n")
}
