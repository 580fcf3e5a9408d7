//! Bounded rendering of field values and outcome lists for logs and the CLI.

/// Collapse whitespace and cap the length of a value shown on one log line.
pub fn compact_value(input: &str, max_chars: usize) -> String {
    if input.is_empty() {
        return "<empty>".to_string();
    }
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Join the first `max_items` entries, noting how many were left out.
pub fn preview_list(items: &[String], max_items: usize) -> String {
    let shown = items
        .iter()
        .take(max_items)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match items.len().checked_sub(max_items) {
        Some(rest) if rest > 0 => format!("{} (+{} more)", shown, rest),
        _ => shown,
    }
}
