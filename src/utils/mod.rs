/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }

    result
}

/// Adds `class` to a space-separated class list unless it is already there.
pub fn add_class(existing: Option<&str>, class: &str) -> String {
    match existing.map(str::trim).filter(|list| !list.is_empty()) {
        Some(list) if list.split_whitespace().any(|c| c == class) => list.to_string(),
        Some(list) => format!("{} {}", list, class),
        None => class.to_string(),
    }
}
