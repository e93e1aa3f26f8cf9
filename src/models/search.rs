/// Case-insensitive substring match over a person's name parts. A term
/// matches when it occurs in the second name, the name, the patronymic, or
/// the full "second name patronymic" string (missing parts count as empty).
pub fn name_matches(
    term: &str,
    second_name: Option<&str>,
    name: Option<&str>,
    patronymic: Option<&str>,
) -> bool {
    let term = term.to_lowercase();
    if term.is_empty() {
        return true;
    }

    let parts = [second_name, name, patronymic];
    if parts
        .iter()
        .flatten()
        .any(|part| part.to_lowercase().contains(&term))
    {
        return true;
    }

    let full_name = format!(
        "{} {} {}",
        second_name.unwrap_or_default(),
        name.unwrap_or_default(),
        patronymic.unwrap_or_default()
    );
    full_name.to_lowercase().contains(&term)
}

/// Case-insensitive "contains" used by the public news/promotion search.
pub fn text_contains(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(&term.to_lowercase())
}

/// Escapes `%`, `_` and `\` so a user term can be embedded in a LIKE pattern.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
