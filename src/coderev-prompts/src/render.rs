//! Placeholder substitution.

/// Substitute `{name}` placeholders in `template` with values from `vars`.
///
/// `{{` and `}}` become literal braces. A `{` that does not start a
/// well-formed `{identifier}` is copied through unchanged. Substituted values
/// are never rescanned.
///
/// On failure returns the name of the first placeholder with no value.
pub fn substitute<'t>(
    template: &'t str,
    vars: &[(&str, &str)],
) -> std::result::Result<String, &'t str> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(name) = placeholder(tail) {
                let value = vars
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or(name)?;
                out.push_str(value);
                rest = &tail[name.len() + 2..];
                continue;
            }
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Identifier inside a `{identifier}` at the start of `tail`.
fn placeholder(tail: &str) -> Option<&str> {
    let inner = &tail[1..];
    let end = inner.find('}')?;
    let name = &inner[..end];

    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some(name)
    } else {
        None
    }
}
