//! Document filename engine.
//!
//! Generates deterministic output filenames for generated documents from a
//! user-supplied `{{placeholder}}` template, falling back to a numbered
//! default when no template is given or rendering produces nothing usable.

use std::collections::HashMap;

/// Characters that are invalid in filenames on at least one supported OS.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace filesystem-hostile characters with `_` and trim whitespace.
///
/// Control characters are dropped entirely. Returns `None` when nothing
/// printable survives, so callers can fall back to a default name.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Append `.{extension}` unless the name already ends with it (case-insensitive).
pub fn ensure_extension(name: &str, extension: &str) -> String {
    let suffix = format!(".{extension}");
    if name.to_lowercase().ends_with(&suffix.to_lowercase()) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

/// Default name for the `index`-th generated document (1-based).
pub fn default_document_name(index: usize, extension: &str) -> String {
    format!("act_{index}.{extension}")
}

/// Render a filename template by substituting `{{key}}` occurrences from
/// `values`, then sanitizing and appending the extension.
///
/// Falls back to [`default_document_name`] when the template renders to an
/// unusable name.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use contracts_core::naming::render_filename;
///
/// let values = HashMap::from([("client".to_string(), "ООО Ромашка".to_string())]);
/// assert_eq!(
///     render_filename(Some("Акт {{client}}"), &values, "docx", 1),
///     "Акт ООО Ромашка.docx"
/// );
/// assert_eq!(render_filename(None, &values, "pdf", 3), "act_3.pdf");
/// ```
pub fn render_filename(
    template: Option<&str>,
    values: &HashMap<String, String>,
    extension: &str,
    index: usize,
) -> String {
    let Some(template) = template else {
        return default_document_name(index, extension);
    };

    let mut rendered = template.to_string();
    for (key, value) in values {
        let placeholder = format!("{{{{{key}}}}}");
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, value);
        }
    }

    match sanitize_filename(&rendered) {
        Some(name) => ensure_extension(&name, extension),
        None => default_document_name(index, extension),
    }
}
