//! Source-code templates handed back to the assistant.
//!
//! Rendering is pure: a template and a few values in, a string out. The
//! templates live under `templates/` and are embedded at compile time.

pub mod batch;
pub mod program;
pub mod receivers;

/// Substitute every `{{key}}` placeholder.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}

/// Event type slug for a display name: `Daily Check-in` becomes `daily_check_in`.
pub fn event_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}
