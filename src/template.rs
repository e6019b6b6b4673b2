//! `@NAME@` placeholder substitution.
//!
//! Consumers call [`substitute`] against a grid's template map to see the
//! code the form engine would actually run. A single call performs one pass;
//! [`expand_templates`] repeats it for templates that reference other
//! templates.

use indexmap::IndexMap;

/// Placeholder delimiter.
pub const MARKER: char = '@';

/// Replace every `@NAME@` whose `NAME` is a key of `templates` with the
/// template body, wrapped in begin/end comments naming the template.
///
/// Unknown names are left as written. Substituted bodies are not scanned
/// again within the same call.
pub fn substitute(code: &str, templates: &IndexMap<String, String>) -> String {
    if code.is_empty() || templates.is_empty() {
        return code.to_string();
    }

    let mut out = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(open) = rest.find(MARKER) {
        let after_open = &rest[open + MARKER.len_utf8()..];
        let Some(close) = after_open.find(MARKER) else {
            break;
        };
        let name = &after_open[..close];
        out.push_str(&rest[..open]);
        if name.is_empty() {
            // `@@`: the second marker may still open a placeholder.
            out.push(MARKER);
            rest = after_open;
            continue;
        }
        match templates.get(name) {
            Some(body) => out.push_str(&wrap(name, body)),
            None => {
                out.push(MARKER);
                out.push_str(name);
                out.push(MARKER);
            }
        }
        rest = &after_open[close + MARKER.len_utf8()..];
    }
    out.push_str(rest);
    out
}

fn wrap(name: &str, body: &str) -> String {
    format!("\n/* Template: {} */\n{}\n/* End Template */\n", name, body)
}

/// Apply [`substitute`] until the text stops changing or `max_depth`
/// passes have run. Bounded so that self-referencing templates terminate.
pub fn expand_templates(
    code: &str,
    templates: &IndexMap<String, String>,
    max_depth: usize,
) -> String {
    let mut current = code.to_string();
    for _ in 0..max_depth {
        let next = substitute(&current, templates);
        if next == current {
            break;
        }
        current = next;
    }
    current
}
