use std::borrow::Cow;
use std::path::Path;

/// Strip ANSI CSI/OSC escape sequences from a string. Tolerant of malformed
/// sequences; everything outside them is kept verbatim.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\u{1b}') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                // parameters and intermediates run until the final byte
                for c in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                // OSC runs to BEL or ST
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\u{07}' || (prev == '\u{1b}' && c == '\\') {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Read one single-line message value from `i18n/{locale}/catloc_cli.ftl`.
/// Fallback to another locale is the caller's concern.
pub fn read_ftl_message(i18n_dir: &Path, locale: &str, key: &str) -> Option<String> {
    let text = std::fs::read_to_string(i18n_dir.join(locale).join("catloc_cli.ftl")).ok()?;
    for line in text.lines() {
        if let Some((id, value)) = line.split_once('=') {
            if id.trim() == key {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}
