//! Field option strings.
//!
//! A field's options are written as a semicolon separated list of
//! `name[: value]` entries, e.g. `"primary_key; column: user_id; index"`.

use std::collections::HashMap;

/// Value recorded for an option written without a `: value` part.
pub const PRESENT: &str = "-";

/// Parse an option string into a map of option name to value.
///
/// Names are trimmed and lower-cased, values are trimmed. Options without a
/// value map to [`PRESENT`]. Empty entries are skipped; nothing here fails.
#[must_use]
pub fn parse(tag: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();

    for entry in tag.split(';') {
        let (name, value) = match entry.split_once(':') {
            Some((name, value)) => (name, value.trim()),
            None => (entry, PRESENT),
        };

        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        options.insert(name, value.to_string());
    }

    options
}
