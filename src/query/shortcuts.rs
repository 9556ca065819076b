//! Query shortcut expansion.

/// Get the expansion for a shortcut prefix.
fn shortcut_expansion(shortcut: &str) -> Option<&'static str> {
    match shortcut {
        "hash" => Some("tx.txhash"),
        "code" => Some("tx.code"),
        "log" => Some("tx.raw_log"),
        "data" => Some("tx.data"),
        "msgs" => Some("tx.tx.body.messages"),
        "memo" => Some("tx.tx.body.memo"),
        "events" => Some("tx.events"),
        "status" => Some("messages"),
        "parsed" => Some("classified"),
        _ => None,
    }
}

/// Expand a query shortcut to its full path.
///
/// Handles both exact matches and prefixes:
/// - `events` → `tx.events`
/// - `msgs.0.msg` → `tx.tx.body.messages.0.msg`
pub fn expand_shortcut(query: &str) -> String {
    if let Some(expanded) = shortcut_expansion(query) {
        return expanded.to_string();
    }

    if let Some((prefix, rest)) = query.split_once('.') {
        if let Some(expanded_prefix) = shortcut_expansion(prefix) {
            return format!("{}.{}", expanded_prefix, rest);
        }
    }

    query.to_string()
}
