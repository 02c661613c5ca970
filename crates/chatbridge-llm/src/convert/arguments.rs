use serde_json::Value;

use crate::types::content::empty_object;

/// Parse a call's accumulated argument string
///
/// Unparseable or empty buffers degrade to `{}` so one bad call never voids
/// its siblings.
pub(crate) fn parse_arguments(name: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return empty_object();
    }

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(function = %name, error = %e, arguments = %raw, "malformed call arguments, using empty object");
            empty_object()
        }
    }
}
