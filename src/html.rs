//! Small helpers shared by the HTML renderers.

use anyhow::Result;
use serde::Serialize;

/// Escapes text for use in HTML element content or a quoted attribute.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serializes `value` as JSON that is safe to inline in a `<script>` block.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
