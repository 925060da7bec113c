//! JavaScript codegen for the bridge surface.
//!
//! Everything the injector evaluates in the page comes from here: the bootstrap
//! scaffolding, per-plugin declarations, response delivery, and style injection.
//! Identifiers and CSS text are escaped before being embedded in string
//! positions; declarations use bracket notation so any identifier works.

use crate::bridge::plugin::JsonObject;

/// Installed once per injector, before any plugin declaration.
///
/// Defines the `window.bridge` namespace and the JS-side pending-callback map.
/// Idempotent, so re-running it after a navigation is harmless. The transport
/// adapter is expected to install `window.__bridgePost` separately.
pub(crate) const BRIDGE_BOOTSTRAP: &str = r#"
(function() {
    if (window.bridge && window.__bridge_pending) { return; }

    // 1. Bridge namespace for plugin entry points
    window.bridge = window.bridge || {};

    // 2. Pending JS-side callbacks, keyed by callback id
    window.__bridge_pending = {};
    window.__bridge_seq = 0;
})();
"#;

/// Drops every JS-side pending callback without invoking it.
pub(crate) const PENDING_RESET: &str = "window.__bridge_pending = {};";

/// Declaration for `window.bridge.<name>`.
///
/// Response-expecting declarations allocate a callback id when the caller
/// supplies a function; fire-and-forget declarations never do.
pub(crate) fn function_declaration(function_name: &str, expects_response: bool) -> String {
    let name = escape_js_string(function_name);

    if expects_response {
        format!(
            r#"
window.bridge['{name}'] = function(data, callback) {{
    var id = null;
    if (typeof callback === 'function') {{
        id = 'cb_' + (++window.__bridge_seq);
        window.__bridge_pending[id] = callback;
    }}
    window.__bridgePost(JSON.stringify({{
        identifier: '{name}',
        payload: data || {{}},
        callbackId: id
    }}));
}};
"#
        )
    } else {
        format!(
            r#"
window.bridge['{name}'] = function(data) {{
    window.__bridgePost(JSON.stringify({{
        identifier: '{name}',
        payload: data || {{}}
    }}));
}};
"#
        )
    }
}

/// Deletes the `window.bridge.<name>` entry point.
pub(crate) fn function_removal(function_name: &str) -> String {
    format!(
        "delete window.bridge['{}'];",
        escape_js_string(function_name)
    )
}

/// Looks up the JS-side pending callback for `token` and invokes it once.
///
/// The pending entry is deleted before the callback runs, so a second delivery
/// for the same token finds nothing.
pub(crate) fn response_delivery(token: &str, payload: &JsonObject) -> String {
    let token = escape_js_string(token);
    let result = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"
(function() {{
    var cb = window.__bridge_pending['{token}'];
    delete window.__bridge_pending['{token}'];
    if (cb) {{ cb({result}); }}
}})();
"#
    )
}

/// Inserts or replaces the style element tagged with `identifier`.
///
/// Replacement rewrites the existing element's text rather than appending a
/// second element, so the page never holds two styles for one identifier.
pub(crate) fn css_injection(identifier: &str, css: &str) -> String {
    let id = escape_js_string(identifier);
    let css = escape_js_string(css);

    format!(
        r#"
(function() {{
    var el = document.getElementById('{id}');
    if (!el) {{
        el = document.createElement('style');
        el.id = '{id}';
        document.head.appendChild(el);
    }}
    el.textContent = '{css}';
}})();
"#
    )
}

/// Removes the style element tagged with `identifier`, if present.
pub(crate) fn css_removal(identifier: &str) -> String {
    let id = escape_js_string(identifier);

    format!(
        r#"
(function() {{
    var el = document.getElementById('{id}');
    if (el && el.parentNode) {{ el.parentNode.removeChild(el); }}
}})();
"#
    )
}

/// Escape a string for embedding in a single-quoted JS string literal.
fn escape_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
