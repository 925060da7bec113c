//! Host-provided transport boundary.

/// Native side of the web view's messaging primitive.
///
/// Core avoids hard-coding a specific web view framework (wry, a WKWebView
/// wrapper, CEF, etc.). Implementations are expected to:
///
/// - evaluate scripts against the web view's current document, marshaling onto
///   its designated thread internally when called from elsewhere,
/// - install a `window.__bridgePost(message)` function in the page that
///   forwards the raw message string to
///   [`InjectorClient::handle_script_message`](crate::host::InjectorClient::handle_script_message),
/// - repeat both after every page navigation (registrations do not persist
///   across reloads; re-registration is the caller's responsibility).
pub trait WebViewHost: Send + Sync + 'static {
    /// Execute `script` in the page.
    fn evaluate_javascript(&self, script: &str);
}
