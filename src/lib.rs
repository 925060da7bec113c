//! # webview_bridge
//!
//! A bidirectional bridge between JavaScript running in an embedded web view
//! and native host code.
//!
//! Host code registers named plugins that become callable from the page as
//! `window.bridge.<name>(data[, callback])`; asynchronous native responses are
//! correlated back to the JS call that requested them. The web view itself is
//! an external collaborator behind the [`WebViewHost`] trait, so any framework
//! that can evaluate JS and post messages back can sit underneath.
//!
//! Each web view gets exactly one injector, running on a dedicated owner
//! thread; all registry mutations and dispatch are marshaled onto that thread
//! through a cheap-to-clone [`InjectorClient`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webview_bridge::{WebViewHost, injector_for_web_view};
//!
//! struct MyWebView;
//!
//! impl WebViewHost for MyWebView {
//!     fn evaluate_javascript(&self, script: &str) {
//!         // Hand the script to the embedded web view.
//!     }
//! }
//!
//! let injector = injector_for_web_view("main", Arc::new(MyWebView));
//!
//! // JS: window.bridge.ping({ x: 1 })
//! injector.inject_function("ping", |data| {
//!     log::info!("ping: {:?}", data);
//! });
//!
//! // JS: window.bridge.echo({ x: 1 }, function(result) { ... })
//! injector.inject_function_with_response("echo", |data, responder| {
//!     responder.respond(data);
//! });
//!
//! // The transport adapter feeds JS-originated calls back in:
//! injector.handle_script_message(r#"{"identifier":"ping","payload":{"x":1}}"#);
//! ```

pub mod bridge;
pub mod error;
pub mod host;

pub use bridge::{
    BlockPlugin, BridgeMessage, DispatchOutcome, Injector, JsonObject, ResponseCallback,
    ResponseRouter, WebViewPlugin,
};
pub use error::BridgeError;
pub use host::{
    InjectorClient, InjectorCommand, InjectorRuntime, WebViewHost, injector_for_web_view,
    remove_web_view,
};
