//! Plugin registry, CSS registry, and the dispatch/correlation path.
//!
//! One injector is bound to exactly one web view. It keeps the page's bridge
//! surface in step with its registries: injecting a plugin evaluates its
//! declaration, removing one deletes the entry point, and response-expecting
//! calls are correlated back to their JS-side callback through a token-keyed
//! pending table.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::bridge::codegen;
use crate::bridge::message::BridgeMessage;
use crate::bridge::plugin::{JsonObject, ResponseCallback, ResponseRouter, WebViewPlugin};
use crate::host::WebViewHost;

/// Outcome of routing one transport-delivered call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The call reached a registered plugin.
    Handled,
    /// No plugin is registered under the call's identifier; the call was dropped.
    RoutingMiss,
    /// The handler panicked; the panic was contained at the dispatch boundary.
    HandlerFailed,
}

/// A response-expecting call waiting for its handler to respond.
#[derive(Debug)]
struct PendingCallback {
    plugin: String,
    created_at: Instant,
}

/// Per-web-view registry and dispatcher for plugins and injected CSS.
///
/// Every method takes `&mut self`: an injector has a single logical owner (the
/// runtime loop), which serializes registry mutations with dispatch. Response
/// sinks hand results back through the router instead of touching the injector
/// from other threads.
pub struct Injector {
    host: Arc<dyn WebViewHost>,
    router: ResponseRouter,
    plugins: HashMap<String, Box<dyn WebViewPlugin>>,
    css: HashMap<String, String>,
    pending: HashMap<String, PendingCallback>,
}

impl Injector {
    /// Bind an injector to a web view and install the bridge scaffolding.
    ///
    /// Most hosts go through [`InjectorRuntime`](crate::host::InjectorRuntime)
    /// instead, which owns the injector on a dedicated thread. Constructing one
    /// directly is for hosts that already have a single-threaded executor (a UI
    /// run loop) to serialize calls on.
    pub fn new(host: Arc<dyn WebViewHost>, router: ResponseRouter) -> Self {
        host.evaluate_javascript(codegen::BRIDGE_BOOTSTRAP);
        Self {
            host,
            router,
            plugins: HashMap::new(),
            css: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Register `plugin` and evaluate its declaration in the page.
    ///
    /// Re-registering an identifier replaces the prior plugin; the old
    /// declaration is removed from the page before the new one is installed, so
    /// no stale bridge function survives.
    pub fn inject_plugin(&mut self, plugin: Box<dyn WebViewPlugin>) {
        let identifier = plugin.identifier().to_string();
        if self.plugins.contains_key(&identifier) {
            log::debug!("Replacing plugin {}", identifier);
            self.host
                .evaluate_javascript(&codegen::function_removal(&identifier));
        }
        self.host.evaluate_javascript(&plugin.javascript_code());
        self.plugins.insert(identifier, plugin);
    }

    /// Delete `window.bridge.<identifier>` and drop the registration.
    /// No-op when the identifier is absent.
    pub fn remove_plugin_for_identifier(&mut self, identifier: &str) {
        if self.plugins.remove(identifier).is_some() {
            self.host
                .evaluate_javascript(&codegen::function_removal(identifier));
        }
    }

    /// Remove every registered plugin. Safe to call when already empty.
    pub fn remove_all_plugins(&mut self) {
        let identifiers: Vec<String> = self.plugins.keys().cloned().collect();
        for identifier in identifiers {
            self.remove_plugin_for_identifier(&identifier);
        }
    }

    /// Identifiers of currently registered plugins, sorted for stable output.
    pub fn registered_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.plugins.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Store `css` under `identifier` and insert-or-replace the tagged style
    /// element in the page. Re-injection under the same identifier replaces the
    /// stylesheet text without duplicating the element.
    pub fn inject_css_string(&mut self, css: &str, identifier: &str) {
        self.host
            .evaluate_javascript(&codegen::css_injection(identifier, css));
        self.css.insert(identifier.to_string(), css.to_string());
    }

    /// Remove the tagged style element and the registry entry.
    /// No-op when the identifier is absent.
    pub fn remove_css_string_for_identifier(&mut self, identifier: &str) {
        if self.css.remove(identifier).is_some() {
            self.host
                .evaluate_javascript(&codegen::css_removal(identifier));
        }
    }

    /// Identifiers of currently injected CSS entries, sorted for stable output.
    pub fn css_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.css.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Route one transport-delivered call to its plugin.
    ///
    /// A call carrying a callback id records a pending entry keyed by that id
    /// (the JS-side id doubles as the correlation token) and hands the plugin a
    /// single-use [`ResponseCallback`]. Routing misses are dropped, never fatal:
    /// a reloaded page may race with late-arriving calls from the previous
    /// document. Handler panics are contained here and never reach the page.
    pub fn dispatch(&mut self, message: BridgeMessage) -> DispatchOutcome {
        if !self.plugins.contains_key(&message.identifier) {
            log::warn!(
                "No plugin registered for identifier {:?}; dropping call",
                message.identifier
            );
            return DispatchOutcome::RoutingMiss;
        }

        let BridgeMessage {
            identifier,
            payload,
            callback_id,
        } = message;

        let responder = callback_id.map(|token| {
            log::debug!("Pending callback {} for plugin {}", token, identifier);
            self.pending.insert(
                token.clone(),
                PendingCallback {
                    plugin: identifier.clone(),
                    created_at: Instant::now(),
                },
            );
            ResponseCallback::new(token, Arc::clone(&self.router))
        });

        let plugin = &self.plugins[&identifier];
        let invoked = panic::catch_unwind(AssertUnwindSafe(|| plugin.invoke(payload, responder)));
        if invoked.is_err() {
            log::error!("Plugin {} panicked while handling a call", identifier);
            return DispatchOutcome::HandlerFailed;
        }

        DispatchOutcome::Handled
    }

    /// Deliver a handler's result to the JS-side callback for `token`.
    ///
    /// Stale tokens (page reloaded, table already cleared) are silently dropped.
    pub fn deliver_response(&mut self, token: &str, payload: JsonObject) {
        let Some(pending) = self.pending.remove(token) else {
            log::debug!("Dropping response for unknown callback {}", token);
            return;
        };

        log::debug!(
            "Delivering response for plugin {} after {:?} ({} still pending)",
            pending.plugin,
            pending.created_at.elapsed(),
            self.pending.len()
        );
        self.host
            .evaluate_javascript(&codegen::response_delivery(token, &payload));
    }

    /// Drop every pending callback without invoking it, on both sides of the
    /// bridge. Used at teardown and navigation, mirroring `remove_all_plugins`.
    pub fn clear_pending_callbacks(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        log::info!("Dropping {} pending callbacks", self.pending.len());
        self.pending.clear();
        self.host.evaluate_javascript(codegen::PENDING_RESET);
    }

    /// Number of response-expecting calls still waiting on their handler.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
