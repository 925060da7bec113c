//! Injector runtime.
//!
//! Runs each injector on a dedicated owner thread with a command loop. The
//! registries and the page DOM are one shared mutable resource, so every
//! operation is marshaled onto that thread through [`InjectorClient`] rather
//! than synchronized with locks. Response sinks feed late results back through
//! the same channel, which is what lets handlers respond from worker threads
//! seconds later without touching the injector directly.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::bridge::{
    BlockPlugin, BridgeMessage, Injector, JsonObject, ResponseCallback, ResponseRouter,
    WebViewPlugin,
};
use crate::host::WebViewHost;

/// Commands processed by an injector's owner thread.
pub enum InjectorCommand {
    /// Register a plugin, replacing any prior one with the same identifier.
    InjectPlugin(Box<dyn WebViewPlugin>),
    /// Remove the plugin registered under the identifier.
    RemovePlugin(String),
    /// Remove every registered plugin.
    RemoveAllPlugins,
    /// Insert or replace the CSS entry for the identifier.
    InjectCss { css: String, identifier: String },
    /// Remove the CSS entry for the identifier.
    RemoveCss(String),
    /// Dispatch a raw JS-originated message from the transport adapter.
    HandleMessage(String),
    /// Deliver a handler's result for a pending callback token.
    DeliverResponse { token: String, payload: JsonObject },
    /// Stop the owner thread, dropping pending callbacks without invoking them.
    Shutdown,
}

/// Client handle for talking to an injector's owner thread.
///
/// This is cheap to clone and can be shared across threads.
#[derive(Clone)]
pub struct InjectorClient {
    sender: Sender<InjectorCommand>,
}

impl InjectorClient {
    /// Register a custom plugin.
    pub fn inject_plugin(&self, plugin: impl WebViewPlugin) {
        self.send(InjectorCommand::InjectPlugin(Box::new(plugin)));
    }

    /// Register a fire-and-forget block plugin: `window.bridge.<name>(data)`.
    pub fn inject_function(
        &self,
        function_name: impl Into<String>,
        handler: impl Fn(JsonObject) + Send + 'static,
    ) {
        self.inject_plugin(BlockPlugin::new(function_name, handler));
    }

    /// Register a response-expecting block plugin:
    /// `window.bridge.<name>(data, callback)`.
    pub fn inject_function_with_response(
        &self,
        function_name: impl Into<String>,
        handler: impl Fn(JsonObject, ResponseCallback) + Send + 'static,
    ) {
        self.inject_plugin(BlockPlugin::with_response(function_name, handler));
    }

    /// Remove the plugin registered under `identifier`. No-op when absent.
    pub fn remove_plugin_for_identifier(&self, identifier: impl Into<String>) {
        self.send(InjectorCommand::RemovePlugin(identifier.into()));
    }

    /// Remove every registered plugin.
    pub fn remove_all_plugins(&self) {
        self.send(InjectorCommand::RemoveAllPlugins);
    }

    /// Insert or replace the stylesheet tagged with `identifier`.
    pub fn inject_css_string(&self, css: impl Into<String>, identifier: impl Into<String>) {
        self.send(InjectorCommand::InjectCss {
            css: css.into(),
            identifier: identifier.into(),
        });
    }

    /// Remove the stylesheet tagged with `identifier`. No-op when absent.
    pub fn remove_css_string_for_identifier(&self, identifier: impl Into<String>) {
        self.send(InjectorCommand::RemoveCss(identifier.into()));
    }

    /// Feed a raw JS-originated message in from the transport adapter.
    ///
    /// Calls are dispatched in the order they arrive here.
    pub fn handle_script_message(&self, raw: impl Into<String>) {
        self.send(InjectorCommand::HandleMessage(raw.into()));
    }

    /// Stop the owner thread. Pending callbacks are dropped, not invoked.
    pub fn shutdown(&self) {
        let _ = self.sender.send(InjectorCommand::Shutdown);
    }

    fn send(&self, command: InjectorCommand) {
        if let Err(e) = self.sender.send(command) {
            log::error!("Failed to send injector command: {}", e);
        }
    }
}

/// Owns the dedicated thread an injector runs on.
pub struct InjectorRuntime {
    client: InjectorClient,
    _handle: JoinHandle<()>,
}

impl InjectorRuntime {
    /// Start an injector for one web view on its own owner thread.
    pub fn start(host: Arc<dyn WebViewHost>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let client = InjectorClient { sender };

        // Response sinks marshal late results back onto the owner loop.
        let router_client = client.clone();
        let router: ResponseRouter = Arc::new(move |token: &str, payload: JsonObject| {
            router_client.send(InjectorCommand::DeliverResponse {
                token: token.to_string(),
                payload,
            });
        });

        let handle = thread::spawn(move || {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                run_injector_loop(receiver, host, router);
            }));

            if let Err(e) = result {
                log::error!("Injector thread panicked: {:?}", e);
            }
        });

        Self {
            client,
            _handle: handle,
        }
    }

    /// Get a client handle for communicating with the injector.
    pub fn client(&self) -> InjectorClient {
        self.client.clone()
    }
}

/// Main loop for the injector's owner thread.
fn run_injector_loop(
    receiver: Receiver<InjectorCommand>,
    host: Arc<dyn WebViewHost>,
    router: ResponseRouter,
) {
    log::info!("Injector thread started");

    let mut injector = Injector::new(host, router);

    loop {
        match receiver.recv() {
            Ok(InjectorCommand::InjectPlugin(plugin)) => {
                log::debug!("Injecting plugin {}", plugin.identifier());
                injector.inject_plugin(plugin);
            }
            Ok(InjectorCommand::RemovePlugin(identifier)) => {
                injector.remove_plugin_for_identifier(&identifier);
            }
            Ok(InjectorCommand::RemoveAllPlugins) => {
                injector.remove_all_plugins();
            }
            Ok(InjectorCommand::InjectCss { css, identifier }) => {
                injector.inject_css_string(&css, &identifier);
            }
            Ok(InjectorCommand::RemoveCss(identifier)) => {
                injector.remove_css_string_for_identifier(&identifier);
            }
            Ok(InjectorCommand::HandleMessage(raw)) => match BridgeMessage::parse(&raw) {
                Ok(message) => {
                    injector.dispatch(message);
                }
                Err(e) => log::warn!("Ignoring malformed bridge message: {}", e),
            },
            Ok(InjectorCommand::DeliverResponse { token, payload }) => {
                injector.deliver_response(&token, payload);
            }
            Ok(InjectorCommand::Shutdown) => {
                log::info!("Injector shutting down");
                injector.clear_pending_callbacks();
                break;
            }
            Err(e) => {
                log::error!("Injector channel error: {}", e);
                break;
            }
        }
    }

    log::info!("Injector thread stopped");
}
