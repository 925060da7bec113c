//! Plugin abstraction and the built-in block plugin.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::bridge::codegen;

/// JSON object payload exchanged between JS callers and native handlers.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Routes a response payload back to the injector that allocated the token.
///
/// [`InjectorRuntime`](crate::host::InjectorRuntime) installs a router that
/// marshals the delivery onto the injector's owner thread. Hosts driving an
/// [`Injector`](crate::bridge::Injector) on their own thread supply one that
/// queues `(token, payload)` for a later
/// [`deliver_response`](crate::bridge::Injector::deliver_response) call.
pub type ResponseRouter = Arc<dyn Fn(&str, JsonObject) + Send + Sync>;

/// Single-use handle a response-expecting handler uses to deliver its result to JS.
///
/// Cheap to clone and `Send`, so a handler may carry it into background work and
/// respond seconds later, or never. The first [`respond`](Self::respond) wins;
/// later invocations are ignored.
#[derive(Clone)]
pub struct ResponseCallback {
    token: String,
    router: ResponseRouter,
    used: Arc<AtomicBool>,
}

impl ResponseCallback {
    pub(crate) fn new(token: String, router: ResponseRouter) -> Self {
        Self {
            token,
            router,
            used: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A sink with no JS-side callback behind it. Handed to response-expecting
    /// handlers when the JS caller omitted the callback argument.
    pub(crate) fn detached() -> Self {
        Self::new(
            String::new(),
            Arc::new(|_token: &str, _payload: JsonObject| {
                log::debug!("No JS callback registered for this call; dropping response");
            }),
        )
    }

    /// Correlation token this sink delivers to.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Deliver `payload` to the JS callback registered for this specific call.
    ///
    /// At most one delivery happens per sink; subsequent invocations are no-ops.
    pub fn respond(&self, payload: JsonObject) {
        if self.used.swap(true, Ordering::SeqCst) {
            log::debug!("Ignoring duplicate respond for callback {}", self.token);
            return;
        }
        (self.router)(&self.token, payload);
    }
}

/// A named unit bridging one JS-callable function to one native handler.
///
/// The identifier doubles as the bridge function name: registering a plugin
/// makes `window.bridge.<identifier>` callable in the page, and removal deletes
/// that entry again. Any type with a stable identifier, a JS declaration, and an
/// invoke path qualifies; [`BlockPlugin`] is the built-in closure-backed variant.
pub trait WebViewPlugin: Send + 'static {
    /// Stable identifier, unique among plugins registered with one injector.
    fn identifier(&self) -> &str;

    /// JS source that, evaluated once in the page, defines `window.bridge.<identifier>`.
    fn javascript_code(&self) -> String;

    /// Handle a call routed from JS. `responder` is present only when the JS
    /// side registered a callback for this call.
    fn invoke(&self, payload: JsonObject, responder: Option<ResponseCallback>);
}

enum BlockHandler {
    FireAndForget(Box<dyn Fn(JsonObject) + Send>),
    WithResponse(Box<dyn Fn(JsonObject, ResponseCallback) + Send>),
}

/// Built-in plugin backed by a closure.
pub struct BlockPlugin {
    function_name: String,
    handler: BlockHandler,
}

impl BlockPlugin {
    /// Fire-and-forget variant: `window.bridge.<name>(data)`.
    pub fn new(
        function_name: impl Into<String>,
        handler: impl Fn(JsonObject) + Send + 'static,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            handler: BlockHandler::FireAndForget(Box::new(handler)),
        }
    }

    /// Response-expecting variant: `window.bridge.<name>(data, callback)`.
    pub fn with_response(
        function_name: impl Into<String>,
        handler: impl Fn(JsonObject, ResponseCallback) + Send + 'static,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            handler: BlockHandler::WithResponse(Box::new(handler)),
        }
    }
}

impl WebViewPlugin for BlockPlugin {
    fn identifier(&self) -> &str {
        &self.function_name
    }

    fn javascript_code(&self) -> String {
        let expects_response = matches!(self.handler, BlockHandler::WithResponse(_));
        codegen::function_declaration(&self.function_name, expects_response)
    }

    fn invoke(&self, payload: JsonObject, responder: Option<ResponseCallback>) {
        match &self.handler {
            BlockHandler::FireAndForget(handler) => handler(payload),
            BlockHandler::WithResponse(handler) => {
                let responder = responder.unwrap_or_else(ResponseCallback::detached);
                handler(payload, responder);
            }
        }
    }
}
