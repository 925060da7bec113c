//! Core bridge: plugin abstraction, JS codegen, and the injector state machine.

mod codegen;
mod injector;
mod message;
mod plugin;

pub use injector::{DispatchOutcome, Injector};
pub use message::BridgeMessage;
pub use plugin::{BlockPlugin, JsonObject, ResponseCallback, ResponseRouter, WebViewPlugin};
