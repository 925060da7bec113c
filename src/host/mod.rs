//! Host-side runtime: transport boundary, owner thread, and per-web-view lookup.

mod registry;
mod runtime;
mod transport;

pub use registry::{injector_for_web_view, remove_web_view};
pub use runtime::{InjectorClient, InjectorCommand, InjectorRuntime};
pub use transport::WebViewHost;
