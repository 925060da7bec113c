//! Process-wide injector lookup, keyed by web view identity.
//!
//! One injector per web view, created on first use for a given label and torn
//! down with the web view. The map is the only process-wide state the crate
//! carries; each entry keeps its runtime thread alive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::host::runtime::{InjectorClient, InjectorRuntime};
use crate::host::transport::WebViewHost;

static INJECTORS: Lazy<Mutex<HashMap<String, InjectorRuntime>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Look up the injector bound to `label`, starting one on first use.
///
/// `label` identifies one web view instance; hosts typically use the window or
/// web view label their framework assigns. `host` is consulted only when the
/// injector does not exist yet.
pub fn injector_for_web_view(label: &str, host: Arc<dyn WebViewHost>) -> InjectorClient {
    let mut injectors = INJECTORS.lock().unwrap();
    injectors
        .entry(label.to_string())
        .or_insert_with(|| {
            log::info!("Starting injector for web view {:?}", label);
            InjectorRuntime::start(host)
        })
        .client()
}

/// Tear down the injector bound to `label`.
///
/// Its registries and pending callbacks are dropped without being invoked.
/// No-op for unknown labels.
pub fn remove_web_view(label: &str) {
    let runtime = INJECTORS.lock().unwrap().remove(label);
    if let Some(runtime) = runtime {
        log::info!("Tearing down injector for web view {:?}", label);
        runtime.client().shutdown();
    }
}
