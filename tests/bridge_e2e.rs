//! End-to-end tests: client -> owner thread -> dispatch -> response delivery,
//! with a fake web view standing in for the transport adapter.

use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use webview_bridge::{InjectorRuntime, JsonObject, WebViewHost};

/// Fake web view that records evaluated scripts and lets tests wait on them.
struct FakeWebView {
    scripts: Mutex<Vec<String>>,
    signal: Condvar,
}

impl FakeWebView {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(Vec::new()),
            signal: Condvar::new(),
        })
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    fn wait_for(&self, description: &str, pred: impl Fn(&[String]) -> bool) {
        let mut scripts = self.scripts.lock().unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !pred(&scripts) {
            let remaining = deadline
                .checked_duration_since(std::time::Instant::now())
                .unwrap_or_else(|| panic!("timed out waiting for {}", description));
            let (guard, _timeout) = self.signal.wait_timeout(scripts, remaining).unwrap();
            scripts = guard;
        }
    }
}

impl WebViewHost for FakeWebView {
    fn evaluate_javascript(&self, script: &str) {
        self.scripts.lock().unwrap().push(script.to_string());
        self.signal.notify_all();
    }
}

fn payload(key: &str, value: i64) -> JsonObject {
    let mut map = JsonObject::new();
    map.insert(key.to_string(), value.into());
    map
}

#[test]
fn fire_and_forget_call_reaches_the_handler() {
    let web_view = FakeWebView::new();
    let runtime = InjectorRuntime::start(web_view.clone());
    let injector = runtime.client();

    let (tx, rx) = mpsc::channel();
    injector.inject_function("ping", move |data| {
        tx.send(data).unwrap();
    });

    web_view.wait_for("the ping declaration", |scripts| {
        scripts.iter().any(|s| s.contains("window.bridge['ping']"))
    });

    injector.handle_script_message(r#"{"identifier":"ping","payload":{"x":1}}"#);
    let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(received, payload("x", 1));

    injector.shutdown();
}

#[test]
fn echo_response_is_delivered_to_the_js_callback() {
    let web_view = FakeWebView::new();
    let runtime = InjectorRuntime::start(web_view.clone());
    let injector = runtime.client();

    injector.inject_function_with_response("echo", |data, responder| {
        responder.respond(data);
    });

    injector.handle_script_message(r#"{"identifier":"echo","payload":{"x":1},"callbackId":"cb_1"}"#);

    web_view.wait_for("the echo response", |scripts| {
        scripts
            .iter()
            .any(|s| s.contains("__bridge_pending['cb_1']") && s.contains("cb({\"x\":1})"))
    });

    injector.shutdown();
}

#[test]
fn concurrent_responses_resolve_out_of_order_without_cross_delivery() {
    let web_view = FakeWebView::new();
    let runtime = InjectorRuntime::start(web_view.clone());
    let injector = runtime.client();

    let (tx, rx) = mpsc::channel();
    injector.inject_function_with_response("work", move |data, responder| {
        tx.send((data, responder)).unwrap();
    });

    injector.handle_script_message(r#"{"identifier":"work","payload":{"n":1},"callbackId":"cb_a"}"#);
    injector.handle_script_message(r#"{"identifier":"work","payload":{"n":2},"callbackId":"cb_b"}"#);

    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();

    // Respond from a worker thread, in reverse order.
    let worker = std::thread::spawn(move || {
        second.1.respond(second.0);
        first.1.respond(first.0);
    });
    worker.join().unwrap();

    web_view.wait_for("both responses", |scripts| {
        scripts.iter().any(|s| s.contains("__bridge_pending['cb_a']"))
            && scripts.iter().any(|s| s.contains("__bridge_pending['cb_b']"))
    });

    let scripts = web_view.scripts();
    let delivery_a = scripts
        .iter()
        .find(|s| s.contains("__bridge_pending['cb_a']"))
        .unwrap();
    let delivery_b = scripts
        .iter()
        .find(|s| s.contains("__bridge_pending['cb_b']"))
        .unwrap();
    assert!(delivery_a.contains("cb({\"n\":1})"));
    assert!(delivery_b.contains("cb({\"n\":2})"));

    injector.shutdown();
}

#[test]
fn bad_input_never_kills_the_owner_thread() {
    let web_view = FakeWebView::new();
    let runtime = InjectorRuntime::start(web_view.clone());
    let injector = runtime.client();

    // Malformed message, routing miss, and a panicking handler in sequence.
    injector.handle_script_message("not json at all");
    injector.handle_script_message(r#"{"identifier":"nobody-home","payload":{}}"#);
    injector.inject_function("boom", |_| panic!("handler failure"));
    injector.handle_script_message(r#"{"identifier":"boom","payload":{}}"#);

    // The loop is still alive and dispatching.
    let (tx, rx) = mpsc::channel();
    injector.inject_function("still-alive", move |data| {
        tx.send(data).unwrap();
    });
    injector.handle_script_message(r#"{"identifier":"still-alive","payload":{"ok":1}}"#);
    let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(received, payload("ok", 1));

    injector.shutdown();
}

#[test]
fn css_lifecycle_round_trips_through_the_page() {
    let web_view = FakeWebView::new();
    let runtime = InjectorRuntime::start(web_view.clone());
    let injector = runtime.client();

    injector.inject_css_string("body { margin: 0 }", "reset");
    injector.inject_css_string("body { margin: 8px }", "reset");
    injector.remove_css_string_for_identifier("reset");

    web_view.wait_for("the css removal", |scripts| {
        scripts.iter().any(|s| s.contains("removeChild"))
    });

    let scripts = web_view.scripts();
    // Replacement targets the same element id both times, then one removal.
    assert_eq!(
        scripts
            .iter()
            .filter(|s| s.contains("getElementById('reset')"))
            .count(),
        3
    );
    assert_eq!(scripts.iter().filter(|s| s.contains("margin: 8px")).count(), 1);

    injector.shutdown();
}
