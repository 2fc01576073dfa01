//! Browser host checks; run with `wasm-pack test --headless --firefox -- --features web`

#![cfg(all(feature = "web", target_arch = "wasm32"))]

use std::cell::Cell;
use std::rc::Rc;

use brrtnav::host::{Host, WebHost};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_settle_point_is_deferred() {
    let host = WebHost::new().unwrap();
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    host.request_settle(Rc::new(move || flag.set(true)));
    // queued as a microtask, never run inline
    assert!(!ran.get());
}

#[wasm_bindgen_test]
fn test_reads_window_address() {
    let host = WebHost::new().unwrap();
    assert!(host.pathname().starts_with('/'));
    assert!(!host.is_srcdoc());
}
