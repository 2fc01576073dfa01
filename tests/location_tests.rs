mod common;

use std::cell::RefCell;
use std::rc::Rc;

use brrtnav::host::Host;
use brrtnav::{NavigationMode, Query, QueryValue, RouteOptions, RouterConfig};
use common::browser::{open, open_with, Recorder};

#[test]
fn test_query_refinement_keeps_route_and_history() {
    let (host, router) = open("https://app.test/list?page=2&sort=asc");
    let rec = Recorder::default();
    let list = router
        .route(RouteOptions::new("/list"), rec.outlet("list"))
        .unwrap();
    assert_eq!(
        list.meta().unwrap().query.get("page"),
        Some(&QueryValue::One("2".to_string()))
    );

    let store = router.location();
    assert!(store.query_set("page", "3"));
    assert!(store.query_set("tags", vec!["a", "b"]));
    assert_eq!(router.current_location().url, "/list?page=3&sort=asc&tags=a,b");
    assert_eq!(
        list.meta().unwrap().query.get("page"),
        Some(&QueryValue::One("3".to_string()))
    );

    assert!(store.query_delete("sort"));
    assert!(store.hash_set("#results"));
    assert_eq!(host.address(), "https://app.test/list?page=3&tags=a,b#results");

    // one show, no hides, a single history entry
    assert_eq!(rec.entries(), vec!["show:list"]);
    assert_eq!(host.history_len(), 1);
}

#[test]
fn test_query_replace_and_clear() {
    let (_host, router) = open("https://app.test/search?q=rust&debug");
    let store = router.location();
    assert_eq!(store.query_get("debug"), Some(QueryValue::Flag(true)));

    let mut query = Query::new();
    query.insert("q", "wasm");
    assert!(store.query_replace(query));
    assert_eq!(router.current_location().url, "/search?q=wasm");

    assert!(store.query_clear());
    assert_eq!(router.current_location().url, "/search");
    assert!(store.query_get("q").is_none());
}

#[test]
fn test_subscribers_see_query_changes() {
    let (_host, router) = open("https://app.test/list");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = router.subscribe(move |loc| sink.borrow_mut().push(loc.url.clone()));

    router.location().query_set("page", "2");
    router.location().hash_set("top");
    router.location().hash_clear();

    assert_eq!(
        *seen.borrow(),
        vec!["/list", "/list?page=2", "/list?page=2#top", "/list?page=2"]
    );
    // replace navigations keep the previous `from`
    assert_eq!(router.current_location().from, None);
}

#[test]
fn test_base_prefix_routes_match_without_it() {
    let config = RouterConfig {
        base: "/portal/".to_string(),
        ..RouterConfig::default()
    };
    let (host, router) = open_with("https://app.test/portal/reports/9", config);
    let rec = Recorder::default();
    let report = router
        .route(RouteOptions::new("/reports/:id"), rec.outlet("report"))
        .unwrap();
    assert!(report.is_shown());
    assert_eq!(report.meta().unwrap().params.get("id"), Some("9"));

    router.goto("/reports/10?fmt=pdf", false);
    assert_eq!(host.address(), "https://app.test/portal/reports/10?fmt=pdf");
    assert_eq!(report.meta().unwrap().params.get("id"), Some("10"));
    assert_eq!(host.history_len(), 2);
}

#[test]
fn test_hash_mode_query_lives_in_fragment() {
    let config = RouterConfig {
        mode: Some(NavigationMode::Hash),
        ..RouterConfig::default()
    };
    let (host, router) = open_with("https://app.test/#/list", config);
    let rec = Recorder::default();
    let list = router
        .route(RouteOptions::new("/list"), rec.outlet("list"))
        .unwrap();
    assert!(list.is_shown());

    router.location().query_set("page", "4");
    assert_eq!(host.hash(), "#/list?page=4");
    assert_eq!(host.search(), "");
    assert!(list.is_shown());
    assert_eq!(rec.entries(), vec!["show:list"]);
}

#[test]
fn test_memory_mode_keeps_host_address() {
    let config = RouterConfig {
        mode: Some(NavigationMode::Memory),
        ..RouterConfig::default()
    };
    let (host, router) = open_with("https://app.test/outer", config);
    let rec = Recorder::default();
    let home = router.route(RouteOptions::new("/"), rec.outlet("home")).unwrap();
    assert!(home.is_shown());

    router.goto("/inner?x=1", false);
    assert_eq!(router.current_location().path, "/inner");
    assert!(!home.is_shown());
    assert_eq!(host.address(), "https://app.test/outer");
    assert_eq!(host.history_len(), 1);
}
