mod common;

use std::path::Path;

use brrtnav::table::RouteTable;
use brrtnav::{NavigationMode, RouterConfig};
use common::browser::open_with;
use common::temp_files::{create_temp_json, create_temp_toml, create_temp_yaml};

#[test]
fn test_load_toml_config() {
    let file = create_temp_toml(
        r#"
mode = "hash"
base = "/app/"
intercept_clicks = false
max_redirects = 4
"#,
    );
    let config = RouterConfig::load(file.path()).unwrap();
    assert_eq!(config.mode, Some(NavigationMode::Hash));
    assert_eq!(config.base, "/app/");
    assert!(!config.intercept_clicks);
    assert_eq!(config.max_redirects, 4);

    // the router normalises the base
    let (_host, router) = open_with("https://app.test/app/", config);
    assert_eq!(router.location().base(), "/app");
    assert_eq!(router.mode(), NavigationMode::Hash);
}

#[test]
fn test_load_config_errors_carry_the_path() {
    let file = create_temp_toml("max_redirects = \"many\"\n");
    let err = RouterConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse router config"));

    let err = RouterConfig::load(Path::new("/no/such/brrtnav.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read router config"));
}

#[test]
fn test_config_from_env() {
    std::env::set_var("BRRTNAV_MODE", "memory");
    std::env::set_var("BRRTNAV_MAX_REDIRECTS", "not-a-number");
    let config = RouterConfig::from_env();
    std::env::remove_var("BRRTNAV_MODE");
    std::env::remove_var("BRRTNAV_MAX_REDIRECTS");

    assert_eq!(config.mode, Some(NavigationMode::Memory));
    assert_eq!(config.max_redirects, brrtnav::config::DEFAULT_MAX_REDIRECTS);
    assert!(config.intercept_clicks);
}

#[test]
fn test_load_yaml_table() {
    let file = create_temp_yaml(
        r"
routes:
  - name: docs
    path: /docs/*
    breadcrumb: Docs
    children:
      - path: /:page
",
    );
    let table = RouteTable::load(file.path()).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.config.is_none());

    let (_host, router) = open_with("https://app.test/docs/intro", RouterConfig::default());
    let mounted = table.mount(&router).unwrap();
    assert!(mounted.iter().all(|m| m.node.is_shown()));
    assert_eq!(mounted[1].name, "/docs/:page");
}

#[test]
fn test_load_json_table() {
    let file = create_temp_json(
        r#"{
  "config": { "mode": "memory" },
  "routes": [
    { "path": "/a", "redirect": "/b" },
    { "path": "/b" }
  ]
}"#,
    );
    let table = RouteTable::load(file.path()).unwrap();
    assert_eq!(table.routes[0].options.redirect.as_deref(), Some("/b"));
    assert_eq!(
        table.config.as_ref().and_then(|c| c.mode),
        Some(NavigationMode::Memory)
    );
}

#[test]
fn test_load_table_rejects_garbage() {
    let file = create_temp_yaml("routes:\n  - path: [1, 2]\n");
    let err = RouteTable::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse route table"));
}
