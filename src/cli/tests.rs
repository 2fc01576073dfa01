//! Unit tests for CLI commands

use std::io::Write as _;

use crate::cli::{execute, Cli, Commands, ModeArg};
use clap::Parser;

fn output(command: &Commands) -> String {
    let mut buf = Vec::new();
    execute(command, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_match_command_parses() {
    let cli = Cli::try_parse_from([
        "brrtnav",
        "match",
        "--pattern",
        "/users/:id",
        "--path",
        "/users/42",
    ])
    .unwrap();

    match cli.command {
        Commands::Match { pattern, path } => {
            assert_eq!(pattern, "/users/:id");
            assert_eq!(path, "/users/42");
        }
        _ => panic!("Expected Match command"),
    }
}

#[test]
fn test_simulate_command_with_repeated_go() {
    let cli = Cli::try_parse_from([
        "brrtnav",
        "simulate",
        "--routes",
        "routes.yaml",
        "--mode",
        "hash",
        "--go",
        "/a",
        "--go",
        "/b",
    ])
    .unwrap();

    match cli.command {
        Commands::Simulate {
            routes,
            mode,
            go,
            address,
        } => {
            assert_eq!(routes.to_string_lossy(), "routes.yaml");
            assert_eq!(mode, Some(ModeArg::Hash));
            assert_eq!(go, vec!["/a", "/b"]);
            assert_eq!(address, "https://app.test/");
        }
        _ => panic!("Expected Simulate command"),
    }
}

#[test]
fn test_unknown_mode_rejected() {
    let result = Cli::try_parse_from([
        "brrtnav", "simulate", "--routes", "r.yaml", "--mode", "sideways",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_match_output() {
    let out = output(&Commands::Match {
        pattern: "/users/:id".to_string(),
        path: "/users/42".to_string(),
    });
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["exact"], true);
    assert_eq!(value["params"]["id"], "42");
    assert_eq!(value["matchedPrefix"], "/users/42");

    let out = output(&Commands::Match {
        pattern: "/users/:id".to_string(),
        path: "/teams/1".to_string(),
    });
    assert_eq!(out.trim(), "no match");
}

#[test]
fn test_query_output() {
    let out = output(&Commands::Query {
        parse: "?tag=a,b&debug".to_string(),
    });
    let mut lines = out.lines().rev();
    assert_eq!(lines.next(), Some("tag=a,b&debug"));
    assert!(out.contains("\"debug\": true"));
}

#[test]
fn test_simulate_output() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        "routes:\n  - name: users\n    path: /users/*\n    children:\n      - name: user\n        path: /:id\n  - name: missing\n    fallback: true\n"
    )
    .unwrap();

    let out = output(&Commands::Simulate {
        routes: file.path().to_path_buf(),
        mode: Some(ModeArg::Memory),
        go: vec!["/users/7".to_string(), "/nowhere".to_string()],
        address: "https://app.test/".to_string(),
    });

    let expected_steps = ["step 0: /", "step 1: /users/7", "step 2: /nowhere"];
    for step in expected_steps {
        assert!(out.contains(step), "missing {step} in {out}");
    }
    assert!(out.contains("\n    user\n"));
    assert!(out.contains("\"pattern\":\"/users/:id\""));
    let last_step = out.split("step 2: /nowhere").nth(1).unwrap();
    assert!(last_step.starts_with("\n  missing\n"));
    assert!(!last_step.contains("\n    user\n"));
}

#[test]
fn test_simulate_missing_file() {
    let mut buf = Vec::new();
    let err = execute(
        &Commands::Simulate {
            routes: "/definitely/not/here.yaml".into(),
            mode: None,
            go: Vec::new(),
            address: "https://app.test/".to_string(),
        },
        &mut buf,
    )
    .unwrap_err();
    assert!(err.to_string().contains("failed to read route table"));
}
