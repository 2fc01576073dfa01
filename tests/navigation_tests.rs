mod common;

use brrtnav::host::Host;
use brrtnav::intercept::LinkClick;
use brrtnav::{NavigationMode, RouteNode, RouteOptions, Router, RouterConfig};
use common::browser::{open, open_with, Recorder};

struct App {
    inbox: RouteNode,
    compose: RouteNode,
    thread: RouteNode,
    index: RouteNode,
    settings: RouteNode,
    profile: RouteNode,
    not_found: RouteNode,
}

fn mount_app(router: &Router, rec: &Recorder) -> App {
    let _home = router
        .route(RouteOptions::new("/").redirect("/inbox"), rec.outlet("home"))
        .unwrap();

    let inbox = router
        .route(
            RouteOptions::new("/inbox/*").firstmatch().breadcrumb("Inbox"),
            rec.outlet("inbox"),
        )
        .unwrap();
    let compose = inbox
        .register(RouteOptions::new("/compose"), rec.outlet("compose"))
        .unwrap();
    let thread = inbox
        .register(
            RouteOptions::new("/:thread").breadcrumb("Thread"),
            rec.outlet("thread"),
        )
        .unwrap();
    let index = inbox
        .register(RouteOptions::new("/"), rec.outlet("index"))
        .unwrap();

    let settings = router
        .route(RouteOptions::new("/settings/*"), rec.outlet("settings"))
        .unwrap();
    let profile = settings
        .register(RouteOptions::new("/profile"), rec.outlet("profile"))
        .unwrap();
    let _settings_fallback = settings
        .register(
            RouteOptions::fallback().redirect("profile"),
            rec.outlet("settings-fallback"),
        )
        .unwrap();

    let not_found = router
        .route(RouteOptions::fallback(), rec.outlet("not-found"))
        .unwrap();

    App {
        inbox,
        compose,
        thread,
        index,
        settings,
        profile,
        not_found,
    }
}

#[test]
fn test_entry_redirect_lands_on_inbox_index() {
    let (host, router) = open("https://app.test/");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);
    router.settle();

    assert_eq!(router.current_location().path, "/inbox");
    assert_eq!(host.history_len(), 1);
    assert!(app.inbox.is_shown());
    assert!(app.index.is_shown());
    assert!(!app.not_found.is_shown());
    assert_eq!(rec.entries(), vec!["show:inbox", "show:index"]);
}

#[test]
fn test_first_match_inside_layout() {
    let (_host, router) = open("https://app.test/inbox");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);
    rec.take();

    router.goto("/inbox/compose", false);
    assert!(app.compose.is_shown());
    assert!(!app.thread.is_shown());
    assert!(!app.index.is_shown());
    assert_eq!(rec.take(), vec!["show:compose", "hide:index"]);

    router.goto("/inbox/42", false);
    assert!(app.thread.is_shown());
    assert_eq!(rec.take(), vec!["hide:compose", "show:thread"]);

    let meta = app.thread.meta().unwrap();
    assert_eq!(meta.params.get("thread"), Some("42"));
    let trail: Vec<(String, String)> = meta
        .breadcrumbs
        .iter()
        .map(|b| (b.name.clone(), b.path.clone()))
        .collect();
    assert_eq!(
        trail,
        vec![
            ("Inbox".to_string(), "/inbox".to_string()),
            ("Thread".to_string(), "/inbox/42".to_string()),
        ]
    );
    assert_eq!(router.breadcrumbs().get(), meta.breadcrumbs);
}

#[test]
fn test_back_and_forward() {
    let (host, router) = open("https://app.test/inbox");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);

    router.goto("/inbox/compose", false);
    router.goto("/inbox/42", false);
    assert_eq!(host.history_len(), 3);

    assert!(host.back());
    assert!(app.compose.is_shown());
    assert!(!app.thread.is_shown());
    assert_eq!(router.current_location().from.as_deref(), Some("/inbox/42"));

    assert!(host.forward());
    assert!(app.thread.is_shown());

    // navigating to where back already went is not suppressed
    assert!(host.back());
    assert!(router.goto("/inbox/42", false));
    assert!(app.thread.is_shown());
}

#[test]
fn test_relative_fallback_redirect() {
    let (host, router) = open("https://app.test/inbox");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);

    router.goto("/settings/unknown", false);
    assert!(app.settings.is_shown());
    assert!(!app.profile.is_shown());

    router.settle();
    assert_eq!(router.current_location().path, "/settings/profile");
    assert!(app.profile.is_shown());
    assert!(!app.not_found.is_shown());
    assert_eq!(rec.count("show:settings-fallback"), 0);
    // the fallback redirect replaced the unknown entry
    assert_eq!(host.history_len(), 2);
}

#[test]
fn test_top_level_not_found() {
    let (_host, router) = open("https://app.test/inbox");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);

    router.goto("/nothing/here", false);
    assert!(!app.not_found.is_shown());
    router.settle();
    assert!(app.not_found.is_shown());
    assert!(!app.inbox.is_shown());
    assert!(!app.settings.is_shown());
    assert_eq!(
        router.current_meta().get().map(|m| m.url.clone()).as_deref(),
        Some("/nothing/here")
    );

    router.goto("/inbox", false);
    assert!(!app.not_found.is_shown());
    assert!(app.index.is_shown());
}

#[test]
fn test_unmounting_section_falls_back() {
    let (_host, router) = open("https://app.test/settings/profile");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);
    router.settle();
    assert!(app.profile.is_shown());

    app.settings.unregister();
    assert!(app.profile.is_detached());
    assert!(!app.profile.is_shown());
    assert_eq!(rec.count("hide:profile"), 1);

    router.settle();
    assert!(app.not_found.is_shown());
}

#[test]
fn test_link_clicks_drive_the_tree() {
    let (host, router) = open("https://app.test/inbox");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);

    assert!(host.click(&LinkClick::on(host.anchor("/inbox/42"))));
    assert!(app.thread.is_shown());

    assert!(host.click(&LinkClick::on(host.anchor("/#/inbox/compose"))));
    assert!(app.compose.is_shown());
    assert_eq!(host.history_len(), 3);
}

#[test]
fn test_hash_mode_app() {
    let config = RouterConfig {
        mode: Some(NavigationMode::Hash),
        ..RouterConfig::default()
    };
    let (host, router) = open_with("https://app.test/index.html#/inbox/7", config);
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);

    assert!(app.thread.is_shown());
    assert_eq!(app.thread.meta().unwrap().params.get("thread"), Some("7"));

    host.set_hash("/inbox/compose");
    assert!(app.compose.is_shown());
    assert!(!app.thread.is_shown());

    router.goto("/settings/profile", false);
    assert!(app.profile.is_shown());
    assert_eq!(host.hash(), "#/settings/profile");
    assert_eq!(host.pathname(), "/index.html");
}

#[test]
fn test_srcdoc_document_uses_memory() {
    let (host, router) = open("about:srcdoc");
    let rec = Recorder::default();
    let app = mount_app(&router, &rec);

    assert_eq!(router.mode(), NavigationMode::Memory);
    assert!(app.index.is_shown());
    router.goto("/inbox/9", false);
    assert!(app.thread.is_shown());
    assert_eq!(host.history_len(), 1);
}
