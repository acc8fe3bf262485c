use std::io::Write;

use sitekit::replay::{self, ReplayError, ReplayReport, ReplayScript, ReplayStep};
use sitekit::{NotificationKind, Page, SiteConfig};
use tempfile::Builder;

const CONTACT_PAGE: &str = r#"<!DOCTYPE html><html><body>
<header class="l-header" data-layout-height="70">
  <button class="navbar-toggler">Menu</button>
  <nav class="navbar-collapse"><a class="nav-link" href="/contact.html">Contact</a></nav>
</header>
<form id="contactForm" class="c-form">
  <div><input type="text" name="name" id="name" required></div>
  <div><input type="email" name="email" id="email" required></div>
  <div><textarea name="message" id="message" required></textarea></div>
  <button type="submit">Verstuur</button>
</form>
</body></html>"#;

const SCRIPT_YAML: &str = r##"
url: https://example.test/contact.html
steps:
  - action: click
    selector: .navbar-toggler
  - action: key_down
    key: Escape
  - action: type_text
    selector: "#name"
    text: Sanne de Vries
  - action: type_text
    selector: "#email"
    text: sanne@voorbeeld.nl
  - action: type_text
    selector: "#message"
    text: Wij zoeken een nieuwe huisstijl.
  - action: click
    selector: button[type="submit"]
  - action: pump
    duration_ms: 3500
"##;

fn page_for(script: &ReplayScript) -> Page {
    let url = script.url.as_deref().expect("script url");
    Page::from_html(CONTACT_PAGE, url, SiteConfig::default()).expect("page assembles")
}

#[test]
fn test_yaml_script_replays_to_thank_you_page() {
    let mut file = Builder::new().suffix(".yaml").tempfile().expect("tempfile");
    file.write_all(SCRIPT_YAML.as_bytes()).expect("write script");

    let script = ReplayScript::load(file.path()).expect("load script");
    let mut page = page_for(&script);
    replay::run(&mut page, &script).expect("replay");

    let report = ReplayReport::capture(&page, false);
    assert_eq!(report.navigations, vec!["https://example.test/thank_you.html"]);
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].kind, NotificationKind::Success);
    assert!(!report.scroll_locked);
    assert_eq!(report.elapsed_ms, 3_500);
    assert!(report.controllers.contains(&"form"));
    assert!(report.html.is_none());
}

#[test]
fn test_json_script_and_html_report() {
    let mut file = Builder::new().suffix(".json").tempfile().expect("tempfile");
    let script = ReplayScript {
        url: Some("https://example.test/".into()),
        steps: vec![
            ReplayStep::Click {
                selector: ".navbar-toggler".into(),
            },
            ReplayStep::Pump { duration_ms: 10 },
        ],
    };
    serde_json::to_writer(&mut file, &script).expect("write json");
    file.flush().expect("flush");

    let loaded = ReplayScript::load(file.path()).expect("load json");
    assert_eq!(loaded, script);

    let mut page = page_for(&loaded);
    replay::run(&mut page, &loaded).expect("replay");
    let report = ReplayReport::capture(&page, true);
    assert!(report.scroll_locked);
    let html = report.html.expect("html requested");
    assert!(html.contains("u-no-scroll"));

    let json = serde_json::to_value(&ReplayReport::capture(&page, false)).expect("report json");
    assert!(json.get("html").is_none());
    assert_eq!(json["scroll_locked"], serde_json::Value::Bool(true));
}

#[test]
fn test_missing_element_stops_replay() {
    let script = ReplayScript {
        url: Some("https://example.test/".into()),
        steps: vec![ReplayStep::Blur {
            selector: "#nope".into(),
        }],
    };
    let mut page = page_for(&script);
    let err = replay::run(&mut page, &script).expect_err("no match");
    assert!(matches!(err, ReplayError::NoMatch(ref selector) if selector == "#nope"));
}

#[test]
fn test_set_layout_feeds_geometry() {
    let html = r#"<html><body><span id="n" data-count="5" data-layout-top="5000">0</span></body></html>"#;
    let mut page = Page::from_html(html, "https://example.test/", SiteConfig::default()).expect("page");
    let script = ReplayScript::from_yaml(
        r##"
steps:
  - action: set_layout
    selector: "#n"
    top: 100
    height: 20
  - action: resize
    width: 1280
    height: 800
  - action: pump
    duration_ms: 2500
"##,
    )
    .expect("script");
    replay::run(&mut page, &script).expect("replay");
    let n = page.query("#n").expect("selector").expect("node");
    assert_eq!(page.document().text_content(n), "5");
}
