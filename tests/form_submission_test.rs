use sitekit::dom::{Document, NodeId};
use sitekit::widgets::form::{ContactForm, SubmissionState};
use sitekit::{NotificationKind, Page, PageInput, SiteConfig};

const CONTACT_URL: &str = "https://example.test/contact.html";

const CONTACT_PAGE: &str = r#"<!DOCTYPE html><html><body>
<form id="contactForm" class="c-form" action="/verzend">
  <div class="mb-3"><input type="text" id="firstName" name="firstName" required></div>
  <div class="mb-3"><input type="email" id="email" name="email" required></div>
  <div class="mb-3"><input type="tel" id="phone" name="phone"></div>
  <div class="mb-3"><textarea id="message" name="message" required></textarea></div>
  <div class="mb-3"><input type="checkbox" id="terms" name="terms" required></div>
  <button type="submit" id="send">Verstuur</button>
</form>
</body></html>"#;

fn load() -> Page {
    Page::from_html(CONTACT_PAGE, CONTACT_URL, SiteConfig::default()).expect("page assembles")
}

fn node(page: &Page, selector: &str) -> NodeId {
    page.query(selector)
        .expect("valid selector")
        .unwrap_or_else(|| panic!("no element for {selector}"))
}

fn type_into(page: &mut Page, selector: &str, value: &str) {
    let target = node(page, selector);
    page.dispatch(PageInput::Input {
        target,
        value: value.to_string(),
    });
}

fn fill_valid(page: &mut Page) {
    type_into(page, "#firstName", "Anouk");
    type_into(page, "#email", "anouk@voorbeeld.nl");
    type_into(page, "#phone", "+31 6 1234 5678");
    type_into(page, "#message", "Graag een offerte voor een nieuwe website.");
    let terms = node(page, "#terms");
    page.dispatch(PageInput::Click { target: terms });
}

fn click_send(page: &mut Page) {
    let send = node(page, "#send");
    page.dispatch(PageInput::Click { target: send });
}

fn feedback_count(page: &Page, field: &str) -> usize {
    let field = node(page, field);
    let parent = page.document().parent(field).expect("field has a parent");
    page.document()
        .query_selector_all(parent, ".invalid-feedback")
        .expect("valid selector")
        .len()
}

#[test]
fn test_valid_submission_notifies_once_then_navigates_once() {
    let mut page = load();
    fill_valid(&mut page);
    assert!(page.document().checked(node(&page, "#terms")));

    click_send(&mut page);
    let send = node(&page, "#send");
    assert!(page.document().is_disabled(send));
    assert!(page.document().text_content(send).contains("Verzenden..."));
    assert!(page.window().navigations().is_empty(), "submit default is prevented");

    page.advance(1_499);
    assert_eq!(page.notifications().count_of(NotificationKind::Success), 0);

    page.advance(1);
    assert_eq!(page.notifications().count_of(NotificationKind::Success), 1);
    assert_eq!(page.document().value(node(&page, "#email")), "");
    assert!(!page.document().checked(node(&page, "#terms")));
    assert!(!page.document().has_class(node(&page, "#email"), "is-valid"));
    assert!(!page.document().is_disabled(send));
    assert_eq!(page.document().text_content(send), "Verstuur");
    assert!(page.window().navigations().is_empty());

    page.advance(1_499);
    assert!(page.window().navigations().is_empty());
    page.advance(1);
    let navigations = page.window().navigations();
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0].as_str(), "https://example.test/thank_you.html");

    page.advance(20_000);
    assert_eq!(page.window().navigations().len(), 1);
    assert_eq!(page.notifications().count_of(NotificationKind::Success), 1);
    assert_eq!(page.notifications().count_of(NotificationKind::Danger), 0);
}

#[test]
fn test_resubmitting_while_in_flight_is_ignored() {
    let mut page = load();
    fill_valid(&mut page);
    click_send(&mut page);

    click_send(&mut page);
    let form = node(&page, "#contactForm");
    let outcome = page.dispatch(PageInput::Submit { form });
    assert!(outcome.default_prevented);

    page.advance(5_000);
    assert_eq!(page.notifications().count_of(NotificationKind::Success), 1);
    assert_eq!(page.window().navigations().len(), 1);
}

#[test]
fn test_invalid_submission_shows_one_danger_and_never_navigates() {
    let mut page = load();
    fill_valid(&mut page);
    type_into(&mut page, "#email", "anouk@");

    click_send(&mut page);
    assert_eq!(page.notifications().count_of(NotificationKind::Danger), 1);
    assert_eq!(
        page.notifications().history()[0].message,
        "Vul alle verplichte velden correct in."
    );
    let email = node(&page, "#email");
    assert!(page.document().has_class(email, "is-invalid"));
    assert!(!page.document().has_class(email, "is-valid"));
    assert!(page.document().has_class(node(&page, "#firstName"), "is-valid"));
    assert_eq!(feedback_count(&page, "#email"), 1);
    assert!(!page.document().is_disabled(node(&page, "#send")));

    page.advance(20_000);
    assert!(page.window().navigations().is_empty());
    assert_eq!(page.notifications().count_of(NotificationKind::Danger), 1);
    assert_eq!(page.notifications().count_of(NotificationKind::Success), 0);
}

#[test]
fn test_blur_renders_exactly_one_message() {
    let mut page = load();
    let email = node(&page, "#email");
    page.dispatch(PageInput::Blur { target: email });
    page.dispatch(PageInput::Blur { target: email });
    assert_eq!(feedback_count(&page, "#email"), 1);

    let parent = page.document().parent(email).expect("parent");
    let feedback = page
        .document()
        .query_selector(parent, ".invalid-feedback")
        .expect("valid selector")
        .expect("feedback");
    assert_eq!(page.document().text_content(feedback), "Dit veld is verplicht");

    type_into(&mut page, "#email", "anouk");
    page.dispatch(PageInput::Blur { target: email });
    let feedback = page
        .document()
        .query_selector(parent, ".invalid-feedback")
        .expect("valid selector")
        .expect("feedback");
    assert_eq!(
        page.document().text_content(feedback),
        "Voer een geldig e-mailadres in"
    );
    assert_eq!(feedback_count(&page, "#email"), 1);
}

#[test]
fn test_invalid_field_revalidates_after_typing_pauses() {
    let mut page = load();
    let email = node(&page, "#email");
    page.dispatch(PageInput::Blur { target: email });
    assert!(page.document().has_class(email, "is-invalid"));

    let mut typed = String::new();
    for ch in "anouk@voorbeeld.nl".chars() {
        typed.push(ch);
        type_into(&mut page, "#email", &typed);
        page.advance(100);
    }
    assert!(page.document().has_class(email, "is-invalid"));

    page.advance(199);
    assert!(page.document().has_class(email, "is-invalid"));
    page.advance(1);
    assert!(page.document().has_class(email, "is-valid"));
    assert_eq!(feedback_count(&page, "#email"), 0);
}

#[test]
fn test_untouched_fields_are_not_revalidated_while_typing() {
    let mut page = load();
    let first = node(&page, "#firstName");
    type_into(&mut page, "#firstName", "A");
    page.advance(1_000);
    assert!(!page.document().has_class(first, "is-invalid"));
    assert!(!page.document().has_class(first, "is-valid"));
}

#[test]
fn test_form_without_submit_control_has_no_success_path() {
    let html = r#"<html><body>
        <form id="contact-mini"><div><input type="email" id="mail" required></div></form>
    </body></html>"#;
    let mut page = Page::from_html(html, CONTACT_URL, SiteConfig::default()).expect("page");
    type_into(&mut page, "#mail", "anouk@voorbeeld.nl");

    let form = node(&page, "#contact-mini");
    let outcome = page.dispatch(PageInput::Submit { form });
    assert!(outcome.default_prevented);
    assert!(page.document().has_class(node(&page, "#mail"), "is-valid"));

    page.advance(10_000);
    assert!(page.notifications().history().is_empty());
    assert!(page.window().navigations().is_empty());
}

#[test]
fn test_unrelated_forms_submit_normally() {
    let html = r#"<html><body>
        <form id="newsletter" action="/aanmelden"><input name="q"><button type="submit" id="go">Ga</button></form>
    </body></html>"#;
    let mut page = Page::from_html(html, CONTACT_URL, SiteConfig::default()).expect("page");
    assert!(page.controller_names().is_empty());
    let go = node(&page, "#go");
    page.dispatch(PageInput::Click { target: go });
    assert_eq!(
        page.window().navigations().last().map(|u| u.path()),
        Some("/aanmelden")
    );
}

#[test]
fn test_form_state_machine_through_controller() {
    let doc = Document::from_html(CONTACT_PAGE).expect("document");
    let form = doc
        .query_selector(Document::ROOT, "form")
        .expect("valid selector")
        .expect("form");
    let controller = ContactForm::new(&doc, form, &SiteConfig::default().form).expect("controller");
    assert_eq!(controller.form(), form);
    assert_eq!(controller.state(), SubmissionState::Idle);
}

#[test]
fn test_custom_thank_you_path_and_delays() {
    let config = SiteConfig::from_yaml(
        "form:\n  submit_delay_ms: 10\n  redirect_delay_ms: 20\n  thank_you_path: /bedankt/\n",
    )
    .expect("config");
    let mut page = Page::from_html(CONTACT_PAGE, CONTACT_URL, config).expect("page");
    fill_valid(&mut page);
    click_send(&mut page);
    page.advance(29);
    assert!(page.window().navigations().is_empty());
    page.advance(1);
    assert_eq!(
        page.window().navigations().last().map(|u| u.path()),
        Some("/bedankt/")
    );
}
