//! Per-field validation rules for contact forms.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::FormMessages;
use crate::dom::{Document, NodeId};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+\-0-9\s()]{10,20}$").expect("Invalid phone regex"));

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s\-']{2,50}$").expect("Invalid name regex"));

const NAME_FIELDS: &[&str] = &["name", "firstName", "lastName"];

/// Minimum message length in UTF-16 code units.
const MIN_MESSAGE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    Required,
    Email,
    Phone,
    Name,
    MessageLength,
    Terms,
}

impl FieldRule {
    pub fn message<'a>(&self, messages: &'a FormMessages) -> &'a str {
        match self {
            FieldRule::Required => &messages.required,
            FieldRule::Email => &messages.email,
            FieldRule::Phone => &messages.phone,
            FieldRule::Name => &messages.name,
            FieldRule::MessageLength => &messages.message_too_short,
            FieldRule::Terms => &messages.terms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub rule: FieldRule,
    pub message: String,
}

/// Controls that take part in validation. Buttons and hidden inputs carry
/// no user input.
pub fn is_validated_control(doc: &Document, node: NodeId) -> bool {
    match doc.tag_name(node) {
        Some("textarea" | "select") => true,
        Some("input") => !matches!(
            doc.input_type(node).as_str(),
            "submit" | "button" | "reset" | "image" | "hidden"
        ),
        _ => false,
    }
}

/// The first rule `field` breaks, if any.
pub fn failed_rule(doc: &Document, field: NodeId) -> Option<FieldRule> {
    let value = doc.value(field);
    let value = value.trim();
    let input_type = doc.input_type(field);
    let required = doc.has_attribute(field, "required");

    if required && value.is_empty() {
        return Some(FieldRule::Required);
    }
    if value.is_empty() {
        return (input_type == "checkbox" && required && !doc.checked(field))
            .then_some(FieldRule::Terms);
    }
    if input_type == "email" && !EMAIL_REGEX.is_match(value) {
        return Some(FieldRule::Email);
    }
    if input_type == "tel" && !PHONE_REGEX.is_match(value) {
        return Some(FieldRule::Phone);
    }
    let field_name = doc.attribute(field, "name").or_else(|| doc.id(field));
    if field_name.is_some_and(|name| NAME_FIELDS.contains(&name.as_str())) && !NAME_REGEX.is_match(value) {
        return Some(FieldRule::Name);
    }
    if doc.tag_name(field) == Some("textarea") && value.encode_utf16().count() < MIN_MESSAGE_LEN {
        return Some(FieldRule::MessageLength);
    }
    if input_type == "checkbox" && required && !doc.checked(field) {
        return Some(FieldRule::Terms);
    }
    None
}

pub fn validate_field(
    doc: &Document,
    field: NodeId,
    messages: &FormMessages,
) -> Result<(), ValidationFailure> {
    match failed_rule(doc, field) {
        Some(rule) => Err(ValidationFailure {
            rule,
            message: rule.message(messages).to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(doc: &mut Document, tag: &str, attrs: &[(&str, &str)], value: &str) -> NodeId {
        let node = doc.create_element(tag);
        for (name, attr_value) in attrs {
            doc.set_attribute(node, name, attr_value);
        }
        doc.append_child(doc.body(), node);
        doc.set_value(node, value);
        node
    }

    #[test]
    fn required_empty_fails_first() {
        let mut doc = Document::new();
        let email = field(&mut doc, "input", &[("type", "email"), ("required", "")], "   ");
        assert_eq!(failed_rule(&doc, email), Some(FieldRule::Required));
        let err = validate_field(&doc, email, &FormMessages::default()).unwrap_err();
        assert_eq!(err.message, "Dit veld is verplicht");
    }

    #[test]
    fn checks_email_and_phone_shapes() {
        let mut doc = Document::new();
        let good = field(&mut doc, "input", &[("type", "email")], "jan@voorbeeld.nl");
        let bad = field(&mut doc, "input", &[("type", "email")], "jan@voorbeeld");
        let phone = field(&mut doc, "input", &[("type", "tel")], "+31 (0)20 123 4567");
        let short_phone = field(&mut doc, "input", &[("type", "tel")], "12345");
        assert_eq!(failed_rule(&doc, good), None);
        assert_eq!(failed_rule(&doc, bad), Some(FieldRule::Email));
        assert_eq!(failed_rule(&doc, phone), None);
        assert_eq!(failed_rule(&doc, short_phone), Some(FieldRule::Phone));
    }

    #[test]
    fn name_fields_accept_accented_letters_only() {
        let mut doc = Document::new();
        let ok = field(&mut doc, "input", &[("name", "firstName")], "Zoë O'Brien-Émile");
        let digits = field(&mut doc, "input", &[("name", "lastName")], "Jansen2");
        let by_id = field(&mut doc, "input", &[("id", "name")], "J");
        let other = field(&mut doc, "input", &[("name", "company")], "Acme 2");
        assert_eq!(failed_rule(&doc, ok), None);
        assert_eq!(failed_rule(&doc, digits), Some(FieldRule::Name));
        assert_eq!(failed_rule(&doc, by_id), Some(FieldRule::Name));
        assert_eq!(failed_rule(&doc, other), None);
    }

    #[test]
    fn short_messages_and_unchecked_terms_fail() {
        let mut doc = Document::new();
        let short = field(&mut doc, "textarea", &[], "Hallo");
        let long = field(&mut doc, "textarea", &[], "Graag een offerte");
        let terms = field(
            &mut doc,
            "input",
            &[("type", "checkbox"), ("required", ""), ("name", "terms")],
            "on",
        );
        assert_eq!(failed_rule(&doc, short), Some(FieldRule::MessageLength));
        assert_eq!(failed_rule(&doc, long), None);
        assert_eq!(failed_rule(&doc, terms), Some(FieldRule::Terms));
        doc.set_checked(terms, true);
        assert_eq!(failed_rule(&doc, terms), None);
    }

    #[test]
    fn buttons_are_not_validated() {
        let mut doc = Document::new();
        let submit = field(&mut doc, "input", &[("type", "submit")], "");
        let button = field(&mut doc, "button", &[], "");
        let text = field(&mut doc, "input", &[], "");
        assert!(!is_validated_control(&doc, submit));
        assert!(!is_validated_control(&doc, button));
        assert!(is_validated_control(&doc, text));
    }
}
