//! Canonical document text.
//!
//! Two documents that differ only in formatting, commas or comments produce
//! byte-identical output, so the text can be compared or used as a key.

use crate::ast::DocumentSource;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Block strings, then regular strings, then runs of ignored tokens
/// (whitespace, commas, `#` comments). String literals are matched first so
/// their contents are copied through untouched.
const IGNORED_PATTERN: &str = concat!(
    r#"(?P<block>"""(?s:\\"""|.)*?""")"#,
    r#"|(?P<string>"(?:[^"\\\n\r]|\\.)*")"#,
    r#"|(?P<ignored>(?:[\s,]|#[^\n\r]*)+)"#,
);

fn ignored_tokens() -> &'static Regex {
    static IGNORED: OnceLock<Regex> = OnceLock::new();
    IGNORED.get_or_init(|| Regex::new(IGNORED_PATTERN).expect("ignored-token pattern is valid"))
}

/// Renders a document (tree or text) to its canonical single-line form.
///
/// Trees are printed with the `graphql-parser` printer first. Every run of
/// whitespace, commas and comments then becomes a single space and the
/// result is trimmed. Text input is assumed to be a serialized document and
/// only goes through the second step.
pub fn stringify<'a>(source: impl Into<DocumentSource<'a>>) -> String {
    match source.into() {
        DocumentSource::Text(text) => normalize(text),
        DocumentSource::Document(document) => normalize(&document.to_string()),
        DocumentSource::Definition(definition) => normalize(&definition.to_string()),
    }
}

/// Collapses ignored tokens in already-serialized document text.
pub fn normalize(text: &str) -> String {
    ignored_tokens()
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.name("ignored").is_some() {
                " ".to_string()
            } else {
                caps[0].to_string()
            }
        })
        .trim()
        .to_string()
}
