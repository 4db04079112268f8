//! Flat HTML form submissions.
//!
//! Field names select where a value lands:
//! - `public-<key>` goes into the public body,
//! - `private-<key>` goes into the private body,
//! - `identification`, `language` and `redirect` are read as-is,
//! - any field ending in `captcha` is a honeypot; a non-empty value marks
//!   the submission as spam.
//!
//! Unknown fields are ignored.

use serde_json::{Map, Value};

use crate::payload::Submission;

const PUBLIC_PREFIX: &str = "public-";
const PRIVATE_PREFIX: &str = "private-";
const CAPTCHA_SUFFIX: &str = "captcha";
const IDENTIFICATION: &str = "identification";
const LANGUAGE: &str = "language";
const REDIRECT: &str = "redirect";
const MESSAGE: &str = "message";

/// Language used when the form does not name one.
pub const DEFAULT_LANGUAGE: &str = "de";

/// The `message` field of a private body, if present and a non-empty string.
pub fn private_message(private_body: &Value) -> Option<&str> {
    private_body
        .get(MESSAGE)
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
}

/// A parsed form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub identification: String,
    pub public: Map<String, Value>,
    pub private: Map<String, Value>,
    pub language: String,
    pub redirect: Option<String>,
    pub spam: bool,
}

impl FormSubmission {
    /// Parse `(name, value)` pairs in submission order.
    pub fn parse<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self {
            identification: String::new(),
            public: Map::new(),
            private: Map::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            redirect: None,
            spam: false,
        };

        for (key, value) in fields {
            let key = key.as_ref();
            let value: String = value.into();
            if key.ends_with(CAPTCHA_SUFFIX) {
                // Last honeypot wins, like a dict built from the form.
                form.spam = !value.is_empty();
            } else if let Some(name) = key.strip_prefix(PUBLIC_PREFIX) {
                form.public.insert(name.to_string(), Value::String(value));
            } else if let Some(name) = key.strip_prefix(PRIVATE_PREFIX) {
                form.private.insert(name.to_string(), Value::String(value));
            } else if key == IDENTIFICATION {
                form.identification = value;
            } else if key == LANGUAGE {
                form.language = value;
            } else if key == REDIRECT {
                form.redirect = Some(value);
            }
        }

        form
    }

    pub fn into_submission(self) -> Submission {
        Submission::new(
            self.identification,
            Value::Object(self.public),
            Value::Object(self.private),
        )
    }
}
