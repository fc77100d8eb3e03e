//! Named-placeholder statement templates.
//!
//! A placeholder is the reserved delimiter byte [`PLACEHOLDER_DELIMITER`]
//! followed by a braced key in one of three forms:
//!
//! - `{=key=}` renders the bound value with an `=` / `IS` prefix
//! - `{!key!}` renders the bound value with a `!=` / `IS NOT` prefix
//! - `{key}` renders the bare literal, or for a list binding the
//!   comma-joined literals followed by `)` (the template supplies the `(`)
//!
//! Rendering is a single left-to-right scan: text that was substituted is
//! never scanned again, so the result does not depend on binding order.
//! Placeholders whose key is not bound are copied through verbatim by
//! [`render`]; [`render_strict`] reports them instead.
//!
//! # Example
//!
//! ```ignore
//! use dbcore::template::{Bindings, placeholder, placeholder_eq, render};
//! use dbcore::LiteralSerializer;
//!
//! let sql = format!(
//!     "SELECT * FROM users WHERE status {} AND id IN ({}",
//!     placeholder_eq("status"),
//!     placeholder("ids"),
//! );
//! let bindings = Bindings::new()
//!     .bind("status", "active")
//!     .bind_list("ids", [1, 2, 3]);
//! let rendered = render(&sql, &bindings, &LiteralSerializer::new())?;
//! assert_eq!(rendered, "SELECT * FROM users WHERE status = 'active' AND id IN (1,2,3)");
//! ```

use crate::error::{DbError, DbResult};
use crate::literal::LiteralSerializer;
use crate::value::{EqualityMode, Value};
use std::collections::HashMap;

/// Marks the start of a placeholder. Query text must not contain it literally.
pub const PLACEHOLDER_DELIMITER: char = '\u{3}';

/// `{key}` placeholder.
pub fn placeholder(key: &str) -> String {
    format!("{PLACEHOLDER_DELIMITER}{{{key}}}")
}

/// `{=key=}` placeholder.
pub fn placeholder_eq(key: &str) -> String {
    format!("{PLACEHOLDER_DELIMITER}{{={key}=}}")
}

/// `{!key!}` placeholder.
pub fn placeholder_ne(key: &str) -> String {
    format!("{PLACEHOLDER_DELIMITER}{{!{key}!}}")
}

/// A value bound to a placeholder key.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Scalar(Value),
    /// Rendered as an `IN (...)` literal list by `{key}` placeholders.
    List(Vec<Value>),
}

impl From<Value> for Binding {
    fn from(v: Value) -> Self {
        Binding::Scalar(v)
    }
}

impl From<Vec<Value>> for Binding {
    fn from(v: Vec<Value>) -> Self {
        Binding::List(v)
    }
}

/// Placeholder key → bound value.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: HashMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a scalar value (chainable).
    pub fn bind(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, Binding::Scalar(value.into()));
        self
    }

    /// Bind a list of values (chainable).
    pub fn bind_list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(key, Binding::List(values));
        self
    }

    /// Insert or replace a binding.
    pub fn insert(&mut self, key: impl Into<String>, binding: impl Into<Binding>) {
        self.entries.insert(key.into(), binding.into());
    }

    pub fn get(&self, key: &str) -> Option<&Binding> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, B: Into<Binding>> FromIterator<(K, B)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (K, B)>>(iter: T) -> Self {
        let mut bindings = Bindings::new();
        for (k, b) in iter {
            bindings.insert(k, b);
        }
        bindings
    }
}

/// Substitute every bound placeholder in `template`; unbound ones are kept verbatim.
pub fn render(
    template: &str,
    bindings: &Bindings,
    serializer: &LiteralSerializer,
) -> DbResult<String> {
    render_inner(template, bindings, serializer, false)
}

/// Like [`render`], but an unbound placeholder is an error.
///
/// Fails with [`DbError::TemplateKeyMissing`] for unbound keys, and with a
/// validation error when a list is bound to an `{=key=}` / `{!key!}` form.
pub fn render_strict(
    template: &str,
    bindings: &Bindings,
    serializer: &LiteralSerializer,
) -> DbResult<String> {
    render_inner(template, bindings, serializer, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker<'a> {
    Eq(&'a str),
    Ne(&'a str),
    Plain(&'a str),
}

impl<'a> Marker<'a> {
    fn key(&self) -> &'a str {
        match *self {
            Marker::Eq(k) | Marker::Ne(k) | Marker::Plain(k) => k,
        }
    }
}

/// Parse a marker at the start of `s` (just after the delimiter).
///
/// Returns the marker and the number of bytes it spans.
fn parse_marker(s: &str) -> Option<(Marker<'_>, usize)> {
    let body = s.strip_prefix('{')?;

    if let Some(inner) = body.strip_prefix('=') {
        if let Some(end) = inner.find("=}") {
            let key = &inner[..end];
            if is_valid_key(key) {
                return Some((Marker::Eq(key), key.len() + 4));
            }
        }
    }
    if let Some(inner) = body.strip_prefix('!') {
        if let Some(end) = inner.find("!}") {
            let key = &inner[..end];
            if is_valid_key(key) {
                return Some((Marker::Ne(key), key.len() + 4));
            }
        }
    }

    let end = body.find('}')?;
    let key = &body[..end];
    if is_valid_key(key) {
        Some((Marker::Plain(key), key.len() + 2))
    } else {
        None
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(PLACEHOLDER_DELIMITER) && !key.contains('}')
}

fn render_inner(
    template: &str,
    bindings: &Bindings,
    serializer: &LiteralSerializer,
    strict: bool,
) -> DbResult<String> {
    let delim_len = PLACEHOLDER_DELIMITER.len_utf8();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(PLACEHOLDER_DELIMITER) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + delim_len..];

        let Some((marker, consumed)) = parse_marker(after) else {
            out.push(PLACEHOLDER_DELIMITER);
            rest = after;
            continue;
        };

        let substituted = match (marker, bindings.get(marker.key())) {
            (_, None) if strict => {
                return Err(DbError::TemplateKeyMissing(marker.key().to_string()));
            }
            (_, None) => false,
            (Marker::Eq(_), Some(Binding::Scalar(v))) => {
                serializer.write_literal(&mut out, v, EqualityMode::Forward)?;
                true
            }
            (Marker::Ne(_), Some(Binding::Scalar(v))) => {
                serializer.write_literal(&mut out, v, EqualityMode::Reverse)?;
                true
            }
            (Marker::Plain(_), Some(Binding::Scalar(v))) => {
                serializer.write_literal(&mut out, v, EqualityMode::None)?;
                true
            }
            (Marker::Plain(_), Some(Binding::List(values))) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    serializer.write_literal(&mut out, v, EqualityMode::None)?;
                }
                out.push(')');
                true
            }
            (Marker::Eq(key) | Marker::Ne(key), Some(Binding::List(_))) if strict => {
                return Err(DbError::validation(format!(
                    "list bound to '{key}' cannot be used in an equality placeholder"
                )));
            }
            (Marker::Eq(_) | Marker::Ne(_), Some(Binding::List(_))) => false,
        };

        if !substituted {
            out.push(PLACEHOLDER_DELIMITER);
            out.push_str(&after[..consumed]);
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}
