//! Rendering of [`Value`]s as inline SQL literals.
//!
//! This is the only place caller-provided text is turned into SQL. Text is
//! always quoted with backslash escaping; numbers are rendered bare;
//! booleans follow the integer convention.
//!
//! With an [`EqualityMode`] other than `None` the literal is prefixed with a
//! comparison operator that is NULL-aware:
//!
//! | value   | None   | Forward    | Reverse        |
//! |---------|--------|------------|----------------|
//! | NULL    | `NULL` | `IS NULL`  | `IS NOT NULL`  |
//! | true    | `1`    | `!= 0`     | `= 0`          |
//! | false   | `0`    | `= 0`      | `!= 0`         |
//! | 42      | `42`   | `= 42`     | `!= 42`        |
//! | 'a'     | `'a'`  | `= 'a'`    | `!= 'a'`       |

use crate::error::{DbError, DbResult};
use crate::value::{EqualityMode, Value};
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;

/// Date-only rendering pattern.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default date + time rendering pattern.
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serializes values into SQL literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSerializer {
    datetime_format: String,
}

impl Default for LiteralSerializer {
    fn default() -> Self {
        Self {
            datetime_format: ISO_DATETIME_FORMAT.to_string(),
        }
    }
}

impl LiteralSerializer {
    /// Create a serializer with ISO-8601 date formats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom chrono strftime pattern for date + time values.
    ///
    /// Returns an error if the pattern contains unknown specifiers.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> DbResult<Self> {
        let format = format.into();
        validate_datetime_format(&format)?;
        self.datetime_format = format;
        Ok(self)
    }

    pub fn datetime_format(&self) -> &str {
        &self.datetime_format
    }

    /// Render `value` as a SQL literal, prefixed according to `mode`.
    pub fn serialize(&self, value: &Value, mode: EqualityMode) -> DbResult<String> {
        let mut out = String::new();
        self.write_literal(&mut out, value, mode)?;
        Ok(out)
    }

    /// Render every value as a plain literal, preserving order.
    pub fn serialize_all<'a, I>(&self, values: I) -> DbResult<Vec<String>>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        values
            .into_iter()
            .map(|v| self.serialize(v, EqualityMode::None))
            .collect()
    }

    /// Append the literal for `value` to `out`.
    pub fn write_literal(
        &self,
        out: &mut String,
        value: &Value,
        mode: EqualityMode,
    ) -> DbResult<()> {
        match value {
            Value::Null => out.push_str(match mode {
                EqualityMode::None => "NULL",
                EqualityMode::Forward => "IS NULL",
                EqualityMode::Reverse => "IS NOT NULL",
            }),
            Value::Bool(b) => out.push_str(match (mode, *b) {
                (EqualityMode::None, true) => "1",
                (EqualityMode::None, false) => "0",
                (EqualityMode::Forward, true) | (EqualityMode::Reverse, false) => "!= 0",
                (EqualityMode::Forward, false) | (EqualityMode::Reverse, true) => "= 0",
            }),
            Value::Int(n) => {
                push_operator(out, mode);
                let _ = write!(out, "{n}");
            }
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(DbError::serialization(format!(
                        "non-finite float {f} has no SQL literal form"
                    )));
                }
                push_operator(out, mode);
                let _ = write!(out, "{f}");
            }
            Value::Date(d) => {
                push_operator(out, mode);
                out.push('\'');
                write!(out, "{}", d.format(ISO_DATE_FORMAT))
                    .map_err(|_| DbError::serialization("failed to format date"))?;
                out.push('\'');
            }
            Value::DateTime(dt) => {
                push_operator(out, mode);
                out.push('\'');
                write!(out, "{}", dt.format(&self.datetime_format)).map_err(|_| {
                    DbError::serialization(format!(
                        "failed to format datetime with pattern '{}'",
                        self.datetime_format
                    ))
                })?;
                out.push('\'');
            }
            Value::Text(s) => {
                push_operator(out, mode);
                out.push('\'');
                escape_text_into(out, s);
                out.push('\'');
            }
        }
        Ok(())
    }
}

fn push_operator(out: &mut String, mode: EqualityMode) {
    match mode {
        EqualityMode::None => {}
        EqualityMode::Forward => out.push_str("= "),
        EqualityMode::Reverse => out.push_str("!= "),
    }
}

/// Backslash-escape quotes and backslashes; NUL becomes `\0`.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    escape_text_into(&mut out, s);
    out
}

fn escape_text_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
}

pub(crate) fn validate_datetime_format(format: &str) -> DbResult<()> {
    if format.is_empty() {
        return Err(DbError::Config("date format cannot be empty".to_string()));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(DbError::Config(format!("invalid date format '{format}'")));
    }
    // Some specifiers parse but need data a naive date-time lacks (e.g. `%z`).
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DbError::Config("invalid sample date".to_string()))?;
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).map_err(|_| {
        DbError::Config(format!(
            "date format '{format}' cannot render a date without a time zone"
        ))
    })?;
    Ok(())
}
