//! SQL identifier quoting.
//!
//! Each adapter declares the pair of characters that wrap an identifier:
//! `"id"` for ANSI backends, `` `id` `` for MySQL-likes, `[id]` for SQL Server.
//!
//! The name is wrapped as-is. Callers pass a single identifier token; dotted
//! or already-quoted names are not split or unescaped, so quoting a quoted
//! name nests the quotes (`"\"id\""` becomes `""id""`).

/// Begin/end quote characters for identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierQuotes {
    pub begin: char,
    pub end: char,
}

impl Default for IdentifierQuotes {
    fn default() -> Self {
        Self::ANSI
    }
}

impl IdentifierQuotes {
    /// `"name"`
    pub const ANSI: Self = Self::new('"', '"');
    /// `` `name` ``
    pub const BACKTICK: Self = Self::new('`', '`');
    /// `[name]`
    pub const BRACKET: Self = Self::new('[', ']');

    pub const fn new(begin: char, end: char) -> Self {
        Self { begin, end }
    }

    /// Wrap `name` in the quote pair.
    pub fn escape(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_escaped(&mut out, name);
        out
    }

    /// Escape every name, preserving order.
    pub fn escape_all<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.escape(name.as_ref()))
            .collect()
    }

    pub(crate) fn write_escaped(&self, out: &mut String, name: &str) {
        out.push(self.begin);
        out.push_str(name);
        out.push(self.end);
    }
}
