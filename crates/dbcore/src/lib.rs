//! # dbcore
//!
//! A vendor-neutral core for relational database adapters.
//!
//! ## Features
//!
//! - **One adapter contract**: every backend implements [`Adapter`]; nothing above it
//!   knows which RDBMS it talks to
//! - **Inline literals**: typed [`Value`]s render as escaped SQL literals or NULL-aware
//!   comparisons via [`LiteralSerializer`]
//! - **Statement templates**: named placeholders with scalar, list and equality forms
//! - **MERGE upserts**: insert-or-update statements keyed on one or more columns
//! - **Lazy connections**: [`Database`] connects on first use and is closed exactly once
//! - **Profiling**: optional per-statement timing, safe under concurrent callers
//!
//! ## Templates
//!
//! ```ignore
//! use dbcore::{Bindings, Value, placeholder, placeholder_eq};
//!
//! let sql = format!(
//!     "SELECT * FROM users WHERE deleted_at {} AND id IN ({}",
//!     placeholder_eq("deleted"),
//!     placeholder("ids"),
//! );
//! let bindings = Bindings::new()
//!     .bind("deleted", Value::Null)
//!     .bind_list("ids", [1, 2, 3]);
//!
//! // SELECT * FROM users WHERE deleted_at IS NULL AND id IN (1,2,3)
//! let text = db.prepare_statement(&sql, &bindings)?;
//! let rows = db.query(&text).await?;
//! ```
//!
//! ## Upserts
//!
//! ```ignore
//! db.insert_or_update(
//!     "users",
//!     &[("id", Value::from(1)), ("name", Value::from("Ann"))],
//!     "id",
//! )
//! .await?;
//! ```

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod ident;
pub mod literal;
pub mod profile;
pub mod result;
pub mod template;
pub mod upsert;
pub mod value;

pub use adapter::{Adapter, LimitInfo, SortDirection, SortSpec};
pub use catalog::{Field, FieldType, ForeignKey, Index};
pub use config::{AdapterConfig, DatabasesConfig};
pub use database::{ConnectionState, Database};
pub use error::{DbError, DbResult};
pub use ident::IdentifierQuotes;
pub use literal::{ISO_DATE_FORMAT, ISO_DATETIME_FORMAT, LiteralSerializer, escape_text};
pub use profile::{ProfileEntry, ProfileLog, ProfileSummary};
pub use result::{BufferedResult, BufferedRow, ResultRow, ResultSet};
pub use template::{
    Binding, Bindings, PLACEHOLDER_DELIMITER, placeholder, placeholder_eq, placeholder_ne, render,
    render_strict,
};
pub use upsert::{MatchKeys, merge_statement};
pub use value::{EqualityMode, Value};
