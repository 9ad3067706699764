//! Catalog aggregates and value types.
//!
//! The catalog is the owner-scoped half of the domain: tags, authors, and
//! books all belong to exactly one user, and nothing in this module is ever
//! visible across that boundary. Tags and authors share a single `Attribute`
//! shape distinguished by [`AttributeKind`]; their invariants are identical.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::user::UserId;

mod filter;
mod price;
mod service;
pub mod validation;

pub use filter::{BookFilter, parse_id_filter};
pub use price::{Price, PriceError};
pub use service::{BookDetail, CatalogService};

/// Discriminates the two attribute collections.
///
/// Tags and authors behave identically at this layer; the kind only selects
/// which collection (and which book link set) an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Tag,
    Author,
}

impl AttributeKind {
    /// Singular noun used in error messages.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Author => "author",
        }
    }

    /// Request field name carrying id references of this kind.
    pub fn field(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Author => "authors",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// A tag or author record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub owner: UserId,
}

/// A book record with its relation id sets.
///
/// `tag_ids` and `author_ids` are unordered sets; the join tables enforce
/// uniqueness at rest and `BTreeSet` preserves it in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub owner: UserId,
    pub title: String,
    pub pages: i32,
    pub year: i32,
    pub price: Price,
    pub link: Option<String>,
    pub cover_image: Option<String>,
    pub tag_ids: BTreeSet<i64>,
    pub author_ids: BTreeSet<i64>,
}

/// Validated field values for creating a book.
///
/// Relation ids are still raw at this point; the catalog service resolves
/// them owner-scoped before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub pages: i32,
    pub year: i32,
    pub price: Price,
    pub link: Option<String>,
    pub tag_ids: Vec<i64>,
    pub author_ids: Vec<i64>,
}

/// Field values supplied to an update; `None` means the field was omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub pages: Option<i32>,
    pub year: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
    pub author_ids: Option<Vec<i64>>,
}

/// How an update treats relation lists the caller omitted.
///
/// Chosen from the HTTP verb by the transport layer, never inferred from the
/// payload: a full update omitting `tags` clears the links, a partial update
/// leaves them alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationStrategy {
    /// Omitted relation lists reset to empty (full update).
    Replace,
    /// Omitted relation lists stay untouched (partial update).
    Merge,
}
