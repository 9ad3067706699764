//! Port for book persistence, including relation link management.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::catalog::{Book, BookFilter, Price};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by book repository adapters.
    pub enum BookRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "book repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "book repository query failed: {message}",
    }
}

/// Fully resolved field values for inserting a book.
///
/// Relation ids have already been validated against the owner's attributes
/// by the caller; the adapter persists them as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookRecord {
    pub owner: UserId,
    pub title: String,
    pub pages: i32,
    pub year: i32,
    pub price: Price,
    pub link: Option<String>,
    pub tag_ids: BTreeSet<i64>,
    pub author_ids: BTreeSet<i64>,
}

/// Column-level changes for an update; `None` leaves the column untouched.
///
/// A `Some` relation set replaces the book's links wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub pages: Option<i32>,
    pub year: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tag_ids: Option<BTreeSet<i64>>,
    pub author_ids: Option<BTreeSet<i64>>,
}

impl BookChanges {
    /// True when the update would not modify anything.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Port for book storage and retrieval.
///
/// All lookups are owner-scoped; a book owned by someone else is
/// indistinguishable from a book that does not exist (`Ok(None)` / `false`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// List the owner's books, newest first (id descending), applying the
    /// relational filter when present.
    async fn list(
        &self,
        owner: UserId,
        filter: &BookFilter,
    ) -> Result<Vec<Book>, BookRepositoryError>;

    /// Fetch one of the owner's books.
    async fn find(&self, owner: UserId, id: i64) -> Result<Option<Book>, BookRepositoryError>;

    /// Insert a book together with its relation links.
    async fn insert(&self, record: NewBookRecord) -> Result<Book, BookRepositoryError>;

    /// Apply changes to one of the owner's books, returning the updated book
    /// or `None` when it is not visible to the owner.
    async fn update(
        &self,
        owner: UserId,
        id: i64,
        changes: BookChanges,
    ) -> Result<Option<Book>, BookRepositoryError>;

    /// Delete one of the owner's books and its links. Returns `false` when
    /// the book is not visible to the owner.
    async fn delete(&self, owner: UserId, id: i64) -> Result<bool, BookRepositoryError>;

    /// Record (or clear) the stored cover image path.
    async fn set_cover_image<'a>(
        &self,
        owner: UserId,
        id: i64,
        path: Option<&'a str>,
    ) -> Result<Option<Book>, BookRepositoryError>;
}
