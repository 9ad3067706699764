//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{authors, book_authors, book_tags, books, tags, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
}

/// Changeset struct for profile updates; `None` fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdateRow<'a> {
    pub name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

/// Row struct for reading from the tags table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// Insertable struct for creating new tag records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tags)]
pub(crate) struct NewTagRow<'a> {
    pub name: &'a str,
    pub user_id: i64,
}

/// Row struct for reading from the authors table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// Insertable struct for creating new author records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = authors)]
pub(crate) struct NewAuthorRow<'a> {
    pub name: &'a str,
    pub user_id: i64,
}

/// Row struct for reading from the books table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub pages: i32,
    pub year: i32,
    pub price_cents: i64,
    pub link: Option<String>,
    pub cover_image: Option<String>,
}

/// Insertable struct for creating new book records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub(crate) struct NewBookRow<'a> {
    pub user_id: i64,
    pub title: &'a str,
    pub pages: i32,
    pub year: i32,
    pub price_cents: i64,
    pub link: Option<&'a str>,
}

/// Changeset struct for scalar book updates; `None` fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = books)]
pub(crate) struct BookUpdateRow<'a> {
    pub title: Option<&'a str>,
    pub pages: Option<i32>,
    pub year: Option<i32>,
    pub price_cents: Option<i64>,
    pub link: Option<&'a str>,
}

impl BookUpdateRow<'_> {
    /// True when the changeset would not touch any column.
    pub(crate) fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.pages.is_none()
            && self.year.is_none()
            && self.price_cents.is_none()
            && self.link.is_none()
    }
}

/// Insertable struct for book–tag links.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = book_tags)]
pub(crate) struct BookTagRow {
    pub book_id: i64,
    pub tag_id: i64,
}

/// Insertable struct for book–author links.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = book_authors)]
pub(crate) struct BookAuthorRow {
    pub book_id: i64,
    pub author_id: i64,
}
