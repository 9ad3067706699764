//! PostgreSQL-backed `AttributeRepository` implementation using Diesel ORM.
//!
//! Tags and authors live in separate tables with identical shapes. Diesel's
//! static typing rules out one generic query over both, so a small macro
//! stamps out the per-table query functions and the trait implementation
//! dispatches on [`AttributeKind`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::catalog::{Attribute, AttributeKind};
use crate::domain::ports::{AttributeRepository, AttributeRepositoryError};
use crate::domain::user::UserId;

use super::models::{AuthorRow, NewAuthorRow, NewTagRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{authors, book_authors, book_tags, books, tags};

impl From<TagRow> for Attribute {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            owner: UserId::new(row.user_id),
        }
    }
}

impl From<AuthorRow> for Attribute {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            owner: UserId::new(row.user_id),
        }
    }
}

/// Generate the query functions for one attribute table.
///
/// `$link_fk` is the column in the link table pointing at the attribute.
macro_rules! attribute_table_queries {
    ($module:ident, $table:ident, $link_table:ident, $link_fk:ident, $row:ident, $new_row:ident) => {
        mod $module {
            use super::*;

            pub(super) async fn list(
                conn: &mut AsyncPgConnection,
                owner: i64,
                assigned_only: bool,
            ) -> Result<Vec<Attribute>, diesel::result::Error> {
                let mut query = $table::table
                    .select($row::as_select())
                    .filter($table::user_id.eq(owner))
                    .into_boxed();
                if assigned_only {
                    // Scope the linkage to the owner's books; a foreign
                    // book referencing this attribute must not count.
                    let owned_books = books::table
                        .filter(books::user_id.eq(owner))
                        .select(books::id);
                    let linked = $link_table::table
                        .filter($link_table::book_id.eq_any(owned_books))
                        .select($link_table::$link_fk);
                    query = query.filter($table::id.eq_any(linked));
                }

                let rows: Vec<$row> = query
                    .order($table::name.desc())
                    .then_order_by($table::id.asc())
                    .load(conn)
                    .await?;
                Ok(rows.into_iter().map(Attribute::from).collect())
            }

            pub(super) async fn insert(
                conn: &mut AsyncPgConnection,
                owner: i64,
                name: &str,
            ) -> Result<Attribute, diesel::result::Error> {
                let row: $row = diesel::insert_into($table::table)
                    .values(&$new_row {
                        name,
                        user_id: owner,
                    })
                    .returning($row::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(row.into())
            }

            pub(super) async fn find_owned(
                conn: &mut AsyncPgConnection,
                owner: i64,
                ids: Vec<i64>,
            ) -> Result<Vec<Attribute>, diesel::result::Error> {
                let rows: Vec<$row> = $table::table
                    .filter($table::user_id.eq(owner).and($table::id.eq_any(ids)))
                    .select($row::as_select())
                    .load(conn)
                    .await?;
                Ok(rows.into_iter().map(Attribute::from).collect())
            }
        }
    };
}

attribute_table_queries!(tag_queries, tags, book_tags, tag_id, TagRow, NewTagRow);
attribute_table_queries!(
    author_queries,
    authors,
    book_authors,
    author_id,
    AuthorRow,
    NewAuthorRow
);

/// Diesel-backed implementation of the `AttributeRepository` port.
#[derive(Clone)]
pub struct DieselAttributeRepository {
    pool: DbPool,
}

impl DieselAttributeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AttributeRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            AttributeRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AttributeRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AttributeRepositoryError::connection("database connection error")
        }
        _ => AttributeRepositoryError::query("database error"),
    }
}

#[async_trait]
impl AttributeRepository for DieselAttributeRepository {
    async fn list(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = owner.as_i64();
        let result = match kind {
            AttributeKind::Tag => tag_queries::list(&mut conn, owner, assigned_only).await,
            AttributeKind::Author => author_queries::list(&mut conn, owner, assigned_only).await,
        };
        result.map_err(map_diesel_error)
    }

    async fn insert(
        &self,
        owner: UserId,
        kind: AttributeKind,
        name: &str,
    ) -> Result<Attribute, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = owner.as_i64();
        let result = match kind {
            AttributeKind::Tag => tag_queries::insert(&mut conn, owner, name).await,
            AttributeKind::Author => author_queries::insert(&mut conn, owner, name).await,
        };
        result.map_err(map_diesel_error)
    }

    async fn find_owned(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: &BTreeSet<i64>,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = owner.as_i64();
        let ids: Vec<i64> = ids.iter().copied().collect();
        let result = match kind {
            AttributeKind::Tag => tag_queries::find_owned(&mut conn, owner, ids).await,
            AttributeKind::Author => author_queries::find_owned(&mut conn, owner, ids).await,
        };
        result.map_err(map_diesel_error)
    }
}
