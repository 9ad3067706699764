//! PostgreSQL-backed `BookRepository` implementation using Diesel ORM.
//!
//! Relation links live in join tables and every mutation that touches them
//! runs in a transaction, so a failed write can never leave a book pointing
//! at half its tags.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::catalog::{Book, BookFilter, Price};
use crate::domain::ports::{BookChanges, BookRepository, BookRepositoryError, NewBookRecord};
use crate::domain::user::UserId;

use super::models::{BookAuthorRow, BookRow, BookTagRow, BookUpdateRow, NewBookRow};
use super::pool::{DbPool, PoolError};
use super::schema::{book_authors, book_tags, books};

/// Diesel-backed implementation of the `BookRepository` port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            BookRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> BookRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            BookRepositoryError::connection("database connection error")
        }
        _ => BookRepositoryError::query("database error"),
    }
}

type LinkSets = (HashMap<i64, BTreeSet<i64>>, HashMap<i64, BTreeSet<i64>>);

/// Fetch the tag and author id sets for a batch of books.
async fn load_links(
    conn: &mut AsyncPgConnection,
    book_ids: &[i64],
) -> Result<LinkSets, diesel::result::Error> {
    let mut tag_sets: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    let mut author_sets: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    if book_ids.is_empty() {
        return Ok((tag_sets, author_sets));
    }

    let tag_links: Vec<(i64, i64)> = book_tags::table
        .filter(book_tags::book_id.eq_any(book_ids))
        .select((book_tags::book_id, book_tags::tag_id))
        .load(conn)
        .await?;
    for (book_id, tag_id) in tag_links {
        tag_sets.entry(book_id).or_default().insert(tag_id);
    }

    let author_links: Vec<(i64, i64)> = book_authors::table
        .filter(book_authors::book_id.eq_any(book_ids))
        .select((book_authors::book_id, book_authors::author_id))
        .load(conn)
        .await?;
    for (book_id, author_id) in author_links {
        author_sets.entry(book_id).or_default().insert(author_id);
    }

    Ok((tag_sets, author_sets))
}

/// Convert a row plus its link sets into a domain book.
fn assemble_book(
    row: BookRow,
    tag_ids: BTreeSet<i64>,
    author_ids: BTreeSet<i64>,
) -> Result<Book, BookRepositoryError> {
    let price = Price::from_minor_units(row.price_cents)
        .map_err(|err| BookRepositoryError::query(format!("invalid stored price: {err}")))?;
    Ok(Book {
        id: row.id,
        owner: UserId::new(row.user_id),
        title: row.title,
        pages: row.pages,
        year: row.year,
        price,
        link: row.link,
        cover_image: row.cover_image,
        tag_ids,
        author_ids,
    })
}

fn tag_link_rows(book_id: i64, tag_ids: &BTreeSet<i64>) -> Vec<BookTagRow> {
    tag_ids
        .iter()
        .map(|&tag_id| BookTagRow { book_id, tag_id })
        .collect()
}

fn author_link_rows(book_id: i64, author_ids: &BTreeSet<i64>) -> Vec<BookAuthorRow> {
    author_ids
        .iter()
        .map(|&author_id| BookAuthorRow { book_id, author_id })
        .collect()
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn list(
        &self,
        owner: UserId,
        filter: &BookFilter,
    ) -> Result<Vec<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = books::table
            .select(BookRow::as_select())
            .filter(books::user_id.eq(owner.as_i64()))
            .into_boxed();
        if let Some(ids) = &filter.tag_ids {
            let ids: Vec<i64> = ids.iter().copied().collect();
            let linked = book_tags::table
                .filter(book_tags::tag_id.eq_any(ids))
                .select(book_tags::book_id);
            query = query.filter(books::id.eq_any(linked));
        }
        if let Some(ids) = &filter.author_ids {
            let ids: Vec<i64> = ids.iter().copied().collect();
            let linked = book_authors::table
                .filter(book_authors::author_id.eq_any(ids))
                .select(book_authors::book_id);
            query = query.filter(books::id.eq_any(linked));
        }

        let rows: Vec<BookRow> = query
            .order(books::id.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let book_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let (mut tag_sets, mut author_sets) = load_links(&mut conn, &book_ids)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                let tags = tag_sets.remove(&row.id).unwrap_or_default();
                let authors = author_sets.remove(&row.id).unwrap_or_default();
                assemble_book(row, tags, authors)
            })
            .collect()
    }

    async fn find(&self, owner: UserId, id: i64) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<BookRow> = books::table
            .filter(books::id.eq(id).and(books::user_id.eq(owner.as_i64())))
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let (mut tag_sets, mut author_sets) = load_links(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        let tags = tag_sets.remove(&row.id).unwrap_or_default();
        let authors = author_sets.remove(&row.id).unwrap_or_default();
        assemble_book(row, tags, authors).map(Some)
    }

    async fn insert(&self, record: NewBookRecord) -> Result<Book, BookRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let tag_ids = record.tag_ids;
        let author_ids = record.author_ids;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewBookRow {
            user_id: record.owner.as_i64(),
            title: &record.title,
            pages: record.pages,
            year: record.year,
            price_cents: record.price.minor_units(),
            link: record.link.as_deref(),
        };
        let tag_ids_ref = &tag_ids;
        let author_ids_ref = &author_ids;

        // Insert the book and its links atomically; a link failure must not
        // leave an orphaned book row behind.
        let row: BookRow = conn
            .transaction(|conn| {
                async move {
                    let row: BookRow = diesel::insert_into(books::table)
                        .values(&new_row)
                        .returning(BookRow::as_returning())
                        .get_result(conn)
                        .await?;

                    if !tag_ids_ref.is_empty() {
                        diesel::insert_into(book_tags::table)
                            .values(tag_link_rows(row.id, tag_ids_ref))
                            .execute(conn)
                            .await?;
                    }
                    if !author_ids_ref.is_empty() {
                        diesel::insert_into(book_authors::table)
                            .values(author_link_rows(row.id, author_ids_ref))
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        drop(conn);
        assemble_book(row, tag_ids, author_ids)
    }

    async fn update(
        &self,
        owner: UserId,
        id: i64,
        changes: BookChanges,
    ) -> Result<Option<Book>, BookRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update_row = BookUpdateRow {
            title: changes.title.as_deref(),
            pages: changes.pages,
            year: changes.year,
            price_cents: changes.price.map(Price::minor_units),
            link: changes.link.as_deref(),
        };
        let tag_ids = &changes.tag_ids;
        let author_ids = &changes.author_ids;
        let owner = owner.as_i64();

        let result = conn
            .transaction(|conn| {
                async move {
                    let scoped = books::table.filter(books::id.eq(id).and(books::user_id.eq(owner)));
                    let row: Option<BookRow> = if update_row.is_empty() {
                        scoped
                            .select(BookRow::as_select())
                            .first(conn)
                            .await
                            .optional()?
                    } else {
                        diesel::update(scoped)
                            .set(&update_row)
                            .returning(BookRow::as_returning())
                            .get_result(conn)
                            .await
                            .optional()?
                    };
                    let Some(row) = row else {
                        return Ok::<_, diesel::result::Error>(None);
                    };

                    if let Some(tag_ids) = tag_ids {
                        diesel::delete(book_tags::table.filter(book_tags::book_id.eq(row.id)))
                            .execute(conn)
                            .await?;
                        if !tag_ids.is_empty() {
                            diesel::insert_into(book_tags::table)
                                .values(tag_link_rows(row.id, tag_ids))
                                .execute(conn)
                                .await?;
                        }
                    }
                    if let Some(author_ids) = author_ids {
                        diesel::delete(
                            book_authors::table.filter(book_authors::book_id.eq(row.id)),
                        )
                        .execute(conn)
                        .await?;
                        if !author_ids.is_empty() {
                            diesel::insert_into(book_authors::table)
                                .values(author_link_rows(row.id, author_ids))
                                .execute(conn)
                                .await?;
                        }
                    }

                    let (mut tag_sets, mut author_sets) = load_links(conn, &[row.id]).await?;
                    let tags = tag_sets.remove(&row.id).unwrap_or_default();
                    let authors = author_sets.remove(&row.id).unwrap_or_default();
                    Ok(Some((row, tags, authors)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        result
            .map(|(row, tags, authors)| assemble_book(row, tags, authors))
            .transpose()
    }

    async fn delete(&self, owner: UserId, id: i64) -> Result<bool, BookRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = owner.as_i64();

        conn.transaction(|conn| {
            async move {
                let existing: Option<i64> = books::table
                    .filter(books::id.eq(id).and(books::user_id.eq(owner)))
                    .select(books::id)
                    .first(conn)
                    .await
                    .optional()?;
                let Some(book_id) = existing else {
                    return Ok::<_, diesel::result::Error>(false);
                };

                // Links first; the book row carries their foreign keys.
                diesel::delete(book_tags::table.filter(book_tags::book_id.eq(book_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(book_authors::table.filter(book_authors::book_id.eq(book_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(books::table.find(book_id)).execute(conn).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn set_cover_image<'a>(
        &self,
        owner: UserId,
        id: i64,
        path: Option<&'a str>,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<BookRow> = diesel::update(
            books::table.filter(books::id.eq(id).and(books::user_id.eq(owner.as_i64()))),
        )
        .set(books::cover_image.eq(path))
        .returning(BookRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let (mut tag_sets, mut author_sets) = load_links(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        let tags = tag_sets.remove(&row.id).unwrap_or_default();
        let authors = author_sets.remove(&row.id).unwrap_or_default();
        assemble_book(row, tags, authors).map(Some)
    }
}
