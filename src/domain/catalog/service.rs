//! Catalog domain service.
//!
//! Implements the owner-scoped collection operations for tags, authors, and
//! books. Two rules hold everywhere and compose:
//!
//! - every query and mutation is restricted to the calling owner's records,
//!   and a record owned by someone else is reported exactly like a record
//!   that does not exist;
//! - relation references (book → tag/author) are resolved against the
//!   caller's own attributes at write time, so a book can never point at
//!   another user's tag or author, however the ids were obtained.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::catalog::validation::{
    current_year, validate_attribute_name, validate_link, validate_pages, validate_title,
    validate_year,
};
use crate::domain::catalog::{
    Attribute, AttributeKind, Book, BookFilter, BookPatch, Price, RelationStrategy,
};
use crate::domain::error::{Error, FieldError};
use crate::domain::ports::{
    AttributeRepository, AttributeRepositoryError, BookChanges, BookRepository,
    BookRepositoryError, ImageStore, ImageStoreError, NewBookRecord,
};
use crate::domain::user::UserId;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Identify an upload by its leading bytes, returning the file extension.
fn sniff_image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&PNG_MAGIC) {
        Some("png")
    } else if bytes.starts_with(&JPEG_MAGIC) {
        Some("jpg")
    } else {
        None
    }
}

fn invalid_image_error() -> Error {
    Error::invalid_request("upload must be a PNG or JPEG image").with_details(serde_json::json!({
        "field": "image",
        "code": "invalid_image",
    }))
}

fn missing_field(field: &str) -> FieldError {
    FieldError::new(field, "missing_field", format!("missing required field: {field}"))
}

fn book_not_found() -> Error {
    // Deliberately identical for "absent" and "owned by someone else".
    Error::not_found("book not found")
}

fn map_attribute_error(error: AttributeRepositoryError) -> Error {
    match error {
        AttributeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attribute repository unavailable: {message}"))
        }
        AttributeRepositoryError::Query { message } => {
            Error::internal(format!("attribute repository error: {message}"))
        }
    }
}

fn map_book_error(error: BookRepositoryError) -> Error {
    match error {
        BookRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("book repository unavailable: {message}"))
        }
        BookRepositoryError::Query { message } => {
            Error::internal(format!("book repository error: {message}"))
        }
    }
}

fn map_image_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Storage { message } => {
            Error::internal(format!("image store error: {message}"))
        }
    }
}

/// Scalar fields of a create request after validation.
struct ValidatedDraft {
    title: String,
    pages: i32,
    year: i32,
    price: Price,
    link: Option<String>,
}

/// Scalar column changes of an update request after validation.
#[derive(Default)]
struct ValidatedScalars {
    title: Option<String>,
    pages: Option<i32>,
    year: Option<i32>,
    price: Option<Price>,
    link: Option<String>,
}

/// A book with its relation records expanded for detail views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub book: Book,
    pub tags: Vec<Attribute>,
    pub authors: Vec<Attribute>,
}

/// Owner-scoped catalog operations over the repository ports.
#[derive(Clone)]
pub struct CatalogService {
    attributes: Arc<dyn AttributeRepository>,
    books: Arc<dyn BookRepository>,
    images: Arc<dyn ImageStore>,
}

impl CatalogService {
    /// Create a new service over the given adapters.
    pub fn new(
        attributes: Arc<dyn AttributeRepository>,
        books: Arc<dyn BookRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            attributes,
            books,
            images,
        }
    }

    /// List the caller's tags or authors, ordered by name descending.
    pub async fn list_attributes(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, Error> {
        self.attributes
            .list(owner, kind, assigned_only)
            .await
            .map_err(map_attribute_error)
    }

    /// Create a tag or author for the caller.
    pub async fn create_attribute(
        &self,
        owner: UserId,
        kind: AttributeKind,
        name: Option<&str>,
    ) -> Result<Attribute, Error> {
        let name = match name {
            None => return Err(Error::validation(vec![missing_field("name")])),
            Some(name) => validate_attribute_name(name)
                .map_err(|field_error| Error::validation(vec![field_error]))?,
        };

        self.attributes
            .insert(owner, kind, &name)
            .await
            .map_err(map_attribute_error)
    }

    /// List the caller's books, newest first, applying relational filters.
    pub async fn list_books(
        &self,
        owner: UserId,
        filter: &BookFilter,
    ) -> Result<Vec<Book>, Error> {
        self.books.list(owner, filter).await.map_err(map_book_error)
    }

    /// Fetch one of the caller's books.
    pub async fn get_book(&self, owner: UserId, id: i64) -> Result<Book, Error> {
        self.books
            .find(owner, id)
            .await
            .map_err(map_book_error)?
            .ok_or_else(book_not_found)
    }

    /// Fetch one of the caller's books with its tag and author records
    /// expanded, for detail views.
    pub async fn get_book_detail(&self, owner: UserId, id: i64) -> Result<BookDetail, Error> {
        let book = self.get_book(owner, id).await?;

        let mut tags = self
            .attributes
            .find_owned(owner, AttributeKind::Tag, &book.tag_ids)
            .await
            .map_err(map_attribute_error)?;
        let mut authors = self
            .attributes
            .find_owned(owner, AttributeKind::Author, &book.author_ids)
            .await
            .map_err(map_attribute_error)?;
        tags.sort_by_key(|attribute| attribute.id);
        authors.sort_by_key(|attribute| attribute.id);

        Ok(BookDetail {
            book,
            tags,
            authors,
        })
    }

    /// Create a book for the caller.
    ///
    /// Every field failure is collected before reporting, including
    /// unresolvable relation ids, so the caller sees the whole problem at
    /// once.
    pub async fn create_book(&self, owner: UserId, input: BookPatch) -> Result<Book, Error> {
        let mut errors = Vec::new();

        let draft = Self::validate_draft(&input, &mut errors);
        let tag_ids = self
            .resolve_refs(
                owner,
                AttributeKind::Tag,
                input.tag_ids.unwrap_or_default(),
                &mut errors,
            )
            .await?;
        let author_ids = self
            .resolve_refs(
                owner,
                AttributeKind::Author,
                input.author_ids.unwrap_or_default(),
                &mut errors,
            )
            .await?;

        let Some(draft) = draft else {
            return Err(Error::validation(errors));
        };
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        self.books
            .insert(NewBookRecord {
                owner,
                title: draft.title,
                pages: draft.pages,
                year: draft.year,
                price: draft.price,
                link: draft.link,
                tag_ids,
                author_ids,
            })
            .await
            .map_err(map_book_error)
    }

    /// Update one of the caller's books.
    ///
    /// The strategy decides what happens to relation lists the caller
    /// omitted: [`RelationStrategy::Replace`] clears them,
    /// [`RelationStrategy::Merge`] leaves them untouched. Scalars merge
    /// either way.
    pub async fn update_book(
        &self,
        owner: UserId,
        id: i64,
        patch: BookPatch,
        strategy: RelationStrategy,
    ) -> Result<Book, Error> {
        // Visibility gate first: a foreign book 404s before any validation
        // output could hint that it exists.
        self.get_book(owner, id).await?;

        let mut errors = Vec::new();
        let scalars = Self::validate_scalars(&patch, &mut errors);

        let tag_ids = match (strategy, patch.tag_ids) {
            (_, Some(ids)) => Some(
                self.resolve_refs(owner, AttributeKind::Tag, ids, &mut errors)
                    .await?,
            ),
            (RelationStrategy::Replace, None) => Some(BTreeSet::new()),
            (RelationStrategy::Merge, None) => None,
        };
        let author_ids = match (strategy, patch.author_ids) {
            (_, Some(ids)) => Some(
                self.resolve_refs(owner, AttributeKind::Author, ids, &mut errors)
                    .await?,
            ),
            (RelationStrategy::Replace, None) => Some(BTreeSet::new()),
            (RelationStrategy::Merge, None) => None,
        };

        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        let changes = BookChanges {
            title: scalars.title,
            pages: scalars.pages,
            year: scalars.year,
            price: scalars.price,
            link: scalars.link,
            tag_ids,
            author_ids,
        };

        self.books
            .update(owner, id, changes)
            .await
            .map_err(map_book_error)?
            .ok_or_else(book_not_found)
    }

    /// Delete one of the caller's books, cleaning up its cover image.
    pub async fn delete_book(&self, owner: UserId, id: i64) -> Result<(), Error> {
        let book = self.get_book(owner, id).await?;

        let deleted = self
            .books
            .delete(owner, id)
            .await
            .map_err(map_book_error)?;
        if !deleted {
            return Err(book_not_found());
        }

        if let Some(path) = book.cover_image {
            // The row is gone; a stale file is not worth failing the request.
            if let Err(error) = self.images.remove(&path).await {
                warn!(%error, path, "failed to remove cover image");
            }
        }
        Ok(())
    }

    /// Attach a cover image to one of the caller's books.
    ///
    /// The payload must carry a PNG or JPEG signature; anything else is
    /// rejected before touching storage.
    pub async fn attach_cover_image(
        &self,
        owner: UserId,
        id: i64,
        bytes: &[u8],
    ) -> Result<Book, Error> {
        let existing = self.get_book(owner, id).await?;

        let extension = sniff_image_extension(bytes).ok_or_else(invalid_image_error)?;
        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let path = self
            .images
            .store(&file_name, bytes)
            .await
            .map_err(map_image_error)?;

        let updated = self
            .books
            .set_cover_image(owner, id, Some(&path))
            .await
            .map_err(map_book_error)?
            .ok_or_else(book_not_found)?;

        if let Some(previous) = existing.cover_image {
            if let Err(error) = self.images.remove(&previous).await {
                warn!(%error, path = previous, "failed to remove replaced cover image");
            }
        }
        Ok(updated)
    }

    fn validate_draft(input: &BookPatch, errors: &mut Vec<FieldError>) -> Option<ValidatedDraft> {
        let title = match &input.title {
            Some(title) => push_err(validate_title(title), errors),
            None => {
                errors.push(missing_field("title"));
                None
            }
        };
        let pages = match input.pages {
            Some(pages) => push_err(validate_pages(pages).map(|()| pages), errors),
            None => {
                errors.push(missing_field("pages"));
                None
            }
        };
        let year = match input.year {
            Some(year) => push_err(validate_year(year, current_year()).map(|()| year), errors),
            None => {
                errors.push(missing_field("year"));
                None
            }
        };
        let price = match input.price {
            Some(price) => Some(price),
            None => {
                errors.push(missing_field("price"));
                None
            }
        };
        let link = push_err(validate_link(input.link.as_deref()), errors);

        match (title, pages, year, price, link) {
            (Some(title), Some(pages), Some(year), Some(price), link) if errors.is_empty() => {
                Some(ValidatedDraft {
                    title,
                    pages,
                    year,
                    price,
                    link: link.flatten(),
                })
            }
            _ => None,
        }
    }

    fn validate_scalars(patch: &BookPatch, errors: &mut Vec<FieldError>) -> ValidatedScalars {
        let mut scalars = ValidatedScalars::default();
        if let Some(title) = &patch.title {
            scalars.title = push_err(validate_title(title), errors);
        }
        if let Some(pages) = patch.pages {
            scalars.pages = push_err(validate_pages(pages).map(|()| pages), errors);
        }
        if let Some(year) = patch.year {
            scalars.year = push_err(validate_year(year, current_year()).map(|()| year), errors);
        }
        scalars.price = patch.price;
        if let Some(link) = &patch.link {
            scalars.link = push_err(validate_link(Some(link)), errors).flatten();
        }
        scalars
    }

    /// Resolve relation ids against the caller's own attributes.
    ///
    /// Unknown and foreign ids are reported together in one field error
    /// rather than silently dropped.
    async fn resolve_refs(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: Vec<i64>,
        errors: &mut Vec<FieldError>,
    ) -> Result<BTreeSet<i64>, Error> {
        let wanted: BTreeSet<i64> = ids.into_iter().collect();
        if wanted.is_empty() {
            return Ok(wanted);
        }

        let found = self
            .attributes
            .find_owned(owner, kind, &wanted)
            .await
            .map_err(map_attribute_error)?;
        let found_ids: BTreeSet<i64> = found.iter().map(|attribute| attribute.id).collect();

        let missing: Vec<String> = wanted
            .difference(&found_ids)
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            errors.push(FieldError::new(
                kind.field(),
                "unknown_id",
                format!("{} ids do not exist: {}", kind.noun(), missing.join(", ")),
            ));
        }
        Ok(wanted)
    }
}

fn push_err<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}
