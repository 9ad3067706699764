//! Domain entities, services, and ports.
//!
//! Everything in this module is transport- and storage-agnostic. The two
//! services ([`CatalogService`], [`AccountService`]) hold the business rules;
//! the `ports` submodule defines the traits adapters implement.

pub mod account;
pub mod catalog;
pub mod error;
pub mod ports;
pub mod user;

pub use self::account::{AccountService, ProfilePatch, RegistrationInput};
pub use self::catalog::{
    Attribute, AttributeKind, Book, BookDetail, BookFilter, BookPatch, CatalogService, Price,
    RelationStrategy, parse_id_filter,
};
pub use self::error::{Error, ErrorCode, FieldError};
pub use self::user::{EmailAddress, User, UserId};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
