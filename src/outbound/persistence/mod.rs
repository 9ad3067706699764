//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here; in
//!   particular, ownership scoping is expressed as plain predicates the
//!   domain asked for, never inferred.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed to
//!   the domain layer.
//! - **Strongly typed errors**: all database errors are mapped to the port
//!   error types.

mod diesel_attribute_repository;
mod diesel_book_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_attribute_repository::DieselAttributeRepository;
pub use diesel_book_repository::DieselBookRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
