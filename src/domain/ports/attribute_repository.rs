//! Port for tag and author persistence.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::catalog::{Attribute, AttributeKind};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by attribute repository adapters.
    pub enum AttributeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "attribute repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "attribute repository query failed: {message}",
    }
}

/// Port for tag and author storage and retrieval.
///
/// Every operation is scoped to an owner; an adapter must never return or
/// touch another user's rows, whatever the other arguments say. Ordering of
/// listings is part of the contract: name descending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// List the owner's attributes of one kind, ordered by name descending.
    ///
    /// With `assigned_only`, restrict to attributes linked to at least one of
    /// the owner's books; each attribute appears exactly once regardless of
    /// how many books reference it.
    async fn list(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError>;

    /// Insert a new attribute stamped with the owner.
    async fn insert(
        &self,
        owner: UserId,
        kind: AttributeKind,
        name: &str,
    ) -> Result<Attribute, AttributeRepositoryError>;

    /// Fetch the subset of `ids` that exist and belong to `owner`.
    ///
    /// Missing and foreign ids are simply absent from the result; the caller
    /// decides whether that is an error.
    async fn find_owned(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: &BTreeSet<i64>,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError>;
}
