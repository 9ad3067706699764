//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{
    NewUserRecord, StoredCredentials, UserChanges, UserRepository, UserRepositoryError,
};
use crate::domain::user::{EmailAddress, User, UserId};

use super::models::{NewUserRow, UserRow, UserUpdateRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        _ => UserRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain user.
///
/// A malformed stored email is a data integrity fault, surfaced as a query
/// error rather than a panic.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserRepositoryError::query(format!("invalid stored email: {err}")))?;
    Ok(User {
        id: UserId::new(row.id),
        email,
        name: row.name,
        is_active: row.is_active,
        is_staff: row.is_staff,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: NewUserRecord) -> Result<User, UserRepositoryError> {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            email: record.email.as_ref(),
            name: &record.name,
            password_hash: &record.password_hash,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|error| match error {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    UserRepositoryError::email_taken(record.email.as_ref())
                }
                other => map_diesel_error(other),
            })?;

        row_to_user(row)
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            let password_hash = row.password_hash.clone();
            row_to_user(row).map(|user| StoredCredentials {
                user,
                password_hash,
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_i64())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        if changes == UserChanges::default() {
            // Diesel rejects empty changesets; an empty patch is a no-op read.
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update = UserUpdateRow {
            name: changes.name.as_deref(),
            password_hash: changes.password_hash.as_deref(),
        };

        let row: Option<UserRow> = diesel::update(users::table.find(id.as_i64()))
            .set(&update)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, UserRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(repo_err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_rejects_malformed_emails() {
        let row = UserRow {
            id: 1,
            email: "not-an-email".to_owned(),
            name: "Test".to_owned(),
            password_hash: "hash".to_owned(),
            is_active: true,
            is_staff: false,
            created_at: chrono::Utc::now(),
        };

        let err = row_to_user(row).expect_err("invalid stored email");
        assert!(err.to_string().contains("invalid stored email"));
    }

    #[rstest]
    fn row_conversion_preserves_flags() {
        let row = UserRow {
            id: 7,
            email: "test@email.com".to_owned(),
            name: "Test".to_owned(),
            password_hash: "hash".to_owned(),
            is_active: false,
            is_staff: true,
            created_at: chrono::Utc::now(),
        };

        let user = row_to_user(row).expect("valid row");
        assert_eq!(user.id, UserId::new(7));
        assert!(!user.is_active);
        assert!(user.is_staff);
    }
}
