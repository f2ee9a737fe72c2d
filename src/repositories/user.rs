//! # User Repository
//!
//! Account management. Creating a user also appends an activity log record
//! in the same transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};

use super::{LogRepository, NAME_MAX_LEN, require_bounded, require_email};
use crate::error::RepositoryError;
use crate::models::user::{self, ActiveModel as UserActiveModel, Model as UserModel, Role};
use crate::models::User;
use crate::password::PasswordHasher;

/// Request data for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    /// Plaintext; hashed before it reaches the store
    pub password: String,
    /// `admin` or `enseignant`; defaults to `enseignant`
    pub role: Option<String>,
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a user and its `user_created` log record atomically.
    pub async fn create_user(
        &self,
        hasher: &PasswordHasher,
        request: NewUser,
    ) -> Result<UserModel, RepositoryError> {
        let last_name = require_bounded("last_name", &request.last_name, NAME_MAX_LEN)?;
        let first_name = require_bounded("first_name", &request.first_name, NAME_MAX_LEN)?;
        let email = require_email(&request.email)?;
        if request.password.is_empty() {
            return Err(RepositoryError::validation_error("password must not be empty"));
        }
        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => Role::default(),
            Some(raw) => raw.parse::<Role>().map_err(RepositoryError::Validation)?,
        };

        let password_hash = hasher.hash(&request.password);

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let existing = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        if existing.is_some() {
            return Err(RepositoryError::conflict(format!(
                "email '{email}' is already registered"
            )));
        }

        let created = UserActiveModel {
            last_name: Set(last_name),
            first_name: Set(first_name),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role),
            last_login_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        LogRepository::append(
            &txn,
            "user_created",
            Some(format!("Added {}", created.full_name())),
        )
        .await?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(user_id = created.id, role = %created.role, "User created");
        Ok(created)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::Email.eq(email.trim()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All users ordered by id
    pub async fn list_users(&self) -> Result<Vec<UserModel>, RepositoryError> {
        User::find()
            .order_by_asc(user::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Stamp the last successful login time.
    pub async fn record_login(&self, user_id: i32) -> Result<(), RepositoryError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = User::update_many()
            .col_expr(user::Column::LastLoginAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!("user {user_id}")));
        }
        Ok(())
    }
}
