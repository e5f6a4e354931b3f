use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

use crate::entities::users;

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub contact_details: String,
    pub email: String,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            contact_details: model.contact_details,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

/// A row ready for insertion. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub address: String,
    pub contact_details: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(User),

    /// The unique index on `email` rejected the row.
    DuplicateEmail,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn count_by_email(&self, email: &str) -> Result<u64> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to count users by email")
    }

    pub async fn insert(&self, record: NewUserRecord) -> Result<InsertOutcome> {
        let active = users::ActiveModel {
            name: Set(record.name),
            address: Set(record.address),
            contact_details: Set(record.contact_details),
            email: Set(record.email),
            password_hash: Set(record.password_hash),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(InsertOutcome::Inserted(User::from(model))),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(InsertOutcome::DuplicateEmail)
            }
            Err(err) => Err(err).context("Failed to insert user"),
        }
    }
}
