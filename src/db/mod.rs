use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::user::{InsertOutcome, NewUserRecord, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        ensure_sqlite_file(db_url).await?;

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .with_context(|| format!("Failed to connect to database at {db_url}"))?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply database migrations")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Closes the pool. Clones of this store become unusable afterwards.
    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .context("Failed to close database connection")?;
        info!("Database connection closed");
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn insert_user(&self, record: NewUserRecord) -> Result<InsertOutcome> {
        self.user_repo().insert(record).await
    }

    pub async fn count_users_with_email(&self, email: &str) -> Result<u64> {
        self.user_repo().count_by_email(email).await
    }
}

/// `SQLite` refuses to open a missing file in read-write mode, so create it
/// (and its parent directory) up front.
async fn ensure_sqlite_file(db_url: &str) -> Result<()> {
    let Some(path_str) = db_url.strip_prefix("sqlite:") else {
        return Ok(());
    };

    let path_str = path_str.trim_start_matches("//");
    let path_str = path_str.split('?').next().unwrap_or_default();

    if path_str.is_empty() || path_str.starts_with(":memory:") {
        return Ok(());
    }

    let path = Path::new(path_str);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }

    if !path.exists() {
        tokio::fs::File::create(path)
            .await
            .with_context(|| format!("Failed to create database file {}", path.display()))?;
    }

    Ok(())
}
