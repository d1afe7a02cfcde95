use super::{CredentialStore, NewUser, Role, StoreError, UserChanges, UserRecord};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{debug, Instrument};

const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const SELECT_USER: &str = r"
    SELECT id, name, email, password_hash, role, active
    FROM users
";

/// `users` table backed store. See `sql/schema.sql`.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table and indexes if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = role.parse::<Role>().map_err(|err| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: err.into(),
    })?;

    Ok(UserRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role,
        active: row.try_get("active")?,
    })
}

fn map_unique_violation(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Duplicate(email.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("{SELECT_USER} WHERE email = $1 LIMIT 1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("{SELECT_USER} WHERE email = $1 AND active LIMIT 1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS taken")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("taken")?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("{SELECT_USER} WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let query = format!("{SELECT_USER} ORDER BY id");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let query = r"
            INSERT INTO users (name, email, password_hash, role, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, active
        ";
        let row = sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.active)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_unique_violation(err, &user.email))?;

        debug!(user_id = row.try_get::<i64, _>("id").ok(), "user inserted");

        Ok(user_from_row(&row)?)
    }

    async fn update(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        // COALESCE keeps the stored hash when no new password was supplied.
        let query = r"
            UPDATE users
            SET name = $2,
                email = $3,
                role = $4,
                active = $5,
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, active
        ";
        let row = sqlx::query(query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.email)
            .bind(changes.role.as_str())
            .bind(changes.active)
            .bind(changes.password_hash.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| map_unique_violation(err, &changes.email))?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span =
            tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}
