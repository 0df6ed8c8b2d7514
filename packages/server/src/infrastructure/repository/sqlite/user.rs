//! SQLite User Repository 実装

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{escape_like, map_db_error};
use crate::domain::{
    NewUser, Profile, RepositoryError, User, UserCredentials, UserId, UserRepository,
};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    bio: Option<String>,
    profile_picture: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            bio: row.bio,
            profile_picture: row.profile_picture,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    username: String,
    first_name: String,
    last_name: String,
    bio: Option<String>,
    profile_picture: Option<String>,
    total_chats: i64,
}

/// Case-folded username stored alongside the original.
///
/// SQLite's `LOWER` only folds ASCII, so folding happens here for both the
/// stored column and the search term.
fn search_key(username: &str) -> String {
    username.to_lowercase()
}

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, bio, profile_picture";

/// SQLite 上のユーザー Repository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, column: &str, value: &str) -> Result<bool, RepositoryError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM users WHERE {column} = ?)");
        let (exists,): (i64,) = sqlx::query_as(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(exists != 0)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (username, username_search, first_name, last_name, email, password_hash, bio, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.username.as_str())
        .bind(search_key(user.username.as_str()))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(user.created_at.value())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            username: user.username.into_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.as_str().to_string(),
            bio: user.bio,
            profile_picture: None,
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(User::from))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?");
        let row: Option<CredentialsRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(|row| UserCredentials {
            user: User::from(row.user),
            password_hash: row.password_hash,
        }))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, RepositoryError> {
        self.exists("username", username).await
    }

    async fn email_taken(&self, email: &str) -> Result<bool, RepositoryError> {
        self.exists("email", email).await
    }

    async fn search(
        &self,
        term: &str,
        exclude: UserId,
        limit: i64,
    ) -> Result<Vec<User>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(&search_key(term)));
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE username_search LIKE ? ESCAPE '\\' AND id != ? \
             ORDER BY username LIMIT ?"
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(pattern)
            .bind(exclude.value())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_profile(&self, username: &str) -> Result<Option<Profile>, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT u.username, u.first_name, u.last_name, u.bio, u.profile_picture, \
                    (SELECT COUNT(*) FROM chats c WHERE c.user1_id = u.id OR c.user2_id = u.id) AS total_chats \
             FROM users u WHERE u.username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|row| Profile {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            bio: row.bio,
            profile_picture: row.profile_picture,
            total_chats: row.total_chats,
        }))
    }
}
