//! SQLite Message Repository 実装

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::map_db_error;
use crate::domain::{
    ChatId, DELETED_MESSAGE_NOTICE, Message, MessageId, MessageRepository, NewMessage,
    RepositoryError, Timestamp, UserId, UserSummary,
};

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    chat_id: i64,
    message_text: Option<String>,
    image_url: Option<String>,
    created_at: i64,
    is_deleted: i64,
    sender_id: i64,
    username: String,
    first_name: String,
    last_name: String,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::new(row.id),
            chat_id: ChatId::new(row.chat_id),
            sender: UserSummary {
                id: UserId::new(row.sender_id),
                username: row.username,
                first_name: row.first_name,
                last_name: row.last_name,
            },
            message_text: row.message_text,
            image_url: row.image_url,
            created_at: Timestamp::new(row.created_at),
            is_deleted: row.is_deleted != 0,
        }
    }
}

const MESSAGE_SELECT: &str = "SELECT m.id, m.chat_id, m.message_text, m.image_url, m.created_at, \
        m.is_deleted, u.id AS sender_id, u.username, u.first_name, u.last_name \
    FROM messages m \
    JOIN users u ON u.id = m.sender_id";

/// SQLite 上のメッセージ Repository
pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO messages (chat_id, sender_id, message_text, image_url, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.chat_id().value())
        .bind(message.sender_id().value())
        .bind(message.text())
        .bind(message.image_url())
        .bind(message.created_at().value())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.find_by_id(MessageId::new(result.last_insert_rowid()))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?");
        let row: Option<MessageRow> = sqlx::query_as(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Message::from))
    }

    async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!("{MESSAGE_SELECT} WHERE m.chat_id = ? ORDER BY m.created_at, m.id");
        let rows: Vec<MessageRow> = sqlx::query_as(&sql)
            .bind(chat_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn mark_deleted(&self, id: MessageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE messages SET message_text = ?, image_url = NULL, is_deleted = 1 \
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(DELETED_MESSAGE_NOTICE)
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}
