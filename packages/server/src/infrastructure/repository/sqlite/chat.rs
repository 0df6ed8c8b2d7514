//! SQLite Chat Repository 実装

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::map_db_error;
use crate::domain::{
    Chat, ChatId, ChatPair, ChatRepository, ChatSummary, LatestMessage, RepositoryError,
    Timestamp, UserId, UserSummary,
};

#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: i64,
    created_at: i64,
    user1_id: i64,
    user1_username: String,
    user1_first_name: String,
    user1_last_name: String,
    user2_id: i64,
    user2_username: String,
    user2_first_name: String,
    user2_last_name: String,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        Self {
            id: ChatId::new(row.id),
            user1: UserSummary {
                id: UserId::new(row.user1_id),
                username: row.user1_username,
                first_name: row.user1_first_name,
                last_name: row.user1_last_name,
            },
            user2: UserSummary {
                id: UserId::new(row.user2_id),
                username: row.user2_username,
                first_name: row.user2_first_name,
                last_name: row.user2_last_name,
            },
            created_at: Timestamp::new(row.created_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChatSummaryRow {
    #[sqlx(flatten)]
    chat: ChatRow,
    latest_text: Option<String>,
    latest_created_at: Option<i64>,
    latest_sender_id: Option<i64>,
}

impl From<ChatSummaryRow> for ChatSummary {
    fn from(row: ChatSummaryRow) -> Self {
        let latest_message = match (row.latest_created_at, row.latest_sender_id) {
            (Some(created_at), Some(sender_id)) => Some(LatestMessage {
                message_text: row.latest_text,
                created_at: Timestamp::new(created_at),
                sender_id: UserId::new(sender_id),
            }),
            _ => None,
        };
        Self {
            chat: Chat::from(row.chat),
            latest_message,
        }
    }
}

const CHAT_SELECT: &str = "SELECT c.id, c.created_at, \
        u1.id AS user1_id, u1.username AS user1_username, \
        u1.first_name AS user1_first_name, u1.last_name AS user1_last_name, \
        u2.id AS user2_id, u2.username AS user2_username, \
        u2.first_name AS user2_first_name, u2.last_name AS user2_last_name \
    FROM chats c \
    JOIN users u1 ON u1.id = c.user1_id \
    JOIN users u2 ON u2.id = c.user2_id";

/// SQLite 上のチャット Repository
pub struct SqliteChatRepository {
    pool: SqlitePool,
}

impl SqliteChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for SqliteChatRepository {
    async fn find_or_create(
        &self,
        pair: ChatPair,
        created_at: Timestamp,
    ) -> Result<Chat, RepositoryError> {
        // 同時作成は一意制約で 1 行に収束する
        sqlx::query(
            "INSERT INTO chats (user1_id, user2_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (user1_id, user2_id) DO NOTHING",
        )
        .bind(pair.first().value())
        .bind(pair.second().value())
        .bind(created_at.value())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        let sql = format!("{CHAT_SELECT} WHERE c.user1_id = ? AND c.user2_id = ?");
        let row: Option<ChatRow> = sqlx::query_as(&sql)
            .bind(pair.first().value())
            .bind(pair.second().value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.map(Chat::from).ok_or(RepositoryError::NotFound)
    }

    async fn find_for_participant(
        &self,
        chat_id: ChatId,
        user: UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let sql = format!("{CHAT_SELECT} WHERE c.id = ? AND (c.user1_id = ? OR c.user2_id = ?)");
        let row: Option<ChatRow> = sqlx::query_as(&sql)
            .bind(chat_id.value())
            .bind(user.value())
            .bind(user.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Chat::from))
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<ChatSummary>, RepositoryError> {
        let sql = "SELECT c.id, c.created_at, \
                u1.id AS user1_id, u1.username AS user1_username, \
                u1.first_name AS user1_first_name, u1.last_name AS user1_last_name, \
                u2.id AS user2_id, u2.username AS user2_username, \
                u2.first_name AS user2_first_name, u2.last_name AS user2_last_name, \
                lm.message_text AS latest_text, lm.created_at AS latest_created_at, \
                lm.sender_id AS latest_sender_id \
            FROM chats c \
            JOIN users u1 ON u1.id = c.user1_id \
            JOIN users u2 ON u2.id = c.user2_id \
            LEFT JOIN messages lm ON lm.id = ( \
                SELECT m.id FROM messages m WHERE m.chat_id = c.id \
                ORDER BY m.created_at DESC, m.id DESC LIMIT 1) \
            WHERE c.user1_id = ? OR c.user2_id = ? \
            ORDER BY COALESCE(lm.created_at, c.created_at) DESC, c.id DESC";
        let rows: Vec<ChatSummaryRow> = sqlx::query_as(sql)
            .bind(user.value())
            .bind(user.value())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(ChatSummary::from).collect())
    }
}
