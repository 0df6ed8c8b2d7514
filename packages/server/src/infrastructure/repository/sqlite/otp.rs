//! SQLite OTP Repository 実装

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::map_db_error;
use crate::domain::{Email, OtpCode, OtpRepository, OtpVerification, RepositoryError, Timestamp};

/// SQLite 上のメール認証コード Repository
pub struct SqliteOtpRepository {
    pool: SqlitePool,
}

impl SqliteOtpRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for SqliteOtpRepository {
    async fn save(
        &self,
        otp: OtpVerification,
        created_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO otp_verifications (email, code, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(otp.email.as_str())
        .bind(otp.code.as_str())
        .bind(otp.expires_at.value())
        .bind(created_at.value())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }

    async fn consume(
        &self,
        email: &Email,
        code: &OtpCode,
        now: Timestamp,
    ) -> Result<bool, RepositoryError> {
        // 最新の有効なコードだけが照合対象
        let result = sqlx::query(
            "UPDATE otp_verifications SET verified = 1 \
             WHERE code = ? AND id = ( \
                SELECT id FROM otp_verifications \
                WHERE email = ? AND verified = 0 AND expires_at > ? \
                ORDER BY created_at DESC, id DESC LIMIT 1)",
        )
        .bind(code.as_str())
        .bind(email.as_str())
        .bind(now.value())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::sqlite::test_support::pool;

    fn otp(code: &str, expires_at: i64) -> OtpVerification {
        OtpVerification {
            email: Email::new("alice@example.com".to_string()).unwrap(),
            code: OtpCode::new(code.to_string()).unwrap(),
            expires_at: Timestamp::new(expires_at),
        }
    }

    fn email() -> Email {
        Email::new("alice@example.com".to_string()).unwrap()
    }

    fn code(value: &str) -> OtpCode {
        OtpCode::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_consume_valid_code_once() {
        // テスト項目: 有効なコードは 1 回だけ検証できる
        // given (前提条件):
        let repo = SqliteOtpRepository::new(pool().await);
        repo.save(otp("123456", 1_000), Timestamp::new(0)).await.unwrap();

        // when (操作):
        let first = repo.consume(&email(), &code("123456"), Timestamp::new(500)).await.unwrap();
        let second = repo.consume(&email(), &code("123456"), Timestamp::new(500)).await.unwrap();

        // then (期待する結果):
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_consume_rejects_wrong_or_expired_code() {
        // テスト項目: 不一致・期限切れのコードは検証できない
        let repo = SqliteOtpRepository::new(pool().await);
        repo.save(otp("123456", 1_000), Timestamp::new(0)).await.unwrap();

        assert!(!repo.consume(&email(), &code("654321"), Timestamp::new(500)).await.unwrap());
        assert!(!repo.consume(&email(), &code("123456"), Timestamp::new(1_000)).await.unwrap());
    }

    #[tokio::test]
    async fn test_consume_only_newest_code_counts() {
        // テスト項目: 再送後は古いコードが使えない
        // given (前提条件):
        let repo = SqliteOtpRepository::new(pool().await);
        repo.save(otp("111111", 10_000), Timestamp::new(0)).await.unwrap();
        repo.save(otp("222222", 10_000), Timestamp::new(100)).await.unwrap();

        // when (操作):
        let old = repo.consume(&email(), &code("111111"), Timestamp::new(200)).await.unwrap();
        let new = repo.consume(&email(), &code("222222"), Timestamp::new(200)).await.unwrap();

        // then (期待する結果):
        assert!(!old);
        assert!(new);
    }
}
