//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    Chat, ChatId, ChatPair, ChatSummary, Email, Message, MessageId, NewMessage, NewUser, OtpCode,
    OtpVerification, Profile, RepositoryError, Timestamp, User, UserCredentials, UserId,
};

/// User Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを作成
    ///
    /// username / email の一意制約違反は `RepositoryError::Conflict` になる
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// ID でユーザーを取得
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// ログイン用にパスワードハッシュ付きでユーザーを取得
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError>;

    /// ユーザー名が使用済みか
    async fn username_taken(&self, username: &str) -> Result<bool, RepositoryError>;

    /// メールアドレスが使用済みか
    async fn email_taken(&self, email: &str) -> Result<bool, RepositoryError>;

    /// ユーザー名の部分一致検索（大文字小文字を区別しない、`exclude` を除く）
    async fn search(
        &self,
        term: &str,
        exclude: UserId,
        limit: i64,
    ) -> Result<Vec<User>, RepositoryError>;

    /// ユーザー名で公開プロフィールを取得
    async fn find_profile(&self, username: &str) -> Result<Option<Profile>, RepositoryError>;
}

/// Chat Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// ペアのチャットを取得、なければ作成
    ///
    /// 同じペアへの同時呼び出しでも行は 1 つだけになること
    async fn find_or_create(
        &self,
        pair: ChatPair,
        created_at: Timestamp,
    ) -> Result<Chat, RepositoryError>;

    /// `user` が参加者であるチャットを ID で取得
    async fn find_for_participant(
        &self,
        chat_id: ChatId,
        user: UserId,
    ) -> Result<Option<Chat>, RepositoryError>;

    /// `user` のチャット一覧（最新アクティビティ順）
    async fn list_for_user(&self, user: UserId) -> Result<Vec<ChatSummary>, RepositoryError>;
}

/// Message Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存し、送信者情報付きで返す
    async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// ID でメッセージを取得
    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// チャットのメッセージを作成順で取得
    async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError>;

    /// 論理削除する。状態が変わった場合のみ `true`
    async fn mark_deleted(&self, id: MessageId) -> Result<bool, RepositoryError>;
}

/// OTP Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// 検証コードを保存
    async fn save(
        &self,
        otp: OtpVerification,
        created_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// 有効期限内・未使用のコードを検証済みにする。一致するコードがあれば `true`
    async fn consume(
        &self,
        email: &Email,
        code: &OtpCode,
        now: Timestamp,
    ) -> Result<bool, RepositoryError>;
}
