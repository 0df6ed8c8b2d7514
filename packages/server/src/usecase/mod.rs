//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod authenticate;
pub mod chat;
pub mod chat_subscription;
pub mod connect_participant;
pub mod delete_message;
pub mod disconnect_participant;
pub mod error;
pub mod login;
pub mod register;
pub mod relay_event;
pub mod search_users;
pub mod send_message;
pub mod send_otp;
pub mod verify_account;

pub use authenticate::AuthenticateUseCase;
pub use chat::{CreateChatUseCase, GetChatUseCase, ListChatsUseCase};
pub use chat_subscription::ChatSubscriptionUseCase;
pub use connect_participant::{AnnouncePresenceUseCase, ConnectParticipantUseCase};
pub use delete_message::DeleteMessageUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::UseCaseError;
pub use login::LoginUseCase;
pub use register::{RegisterOutcome, RegisterUseCase, RegistrationForm};
pub use relay_event::RelayEventUseCase;
pub use search_users::{GetProfileUseCase, GetUserUseCase, SearchUsersUseCase};
pub use send_message::{ImageUpload, SendMessageInput, SendMessageUseCase};
pub use send_otp::SendOtpUseCase;
pub use verify_account::VerifyAccountUseCase;
