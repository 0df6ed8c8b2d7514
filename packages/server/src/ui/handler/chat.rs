//! Chat endpoints under `/api/chats`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};

use super::authenticate;
use crate::{
    domain::{ChatId, ConnectionId, DELETED_MESSAGE_NOTICE, MessageId},
    infrastructure::dto::http::{
        ChatDetailResponse, ChatDto, ChatResponse, ChatSummaryDto, ChatsResponse,
        CreateChatRequest, DeleteMessageQuery, DeleteMessageResponse, MessageDto,
        MessageResponse, MessagesResponse, UserIdQuery,
    },
    ui::{error::ApiError, state::AppState},
    usecase::{
        CreateChatUseCase, DeleteMessageUseCase, GetChatUseCase, ImageUpload, ListChatsUseCase,
        SendMessageInput, SendMessageUseCase, UseCaseError,
    },
};

/// `GET /api/chats?userId=`
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<ChatsResponse>, ApiError> {
    let Query(query) = query?;
    let user = authenticate(&state, query.user_id).await?;
    let chats = ListChatsUseCase::new(state.chats.clone())
        .execute(user.id)
        .await?;
    Ok(Json(ChatsResponse {
        chats: chats.iter().map(ChatSummaryDto::from).collect(),
    }))
}

/// `POST /api/chats {userId, otherUserId}`
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let user = authenticate(&state, request.user_id).await?;
    let chat = CreateChatUseCase::new(state.users.clone(), state.chats.clone())
        .execute(user.id, request.other_user_id)
        .await?;
    Ok(Json(ChatResponse {
        chat: ChatDto::from(&chat),
    }))
}

/// `GET /api/chats/:id?userId=`
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<ChatDetailResponse>, ApiError> {
    let Path(chat_id) = path?;
    let Query(query) = query?;
    let user = authenticate(&state, query.user_id).await?;
    let (chat, messages) = GetChatUseCase::new(state.chats.clone(), state.messages.clone())
        .execute(ChatId::new(chat_id), user.id)
        .await?;
    Ok(Json(ChatDetailResponse {
        chat: ChatDto::from(&chat),
        messages: messages.iter().map(MessageDto::from).collect(),
    }))
}

/// `GET /api/chats/:id/messages?userId=`
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let Path(chat_id) = path?;
    let Query(query) = query?;
    let user = authenticate(&state, query.user_id).await?;
    let messages = GetChatUseCase::new(state.chats.clone(), state.messages.clone())
        .messages(ChatId::new(chat_id), user.id)
        .await?;
    Ok(Json(MessagesResponse {
        messages: messages.iter().map(MessageDto::from).collect(),
    }))
}

/// Fields of the send-message multipart form
#[derive(Debug, Default)]
struct MessageForm {
    user_id: Option<i64>,
    message_text: Option<String>,
    image: Option<ImageUpload>,
}

async fn read_message_form(mut multipart: Multipart) -> Result<MessageForm, ApiError> {
    let mut form = MessageForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("userId") => {
                let text = field.text().await?;
                form.user_id = Some(text.trim().parse().map_err(|_| {
                    UseCaseError::Auth("Invalid user".to_string())
                })?);
            }
            Some("message_text") => form.message_text = Some(field.text().await?),
            Some("image") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        bytes: bytes.to_vec(),
                        content_type,
                    });
                }
            }
            other => tracing::debug!("Ignoring multipart field {:?}", other),
        }
    }
    Ok(form)
}

/// `POST /api/chats/:id/messages` (multipart `userId`, `message_text?`, `image?`)
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(chat_id) = path?;
    let form = read_message_form(multipart?).await?;
    let user = authenticate(&state, form.user_id).await?;

    let message = SendMessageUseCase::new(
        state.chats.clone(),
        state.messages.clone(),
        state.images.clone(),
        state.hub.clone(),
    )
    .execute(SendMessageInput {
        chat_id: ChatId::new(chat_id),
        sender: user.id,
        text: form.message_text,
        image: form.image,
    })
    .await?;

    Ok(Json(MessageResponse {
        message: MessageDto::from(&message),
    }))
}

/// `DELETE /api/chats/:chatId/messages/:messageId?userId=&connectionId=`
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    query: Result<Query<DeleteMessageQuery>, QueryRejection>,
) -> Result<Json<DeleteMessageResponse>, ApiError> {
    let Path((chat_id, message_id)) = path?;
    let Query(query) = query?;
    let user = authenticate(&state, query.user_id).await?;
    let origin = query
        .connection_id
        .as_deref()
        .map(ConnectionId::parse)
        .transpose()
        .map_err(UseCaseError::from)?;

    DeleteMessageUseCase::new(
        state.messages.clone(),
        state.images.clone(),
        state.hub.clone(),
    )
    .execute(
        ChatId::new(chat_id),
        MessageId::new(message_id),
        user.id,
        origin,
    )
    .await?;

    Ok(Json(DeleteMessageResponse {
        deleted: true,
        notice: Some(DELETED_MESSAGE_NOTICE.to_string()),
    }))
}
