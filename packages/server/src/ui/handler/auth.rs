//! Account endpoints under `/api/auth`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::{
        AccountCreationRequest, LoginRequest, MessageOnlyResponse, OtpSentResponse,
        RegisterRequest, SendOtpRequest, UserDto, UserResponse,
    },
    ui::{error::ApiError, state::AppState},
    usecase::{
        LoginUseCase, RegisterOutcome, RegisterUseCase, RegistrationForm, SendOtpUseCase,
        VerifyAccountUseCase,
    },
};

impl From<RegisterRequest> for RegistrationForm {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password,
            bio: request.bio,
        }
    }
}

fn created(user: &crate::domain::User) -> Response {
    (
        StatusCode::CREATED,
        Json(UserResponse {
            message: Some("User created successfully".to_string()),
            user: UserDto::from(user),
        }),
    )
        .into_response()
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let usecase = RegisterUseCase::new(
        state.users.clone(),
        state.otps.clone(),
        state.mailer.clone(),
        state.hasher.clone(),
        state.email_verification,
    );

    match usecase.execute(request.into()).await? {
        RegisterOutcome::Created(user) => Ok(created(&user)),
        RegisterOutcome::VerificationSent(email) => Ok((
            StatusCode::ACCEPTED,
            Json(OtpSentResponse {
                message: "Verification code sent to your email".to_string(),
                email: email.as_str().to_string(),
            }),
        )
            .into_response()),
    }
}

/// `POST /api/auth/accountCreation`
pub async fn account_creation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AccountCreationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let user = VerifyAccountUseCase::new(
        state.users.clone(),
        state.otps.clone(),
        state.hasher.clone(),
    )
    .execute(
        request.email,
        request.entered_code,
        request.user_data.map(RegistrationForm::from),
    )
    .await?;
    Ok(created(&user))
}

/// `POST /api/auth/sendOtp`
pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<MessageOnlyResponse>, ApiError> {
    let Json(request) = payload?;
    SendOtpUseCase::new(state.otps.clone(), state.mailer.clone())
        .execute(request.email)
        .await?;
    Ok(Json(MessageOnlyResponse {
        message: "OTP sent successfully".to_string(),
    }))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    let user = LoginUseCase::new(state.users.clone(), state.hasher.clone())
        .execute(request.username, request.password)
        .await?;
    Ok(Json(UserResponse {
        message: Some("Login successful".to_string()),
        user: UserDto::from(&user),
    }))
}

/// `POST /api/auth/logout`
///
/// Sessions are client-side only, so there is nothing to revoke.
pub async fn logout() -> Json<MessageOnlyResponse> {
    Json(MessageOnlyResponse {
        message: "Logout successful".to_string(),
    })
}
