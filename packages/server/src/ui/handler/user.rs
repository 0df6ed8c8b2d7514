//! User endpoints under `/api/users`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};

use super::authenticate;
use crate::{
    domain::UserId,
    infrastructure::dto::http::{
        ProfileDto, SearchQuery, UserDto, UserIdQuery, UserResponse, UserSearchDto, UsersResponse,
    },
    ui::{error::ApiError, state::AppState},
    usecase::{GetProfileUseCase, GetUserUseCase, SearchUsersUseCase},
};

/// `GET /api/users/search?username=&userId=`
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<UsersResponse>, ApiError> {
    let Query(query) = query?;
    let requester = authenticate(&state, query.user_id).await?;
    let users = SearchUsersUseCase::new(state.users.clone())
        .execute(requester.id, query.username)
        .await?;
    Ok(Json(UsersResponse {
        users: users.iter().map(UserSearchDto::from).collect(),
    }))
}

/// `GET /api/users/:id?userId=`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Query(query) = query?;
    authenticate(&state, query.user_id).await?;
    let user = GetUserUseCase::new(state.users.clone())
        .execute(UserId::new(id))
        .await?;
    Ok(Json(UserResponse {
        message: None,
        user: UserDto::from(&user),
    }))
}

/// `GET /api/users/by-username/:username`
pub async fn profile_by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ProfileDto>, ApiError> {
    let profile = GetProfileUseCase::new(state.users.clone())
        .execute(&username)
        .await?;
    Ok(Json(ProfileDto::from(&profile)))
}
