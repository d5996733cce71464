use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::{extract::AppJson, AppState};
use crate::{error::AppResult, services::auth};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub message: &'static str,
    pub user: AccountView,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let user = auth::register(
        state.users.as_ref(),
        body.username.as_deref().unwrap_or_default(),
        body.email.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
        state.bcrypt_cost,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            message: "User created",
            user: AccountView {
                id: user.id,
                username: user.username,
                created_at: None,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<AccountResponse>> {
    let user = auth::login(
        state.users.as_ref(),
        body.username.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok(Json(AccountResponse {
        message: "Login successful",
        user: AccountView {
            id: user.id,
            username: user.username,
            created_at: Some(user.created_at),
        },
    }))
}
