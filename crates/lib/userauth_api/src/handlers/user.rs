//! User account request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use userauth_core::models::auth::UserProfile;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::BearerToken;
use crate::models::{
    AccessTokenResponse, CredentialsRequest, RefreshRequest, SignUpResponse, TokenPairResponse,
};

/// `POST /user/signUp`: create a new user account.
pub async fn sign_up_handler(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SignUpResponse>)> {
    let Json(body) = body?;
    state.auth.register(&body.email, &body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            msg: "User Created Successfully".into(),
        }),
    ))
}

/// `POST /user/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<TokenPairResponse>> {
    let Json(body) = body?;
    let pair = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// `POST /user/refresh`: exchange a refresh token for a new access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<AccessTokenResponse>> {
    let Json(body) = body?;
    let access_token = state.auth.renew_access_token(&body.refresh_token)?;
    Ok(Json(AccessTokenResponse { access_token }))
}

/// `GET /user/me`: profile of the access token's owner.
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.auth.profile_by_token(&token).await?;
    Ok(Json(profile))
}
