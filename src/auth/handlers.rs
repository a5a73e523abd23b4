use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument, warn};

use crate::{
    auth::dto::{LoginRequest, LoginResponse},
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        warn!("login for unknown email");
        return Err(ApiError::NotFound("User not found"));
    };

    let hasher = state.hasher.clone();
    let digest = user.password_hash;
    let plain = payload.password;
    let valid = tokio::task::spawn_blocking(move || hasher.verify(&plain, &digest))
        .await
        .context("verify task panicked")??;

    if !valid {
        warn!(user_id = user.id, "login invalid password");
        return Ok((StatusCode::UNAUTHORIZED, Json(LoginResponse::rejected())));
    }

    info!(user_id = user.id, "user logged in");
    Ok((StatusCode::OK, Json(LoginResponse::accepted(user.id))))
}
