use anyhow::Context;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument};

use super::{
    dto::CreateUserForm,
    repo_types::{NewUser, UserProfile},
};
use crate::{error::ApiError, state::AppState};

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user))
}

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/users/:user_id", get(get_user))
}

/// POST /users (multipart: name, email, password, optional profilePicture file)
#[instrument(skip(state, mp))]
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(mut mp, _): WithRejection<Multipart, ApiError>,
) -> Result<(StatusCode, HeaderMap, Json<UserProfile>), ApiError> {
    let mut form = CreateUserForm::read(&mut mp)
        .await
        .context("read create-user form")?;
    let creds = form.take_credentials()?;

    let profile_picture = match form.profile_picture {
        Some(upload) => Some(
            state
                .storage
                .put_object(&upload.file_name, upload.body)
                .await
                .context("store profile picture")?,
        ),
        None => None,
    };

    let hasher = state.hasher.clone();
    let password = creds.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("hash task panicked")??;

    let user = state
        .users
        .create(NewUser {
            name: creds.name,
            email: creds.email,
            password_hash,
            profile_picture,
        })
        .await?;

    info!(user_id = user.id, "user created");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        HeaderValue::from_str(&format!("/users/{}", user.id)).context("location header")?,
    );

    Ok((StatusCode::CREATED, headers, Json(UserProfile::from(user))))
}

/// GET /users/:user_id. Ids that are not integers cannot exist, so they 404 too.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let Ok(id) = user_id.parse::<i64>() else {
        return Err(ApiError::NotFound("User not found"));
    };

    state
        .users
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User not found"))
}
