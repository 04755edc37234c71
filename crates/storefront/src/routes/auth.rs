//! Authentication route handlers.
//!
//! JSON endpoints backing the client's sign-in. A successful register or
//! login stores a [`CurrentUser`] in the session; the session cookie is what
//! the cart and wishlist endpoints authenticate against.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Register and login request body.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

async fn sign_in(session: &Session, user: CurrentUser) -> Result<Json<CurrentUser>> {
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(Json(user))
}

/// `POST /auth/register` - create an account and sign in.
///
/// Responds `201` with `{id, email}`.
#[tracing::instrument(skip_all, fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .register_with_password(&body.email, &body.password)
        .await?;

    let body = sign_in(&session, CurrentUser::from(&user)).await?;
    Ok((StatusCode::CREATED, body).into_response())
}

/// `POST /auth/login` - sign in with email and password.
///
/// Responds `200` with `{id, email}`, or `401` for bad credentials.
#[tracing::instrument(skip_all, fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<Json<CurrentUser>> {
    let user = AuthService::new(state.pool())
        .login_with_password(&body.email, &body.password)
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::info!("Rejected login");
            }
        })?;

    sign_in(&session, CurrentUser::from(&user)).await
}

/// `POST /auth/logout` - end the session. Always `204`.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me` - the signed-in account.
///
/// Responds `401` if the session is missing or the account no longer exists.
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Json<CurrentUser>> {
    match AuthService::new(state.pool()).get_user(current.id).await {
        Ok(user) => Ok(Json(CurrentUser::from(&user))),
        Err(AuthError::UserNotFound) => {
            clear_current_user(&session).await?;
            Err(AppError::Unauthorized("account no longer exists".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            email: "ada@sparklab.store".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("ada@sparklab.store"));
        assert!(!debug.contains("hunter2"));
    }
}
