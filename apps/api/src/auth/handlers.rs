use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::accounts::NewAccount;
use crate::auth::session::{AuthSession, Session};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::account::{AccountRow, AccountView};
use crate::models::catalog::SignupRole;
use crate::onboarding::form::{Field, FieldErrors};
use crate::onboarding::validation::check_email;
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: AccountView,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: Session,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

fn validate_sign_up(req: &SignUpRequest) -> Result<Option<SignupRole>, FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Some(message) = check_email(&req.email) {
        errors.set(Field::Email, message);
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.set(
            Field::Password,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    let role = match req.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<SignupRole>() {
            Ok(role) => Some(role),
            Err(e) => {
                errors.set(Field::Role, e.to_string());
                None
            }
        },
    };

    if errors.is_empty() {
        Ok(role)
    } else {
        Err(errors)
    }
}

async fn open_session(state: &AppState, account: AccountRow) -> Result<AuthResponse, AppError> {
    let session = Session {
        account_id: account.id,
        email: account.email.clone(),
        issued_at: Utc::now(),
    };
    let token = state.sessions.create(&session).await?;
    Ok(AuthResponse {
        success: true,
        user: account.into(),
        token,
    })
}

/// POST /api/v1/auth/signup
pub async fn handle_sign_up(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let role = validate_sign_up(&req).map_err(AppError::Validation)?;
    let email = req.email.trim().to_string();

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || password_auth::generate_hash(password))
        .await
        .map_err(anyhow::Error::from)?;

    let account = state
        .accounts
        .create(NewAccount {
            email,
            password_hash,
            name: req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            role: role.map(|r| r.as_str().to_string()),
        })
        .await?;
    info!("Created account {}", account.id);

    Ok((StatusCode::CREATED, Json(open_session(&state, account).await?)))
}

/// POST /api/v1/auth/signin
pub async fn handle_sign_in(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let account = state
        .accounts
        .find_by_email(req.email.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let hash = account.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || {
        password_auth::verify_password(req.password, &hash).is_ok()
    })
    .await
    .map_err(anyhow::Error::from)?;
    if !verified {
        return Err(AppError::InvalidCredentials);
    }

    let account = state.accounts.record_login(account.id).await?;
    Ok(Json(open_session(&state, account).await?))
}

/// POST /api/v1/auth/logout
pub async fn handle_log_out(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<LogoutResponse>, AppError> {
    state.sessions.revoke(&auth.token).await?;
    Ok(Json(LogoutResponse { success: true }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(auth: AuthSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        session: auth.session,
    })
}
