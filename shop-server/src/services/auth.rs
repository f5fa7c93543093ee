//! Account registration, login and profile

use shared::models::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserResponse};
use shared::{AppError, ErrorCode};
use sqlx::SqlitePool;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServiceResult;
use crate::db::repository::{RepoError, user};
use crate::security_log;
use crate::utils::validation::{MAX_NAME_LEN, validate_email, validate_password, validate_required_text};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue(jwt: &JwtService, user: User) -> ServiceResult<AuthResponse> {
    let access_token = jwt
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    Ok(AuthResponse {
        user: user.into(),
        access_token,
    })
}

async fn create_account(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    password: &str,
    role: Role,
) -> ServiceResult<User> {
    let password_hash = hash_password(password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    let created = user::create(
        pool,
        email,
        name,
        &password_hash,
        role,
        shared::util::now_millis(),
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::EmailAlreadyRegistered).into(),
        other => crate::core::ServiceError::from(other),
    })?;
    Ok(created)
}

/// Create a USER account and sign it in
pub async fn register(
    pool: &SqlitePool,
    jwt: &JwtService,
    request: &RegisterRequest,
) -> ServiceResult<AuthResponse> {
    let email = normalize_email(&request.email);
    validate_email(&email)?;
    validate_required_text(&request.name, "name", MAX_NAME_LEN)?;
    validate_password(&request.password)?;

    if user::find_by_email(pool, &email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
    }
    let created = create_account(pool, &email, request.name.trim(), &request.password, Role::User).await?;

    tracing::info!(user_id = created.id, "User registered");
    issue(jwt, created)
}

/// Exchange credentials for an access token
///
/// Unknown email and wrong password give the same 401.
pub async fn login(
    pool: &SqlitePool,
    jwt: &JwtService,
    request: &LoginRequest,
) -> ServiceResult<AuthResponse> {
    let email = normalize_email(&request.email);
    let found = user::find_by_email(pool, &email).await?;

    let Some(found) = found.filter(|u| verify_password(&request.password, &u.password_hash)) else {
        security_log!("WARN", "login_failed", email = email.as_str());
        return Err(AppError::invalid_credentials().into());
    };

    tracing::info!(user_id = found.id, role = found.role.as_str(), "User logged in");
    issue(jwt, found)
}

/// The stored account behind a token
pub async fn profile(pool: &SqlitePool, principal: &CurrentUser) -> ServiceResult<UserResponse> {
    let found = user::find_by_id(pool, principal.id).await?.ok_or_else(|| {
        security_log!("WARN", "token_for_missing_user", user_id = principal.id);
        AppError::not_authenticated()
    })?;
    Ok(found.into())
}

/// Create the configured ADMIN unless the email is already taken
///
/// Returns whether an account was created.
pub async fn bootstrap_admin(pool: &SqlitePool, email: &str, password: &str) -> ServiceResult<bool> {
    let email = normalize_email(email);
    validate_email(&email)?;
    validate_password(password)?;

    if user::find_by_email(pool, &email).await?.is_some() {
        tracing::debug!(email = %email, "Admin account already present");
        return Ok(false);
    }
    let created = create_account(pool, &email, "Administrator", password, Role::Admin).await?;
    tracing::info!(user_id = created.id, email = %email, "Admin account created");
    Ok(true)
}
