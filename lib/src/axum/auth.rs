use std::str::FromStr;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json};
use axum_extra::extract::PrivateCookieJar;
use cookie::Cookie;
use http::StatusCode;
use serde_json::json;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateLength};

use crate::auth::TokenMeta;
use crate::error::{Error, ErrorKind, Result};
use crate::{api, auth, routes, util, Config, User};

use super::{extract, ConfigExt, DbExt, Router};

pub fn router(config: &Config) -> Router {
    let mut router = Router::new()
        .route(routes::LOGIN, post(login))
        .route(routes::LOGOUT, post(logout))
        .route(routes::ME, get(me));
    if config.registration.enabled {
        router = router.route(routes::REGISTER, post(register));
    }
    router
}

/// Worker self-registration. New accounts start unapproved and can't touch
/// the catalog until an admin lets them in.
pub async fn register(
    Extension(db): DbExt,
    Extension(config): ConfigExt,
    Json(data): Json<api::RegisterRequest>,
) -> Result<impl IntoResponse> {
    if !config.registration.enabled {
        return Err(ErrorKind::RegistrationClosed(
            "worker self-registration is disabled".to_string(),
        )
        .into());
    }

    // validate inputs
    if !data.email.validate_email() {
        return Err(ErrorKind::BadInput("invalid email".to_string()).into());
    }
    if !data.password.validate_length(Some(8), Some(128), None) {
        return Err(ErrorKind::BadInput(
            "password must be between 8 and 128 characters".to_string(),
        )
        .into());
    }
    if data.password != data.password2 {
        return Err(ErrorKind::BadInput("password fields didn't match".to_string()).into());
    }
    if util::find_user_by_email(&db, &data.email).is_ok() {
        return Err(ErrorKind::UserWithEmailAlreadyExists(data.email).into());
    }

    let user = User {
        email: data.email,
        first_name: data.first_name,
        last_name: data.last_name,
        password_hash: Some(auth::hash_password(&data.password)?),
        ..Default::default()
    };
    db.set(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(api::UserResponse {
            message: "Registration successful. Please wait for admin approval.".to_string(),
            user: Some(api::UserEntry::new(&user)),
        }),
    ))
}

/// Processes login data and hands back an access token.
pub async fn login(
    Extension(db): DbExt,
    mut cookies: PrivateCookieJar,
    Json(data): Json<api::AuthRequest>,
) -> Result<(PrivateCookieJar, impl IntoResponse)> {
    let user = util::find_user_by_email(&db, &data.email)
        .map_err(|_| ErrorKind::InvalidCredentials)?;

    let password_hash = user
        .password_hash
        .clone()
        .ok_or_else(|| Error::new_with(ErrorKind::PasswordNotSet, None, Some(user.id)))?;
    if auth::validate_password(data.password.as_bytes(), &password_hash).is_err() {
        return Err(ErrorKind::InvalidCredentials.into());
    }

    // workers need approval before they can log in, admins don't
    if user.is_worker() && !user.is_approved {
        return Err(Error::new_with(
            ErrorKind::PendingApproval,
            None,
            Some(user.id),
        ));
    }
    if user.is_disabled {
        return Err(Error::new_with(
            ErrorKind::AccountDisabled,
            None,
            Some(user.id),
        ));
    }

    let token = auth::login::issue_token(&user.id, &db)?;
    cookies = cookies.add(auth::login::token_cookie(&token));

    Ok((
        cookies,
        Json(api::AuthResponse {
            message: "Login successful".to_string(),
            token: token.id.to_string(),
            user: api::UserEntry::new(&user),
        }),
    ))
}

/// Logout handler. Removes the presented token from the db along with the
/// token cookie.
pub async fn logout(
    Extension(db): DbExt,
    bearer: Option<axum_auth::AuthBearer>,
    mut cookies: PrivateCookieJar,
) -> Result<(PrivateCookieJar, impl IntoResponse)> {
    let token = match bearer {
        Some(axum_auth::AuthBearer(token)) => Some(token),
        None => cookies.get("token").map(|c| c.value().to_string()),
    };
    if let Some(token) = token {
        if let Ok(id) = Uuid::from_str(&token) {
            let _ = db.remove_by_id::<TokenMeta>(id);
        }
    }
    cookies = cookies.remove(Cookie::from("token"));

    Ok((cookies, Json(json!({ "message": "Logout successful" }))))
}

/// Current authenticated user details.
pub async fn me(user: extract::User) -> Result<impl IntoResponse> {
    Ok(Json(api::UserEntry::new(&user)))
}
