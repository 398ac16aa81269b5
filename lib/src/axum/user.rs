//! Admin-only user management: listing accounts, approving or rejecting
//! pending workers and promoting approved workers to admin.

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json};

use crate::error::{ErrorKind, Result};
use crate::{api, routes, User};

use super::{extract, DbExt, Router};

pub fn router() -> Router {
    Router::new()
        .route(routes::USERS, get(all_users))
        .route(routes::USERS_PENDING, get(pending_workers))
        .route(routes::USERS_APPROVE, post(approve_worker))
        .route(routes::USERS_PROMOTE, post(promote_to_admin))
}

/// List all users, newest first.
pub async fn all_users(
    user: extract::User,
    Extension(db): DbExt,
) -> Result<impl IntoResponse> {
    if !user.is_admin {
        return Err(ErrorKind::Forbidden.into());
    }

    let mut users = db.get_collection::<User>()?;
    users.sort_by_key(|u| std::cmp::Reverse(u.date_joined));

    Ok(Json(
        users.iter().map(api::UserEntry::new).collect::<Vec<_>>(),
    ))
}

/// List workers awaiting approval, newest first.
pub async fn pending_workers(
    user: extract::User,
    Extension(db): DbExt,
) -> Result<impl IntoResponse> {
    if !user.is_admin {
        return Err(ErrorKind::Forbidden.into());
    }

    let mut users = db
        .get_collection::<User>()?
        .into_iter()
        .filter(|u| u.is_worker() && !u.is_approved)
        .collect::<Vec<_>>();
    users.sort_by_key(|u| std::cmp::Reverse(u.date_joined));

    Ok(Json(
        users.iter().map(api::UserEntry::new).collect::<Vec<_>>(),
    ))
}

/// Approve or reject a pending worker. Rejection removes the account.
pub async fn approve_worker(
    user: extract::User,
    Extension(db): DbExt,
    Json(data): Json<api::ApproveRequest>,
) -> Result<impl IntoResponse> {
    if !user.is_admin {
        return Err(ErrorKind::Forbidden.into());
    }

    let mut target = db
        .get::<User>(data.user_id)
        .map_err(|_| ErrorKind::UserNotFound(data.user_id.to_string()))?;
    if target.is_admin {
        return Err(
            ErrorKind::BadInput("cannot approve or reject admin users".to_string()).into(),
        );
    }

    if data.approve {
        target.is_approved = true;
        db.set(&target)?;

        Ok(Json(api::UserResponse {
            message: format!("Worker {} has been approved", target.email),
            user: Some(api::UserEntry::new(&target)),
        }))
    } else {
        // Reject - delete the account
        db.remove(&target)?;

        Ok(Json(api::UserResponse {
            message: format!("Worker {} has been rejected and removed", target.email),
            user: None,
        }))
    }
}

/// Promote an approved worker to admin.
pub async fn promote_to_admin(
    user: extract::User,
    Extension(db): DbExt,
    Json(data): Json<api::PromoteRequest>,
) -> Result<impl IntoResponse> {
    if !user.is_admin {
        return Err(ErrorKind::Forbidden.into());
    }

    let mut target = db
        .get::<User>(data.user_id)
        .map_err(|_| ErrorKind::UserNotFound(data.user_id.to_string()))?;
    if target.is_admin {
        return Err(ErrorKind::BadInput("user is already an admin".to_string()).into());
    }
    if !target.is_approved {
        return Err(ErrorKind::BadInput(
            "user must be approved before promotion to admin".to_string(),
        )
        .into());
    }

    target.is_admin = true;
    db.set(&target)?;

    Ok(Json(api::UserResponse {
        message: format!("{} has been promoted to admin", target.email),
        user: Some(api::UserEntry::new(&target)),
    }))
}
