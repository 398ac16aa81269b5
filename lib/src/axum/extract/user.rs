use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_auth::AuthBearer;
use axum_extra::extract::cookie::Key as CookieKey;
use axum_extra::extract::PrivateCookieJar;
use log::debug;
use uuid::Uuid;

use crate::auth::TokenMeta;
use crate::db::Database;
use crate::error::{Error, ErrorKind};
use crate::user::User as RawUser;
use crate::util::token_expired;
use crate::Config;

/// Extractor resolving the calling user from the presented access token,
/// either a bearer header or the private token cookie.
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct User(pub RawUser);

impl Deref for User {
    type Target = RawUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<RawUser> for User {
    fn from(u: RawUser) -> Self {
        Self(u)
    }
}

impl From<User> for RawUser {
    fn from(u: User) -> Self {
        u.0
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for User
where
    CookieKey: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(mut parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let db = parts
            .extensions
            .get::<Arc<Database>>()
            .expect("database extension unavailable")
            .clone();
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .expect("config extension unavailable")
            .clone();

        // autologin functionality for faster development, can be set in config
        if config.dev.enabled {
            if let Some(autologin_email) = &config.dev.autologin {
                debug!("attempting autologin, uri: {}", parts.uri);
                let users = db.get_collection::<RawUser>()?;
                if let Some(user) = users.into_iter().find(|u| &u.email == autologin_email) {
                    return Ok(User(user));
                } else {
                    return Err(ErrorKind::AuthFailed(format!(
                        "autologin: provided user email that doesn't exist: {}",
                        autologin_email
                    ))
                    .into());
                }
            }
        }

        // first see if the bearer token is presented with authorization header
        let token = if let Ok(token) = AuthBearer::from_request_parts(parts, state).await {
            token.0
        } else {
            // otherwise try accessing cookie jar and extracting the token cookie
            let jar: PrivateCookieJar<CookieKey> =
                PrivateCookieJar::from_request_parts(&mut parts, state)
                    .await
                    .expect("cookie jar extraction is infallible");

            let cookie = jar
                .get("token")
                .ok_or(ErrorKind::AuthFailed("no access token presented".to_string()))?;

            cookie.value().to_string()
        };

        let token = db.get::<TokenMeta>(Uuid::from_str(&token)?).map_err(|_| {
            Error::new(ErrorKind::AuthFailed(
                "failed getting token meta from db".to_string(),
            ))
        })?;

        // check if token hasn't expired
        if token_expired(&db, &token) {
            return Err(ErrorKind::AuthFailed("token expired".to_string()).into());
        }

        db.get::<RawUser>(token.user_id)
            .map(User)
            .map_err(|_| ErrorKind::AuthFailed("token user no longer exists".to_string()).into())
    }
}
