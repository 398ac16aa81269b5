use cookie::{Cookie, SameSite};

use crate::error::Result;
use crate::{util, Database, UserId};

use super::TokenMeta;

/// Issues an access token for the user, reusing an existing unexpired one
/// if present.
pub fn issue_token(user_id: &UserId, db: &Database) -> Result<TokenMeta> {
    let tokens = db.get_collection::<TokenMeta>()?;

    // check if an active token exists for user
    for token in tokens {
        if &token.user_id == user_id && !token.is_expired() {
            return Ok(token);
        }
    }

    // no active token for user, generate one
    let token = TokenMeta::new(user_id.clone());
    db.set(&token)?;

    Ok(token)
}

/// Builds the token cookie handed to browser clients.
pub fn token_cookie<'c>(token: &TokenMeta) -> Cookie<'c> {
    Cookie::build(("token", token.id.to_string()))
        .same_site(SameSite::Lax)
        .path("/")
        .secure(true)
        .build()
}

/// Generates a cookie for logging in user by user id.
pub fn log_in_user_id<'c>(user_id: &UserId, db: &Database) -> Result<Cookie<'c>> {
    let token = issue_token(user_id, db)?;
    Ok(token_cookie(&token))
}

/// Generates a cookie for logging in user with user email.
pub fn log_in_user_email<'c>(user_email: &str, db: &Database) -> Result<Cookie<'c>> {
    let user = util::find_user_by_email(db, &user_email.to_string())?;
    log_in_user_id(&user.id, db)
}
