use std::net::SocketAddr;

use rust_decimal::Decimal;

use crate::auth::TokenMeta;
use crate::db::Database;
use crate::error::{ErrorKind, Result};
use crate::user::User;

/// Checks if provided token has expired, deleting it if it's expired.
pub fn token_expired(db: &Database, token: &TokenMeta) -> bool {
    if token.is_expired() {
        let _ = db.remove(token);
        true
    } else {
        false
    }
}

pub fn find_user_by_email(db: &Database, email: &String) -> Result<User> {
    for user in db.get_collection::<User>()? {
        if &user.email == email {
            return Ok(user);
        }
    }
    Err(ErrorKind::UserNotFound(format!("{}", email)).into())
}

/// Renders the whole part of a decimal with thousands separators, the way
/// prices and mileages are displayed on listing pages.
pub fn group_thousands(value: Decimal) -> String {
    let whole = value.trunc().to_string();
    let (sign, digits) = whole
        .strip_prefix('-')
        .map(|d| ("-", d))
        .unwrap_or(("", whole.as_str()));

    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{}{}", sign, out)
}

/// Creates an easily bindable address using the `0.0.0.0` meta-address and
/// any available port.
pub fn get_available_address() -> Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("0.0.0.0:0")?;
    let addr = listener.local_addr()?;
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(dec!(0)), "0");
        assert_eq!(group_thousands(dec!(950)), "950");
        assert_eq!(group_thousands(dec!(45_000)), "45,000");
        assert_eq!(group_thousands(dec!(4_500_000.75)), "4,500,000");
        assert_eq!(group_thousands(dec!(-1_234_567)), "-1,234,567");
    }
}
