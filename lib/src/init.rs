//! Data initialization procedures.
//!
//! The app config can contain entries describing items expected to exist
//! after the application is started, typically the bootstrap admin accounts
//! and the standard car categories. This module converts those entries into
//! initial application state.

use crate::{auth, Category, Config, Database, Result, User};

/// Initializes database state based on entries found in the configuration.
pub fn initialize(config: &Config, db: &Database) -> Result<()> {
    users(config, db)?;
    categories(config, db)?;
    Ok(())
}

/// Initializes users from entries found in the configuration.
pub fn users(config: &Config, db: &Database) -> Result<()> {
    for user_ in &config.users {
        let mut user = user_.user.clone();
        if let Some(password) = &user_.password {
            user.password_hash = Some(auth::hash_password(password)?);
        }

        // If the user already exists, update them with the information
        // in the config.
        if let Some(mut existing_user) = db
            .get_collection::<User>()?
            .into_iter()
            .find(|u| u.email == user.email)
        {
            existing_user.is_admin = user.is_admin;
            existing_user.is_approved = user.is_approved;
            existing_user.is_disabled = user.is_disabled;
            if user.password_hash.is_some() {
                existing_user.password_hash = user.password_hash;
            }

            db.set(&existing_user)?;
        } else {
            db.set(&user)?;
        }
    }
    Ok(())
}

/// Initializes car categories from entries found in the configuration.
/// Existing categories are matched by name and left alone.
pub fn categories(config: &Config, db: &Database) -> Result<()> {
    let existing = db.get_collection::<Category>()?;
    for category_ in &config.categories {
        if existing.iter().any(|c| c.name == category_.name) {
            continue;
        }
        let category = Category {
            name: category_.name.clone(),
            description: category_.description.clone(),
            ..Default::default()
        };
        db.set(&category)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn seeds_users_and_categories() {
        let db = Database::temporary().unwrap();
        let cfg = Config {
            users: vec![config::User {
                user: User {
                    email: "admin@example.com".to_string(),
                    is_admin: true,
                    is_approved: true,
                    ..Default::default()
                },
                password: Some("hunter22".to_string()),
            }],
            categories: vec![config::Category {
                name: "SUV".to_string(),
                description: "Sport utility vehicles".to_string(),
            }],
            ..Default::default()
        };

        initialize(&cfg, &db).unwrap();
        // running again must not duplicate anything
        initialize(&cfg, &db).unwrap();

        let users = db.get_collection::<User>().unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin);
        assert!(users[0].password_hash.is_some());

        assert_eq!(db.get_collection::<Category>().unwrap().len(), 1);
    }
}
