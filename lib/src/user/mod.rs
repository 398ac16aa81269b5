use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{Collectable, Identifiable};

pub type UserId = Uuid;

/// User data structure.
///
/// Accounts come in two flavors: workers and admins. Workers self-register
/// and stay locked out of catalog mutations until an admin approves them;
/// admins are either seeded through config or promoted from approved
/// workers.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct User {
    pub id: UserId,

    pub email: String,

    pub first_name: String,
    pub last_name: String,

    /// Users seeded from config may have no password set until one is
    /// assigned, hence the option type.
    pub password_hash: Option<String>,

    pub is_admin: bool,
    pub is_approved: bool,
    pub is_disabled: bool,

    pub date_joined: DateTime<Utc>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),

            email: "".to_string(),

            first_name: "".to_string(),
            last_name: "".to_string(),

            password_hash: None,

            is_admin: false,
            is_approved: false,
            is_disabled: false,

            date_joined: Utc::now(),
        }
    }
}

impl Collectable for User {
    fn get_collection_name() -> &'static str {
        "user"
    }
}

impl Identifiable for User {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Workers are all non-admin accounts.
    pub fn is_worker(&self) -> bool {
        !self.is_admin
    }

    /// Approved-worker-or-admin policy gating all catalog and gallery
    /// mutations. Admins always pass, workers must be approved first.
    pub fn can_manage_catalog(&self) -> bool {
        if self.is_disabled {
            return false;
        }
        self.is_admin || self.is_approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_policy() {
        let mut user = User::default();
        assert!(!user.can_manage_catalog());

        user.is_approved = true;
        assert!(user.can_manage_catalog());

        user.is_disabled = true;
        assert!(!user.can_manage_catalog());

        let admin = User {
            is_admin: true,
            ..Default::default()
        };
        assert!(admin.can_manage_catalog());
        assert!(!admin.is_worker());
    }
}
