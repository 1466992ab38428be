use serde::{Deserialize, Serialize};
use shared::{SubscriptionPlan, UserRole};
use uuid::Uuid;

fn default_plan() -> SubscriptionPlan {
    SubscriptionPlan::Free
}

/// Domain model of a household user, as persisted under `famfin_users`.
///
/// The password is stored as typed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Digits only
    #[serde(default)]
    pub cpf: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default = "default_plan")]
    pub plan: SubscriptionPlan,
    #[serde(default)]
    pub avatar: String,
}

impl User {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Avatar generated from the user's name
    pub fn avatar_for(name: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
        format!(
            "https://ui-avatars.com/api/?name={}&background=10b981&color=fff",
            encoded
        )
    }

    /// Login match: email in any case, or CPF with formatting ignored
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        if self.email.to_lowercase() == identifier.trim().to_lowercase() {
            return true;
        }
        let digits = digits_only(identifier);
        !digits.is_empty() && !self.cpf.is_empty() && self.cpf == digits
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_system_admin(&self) -> bool {
        self.role == UserRole::SystemAdmin
    }

    /// First word of the name, as charts label people
    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }

    /// Merge a partial record into this user
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(cpf) = &patch.cpf {
            self.cpf = digits_only(cpf);
        }
        if let Some(password) = &patch.password {
            self.password = password.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(plan) = patch.plan {
            self.plan = plan;
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = avatar.clone();
        }
    }
}

/// Partial user record; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub plan: Option<SubscriptionPlan>,
    pub avatar: Option<String>,
}

/// Strip everything but ASCII digits ("111.222.333-44" -> "11122233344")
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}
