//! User directory records: roles, the fraud flag, and chef identifiers.

use chrono::{DateTime, Utc};
use common::UserId;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Privilege level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Chef,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Chef => "chef",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Administrator-set flag that blocks new order placement.
///
/// Flagging is one-way; there is no programmatic un-flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FraudStatus {
    #[default]
    Active,
    Fraud,
}

impl FraudStatus {
    /// Returns true if the user is blocked from placing orders.
    pub fn is_fraud(&self) -> bool {
        matches!(self, FraudStatus::Fraud)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FraudStatus::Active => "active",
            FraudStatus::Fraud => "fraud",
        }
    }
}

/// Chef identifier in the `CHEF-####` format.
///
/// The four-digit suffix is random and not checked for global uniqueness;
/// collisions are possible at scale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChefId(String);

impl ChefId {
    /// Validates and wraps an existing identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        let suffix = s.strip_prefix("CHEF-");
        match suffix {
            Some(d) if d.len() == 4 && d.bytes().all(|b| b.is_ascii_digit()) => Ok(ChefId(s)),
            _ => Err(DomainError::InvalidChefId(s)),
        }
    }

    /// Generates a fresh identifier with a random 4-digit suffix.
    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(1000..10000);
        ChefId(format!("CHEF-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChefId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ChefId::new(s)
    }
}

impl From<ChefId> for String {
    fn from(id: ChefId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user directory record. Keyed by unique email; never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: FraudStatus,
    /// Present only when `role` is [`Role::Chef`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_id: Option<ChefId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates the record written on first signup.
    pub fn signup(new: NewUser, now: DateTime<Utc>) -> Self {
        User {
            id: UserId::new(),
            email: new.email,
            name: new.name,
            role: Role::User,
            status: FraudStatus::Active,
            chef_id: None,
            photo_url: new.photo_url,
            address: None,
            created_at: now,
        }
    }

    /// Applies a validated self-service update in place.
    pub fn apply_profile_update(&mut self, update: &ProfileUpdate) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref url) = update.photo_url {
            self.photo_url = Some(url.clone());
        }
        if let Some(ref address) = update.address {
            self.address = Some(address.clone());
        }
    }
}

/// Signup payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.email.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "email",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Self-service profile update, restricted to non-privileged fields.
///
/// Role, fraud status, and chef identifier are deliberately absent; unknown
/// fields are rejected at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// Returns true when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.photo_url.is_none() && self.address.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chef_id_format_is_enforced() {
        assert!(ChefId::new("CHEF-0042").is_ok());
        assert!(ChefId::new("CHEF-42").is_err());
        assert!(ChefId::new("CHEF-12345").is_err());
        assert!(ChefId::new("chef-1234").is_err());
        assert!(ChefId::new("CHEF-12a4").is_err());
    }

    #[test]
    fn generated_chef_ids_match_format() {
        for _ in 0..100 {
            let id = ChefId::generate();
            assert!(ChefId::new(id.as_str()).is_ok(), "bad id: {id}");
        }
    }

    #[test]
    fn chef_id_deserialization_validates() {
        assert!(serde_json::from_str::<ChefId>("\"CHEF-9999\"").is_ok());
        assert!(serde_json::from_str::<ChefId>("\"CHEF-x\"").is_err());
    }

    #[test]
    fn signup_defaults() {
        let user = User::signup(
            NewUser {
                email: "alice@example.com".into(),
                name: "Alice".into(),
                photo_url: None,
            },
            Utc::now(),
        );
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, FraudStatus::Active);
        assert!(user.chef_id.is_none());
    }

    #[test]
    fn profile_update_applies_only_present_fields() {
        let mut user = User::signup(
            NewUser {
                email: "alice@example.com".into(),
                name: "Alice".into(),
                photo_url: None,
            },
            Utc::now(),
        );
        user.apply_profile_update(&ProfileUpdate {
            name: None,
            photo_url: Some("https://example.com/a.png".into()),
            address: None,
        });
        assert_eq!(user.name, "Alice");
        assert_eq!(user.photo_url.as_deref(), Some("https://example.com/a.png"));
        assert!(user.address.is_none());
    }

    #[test]
    fn role_wire_casing() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&FraudStatus::Fraud).unwrap(),
            "\"fraud\""
        );
    }

    #[test]
    fn profile_update_rejects_privileged_fields() {
        let json = serde_json::json!({ "role": "admin" });
        assert!(serde_json::from_value::<ProfileUpdate>(json).is_err());

        let json = serde_json::json!({ "name": "Alice B" });
        let update: ProfileUpdate = serde_json::from_value(json).unwrap();
        assert!(!update.is_empty());
    }
}
