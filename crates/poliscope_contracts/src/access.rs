#![forbid(unsafe_code)]

use serde::Serialize;

use crate::common::validate_token;
use crate::{ContractViolation, Validate};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = Self(id.into());
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for UserId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_token("user_id", &self.0, 96)
    }
}

/// The role set of the surrounding dashboard. A role absent from this
/// enum cannot reach the page at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    User,
    Insurer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Insurer => "insurer",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub role: Role,
}

impl UserProfile {
    pub fn v1(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Read-only snapshot of the authentication context. The page never
/// writes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessContext {
    pub profile: Option<UserProfile>,
}

impl AccessContext {
    pub fn signed_out() -> Self {
        Self { profile: None }
    }

    pub fn signed_in(profile: UserProfile) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.profile.as_ref().map(|p| &p.user_id)
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}
