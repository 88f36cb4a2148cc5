#![forbid(unsafe_code)]

use poliscope_contracts::access::UserId;
use poliscope_contracts::policy::{Policy, PolicyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorKind {
    Transport,
    Timeout,
    NonSuccessStatus(u16),
    Decode,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub detail: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Transport, detail)
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, detail)
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Decode, detail)
    }
}

/// The policy comparison service as consumed by the detail page. The
/// controller receives an implementation by injection and never reaches
/// for a process-wide instance.
pub trait PolicyGateway {
    fn get_policy_by_id(&mut self, id: &PolicyId) -> Result<Option<Policy>, GatewayError>;

    fn is_policy_favorite(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<bool, GatewayError>;

    fn add_to_favorites(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<(), GatewayError>;

    fn remove_from_favorites(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<(), GatewayError>;

    fn delete_policy(&mut self, policy_id: &PolicyId) -> Result<(), GatewayError>;
}
